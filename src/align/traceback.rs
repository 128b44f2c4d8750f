use super::matrix::ScoreMatrix;
use super::mode::AlignMode;
use super::scoring::ScoringScheme;

pub const GAP: u8 = b'-';

/// 回溯得到的一对比对序列（等长，空位以 `-` 表示）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlignedPair {
    pub aligned1: Vec<u8>,
    pub aligned2: Vec<u8>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.aligned1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned1.is_empty()
    }

    /// 任一条序列在该列为空位即计数一次
    pub fn gap_count(&self) -> usize {
        self.aligned1
            .iter()
            .zip(&self.aligned2)
            .filter(|&(&x, &y)| x == GAP || y == GAP)
            .count()
    }
}

/// 从 `start` 回溯至变体的终止条件
///
/// 每一步按固定优先级选择：对角（匹配/错配）> 竖直（b 中插入空位）> 水平（a 中插入空位）。
/// 多条路径得分相同时，该优先级决定输出哪一条。
pub fn traceback(
    matrix: &ScoreMatrix,
    a: &[u8],
    b: &[u8],
    scheme: &ScoringScheme,
    mode: AlignMode,
    start: (usize, usize),
) -> AlignedPair {
    let (mut i, mut j) = start;
    let mut out1: Vec<u8> = Vec::with_capacity(i + j);
    let mut out2: Vec<u8> = Vec::with_capacity(i + j);

    while !mode.stops(matrix, i, j) {
        let s = matrix.get(i, j);
        let diag = i > 0
            && j > 0
            && s == matrix.get(i - 1, j - 1) + scheme.substitution(a[i - 1], b[j - 1]);

        if diag {
            out1.push(a[i - 1]);
            out2.push(b[j - 1]);
            i -= 1;
            j -= 1;
        } else if i > 0 && s == matrix.get(i - 1, j) + scheme.gap_score() {
            out1.push(a[i - 1]);
            out2.push(GAP);
            i -= 1;
        } else if j > 0 {
            out1.push(GAP);
            out2.push(b[j - 1]);
            j -= 1;
        } else {
            // no consistent predecessor
            log::warn!("traceback stuck at ({}, {}) with score {}", i, j, s);
            break;
        }
    }

    out1.reverse();
    out2.reverse();

    AlignedPair {
        aligned1: out1,
        aligned2: out2,
    }
}
