use super::mode::AlignMode;
use super::scoring::{Score, ScoringScheme};

/// (n+1)×(m+1) 打分矩阵，按行连续存放，下标为 `i * cols + j`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<Score>,
}

impl ScoreMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Score {
        self.cells[i * self.cols + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, v: Score) {
        self.cells[i * self.cols + j] = v;
    }

    pub fn row(&self, i: usize) -> &[Score] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }
}

/// 填表结果：矩阵本身 + 最高分单元格
#[derive(Debug)]
pub struct FilledMatrix {
    pub matrix: ScoreMatrix,
    pub best_score: Score,
    pub best: (usize, usize),
}

/// 按比对变体填充打分矩阵
///
/// 递推：`H[i][j] = max(H[i-1][j-1] + s(a, b), H[i-1][j] + gap, H[i][j-1] + gap)`，
/// 局部比对再与 0 取最大值。最高分的记录规则为“后出现的 >= 当前最大值者胜出”，
/// 按行优先扫描，因此并列时保留最后扫描到的单元格。
pub fn fill(a: &[u8], b: &[u8], scheme: &ScoringScheme, mode: AlignMode) -> FilledMatrix {
    let n = a.len();
    let m = b.len();
    let mut matrix = ScoreMatrix::new(n + 1, m + 1);

    for i in 0..=n {
        matrix.set(i, 0, mode.border(scheme, i));
    }
    for j in 0..=m {
        matrix.set(0, j, mode.border(scheme, j));
    }

    let floor = mode.floor();
    let mut best_score: Score = 0;
    let mut best = (0usize, 0usize);

    for i in 1..=n {
        for j in 1..=m {
            let diag = matrix.get(i - 1, j - 1) + scheme.substitution(a[i - 1], b[j - 1]);
            let up = matrix.get(i - 1, j) + scheme.gap_score();
            let left = matrix.get(i, j - 1) + scheme.gap_score();

            let mut val = diag.max(up).max(left);
            if let Some(f) = floor {
                val = val.max(f);
            }
            matrix.set(i, j, val);

            if val >= best_score {
                best_score = val;
                best = (i, j);
            }
        }
    }

    log::trace!(
        "{} matrix {}x{} filled, best {} at {:?}",
        mode.name(),
        n + 1,
        m + 1,
        best_score,
        best
    );

    FilledMatrix {
        matrix,
        best_score,
        best,
    }
}
