use super::matrix::ScoreMatrix;
use super::scoring::{Score, ScoringScheme};

/// 比对变体：全局（Needleman-Wunsch）或局部（Smith-Waterman）
///
/// 两种变体共享同一套递推和回溯，只在以下几处不同：
/// 边界初始化、是否在 0 处截断、回溯起点、回溯终止条件。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignMode {
    Global,
    Local,
}

impl AlignMode {
    /// 第 k 行（或列）的边界值
    #[inline]
    pub fn border(self, scheme: &ScoringScheme, k: usize) -> Score {
        match self {
            AlignMode::Global => scheme.gap_score() * k as Score,
            AlignMode::Local => 0,
        }
    }

    #[inline]
    pub fn floor(self) -> Option<Score> {
        match self {
            AlignMode::Global => None,
            AlignMode::Local => Some(0),
        }
    }

    /// 回溯起点。`best` 为填表时记录的最高分单元格，仅局部比对使用。
    pub fn start(self, matrix: &ScoreMatrix, best: (usize, usize)) -> (usize, usize) {
        match self {
            AlignMode::Global => (matrix.rows() - 1, matrix.cols() - 1),
            AlignMode::Local => best,
        }
    }

    #[inline]
    pub fn stops(self, matrix: &ScoreMatrix, i: usize, j: usize) -> bool {
        match self {
            AlignMode::Global => i == 0 && j == 0,
            AlignMode::Local => matrix.get(i, j) == 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AlignMode::Global => "Needleman-Wunsch",
            AlignMode::Local => "Smith-Waterman",
        }
    }
}
