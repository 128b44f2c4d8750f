/// 矩阵中的分值类型。打分参数为 `i32`，累加在 `i64` 中进行，
/// 任意 `i32` 参数乘以序列长度都不会溢出。
pub type Score = i64;

/// 线性打分方案：匹配奖励、错配罚分、空位罚分
///
/// 不做任何取值校验，调用方负责给出有意义的组合。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringScheme {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap: i32,
}

impl ScoringScheme {
    pub const fn new(match_score: i32, mismatch_score: i32, gap: i32) -> Self {
        Self {
            match_score,
            mismatch_score,
            gap,
        }
    }

    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> Score {
        if a == b {
            Score::from(self.match_score)
        } else {
            Score::from(self.mismatch_score)
        }
    }

    #[inline]
    pub fn gap_score(&self) -> Score {
        Score::from(self.gap)
    }
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self::new(1, -1, -1)
    }
}
