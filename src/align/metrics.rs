use std::time::{Duration, Instant};

use super::scoring::Score;
use super::traceback::AlignedPair;

/// 一次比对的完整结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub aligned1: Vec<u8>,
    pub aligned2: Vec<u8>,
    pub score: Score,
    pub gaps: usize,
    pub elapsed: Duration,
}

impl AlignmentResult {
    pub fn from_pair(pair: AlignedPair, score: Score, elapsed: Duration) -> Self {
        let gaps = pair.gap_count();
        Self {
            aligned1: pair.aligned1,
            aligned2: pair.aligned2,
            score,
            gaps,
            elapsed,
        }
    }

    pub fn aligned1_str(&self) -> String {
        String::from_utf8_lossy(&self.aligned1).into_owned()
    }

    pub fn aligned2_str(&self) -> String {
        String::from_utf8_lossy(&self.aligned2).into_owned()
    }

    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// 计时执行 `f`，返回其结果与耗时（单调时钟）
pub fn timed<R>(f: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}
