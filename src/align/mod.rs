pub mod matrix;
pub mod metrics;
pub mod mode;
pub mod scoring;
pub mod traceback;

pub use matrix::{fill, FilledMatrix, ScoreMatrix};
pub use metrics::{timed, AlignmentResult};
pub use mode::AlignMode;
pub use scoring::{Score, ScoringScheme};
pub use traceback::{traceback, AlignedPair, GAP};

/// 按给定变体执行一次完整比对：填表 + 回溯 + 统计
///
/// 计时仅覆盖填表与回溯，矩阵在返回前释放。
pub fn align(a: &[u8], b: &[u8], scheme: ScoringScheme, mode: AlignMode) -> AlignmentResult {
    let ((pair, score), elapsed) = timed(|| {
        let filled = fill(a, b, &scheme, mode);
        let start = mode.start(&filled.matrix, filled.best);
        let score = match mode {
            AlignMode::Global => filled.matrix.get(start.0, start.1),
            AlignMode::Local => filled.best_score,
        };
        let pair = traceback(&filled.matrix, a, b, &scheme, mode, start);
        (pair, score)
    });

    log::debug!(
        "{}: len {}x{} -> score {}, aligned length {}",
        mode.name(),
        a.len(),
        b.len(),
        score,
        pair.len()
    );

    AlignmentResult::from_pair(pair, score, elapsed)
}

/// 全局比对（Needleman-Wunsch）
pub fn align_global(a: &[u8], b: &[u8], scheme: ScoringScheme) -> AlignmentResult {
    align(a, b, scheme, AlignMode::Global)
}

/// 局部比对（Smith-Waterman）
pub fn align_local(a: &[u8], b: &[u8], scheme: ScoringScheme) -> AlignmentResult {
    align(a, b, scheme, AlignMode::Local)
}

/// 同一请求的两种比对相互独立，并行执行，各自计时
pub fn align_both(a: &[u8], b: &[u8], scheme: ScoringScheme) -> (AlignmentResult, AlignmentResult) {
    rayon::join(|| align_global(a, b, scheme), || align_local(a, b, scheme))
}
