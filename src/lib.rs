//! # pairalign
//!
//! 线性打分下的双序列最优比对。
//!
//! 本 crate 提供：
//!
//! - **全局比对**：Needleman-Wunsch，两条序列从头到尾完整参与比对
//! - **局部比对**：Smith-Waterman，找出得分最高的一对连续子串
//! - **线协议**：`seq1:<A>;seq2:<B>` 请求的解析与 `Needleman;...;Smith;...` 应答的生成
//! - **客户端**：连接对端、接收请求、返回两种比对结果
//!
//! ## 快速示例
//!
//! ```rust
//! use pairalign::align::{align_global, align_local, ScoringScheme};
//!
//! let scheme = ScoringScheme::default(); // match=1, mismatch=-1, gap=-1
//!
//! let g = align_global(b"AGT", b"AT", scheme);
//! assert_eq!(g.score, 1);
//! assert_eq!(g.aligned1, b"AGT");
//! assert_eq!(g.aligned2, b"A-T");
//! assert_eq!(g.gaps, 1);
//!
//! let l = align_local(b"AGT", b"AT", scheme);
//! assert_eq!(l.aligned1, b"T");
//! assert_eq!(l.aligned2, b"T");
//! ```
//!
//! ## 模块说明
//!
//! - [`align`] — 打分方案、打分矩阵填充、回溯、计时
//! - [`io`] — FASTA 解析、线协议、TCP 客户端会话

pub mod align;
pub mod io;
