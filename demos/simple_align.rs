//! 演示如何在 library 模式下使用 pairalign 进行双序列比对。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_align
//! ```

use pairalign::align::{self, AlignMode, ScoringScheme};
use pairalign::io::wire::{self, AlignRequest};

fn main() -> anyhow::Result<()> {
    let seq1 = b"GATTACAGATTACA";
    let seq2 = b"GCATGCTACAGA";
    println!("序列1: {}", String::from_utf8_lossy(seq1));
    println!("序列2: {}", String::from_utf8_lossy(seq2));

    // 1. 默认打分：match=1, mismatch=-1, gap=-1
    let scheme = ScoringScheme::default();

    // 2. 打分矩阵
    let filled = align::fill(seq1, seq2, &scheme, AlignMode::Local);
    println!(
        "\n局部打分矩阵 {}x{}，最高分 {} 位于 {:?}",
        filled.matrix.rows(),
        filled.matrix.cols(),
        filled.best_score,
        filled.best
    );

    // 3. 全局与局部比对
    let (g, l) = align::align_both(seq1, seq2, scheme);
    println!("\nNeedleman-Wunsch:");
    println!("  {}", g.aligned1_str());
    println!("  {}", g.aligned2_str());
    println!("  得分={}  空位={}  耗时={:.4}s", g.score, g.gaps, g.seconds());

    println!("\nSmith-Waterman:");
    println!("  {}", l.aligned1_str());
    println!("  {}", l.aligned2_str());
    println!("  得分={}  空位={}  耗时={:.4}s", l.score, l.gaps, l.seconds());

    // 4. 线协议
    let request = AlignRequest::new("AGT", "AT");
    let parsed = wire::parse_request(&request.to_payload())?;
    let (g, l) = align::align_both(parsed.seq1.as_bytes(), parsed.seq2.as_bytes(), scheme);
    let response = wire::format_labelled_response("Rust", &g, &l);
    println!("\n请求: {}", request.to_payload());
    println!("应答: {}", response);
    println!("\n{}", wire::parse_response(&response)?.render());

    Ok(())
}
