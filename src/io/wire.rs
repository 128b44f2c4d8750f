//! 文本线协议
//!
//! 请求：`seq1:<A>;seq2:<B>`
//!
//! 应答（可带来源标签前缀 `<label>;`）：
//! `Needleman;Alignment1:..;Alignment2:..;AlignmentScore:..;Gap:..;ExecutionTime:..;Smith;...`

use std::fmt::Write as _;
use std::io::{ErrorKind, Read};

use thiserror::Error;

use crate::align::{AlignmentResult, Score};

pub const END_DELIMITER: &str = "<END>";

const GLOBAL_MARKER: &str = "Needleman";
const LOCAL_MARKER: &str = "Smith";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("missing section marker '{0}'")]
    MissingMarker(&'static str),
    #[error("field '{field}' is not a number: '{value}'")]
    BadNumber { field: &'static str, value: String },
    #[error("message exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("request needs {cells} matrix cells, limit is {limit}")]
    MatrixTooLarge { cells: u128, limit: u128 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignRequest {
    pub seq1: String,
    pub seq2: String,
}

impl AlignRequest {
    pub fn new(seq1: impl Into<String>, seq2: impl Into<String>) -> Self {
        Self {
            seq1: seq1.into(),
            seq2: seq2.into(),
        }
    }

    pub fn to_payload(&self) -> String {
        format!("seq1:{};seq2:{}", self.seq1, self.seq2)
    }

    /// 比对所需的矩阵单元格数 (n+1)(m+1)
    pub fn matrix_cells(&self) -> u128 {
        (self.seq1.len() as u128 + 1) * (self.seq2.len() as u128 + 1)
    }

    pub fn check_size(&self, limit: u128) -> Result<(), ProtocolError> {
        let cells = self.matrix_cells();
        if cells > limit {
            return Err(ProtocolError::MatrixTooLarge { cells, limit });
        }
        Ok(())
    }
}

/// 从流中读取一条完整消息
///
/// 以下任一情况视为消息结束：对端关闭、末尾为换行、出现 `<END>`、
/// 已收到数据后读超时（`WouldBlock`/`TimedOut`）。尚未收到数据时的超时继续等待。
/// 累计超过 `limit` 字节即报错，不做截断。
pub fn read_message<R: Read>(reader: &mut R, limit: usize) -> anyhow::Result<String> {
    let mut data: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                data.extend_from_slice(&chunk[..n]);
                if data.len() > limit {
                    return Err(ProtocolError::PayloadTooLarge { limit }.into());
                }
                if data.ends_with(b"\n") || contains_end(&data) {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                if data.is_empty() {
                    continue;
                }
                log::trace!("peer idle after {} bytes, message complete", data.len());
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn contains_end(data: &[u8]) -> bool {
    data.windows(END_DELIMITER.len())
        .any(|w| w == END_DELIMITER.as_bytes())
}

/// 解析请求；多余的字段忽略，序列可为空
pub fn parse_request(payload: &str) -> Result<AlignRequest, ProtocolError> {
    let payload = payload.trim_end_matches(|c: char| c.is_whitespace() || c == '\0');
    let payload = payload.strip_suffix(END_DELIMITER).unwrap_or(payload);
    let fields: Vec<&str> = payload.split(';').collect();
    if fields.len() < 2 {
        return Err(ProtocolError::TooFewFields {
            expected: 2,
            found: fields.len(),
        });
    }
    let seq1 = fields[0]
        .strip_prefix("seq1:")
        .ok_or(ProtocolError::MissingField("seq1"))?;
    let seq2 = fields[1]
        .strip_prefix("seq2:")
        .ok_or(ProtocolError::MissingField("seq2"))?;
    Ok(AlignRequest::new(seq1, seq2))
}

/// 单个比对变体在应答中的字段
#[derive(Debug, Clone, PartialEq)]
pub struct VariantReport {
    pub alignment1: String,
    pub alignment2: String,
    pub score: Score,
    pub gaps: usize,
    pub seconds: f64,
}

impl From<&AlignmentResult> for VariantReport {
    fn from(r: &AlignmentResult) -> Self {
        Self {
            alignment1: r.aligned1_str(),
            alignment2: r.aligned2_str(),
            score: r.score,
            gaps: r.gaps,
            seconds: r.seconds(),
        }
    }
}

impl VariantReport {
    fn write_wire(&self, marker: &str, out: &mut String) {
        let _ = write!(
            out,
            "{};Alignment1:{};Alignment2:{};AlignmentScore:{};Gap:{};ExecutionTime:{:.4}",
            marker, self.alignment1, self.alignment2, self.score, self.gaps, self.seconds
        );
    }

    pub fn write_summary(&self, title: &str, out: &mut String) {
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(out, "  Alignment1: {}", self.alignment1);
        let _ = writeln!(out, "  Alignment2: {}", self.alignment2);
        let _ = writeln!(out, "  Alignment Score: {}", self.score);
        let _ = writeln!(out, "  Gap: {}", self.gaps);
        let _ = writeln!(out, "  Execution Time: {:.4}", self.seconds);
    }

    fn parse(fields: &[&str]) -> Result<Self, ProtocolError> {
        if fields.len() < 5 {
            return Err(ProtocolError::TooFewFields {
                expected: 5,
                found: fields.len(),
            });
        }
        let alignment1 = field_value(fields[0], "Alignment1")?.to_string();
        let alignment2 = field_value(fields[1], "Alignment2")?.to_string();
        let score = parse_number(fields[2], "AlignmentScore")?;
        let gaps = parse_number(fields[3], "Gap")?;
        let seconds = parse_number(fields[4], "ExecutionTime")?;
        Ok(Self {
            alignment1,
            alignment2,
            score,
            gaps,
            seconds,
        })
    }
}

fn field_value<'a>(field: &'a str, key: &'static str) -> Result<&'a str, ProtocolError> {
    field
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or(ProtocolError::MissingField(key))
}

fn parse_number<T: std::str::FromStr>(field: &str, key: &'static str) -> Result<T, ProtocolError> {
    let value = field_value(field, key)?;
    value.trim().parse().map_err(|_| ProtocolError::BadNumber {
        field: key,
        value: value.to_string(),
    })
}

/// 一份完整应答：全局 + 局部两段，外加可选的来源标签
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseReport {
    pub label: Option<String>,
    pub global: VariantReport,
    pub local: VariantReport,
}

impl ResponseReport {
    pub fn new(label: Option<&str>, global: &AlignmentResult, local: &AlignmentResult) -> Self {
        Self {
            label: label.map(str::to_string),
            global: global.into(),
            local: local.into(),
        }
    }

    pub fn to_wire(&self) -> String {
        let mut out = String::new();
        if let Some(label) = &self.label {
            out.push_str(label);
            out.push(';');
        }
        self.global.write_wire(GLOBAL_MARKER, &mut out);
        out.push(';');
        self.local.write_wire(LOCAL_MARKER, &mut out);
        out
    }

    /// 多行可读摘要
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(label) = &self.label {
            let _ = writeln!(out, "Source: {}\n", label);
        }
        self.global.write_summary("Needleman-Wunsch", &mut out);
        out.push('\n');
        self.local.write_summary("Smith-Waterman", &mut out);
        out
    }
}

pub fn format_response(global: &AlignmentResult, local: &AlignmentResult) -> String {
    ResponseReport::new(None, global, local).to_wire()
}

pub fn format_labelled_response(
    label: &str,
    global: &AlignmentResult,
    local: &AlignmentResult,
) -> String {
    ResponseReport::new(Some(label), global, local).to_wire()
}

/// 解析应答；接受带或不带标签的形式，末尾的 `<END>` 会被去掉
pub fn parse_response(text: &str) -> Result<ResponseReport, ProtocolError> {
    let text = text.trim();
    let text = text.strip_suffix(END_DELIMITER).unwrap_or(text).trim_end();
    let fields: Vec<&str> = text.split(';').collect();

    let g = fields
        .iter()
        .position(|&f| f == GLOBAL_MARKER)
        .ok_or(ProtocolError::MissingMarker(GLOBAL_MARKER))?;
    let label = (g > 0).then(|| fields[..g].join(";"));

    let global = VariantReport::parse(&fields[g + 1..])?;
    let l = g + 6;
    if fields.get(l).copied() != Some(LOCAL_MARKER) {
        return Err(ProtocolError::MissingMarker(LOCAL_MARKER));
    }
    let local = VariantReport::parse(&fields[l + 1..])?;

    Ok(ResponseReport {
        label,
        global,
        local,
    })
}

/// 选出全局比对得分最高的应答，并列时取最先出现者
pub fn best_report(reports: &[ResponseReport]) -> Option<&ResponseReport> {
    reports
        .iter()
        .reduce(|best, r| if r.global.score > best.global.score { r } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align_global, align_local, ScoringScheme};
    use std::time::Duration;

    fn result(a1: &str, a2: &str, score: Score, gaps: usize, ms: u64) -> AlignmentResult {
        AlignmentResult {
            aligned1: a1.as_bytes().to_vec(),
            aligned2: a2.as_bytes().to_vec(),
            score,
            gaps,
            elapsed: Duration::from_millis(ms),
        }
    }

    #[test]
    fn parse_simple_request() {
        let req = parse_request("seq1:AGT;seq2:AT").unwrap();
        assert_eq!(req, AlignRequest::new("AGT", "AT"));
        assert_eq!(req.to_payload(), "seq1:AGT;seq2:AT");
    }

    #[test]
    fn request_trims_line_ending_and_ignores_extra_fields() {
        let req = parse_request("seq1:AC;seq2:GT;extra\r\n").unwrap();
        assert_eq!(req, AlignRequest::new("AC", "GT"));
    }

    #[test]
    fn request_allows_empty_sequences() {
        let req = parse_request("seq1:;seq2:").unwrap();
        assert!(req.seq1.is_empty());
        assert!(req.seq2.is_empty());
    }

    #[test]
    fn request_errors() {
        assert_eq!(
            parse_request("seq1:AC"),
            Err(ProtocolError::TooFewFields { expected: 2, found: 1 })
        );
        assert_eq!(parse_request("AC;seq2:GT"), Err(ProtocolError::MissingField("seq1")));
        assert_eq!(parse_request("seq1:AC;GT"), Err(ProtocolError::MissingField("seq2")));
    }

    #[test]
    fn request_size_limit() {
        let req = AlignRequest::new("ACGT", "AC");
        assert_eq!(req.matrix_cells(), 15);
        assert!(req.check_size(15).is_ok());
        assert_eq!(
            req.check_size(14),
            Err(ProtocolError::MatrixTooLarge { cells: 15, limit: 14 })
        );
    }

    #[test]
    fn request_with_end_delimiter() {
        let req = parse_request("seq1:AC;seq2:GT<END>").unwrap();
        assert_eq!(req, AlignRequest::new("AC", "GT"));
    }

    /// 按预设分段返回数据，分段耗尽后返回给定的错误类型
    struct Segments {
        stalls: usize,
        parts: Vec<Vec<u8>>,
        tail: ErrorKind,
    }

    impl Read for Segments {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.stalls > 0 {
                self.stalls -= 1;
                return Err(ErrorKind::TimedOut.into());
            }
            if self.parts.is_empty() {
                return Err(self.tail.into());
            }
            let part = self.parts.remove(0);
            buf[..part.len()].copy_from_slice(&part);
            Ok(part.len())
        }
    }

    #[test]
    fn message_assembled_across_segments_until_idle() {
        let mut r = Segments {
            stalls: 0,
            parts: vec![b"seq1:AGT;".to_vec(), b"seq2:".to_vec(), b"AT".to_vec()],
            tail: ErrorKind::WouldBlock,
        };
        assert_eq!(read_message(&mut r, 4096).unwrap(), "seq1:AGT;seq2:AT");
    }

    #[test]
    fn timeouts_before_first_byte_keep_waiting() {
        let mut r = Segments {
            stalls: 3,
            parts: vec![b"seq1:A;seq2:C".to_vec()],
            tail: ErrorKind::TimedOut,
        };
        assert_eq!(read_message(&mut r, 4096).unwrap(), "seq1:A;seq2:C");
    }

    #[test]
    fn message_stops_at_newline_or_end_delimiter() {
        let mut r = Segments {
            stalls: 0,
            parts: vec![b"seq1:A;seq2:C\n".to_vec(), b"ignored".to_vec()],
            tail: ErrorKind::UnexpectedEof,
        };
        assert_eq!(read_message(&mut r, 4096).unwrap(), "seq1:A;seq2:C\n");

        let mut r = Segments {
            stalls: 0,
            parts: vec![b"Rust;Needleman<E".to_vec(), b"ND>".to_vec(), b"ignored".to_vec()],
            tail: ErrorKind::UnexpectedEof,
        };
        assert_eq!(read_message(&mut r, 4096).unwrap(), "Rust;Needleman<END>");
    }

    #[test]
    fn message_over_limit_is_rejected_not_truncated() {
        let body = format!("seq1:AC;seq2:{}", "A".repeat(5000));
        let mut r = std::io::Cursor::new(body.into_bytes());
        let err = read_message(&mut r, 4096).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ProtocolError>(),
            Some(&ProtocolError::PayloadTooLarge { limit: 4096 })
        );
    }

    #[test]
    fn read_error_before_any_data_is_propagated() {
        let mut r = Segments {
            stalls: 0,
            parts: Vec::new(),
            tail: ErrorKind::ConnectionReset,
        };
        assert!(read_message(&mut r, 16).is_err());
    }

    #[test]
    fn response_exact_layout() {
        let g = result("AGT", "A-T", 1, 1, 0);
        let l = result("T", "T", 1, 0, 0);
        assert_eq!(
            format_response(&g, &l),
            "Needleman;Alignment1:AGT;Alignment2:A-T;AlignmentScore:1;Gap:1;\
             ExecutionTime:0.0000;Smith;Alignment1:T;Alignment2:T;AlignmentScore:1;Gap:0;\
             ExecutionTime:0.0000"
        );
    }

    #[test]
    fn labelled_response_prefix_and_time_precision() {
        let g = result("A", "A", 1, 0, 1234);
        let l = result("A", "A", 1, 0, 5);
        let wire = format_labelled_response("Rust", &g, &l);
        assert!(wire.starts_with("Rust;Needleman;Alignment1:A;"));
        assert!(wire.contains("ExecutionTime:1.2340;Smith;"));
        assert!(wire.ends_with("ExecutionTime:0.0050"));
    }

    #[test]
    fn parse_labelled_response_with_end_delimiter() {
        let text = "Python;Needleman;Alignment1:AGT;Alignment2:A-T;AlignmentScore:1;Gap:1;\
                    ExecutionTime:0.0001;Smith;Alignment1:T;Alignment2:T;AlignmentScore:1;\
                    Gap:0;ExecutionTime:0.0002<END>";
        let report = parse_response(text).unwrap();
        assert_eq!(report.label.as_deref(), Some("Python"));
        assert_eq!(report.global.alignment2, "A-T");
        assert_eq!(report.global.gaps, 1);
        assert_eq!(report.local.alignment1, "T");
        assert!((report.local.seconds - 0.0002).abs() < 1e-9);
    }

    #[test]
    fn parse_response_from_real_alignment() {
        let s = ScoringScheme::default();
        let g = align_global(b"GATTACA", b"GCATGCA", s);
        let l = align_local(b"GATTACA", b"GCATGCA", s);
        let report = parse_response(&format_response(&g, &l)).unwrap();
        assert_eq!(report.label, None);
        assert_eq!(report.global.score, g.score);
        assert_eq!(report.global.alignment1, g.aligned1_str());
        assert_eq!(report.local.gaps, l.gaps);
    }

    #[test]
    fn parse_response_errors() {
        assert_eq!(
            parse_response("Smith;Alignment1:A"),
            Err(ProtocolError::MissingMarker("Needleman"))
        );
        assert_eq!(
            parse_response(
                "Needleman;Alignment1:A;Alignment2:A;AlignmentScore:x;Gap:0;ExecutionTime:0.1"
            ),
            Err(ProtocolError::BadNumber {
                field: "AlignmentScore",
                value: "x".to_string()
            })
        );
        assert_eq!(
            parse_response(
                "Needleman;Alignment1:A;Alignment2:A;AlignmentScore:1;Gap:0;ExecutionTime:0.1"
            ),
            Err(ProtocolError::MissingMarker("Smith"))
        );
        assert_eq!(
            parse_response("Needleman;Alignment1:A;Alignment2:A"),
            Err(ProtocolError::TooFewFields { expected: 5, found: 2 })
        );
    }

    #[test]
    fn render_summary_layout() {
        let g = result("AGT", "A-T", 1, 1, 0);
        let l = result("T", "T", 1, 0, 0);
        let text = ResponseReport::new(Some("Rust"), &g, &l).render();
        assert!(text.starts_with("Source: Rust\n\nNeedleman-Wunsch\n  Alignment1: AGT\n"));
        assert!(text.contains("\nSmith-Waterman\n  Alignment1: T\n"));
        assert!(text.contains("  Alignment Score: 1\n"));
    }

    #[test]
    fn best_report_prefers_highest_global_score_first_on_ties() {
        let mk = |label: &str, score: Score| ResponseReport {
            label: Some(label.to_string()),
            global: VariantReport {
                alignment1: String::new(),
                alignment2: String::new(),
                score,
                gaps: 0,
                seconds: 0.0,
            },
            local: VariantReport {
                alignment1: String::new(),
                alignment2: String::new(),
                score: 0,
                gaps: 0,
                seconds: 0.0,
            },
        };
        let reports = vec![mk("C", 2), mk("Java", 5), mk("Python", 5)];
        assert_eq!(best_report(&reports).unwrap().label.as_deref(), Some("Java"));
        assert!(best_report(&[]).is_none());
    }
}
