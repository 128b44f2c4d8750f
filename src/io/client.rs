use anyhow::{bail, Context, Result};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::align::{align_both, ScoringScheme};
use crate::io::wire::{self, ResponseReport};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// 应答前缀中的来源标签
    pub label: String,
    /// 请求的最大字节数，超出即拒绝
    pub max_payload: usize,
    /// 允许分配的最大矩阵单元格数
    pub max_cells: u128,
    /// 已收到数据后对端静默多久视为请求结束；为零时一直读到对端关闭
    pub idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 65432,
            label: "Rust".to_string(),
            max_payload: 4096,
            max_cells: 50_000_000,
            idle_timeout: Duration::from_millis(250),
        }
    }
}

impl ClientConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 处理一次会话：读取请求，执行全局与局部比对，写回带标签的应答
pub fn serve_stream<S: Read + Write>(
    stream: &mut S,
    config: &ClientConfig,
    scheme: ScoringScheme,
) -> Result<ResponseReport> {
    let payload = wire::read_message(stream, config.max_payload).context("failed to read request")?;
    if payload.is_empty() {
        bail!("peer closed the connection before sending a request");
    }
    log::debug!("received request: {}", payload.trim_end());

    let request = wire::parse_request(&payload)?;
    request.check_size(config.max_cells)?;
    log::info!(
        "aligning sequences of length {} and {}",
        request.seq1.len(),
        request.seq2.len()
    );

    let (global, local) = align_both(request.seq1.as_bytes(), request.seq2.as_bytes(), scheme);
    let report = ResponseReport::new(Some(config.label.as_str()), &global, &local);

    stream
        .write_all(report.to_wire().as_bytes())
        .context("failed to send response")?;
    stream.flush()?;
    log::info!(
        "sent response: global score {}, local score {}",
        report.global.score,
        report.local.score
    );
    Ok(report)
}

/// 连接对端并完成一次请求/应答
pub fn run_client(config: &ClientConfig, scheme: ScoringScheme) -> Result<ResponseReport> {
    let addr = config.addr();
    log::info!("connecting to {}", addr);
    let mut stream =
        TcpStream::connect(&addr).with_context(|| format!("cannot connect to '{}'", addr))?;
    let idle = Some(config.idle_timeout).filter(|d| !d.is_zero());
    stream.set_read_timeout(idle)?;
    serve_stream(&mut stream, config, scheme)
        .with_context(|| format!("session with '{}' failed", addr))
}
