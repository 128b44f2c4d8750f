//! 广播端：把一条比对请求分发给若干客户端，收集应答，
//! 选出全局得分最高者并转发给结果接收端。

use anyhow::{bail, Context, Result};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};

use crate::io::wire::{self, AlignRequest, ResponseReport, END_DELIMITER};

#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    pub bind: String,
    pub port: u16,
    /// 需要收集的有效应答数
    pub clients: usize,
    /// 最佳应答的接收端地址；为 `None` 时只打印不转发
    pub sink: Option<String>,
    /// 单条应答的最大字节数
    pub max_response: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 65432,
            clients: 3,
            sink: Some("127.0.0.1:65433".to_string()),
            max_response: 1 << 20,
        }
    }
}

impl BroadcastConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

pub fn send_request<W: Write>(stream: &mut W, request: &AlignRequest) -> Result<()> {
    stream
        .write_all(request.to_payload().as_bytes())
        .context("failed to send request")?;
    stream.flush()?;
    Ok(())
}

/// 读取一条应答直到对端关闭，超过 `max_response` 字节即报错
pub fn read_report<R: Read>(stream: &mut R, max_response: usize) -> Result<ResponseReport> {
    let text = wire::read_message(stream, max_response).context("failed to read response")?;
    Ok(wire::parse_response(&text)?)
}

/// 与一个客户端完成一次交换；请求发出后半关闭写端，客户端随即读到请求结束
fn exchange(
    stream: &mut TcpStream,
    request: &AlignRequest,
    max_response: usize,
) -> Result<ResponseReport> {
    send_request(stream, request)?;
    stream.shutdown(Shutdown::Write)?;
    read_report(stream, max_response)
}

/// 依次接受连接，直到收集到 `config.clients` 条有效应答
///
/// 无效应答记录警告后跳过，不计入数量。
pub fn collect_reports(
    listener: &TcpListener,
    request: &AlignRequest,
    config: &BroadcastConfig,
) -> Result<Vec<ResponseReport>> {
    let mut reports = Vec::with_capacity(config.clients);

    while reports.len() < config.clients {
        let (mut stream, peer) = listener.accept().context("accept failed")?;
        log::info!("client connected from {}", peer);

        match exchange(&mut stream, request, config.max_response) {
            Ok(report) => {
                log::info!(
                    "response from {} ({}): global score {}",
                    peer,
                    report.label.as_deref().unwrap_or("unlabelled"),
                    report.global.score
                );
                reports.push(report);
            }
            Err(e) => log::warn!("discarding response from {}: {:#}", peer, e),
        }
    }

    Ok(reports)
}

/// 写出最佳应答并以 `<END>` 结尾
pub fn forward_report<W: Write>(sink: &mut W, report: &ResponseReport) -> Result<()> {
    let mut text = report.to_wire();
    text.push_str(END_DELIMITER);
    sink.write_all(text.as_bytes())
        .context("failed to forward best response")?;
    sink.flush()?;
    Ok(())
}

/// 在已绑定的监听套接字上完成一轮广播，返回选中的应答
pub fn broadcast_on(
    listener: &TcpListener,
    config: &BroadcastConfig,
    request: &AlignRequest,
) -> Result<ResponseReport> {
    if config.clients == 0 {
        bail!("at least one client response is required");
    }
    let reports = collect_reports(listener, request, config)?;
    let best = match wire::best_report(&reports) {
        Some(best) => best.clone(),
        None => bail!("no client responses collected"),
    };
    log::info!(
        "best response from {} with global score {}",
        best.label.as_deref().unwrap_or("unlabelled"),
        best.global.score
    );

    if let Some(addr) = &config.sink {
        let mut sink = TcpStream::connect(addr)
            .with_context(|| format!("cannot connect to result sink '{}'", addr))?;
        forward_report(&mut sink, &best)?;
        log::info!("forwarded best response to {}", addr);
    }
    Ok(best)
}

/// 绑定监听地址并完成一轮广播
pub fn broadcast(config: &BroadcastConfig, request: &AlignRequest) -> Result<ResponseReport> {
    let addr = config.addr();
    let listener =
        TcpListener::bind(&addr).with_context(|| format!("cannot listen on '{}'", addr))?;
    log::info!("waiting for {} client(s) on {}", config.clients, addr);
    broadcast_on(&listener, config, request)
}
