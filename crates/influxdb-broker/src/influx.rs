// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Ships rendered points to InfluxDB over HTTP `/write` or UDP.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::config::Config;
use crate::point::{Point, TimePrecision};

/// Largest datagram handed to the UDP transport, kept under the IPv4 UDP
/// payload ceiling.
const MAX_UDP_PAYLOAD: usize = 65_000;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("influxdb rejected write: {0}: {1}")]
    Status(StatusCode, String),
    #[error("udp transport error: {0}")]
    Io(#[from] io::Error),
}

/// Destination for rendered points. The flusher only sees this trait, so
/// tests can script failures without a live InfluxDB.
#[async_trait]
pub trait PointSink {
    /// Sends every point in one shot. Partial delivery counts as failure;
    /// the caller requeues the whole batch.
    async fn write(&self, points: &[Point], precision: TimePrecision) -> Result<(), SinkError>;
}

/// The real sink. One of the two transports is chosen at startup and kept
/// for the life of the process.
pub struct InfluxDb {
    transport: Transport,
}

enum Transport {
    Http {
        client: reqwest::Client,
        write_url: String,
        database: String,
        user: String,
        password: String,
    },
    Udp {
        socket: UdpSocket,
    },
}

impl InfluxDb {
    pub async fn new(config: &Config) -> Result<Self, SinkError> {
        let transport = if config.use_udp {
            let socket = UdpSocket::bind("0.0.0.0:0").await?;
            socket
                .connect((config.host.as_str(), config.udp_port))
                .await?;
            // The UDP wire carries no database or credentials; the server's
            // port mapping selects the database.
            info!(
                "udp transport to {}:{}, database and auth settings do not apply",
                config.host, config.udp_port
            );
            Transport::Udp { socket }
        } else {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.flush_timeout_secs))
                .build()?;
            Transport::Http {
                client,
                write_url: write_url(config),
                database: config.database.clone(),
                user: config.user.clone(),
                password: config.password.clone(),
            }
        };
        Ok(Self { transport })
    }
}

#[async_trait]
impl PointSink for InfluxDb {
    async fn write(&self, points: &[Point], precision: TimePrecision) -> Result<(), SinkError> {
        match &self.transport {
            Transport::Http {
                client,
                write_url,
                database,
                user,
                password,
            } => {
                let resp = client
                    .post(write_url)
                    .query(&[
                        ("db", database.as_str()),
                        ("precision", precision.query_param()),
                    ])
                    .basic_auth(user, Some(password))
                    .header("Content-Type", "text/plain; charset=utf-8")
                    .body(render(points, precision).join("\n"))
                    .send()
                    .await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(SinkError::Status(
                        status,
                        resp.text().await.unwrap_or_default(),
                    ));
                }
                debug!("wrote {} points over http", points.len());
                Ok(())
            }
            Transport::Udp { socket } => {
                for datagram in datagrams(&render(points, precision)) {
                    socket.send(datagram.as_bytes()).await?;
                }
                debug!("wrote {} points over udp", points.len());
                Ok(())
            }
        }
    }
}

fn write_url(config: &Config) -> String {
    let scheme = if config.use_tls { "https" } else { "http" };
    format!("{scheme}://{}:{}/write", config.host, config.port)
}

fn render(points: &[Point], precision: TimePrecision) -> Vec<String> {
    points
        .iter()
        .map(|point| point.to_line_protocol(precision))
        .collect()
}

/// Packs lines into newline-joined datagrams of at most [`MAX_UDP_PAYLOAD`]
/// bytes. An oversized single line still goes out alone.
fn datagrams(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for line in lines {
        if !current.is_empty() && current.len() + 1 + line.len() > MAX_UDP_PAYLOAD {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
