// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! UDP intake for monitoring events.
//!
//! Each datagram carries newline-separated JSON check events. Lines that do
//! not decode are skipped so one broken emitter cannot stall the stream.

use std::io;
use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::broker::InfluxBroker;
use crate::event::CheckEvent;

// Large enough for a full UDP datagram, so a burst of check results in one
// packet never gets truncated.
const BUFFER_SIZE: usize = 65_536;

/// Configuration for the event intake listener.
pub struct EventServerConfig {
    /// Host to bind the UDP socket to (e.g., "0.0.0.0").
    pub host: String,
    /// Port to bind the UDP socket to.
    pub port: u16,
}

// EventReader abstracts the transport so tests can replay a fixed buffer.
enum EventReader {
    UdpSocket(tokio::net::UdpSocket),

    /// Mirror reader for testing - replays a fixed buffer
    #[allow(dead_code)]
    MirrorTest(Vec<u8>, SocketAddr),
}

impl EventReader {
    async fn read(&self) -> io::Result<(Vec<u8>, SocketAddr)> {
        match self {
            EventReader::UdpSocket(socket) => {
                let mut buf = [0; BUFFER_SIZE];
                let (amt, src) = socket.recv_from(&mut buf).await?;
                Ok((buf[..amt].to_owned(), src))
            }
            EventReader::MirrorTest(data, addr) => Ok((data.clone(), *addr)),
        }
    }
}

/// Listens for check events and feeds them to the broker.
pub struct EventServer {
    cancel_token: CancellationToken,
    broker: InfluxBroker,
    reader: EventReader,
}

impl EventServer {
    pub async fn new(
        config: &EventServerConfig,
        broker: InfluxBroker,
        cancel_token: CancellationToken,
    ) -> io::Result<EventServer> {
        let addr = format!("{}:{}", config.host, config.port);
        let socket = tokio::net::UdpSocket::bind(addr).await?;
        Ok(EventServer {
            cancel_token,
            broker,
            reader: EventReader::UdpSocket(socket),
        })
    }

    /// Address the listener is bound to, useful with an ephemeral port.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match &self.reader {
            EventReader::UdpSocket(socket) => socket.local_addr(),
            EventReader::MirrorTest(_, addr) => Ok(*addr),
        }
    }

    /// Main loop that receives and processes events until cancelled.
    pub async fn spin(self) {
        let mut spin_cancelled = false;
        while !spin_cancelled {
            self.consume_events().await;
            spin_cancelled = self.cancel_token.is_cancelled();
        }
    }

    /// Receive one datagram and queue points for every event in it.
    async fn consume_events(&self) {
        let (buf, src) = match self.reader.read().await {
            Ok(read) => read,
            Err(e) => {
                error!("failed to read from event socket: {e}");
                return;
            }
        };
        let text = match std::str::from_utf8(&buf) {
            Ok(text) => text,
            Err(e) => {
                error!("discarding non-utf8 datagram from {src}: {e}");
                return;
            }
        };
        trace!("received {} bytes from {src}", buf.len());

        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            match serde_json::from_str::<CheckEvent>(line) {
                Ok(event) => self.broker.handle(&event),
                Err(e) => debug!("skipping undecodable event line: {e}"),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use tracing_test::traced_test;

    use super::*;
    use crate::buffer::PointBuffer;
    use crate::point::Point;

    async fn setup_and_consume_events(payload: &[u8]) -> Vec<Point> {
        let buffer = Arc::new(PointBuffer::new());
        let server = EventServer {
            cancel_token: CancellationToken::new(),
            broker: InfluxBroker::new(Arc::clone(&buffer)),
            reader: EventReader::MirrorTest(
                payload.to_vec(),
                SocketAddr::new(IpAddr::V4(Ipv4Addr::new(111, 112, 113, 114)), 0),
            ),
        };
        server.consume_events().await;
        buffer.drain()
    }

    #[tokio::test]
    async fn test_consume_service_result_datagram() {
        let json = r#"{"kind":"service_result","host_name":"web01","service_description":"memory","perf_data":"ramused=1009MB;;;0;1982","last_chk":1403618279,"last_state_change":1403618279,"state":"OK","last_state":"OK","state_type":"HARD","last_state_type":"HARD","state_id":0,"output":"RAM ok"}"#;
        let points = setup_and_consume_events(json.as_bytes()).await;

        let series: Vec<&str> = points.iter().map(|p| p.series.as_str()).collect();
        assert_eq!(
            series,
            vec!["web01.memory.ramused", "web01.memory._states_.SERVICE"]
        );
    }

    #[tokio::test]
    async fn test_consume_multiple_lines_in_one_datagram() {
        let payload = concat!(
            r#"{"kind":"log_notification","log":"[1402515279] HOST NOTIFICATION: admin;localhost;DOWN;notify-host-by-email;down"}"#,
            "\n",
            r#"{"kind":"unknown_host_result","host_name":"ghost","time_stamp":100,"perf_data":"rta=1.1ms"}"#,
            "\n",
        );
        let points = setup_and_consume_events(payload.as_bytes()).await;

        let series: Vec<&str> = points.iter().map(|p| p.series.as_str()).collect();
        assert_eq!(
            series,
            vec!["localhost._self_._events_.NOTIFICATION", "ghost._self_.rta"]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_undecodable_lines_are_skipped() {
        let payload = concat!(
            "not json at all\n",
            r#"{"kind":"unknown_host_result","host_name":"ghost","time_stamp":100,"perf_data":"rta=1.1ms"}"#,
        );
        let points = setup_and_consume_events(payload.as_bytes()).await;

        assert!(logs_contain("skipping undecodable event line"));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].series, "ghost._self_.rta");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_non_utf8_datagram_dropped() {
        let points = setup_and_consume_events(&[0xff, 0xfe, 0x80]).await;

        assert!(logs_contain("discarding non-utf8 datagram"));
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_blank_lines_ignored() {
        let points = setup_and_consume_events(b"\n\n   \n").await;
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_bound_socket_reports_local_addr() {
        let buffer = Arc::new(PointBuffer::new());
        let config = EventServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let server = EventServer::new(
            &config,
            InfluxBroker::new(buffer),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let addr = server.local_addr().unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_ne!(addr.port(), 0);
    }
}
