// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, sync::Arc};

use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use influxdb_broker::{
    broker::InfluxBroker,
    buffer::PointBuffer,
    config::Config,
    flusher::{Flusher, FlusherConfig},
    influx::InfluxDb,
    point::TimePrecision,
    server::{EventServer, EventServerConfig},
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("INFLUX_BROKER_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error creating config on broker agent startup: {e}");
            return;
        }
    };

    let sink = match InfluxDb::new(&config).await {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            error!("Error creating InfluxDB sink on broker agent startup: {e}");
            return;
        }
    };

    let buffer = Arc::new(PointBuffer::new());
    let cancel_token = CancellationToken::new();

    let server_config = EventServerConfig {
        host: config.events_host.clone(),
        port: config.events_port,
    };
    let server = match EventServer::new(
        &server_config,
        InfluxBroker::new(Arc::clone(&buffer)),
        cancel_token.clone(),
    )
    .await
    {
        Ok(server) => server,
        Err(e) => {
            error!("Error binding event listener on broker agent startup: {e}");
            return;
        }
    };
    info!(
        "event-udp: starting to listen on port {}",
        config.events_port
    );
    tokio::spawn(server.spin());

    let mut flusher = Flusher::new(FlusherConfig {
        buffer,
        sink,
        precision: TimePrecision::Seconds,
        tick_limit: config.tick_limit,
    });

    let mut flush_interval = interval(Duration::from_secs(config.flush_interval_secs));
    flush_interval.tick().await; // discard first tick, which is instantaneous

    loop {
        tokio::select! {
            _ = flush_interval.tick() => {
                flusher.tick().await;
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl+C: {e}");
                }
                info!("Shutting down, flushing remaining points");
                cancel_token.cancel();
                flusher.tick().await;
                break;
            }
        }
    }
}
