// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Buffered forwarding of monitoring check results to InfluxDB.
//!
//! Check events arrive as newline-separated JSON over UDP, are turned into
//! timestamped points named by an escape-aware series encoder, and leave
//! through a shared buffer that a periodic flusher drains into InfluxDB
//! with bounded retry.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

/// Event dispatch from decoded check events to buffered points
pub mod broker;

/// Shared point queue between intake and flush
pub mod buffer;

/// Point construction from perfdata, state transitions and log events
pub mod builder;

/// Environment-based runtime configuration
pub mod config;

/// Crate error types
pub mod errors;

/// Wire format of incoming check events
pub mod event;

/// Periodic flushing with bounded retry
pub mod flusher;

/// InfluxDB transports (HTTP `/write` and UDP)
pub mod influx;

/// Engine log line parsing (alerts and notifications)
pub mod logevent;

/// Series name encoding, decoding and sanitizing
pub mod naming;

/// Perfdata token parsing
pub mod perfdata;

/// Line protocol points and field values
pub mod point;

/// UDP intake listener for check events
pub mod server;
