// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Parsing of monitoring log lines into structured events.
//!
//! Recognized shapes, all `[epoch] TYPE: field;field;...`:
//!
//! ```text
//! [1402515279] HOST NOTIFICATION: contact;host;state;method;output
//! [1402515279] SERVICE NOTIFICATION: contact;host;service;state;method;output
//! [1329144231] HOST ALERT: host;state;state_type;attempts;output
//! [1329144231] SERVICE ALERT: host;service;state;state_type;attempts;output
//! ```

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::errors::ParseError;
use crate::point::FieldValue;

/// Kind of log event, carried into the series name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEventKind {
    Alert,
    Notification,
}

impl LogEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEventKind::Alert => "ALERT",
            LogEventKind::Notification => "NOTIFICATION",
        }
    }
}

/// One structured log event. `fields` holds everything that belongs in the
/// emitted point, in wire order, starting with the epoch time.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub time: i64,
    pub hostname: String,
    pub service: Option<String>,
    pub kind: LogEventKind,
    pub fields: Vec<(&'static str, FieldValue)>,
}

fn host_notification_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^\[(\d+)\] HOST NOTIFICATION: ([^;]*);([^;]*);([^;]*);([^;]*);(.*)$")
            .expect("host notification pattern must compile")
    })
}

fn service_notification_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^\[(\d+)\] SERVICE NOTIFICATION: ([^;]*);([^;]*);([^;]*);([^;]*);([^;]*);(.*)$")
            .expect("service notification pattern must compile")
    })
}

fn host_alert_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^\[(\d+)\] HOST ALERT: ([^;]*);([^;]*);([^;]*);([^;]*);(.*)$")
            .expect("host alert pattern must compile")
    })
}

fn service_alert_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^\[(\d+)\] SERVICE ALERT: ([^;]*);([^;]*);([^;]*);([^;]*);([^;]*);(.*)$")
            .expect("service alert pattern must compile")
    })
}

/// Parses one log line; lines that match no known shape are rejected.
pub fn parse(line: &str) -> Result<LogEvent, ParseError> {
    if let Some(c) = host_notification_pattern().captures(line) {
        return notification(&c, None);
    }
    if let Some(c) = service_notification_pattern().captures(line) {
        let service = cap(&c, 4).to_string();
        return notification(&c, Some(service));
    }
    if let Some(c) = host_alert_pattern().captures(line) {
        return alert(&c, None);
    }
    if let Some(c) = service_alert_pattern().captures(line) {
        let service = cap(&c, 3).to_string();
        return alert(&c, Some(service));
    }
    Err(ParseError::UnsupportedLine)
}

fn cap<'a>(captures: &'a Captures<'a>, index: usize) -> &'a str {
    captures.get(index).map_or("", |m| m.as_str())
}

fn epoch(captures: &Captures<'_>) -> Result<i64, ParseError> {
    cap(captures, 1).parse().map_err(|_| ParseError::UnsupportedLine)
}

fn notification(captures: &Captures<'_>, service: Option<String>) -> Result<LogEvent, ParseError> {
    let time = epoch(captures)?;
    // Field positions shift by one when a service description is present.
    let offset = usize::from(service.is_some());
    let notification_type = if service.is_some() { "SERVICE" } else { "HOST" };
    Ok(LogEvent {
        time,
        hostname: cap(captures, 3).to_string(),
        service,
        kind: LogEventKind::Notification,
        fields: vec![
            ("time", FieldValue::Integer(time)),
            ("state", cap(captures, 4 + offset).into()),
            ("contact", cap(captures, 2).into()),
            ("notification_type", notification_type.into()),
            ("notification_method", cap(captures, 5 + offset).into()),
            ("output", cap(captures, 6 + offset).into()),
        ],
    })
}

fn alert(captures: &Captures<'_>, service: Option<String>) -> Result<LogEvent, ParseError> {
    let time = epoch(captures)?;
    let offset = usize::from(service.is_some());
    let mut fields = vec![
        ("time", FieldValue::Integer(time)),
        ("state", cap(captures, 3 + offset).into()),
        ("state_type", cap(captures, 4 + offset).into()),
    ];
    if let Ok(attempts) = cap(captures, 5 + offset).parse::<i64>() {
        fields.push(("attempts", FieldValue::Integer(attempts)));
    }
    fields.push(("output", cap(captures, 6 + offset).into()));
    Ok(LogEvent {
        time,
        hostname: cap(captures, 2).to_string(),
        service,
        kind: LogEventKind::Alert,
        fields,
    })
}
