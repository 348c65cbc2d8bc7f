// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Turns one monitoring event's raw fields into data points.
//!
//! Every builder takes an already-encoded series prefix (see
//! [`crate::naming`]) and returns the points to append; absent numeric
//! fields are omitted from points, never zero-filled.

use tracing::debug;

use crate::event::{CheckStatus, StateKind};
use crate::logevent;
use crate::naming::{self, EVENTS_MARKER, SELF_MARKER, STATES_MARKER};
use crate::perfdata;
use crate::point::{FieldValue, Point};

/// Builds one point per perfdata metric that carries at least one numeric
/// field. Malformed tokens are skipped, not fatal.
pub fn perfdata_points(perf_data: &str, timestamp: i64, prefix: &str) -> Vec<Point> {
    perf_data
        .split_whitespace()
        .filter_map(|token| match perfdata::parse(token) {
            Ok(metric) => Some(metric),
            Err(e) => {
                debug!("skipping perfdata token: {e}");
                None
            }
        })
        .filter(perfdata::Metric::has_numeric_field)
        .map(|metric| {
            let series = naming::encode_with_prefix(prefix, &[&naming::sanitize(&metric.name)]);
            let mut fields: Vec<(&'static str, FieldValue)> = Vec::with_capacity(6);
            if let Some(value) = metric.value {
                fields.push(("value", value.into()));
            }
            fields.push(("unit", metric.unit.into()));
            if let Some(warning) = metric.warning {
                fields.push(("warning", warning.into()));
            }
            if let Some(critical) = metric.critical {
                fields.push(("critical", critical.into()));
            }
            if let Some(min) = metric.min {
                fields.push(("min", min.into()));
            }
            if let Some(max) = metric.max {
                fields.push(("max", max.into()));
            }
            Point {
                series,
                time: timestamp,
                fields,
            }
        })
        .collect()
}

/// Builds the `_events_.ALERT` point, emitted only when the state or the
/// state type changed since the previous check.
pub fn state_transition_points(status: &CheckStatus<'_>, prefix: &str) -> Vec<Point> {
    if status.state == status.last_state && status.state_type == status.last_state_type {
        return Vec::new();
    }
    vec![Point {
        series: naming::encode_with_prefix(prefix, &[EVENTS_MARKER, "ALERT"]),
        time: status.last_chk,
        fields: vec![
            ("state", status.state.into()),
            ("state_type", status.state_type.into()),
            ("output", status.output.into()),
        ],
    }]
}

/// Builds the unconditional `_states_` point carried by every check result.
pub fn current_state_points(
    status: &CheckStatus<'_>,
    prefix: &str,
    kind: StateKind,
) -> Vec<Point> {
    vec![Point {
        series: naming::encode_with_prefix(prefix, &[STATES_MARKER, kind.as_str()]),
        time: status.last_chk,
        fields: vec![
            ("state_type", status.state_type.into()),
            ("acknowledged", i64::from(status.acknowledged).into()),
            ("output", status.output.into()),
            ("state_id", status.state_id.into()),
            ("last_check", status.last_chk.into()),
            ("last_state_change", status.last_state_change.into()),
        ],
    }]
}

/// Builds a point from an engine log line, or nothing when the line matches
/// no known event shape. Host-level events carry the self marker in the
/// service slot.
pub fn log_event_points(raw_log_line: &str) -> Vec<Point> {
    let event = match logevent::parse(raw_log_line) {
        Ok(event) => event,
        Err(e) => {
            debug!("skipping log line: {e}");
            return Vec::new();
        }
    };
    let service = event.service.as_deref().unwrap_or(SELF_MARKER);
    let series = naming::encode(&[
        &naming::sanitize(&event.hostname),
        &naming::sanitize(service),
        EVENTS_MARKER,
        event.kind.as_str(),
    ]);
    vec![Point {
        series,
        time: event.time,
        fields: event.fields,
    }]
}
