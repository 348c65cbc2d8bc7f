// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Monitoring events as received from the engine.
//!
//! Each event kind is its own variant with its own required fields, resolved
//! once at the ingestion boundary; field names mirror the engine's check
//! result records. Unknown-result kinds carry only a capture timestamp and
//! partial identity, so they can never feed state points.

use serde::{Deserialize, Serialize};

/// A tagged monitoring event. The JSON form carries the kind in a `kind`
/// discriminator, e.g. `{"kind":"service_result","host_name":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckEvent {
    ServiceResult(ServiceResult),
    HostResult(HostResult),
    UnknownServiceResult(UnknownServiceResult),
    UnknownHostResult(UnknownHostResult),
    LogNotification(LogNotification),
}

/// Scheduled check result for a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResult {
    pub host_name: String,
    pub service_description: String,
    #[serde(default)]
    pub perf_data: String,
    pub last_chk: i64,
    #[serde(default)]
    pub last_state_change: i64,
    pub state: String,
    pub last_state: String,
    pub state_type: String,
    pub last_state_type: String,
    #[serde(default)]
    pub state_id: i64,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub problem_has_been_acknowledged: bool,
}

/// Scheduled check result for a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResult {
    pub host_name: String,
    #[serde(default)]
    pub perf_data: String,
    pub last_chk: i64,
    #[serde(default)]
    pub last_state_change: i64,
    pub state: String,
    pub last_state: String,
    pub state_type: String,
    pub last_state_type: String,
    #[serde(default)]
    pub state_id: i64,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub problem_has_been_acknowledged: bool,
}

/// Passive check result for a service the engine does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownServiceResult {
    pub host_name: String,
    pub service_description: String,
    pub time_stamp: i64,
    #[serde(default)]
    pub perf_data: String,
    #[serde(default)]
    pub return_code: i64,
    #[serde(default)]
    pub output: String,
}

/// Passive check result for a host the engine does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownHostResult {
    pub host_name: String,
    pub time_stamp: i64,
    #[serde(default)]
    pub perf_data: String,
    #[serde(default)]
    pub return_code: i64,
    #[serde(default)]
    pub output: String,
}

/// Raw engine log line, parsed downstream by [`crate::logevent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogNotification {
    pub log: String,
}

/// Whether state points describe a host or a service; carried into the
/// series name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Host,
    Service,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Host => "HOST",
            StateKind::Service => "SERVICE",
        }
    }
}

/// Borrowed view of the state-bearing fields shared by host and service
/// results, consumed by the point builders.
#[derive(Debug, Clone, Copy)]
pub struct CheckStatus<'a> {
    pub last_chk: i64,
    pub last_state_change: i64,
    pub state: &'a str,
    pub last_state: &'a str,
    pub state_type: &'a str,
    pub last_state_type: &'a str,
    pub state_id: i64,
    pub output: &'a str,
    pub acknowledged: bool,
}

impl ServiceResult {
    pub fn status(&self) -> CheckStatus<'_> {
        CheckStatus {
            last_chk: self.last_chk,
            last_state_change: self.last_state_change,
            state: &self.state,
            last_state: &self.last_state,
            state_type: &self.state_type,
            last_state_type: &self.last_state_type,
            state_id: self.state_id,
            output: &self.output,
            acknowledged: self.problem_has_been_acknowledged,
        }
    }
}

impl HostResult {
    pub fn status(&self) -> CheckStatus<'_> {
        CheckStatus {
            last_chk: self.last_chk,
            last_state_change: self.last_state_change,
            state: &self.state,
            last_state: &self.last_state,
            state_type: &self.state_type,
            last_state_type: &self.last_state_type,
            state_id: self.state_id,
            output: &self.output,
            acknowledged: self.problem_has_been_acknowledged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_result_decodes_from_tagged_json() {
        let json = r#"{
            "kind": "service_result",
            "host_name": "web01",
            "service_description": "mem",
            "perf_data": "ramused=1009MB;;;0;1982",
            "last_chk": 1403618279,
            "last_state_change": 1403600000,
            "state": "WARNING",
            "last_state": "OK",
            "state_type": "HARD",
            "last_state_type": "HARD",
            "state_id": 1,
            "output": "RAM used at 51%",
            "problem_has_been_acknowledged": false
        }"#;
        let event: CheckEvent = serde_json::from_str(json).unwrap();
        match event {
            CheckEvent::ServiceResult(result) => {
                assert_eq!(result.host_name, "web01");
                assert_eq!(result.service_description, "mem");
                assert_eq!(result.last_chk, 1403618279);
                assert_eq!(result.state, "WARNING");
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "kind": "host_result",
            "host_name": "web01",
            "last_chk": 1403618279,
            "state": "UP",
            "last_state": "UP",
            "state_type": "HARD",
            "last_state_type": "HARD"
        }"#;
        let event: CheckEvent = serde_json::from_str(json).unwrap();
        match event {
            CheckEvent::HostResult(result) => {
                assert_eq!(result.perf_data, "");
                assert_eq!(result.state_id, 0);
                assert!(!result.problem_has_been_acknowledged);
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_log_notification_round_trip() {
        let event = CheckEvent::LogNotification(LogNotification {
            log: "[1402515279] HOST NOTIFICATION: admin;localhost;DOWN;notify-host-by-email;down".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"log_notification\""));
        assert_eq!(serde_json::from_str::<CheckEvent>(&json).unwrap(), event);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = serde_json::from_str::<CheckEvent>(r#"{"kind":"weird_result"}"#);
        assert!(err.is_err());
    }
}
