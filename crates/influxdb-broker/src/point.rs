// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Data points and their InfluxDB line-protocol rendering.
//!
//! ```text
//! series field1=val1,field2=val2 timestamp
//! ```
//!
//! Series identifiers come pre-encoded from [`crate::naming`]; fields keep
//! their insertion order so rendered output is deterministic.

use std::fmt;

/// A value that can be stored in an InfluxDB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Format this value for line protocol: floats as-is, integers with an
    /// `i` suffix, strings double-quoted with inner quotes escaped, booleans
    /// as `true`/`false`.
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FieldValue::Boolean(v) => {
                if *v {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line_protocol())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

/// Timestamp resolution advertised to the sink; point times are carried in
/// epoch seconds and scaled at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePrecision {
    #[default]
    Seconds,
    Milliseconds,
    Nanoseconds,
}

impl TimePrecision {
    /// Value of the `precision` query parameter on the write endpoint.
    pub fn query_param(&self) -> &'static str {
        match self {
            TimePrecision::Seconds => "s",
            TimePrecision::Milliseconds => "ms",
            TimePrecision::Nanoseconds => "ns",
        }
    }

    fn scale(&self, epoch_secs: i64) -> i64 {
        match self {
            TimePrecision::Seconds => epoch_secs,
            TimePrecision::Milliseconds => epoch_secs * 1_000,
            TimePrecision::Nanoseconds => epoch_secs * 1_000_000_000,
        }
    }
}

/// One timestamped measurement, the atomic unit handed to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Encoded series identifier, see [`crate::naming`].
    pub series: String,
    /// Epoch seconds.
    pub time: i64,
    /// Ordered field set; the destination requires at least one field.
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl Point {
    /// Render this point as one line of line protocol.
    pub fn to_line_protocol(&self, precision: TimePrecision) -> String {
        debug_assert!(!self.fields.is_empty(), "a point needs at least one field");

        let mut line = escape_measurement(&self.series);
        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_field_key(key));
            line.push('=');
            line.push_str(&value.to_line_protocol());
        }
        line.push(' ');
        line.push_str(&precision.scale(self.time).to_string());
        line
    }
}

// Spaces and commas must be escaped in the measurement position.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

// Commas, equals signs, and spaces must be escaped in field keys.
fn escape_field_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_float() {
        assert_eq!(FieldValue::Float(3.15).to_line_protocol(), "3.15");
        assert_eq!(FieldValue::Float(1009.0).to_line_protocol(), "1009");
    }

    #[test]
    fn test_field_value_integer() {
        assert_eq!(FieldValue::Integer(42).to_line_protocol(), "42i");
    }

    #[test]
    fn test_field_value_string_escaping() {
        assert_eq!(
            FieldValue::String("say \"hi\"".to_string()).to_line_protocol(),
            "\"say \\\"hi\\\"\""
        );
        assert_eq!(FieldValue::String(String::new()).to_line_protocol(), "\"\"");
    }

    #[test]
    fn test_field_value_boolean() {
        assert_eq!(FieldValue::Boolean(true).to_line_protocol(), "true");
        assert_eq!(FieldValue::Boolean(false).to_line_protocol(), "false");
    }

    #[test]
    fn test_point_rendering() {
        let point = Point {
            series: "web01.cpu.load".to_string(),
            time: 1_403_618_279,
            fields: vec![
                ("value", FieldValue::Float(1.5)),
                ("unit", FieldValue::String(String::new())),
                ("max", FieldValue::Float(8.0)),
            ],
        };
        assert_eq!(
            point.to_line_protocol(TimePrecision::Seconds),
            "web01.cpu.load value=1.5,unit=\"\",max=8 1403618279"
        );
    }

    #[test]
    fn test_precision_scaling() {
        let point = Point {
            series: "m".to_string(),
            time: 2,
            fields: vec![("value", FieldValue::Integer(1))],
        };
        assert_eq!(point.to_line_protocol(TimePrecision::Seconds), "m value=1i 2");
        assert_eq!(point.to_line_protocol(TimePrecision::Milliseconds), "m value=1i 2000");
        assert_eq!(
            point.to_line_protocol(TimePrecision::Nanoseconds),
            "m value=1i 2000000000"
        );
    }

    #[test]
    fn test_precision_query_params() {
        assert_eq!(TimePrecision::Seconds.query_param(), "s");
        assert_eq!(TimePrecision::Milliseconds.query_param(), "ms");
        assert_eq!(TimePrecision::Nanoseconds.query_param(), "ns");
    }

    #[test]
    fn test_measurement_escaping() {
        // Sanitized series never contain these, but raw API users might.
        let point = Point {
            series: "my measurement,x".to_string(),
            time: 1,
            fields: vec![("f", FieldValue::Integer(1))],
        };
        assert_eq!(
            point.to_line_protocol(TimePrecision::Seconds),
            "my\\ measurement\\,x f=1i 1"
        );
    }
}
