// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Check performance-data parsing.
//!
//! A perfdata string is a sequence of whitespace-separated tokens of the form
//! `label=value[unit];warn;crit;min;max`. Every segment after the value is
//! optional, and an empty segment means "not specified" rather than zero.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::ParseError;

/// One metric parsed out of a perfdata token. All numerics are carried as
/// floats so field typing stays consistent across points.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: Option<f64>,
    pub unit: String,
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Metric {
    /// True when the token supplied at least one numeric field; tokens that
    /// carry none produce no point.
    pub fn has_numeric_field(&self) -> bool {
        self.value.is_some()
            || self.warning.is_some()
            || self.critical.is_some()
            || self.min.is_some()
            || self.max.is_some()
    }
}

// Value segment: optional signed decimal (exponent allowed) followed by an
// optional short unit suffix.
fn value_pattern() -> &'static Regex {
    static VALUE_RE: OnceLock<Regex> = OnceLock::new();
    VALUE_RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)?([A-Za-z%/]*)$")
            .expect("value pattern must compile")
    })
}

/// Parses a single perfdata token into a [`Metric`].
///
/// The label may be single-quoted. Threshold and bound segments that are
/// empty or non-numeric come back as `None`; a non-numeric value segment
/// rejects the whole token.
pub fn parse(token: &str) -> Result<Metric, ParseError> {
    let (raw_label, rest) = token
        .split_once('=')
        .ok_or_else(|| ParseError::NotPerfdata(token.to_string()))?;

    let name = raw_label
        .strip_prefix('\'')
        .and_then(|l| l.strip_suffix('\''))
        .unwrap_or(raw_label);
    if name.is_empty() {
        return Err(ParseError::NotPerfdata(token.to_string()));
    }

    let mut segments = rest.split(';');
    // First segment is always present for a non-empty split.
    let value_segment = segments.next().unwrap_or_default().trim();
    let captures = value_pattern()
        .captures(value_segment)
        .ok_or_else(|| ParseError::NotPerfdata(token.to_string()))?;

    let value = captures.get(1).map(|m| m.as_str());
    let unit = captures.get(2).map_or("", |m| m.as_str());
    if value.is_none() && !unit.is_empty() {
        // A bare word where the number belongs is garbage, not a unit.
        return Err(ParseError::NotPerfdata(token.to_string()));
    }
    let value = match value {
        Some(v) => Some(
            v.parse::<f64>()
                .map_err(|_| ParseError::NotPerfdata(token.to_string()))?,
        ),
        None => None,
    };

    let mut numeric_segment = || segments.next().and_then(|s| s.trim().parse::<f64>().ok());
    let warning = numeric_segment();
    let critical = numeric_segment();
    let min = numeric_segment();
    let max = numeric_segment();

    Ok(Metric {
        name: name.to_string(),
        value,
        unit: unit.to_string(),
        warning,
        critical,
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_token() {
        let m = parse("memused=1550GB;2973;3964;0;5810").unwrap();
        assert_eq!(m.name, "memused");
        assert_eq!(m.value, Some(1550.0));
        assert_eq!(m.unit, "GB");
        assert_eq!(m.warning, Some(2973.0));
        assert_eq!(m.critical, Some(3964.0));
        assert_eq!(m.min, Some(0.0));
        assert_eq!(m.max, Some(5810.0));
    }

    #[test]
    fn test_empty_segments_are_not_specified() {
        let m = parse("ramused=1009MB;;;0;1982").unwrap();
        assert_eq!(m.value, Some(1009.0));
        assert_eq!(m.unit, "MB");
        assert_eq!(m.warning, None);
        assert_eq!(m.critical, None);
        assert_eq!(m.min, Some(0.0));
        assert_eq!(m.max, Some(1982.0));
    }

    #[test]
    fn test_bare_value_token() {
        let m = parse("rtt=9999").unwrap();
        assert_eq!(m.value, Some(9999.0));
        assert_eq!(m.unit, "");
        assert_eq!(m.warning, None);
        assert_eq!(m.max, None);
    }

    #[test]
    fn test_quoted_label() {
        let m = parse("'disk used'=5MB").unwrap();
        assert_eq!(m.name, "disk used");
        assert_eq!(m.value, Some(5.0));
    }

    #[test]
    fn test_signed_and_exponent_values() {
        assert_eq!(parse("temp=-5C;;;-20;60").unwrap().value, Some(-5.0));
        let m = parse("lat=1.5e3ms").unwrap();
        assert_eq!(m.value, Some(1500.0));
        assert_eq!(m.unit, "ms");
    }

    #[test]
    fn test_percent_and_slash_units() {
        assert_eq!(parse("used=82%").unwrap().unit, "%");
        assert_eq!(parse("rate=12MB/s").unwrap().unit, "MB/s");
    }

    #[test]
    fn test_empty_value_with_thresholds() {
        let m = parse("queue=;10;20").unwrap();
        assert_eq!(m.value, None);
        assert_eq!(m.warning, Some(10.0));
        assert_eq!(m.critical, Some(20.0));
        assert!(m.has_numeric_field());
    }

    #[test]
    fn test_valueless_token_has_no_numeric_field() {
        let m = parse("idle=").unwrap();
        assert_eq!(m.value, None);
        assert_eq!(m.unit, "");
        assert!(!m.has_numeric_field());
    }

    #[test]
    fn test_non_numeric_thresholds_degrade_to_unspecified() {
        let m = parse("load=3;10:20;@30;0;100").unwrap();
        assert_eq!(m.value, Some(3.0));
        assert_eq!(m.warning, None);
        assert_eq!(m.critical, None);
        assert_eq!(m.min, Some(0.0));
        assert_eq!(m.max, Some(100.0));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert!(matches!(parse("junk"), Err(ParseError::NotPerfdata(_))));
        assert!(matches!(parse("label=abc"), Err(ParseError::NotPerfdata(_))));
        assert!(matches!(parse("=5"), Err(ParseError::NotPerfdata(_))));
        assert!(matches!(parse("v=12.3.4"), Err(ParseError::NotPerfdata(_))));
    }
}
