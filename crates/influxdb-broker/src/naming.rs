// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

//! Series naming: hierarchical identifiers joined with an escaped separator.
//!
//! Monitoring entity names (hostnames, service descriptions) are arbitrary
//! strings that may themselves contain the hierarchy separator, so every part
//! is escaped on the way in and `decode` recovers the exact original parts.

use tracing::warn;

const SEPARATOR: char = '.';
const ESCAPE: char = '\\';

/// Placeholder for the service slot of host-level series.
pub const SELF_MARKER: &str = "_self_";
/// Series subtree for alert/notification event points.
pub const EVENTS_MARKER: &str = "_events_";
/// Series subtree for current-state points.
pub const STATES_MARKER: &str = "_states_";

/// Joins name parts into a single series identifier, escaping the separator
/// and the escape character inside each part.
pub fn encode(parts: &[&str]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        escape_into(part, &mut out);
    }
    out
}

/// Like [`encode`], but prepends an already-encoded prefix and one separator.
/// The prefix is trusted as encoded and is not re-escaped.
pub fn encode_with_prefix(prefix: &str, parts: &[&str]) -> String {
    let mut out = String::with_capacity(prefix.len() + 1);
    out.push_str(prefix);
    out.push(SEPARATOR);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        escape_into(part, &mut out);
    }
    out
}

fn escape_into(part: &str, out: &mut String) {
    for c in part.chars() {
        // The escape character must be recognized before the separator so an
        // escaped sequence is never escaped twice.
        if c == ESCAPE || c == SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// Splits an encoded series identifier back into its original parts.
///
/// An escape character consumes exactly the next character literally; an
/// unescaped separator ends the current part. A trailing escape is an
/// encoding error: it is reported and contributes nothing to the part.
pub fn decode(encoded: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in encoded.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == SEPARATOR {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if escaped {
        warn!("trailing escape character in series name {:?}", encoded);
    }
    parts.push(current);
    parts
}

/// Encoded series prefix for a service: `host.service`.
pub fn service_context(host: &str, service: &str) -> String {
    encode(&[&sanitize(host), &sanitize(service)])
}

/// Encoded series prefix for a host: the service slot holds [`SELF_MARKER`].
pub fn host_context(host: &str) -> String {
    encode(&[&sanitize(host), SELF_MARKER])
}

/// Replaces every character outside `[A-Za-z0-9._-]` with an underscore.
///
/// Applied to raw name components before they enter a series identifier;
/// independent of the separator escaping above, which stays lossless.
pub fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
