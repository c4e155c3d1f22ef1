//! # Common: Shared Diagnostics Model
//!
//! **Role**: Types shared by every analysis crate — source spans, findings,
//! secondary locations, and the embedded-payload message encoding.
//!
//! **Core Types**:
//! - `SourceSpan`: byte + line/column region of a node or token.
//! - `Finding`: one reportable diagnostic with optional secondary locations.
//! - `IssueLocation`: a secondary location in sink-facing form.
//! - `EncodedMessage`: the flat-sink payload (message + secondary locations)
//!   serialized into a single message field when the consumer cannot accept
//!   structured locations.
//!
//! **Design**:
//! - Findings are first-class structured values; flattening to an embedded
//!   JSON payload happens only at the output boundary, selected by
//!   `OutputMode` rather than a sentinel option value.
//! - Lines are 1-indexed, columns 0-indexed, matching the upstream tooling
//!   the JSON output is consumed by.

use serde::Serialize;
use std::collections::BTreeMap;

/// A contiguous source region.
///
/// Lines are 1-indexed, columns are 0-indexed. Byte offsets are into the
/// file's UTF-8 source buffer; files larger than 4 GiB are rejected at parse
/// time, so `u32` offsets are always sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub start_byte: u32,
    pub end_byte: u32,
}

impl SourceSpan {
    /// Returns the number of source lines this span covers (at least 1).
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// A location related to, but not the primary site of, a finding.
///
/// Serialized in the camelCase shape the downstream analysis UI expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLocation {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IssueLocation {
    /// Builds an `IssueLocation` from a span, with no label.
    pub fn from_span(span: SourceSpan) -> Self {
        Self {
            line: span.start_line,
            column: span.start_col,
            end_line: span.end_line,
            end_column: span.end_col,
            message: None,
        }
    }

    /// Builds a labeled `IssueLocation` from a span.
    pub fn labeled(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::from_span(span)
        }
    }
}

/// The flat-sink payload: an expanded message plus its secondary locations,
/// serialized as one JSON string and embedded in the primary message data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    pub message: String,
    pub secondary_locations: Vec<IssueLocation>,
}

/// Selects how secondary locations cross the output boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Forward secondary locations as structured entries.
    #[default]
    Structured,
    /// Serialize `{ cost, message, secondaryLocations }` into the finding's
    /// data under `wardenRuntimeData`, for sinks that accept only a single
    /// flat message string.
    Embedded,
}

/// One reportable diagnostic, immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Rule identifier, e.g. `"no-duplicated-branches"`.
    pub rule: &'static str,
    /// Message identifier within the rule, e.g. `"sameConditionalBlock"`.
    pub message_id: &'static str,
    /// Primary location of the finding.
    pub span: SourceSpan,
    /// Message template with `{{key}}` placeholders.
    pub message: String,
    /// Template data; also carried to the sink verbatim.
    pub data: BTreeMap<String, String>,
    /// Related locations in source order.
    pub secondary_locations: Vec<IssueLocation>,
    /// Optional numeric cost (e.g. a complexity total).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
}

impl Finding {
    /// Creates a finding with no data, secondaries, or cost.
    pub fn new(
        rule: &'static str,
        message_id: &'static str,
        span: SourceSpan,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            message_id,
            span,
            message: message.into(),
            data: BTreeMap::new(),
            secondary_locations: Vec::new(),
            cost: None,
        }
    }

    /// Adds a template-data entry.
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Appends a secondary location.
    pub fn with_secondary(mut self, location: IssueLocation) -> Self {
        self.secondary_locations.push(location);
        self
    }

    /// Sets the numeric cost.
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// Expands `{{key}}` placeholders in `template` with values from `data`.
///
/// Applied for every key, order-independent. Keys are simple identifiers, so
/// no brace escaping is needed; unknown placeholders are left untouched.
pub fn expand_message(template: &str, data: &BTreeMap<String, String>) -> String {
    let mut expanded = template.to_string();
    for (key, value) in data {
        let placeholder = format!("{{{{{key}}}}}");
        expanded = expanded.replace(&placeholder, value);
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> SourceSpan {
        SourceSpan {
            start_line,
            start_col,
            end_line,
            end_col,
            start_byte: 0,
            end_byte: 0,
        }
    }

    #[test]
    fn test_expand_message_replaces_every_key() {
        let mut data = BTreeMap::new();
        data.insert("type".to_string(), "branch".to_string());
        data.insert("line".to_string(), "3".to_string());
        let out = expand_message(
            "This {{type}} duplicates the {{type}} on line {{line}}.",
            &data,
        );
        assert_eq!(out, "This branch duplicates the branch on line 3.");
    }

    #[test]
    fn test_expand_message_leaves_unknown_placeholders() {
        let data = BTreeMap::new();
        assert_eq!(expand_message("keep {{this}}", &data), "keep {{this}}");
    }

    #[test]
    fn test_issue_location_serializes_camel_case() {
        let loc = IssueLocation::labeled(span(3, 8, 3, 10), "+1");
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["line"], 3);
        assert_eq!(json["column"], 8);
        assert_eq!(json["endLine"], 3);
        assert_eq!(json["endColumn"], 10);
        assert_eq!(json["message"], "+1");
    }

    #[test]
    fn test_issue_location_omits_empty_message() {
        let loc = IssueLocation::from_span(span(1, 0, 1, 5));
        let json = serde_json::to_string(&loc).unwrap();
        assert!(!json.contains("message"));
    }

    #[test]
    fn test_encoded_message_shape() {
        let encoded = EncodedMessage {
            cost: Some(4),
            message: "Refactor this function.".to_string(),
            secondary_locations: vec![IssueLocation::labeled(span(2, 8, 2, 10), "+1")],
        };
        let json = serde_json::to_value(&encoded).unwrap();
        assert_eq!(json["cost"], 4);
        assert_eq!(json["secondaryLocations"][0]["message"], "+1");
    }

    #[test]
    fn test_span_line_count() {
        assert_eq!(span(2, 0, 5, 1).line_count(), 4);
        assert_eq!(span(7, 0, 7, 9).line_count(), 1);
    }
}
