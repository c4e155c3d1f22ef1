//! The secondary-location reporting envelope.
//!
//! A `Finding` is a first-class structured value for its whole life inside
//! the engine; this module is the only place it is ever flattened. Sinks
//! that render related locations natively get them as structured entries;
//! sinks that accept a single message string get the same information as one
//! JSON payload embedded in the finding's data.

use common::{expand_message, EncodedMessage, Finding, OutputMode};

/// Data key carrying the embedded payload in `OutputMode::Embedded`.
pub const RUNTIME_DATA_KEY: &str = "wardenRuntimeData";

/// Message id used for embedded-payload findings.
pub const RUNTIME_MESSAGE_ID: &str = "wardenRuntime";

/// Finalizes a finding for the selected output boundary.
///
/// In both modes the `{{key}}` placeholders of the message template are
/// expanded from the finding's data. In `Embedded` mode the expanded message,
/// cost, and secondary locations are serialized into
/// `data["wardenRuntimeData"]` and the structured secondary list is cleared.
pub fn emit(finding: Finding, mode: OutputMode) -> Finding {
    let expanded = expand_message(&finding.message, &finding.data);
    match mode {
        OutputMode::Structured => Finding {
            message: expanded,
            ..finding
        },
        OutputMode::Embedded => {
            let encoded = EncodedMessage {
                cost: finding.cost,
                message: expanded.clone(),
                secondary_locations: finding.secondary_locations,
            };
            let payload = serde_json::to_string(&encoded)
                .expect("EncodedMessage has no non-serializable fields");

            let mut data = finding.data;
            data.insert(RUNTIME_DATA_KEY.to_string(), payload);
            Finding {
                rule: finding.rule,
                message_id: RUNTIME_MESSAGE_ID,
                span: finding.span,
                message: expanded,
                data,
                secondary_locations: Vec::new(),
                cost: finding.cost,
            }
        }
    }
}
