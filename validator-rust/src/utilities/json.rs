//! JSON rendering of query responses for the UI-layer caller.

use crate::base::QueryResponse;
use crate::errors::*;

/// Serialize a response to a JSON string. The true mean never appears in a
/// response, so the report is safe to hand to the display layer as-is.
pub fn release_report(response: &QueryResponse) -> Result<String> {
    serde_json::to_string(response)
        .map_err(|err| Error::from(format!("release report: {}", err)))
}
