use rdf_convert_common::{ConvertResult, MalformedInputError, TextPosition};
use serde_json::Value;

/// Reads a JSON document, turning syntax errors into [`MalformedInputError`]s of `format`.
pub(crate) fn read_json(format: &str, input: &[u8]) -> ConvertResult<Value> {
    serde_json::from_slice(input).map_err(|error| {
        let position = (error.line() > 0).then(|| TextPosition {
            line: error.line() as u64 - 1,
            column: error.column().saturating_sub(1) as u64,
            offset: None,
        });
        // serde_json appends the position to its messages
        let message = error.to_string();
        let message = message
            .split(" at line ")
            .next()
            .unwrap_or(&message)
            .to_owned();
        MalformedInputError::new(format, position, message).into()
    })
}
