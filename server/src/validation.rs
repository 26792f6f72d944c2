use crate::error::ApiError;

/// Reject a speak request before the engine is touched. Both fields must be
/// non-empty; a missing field deserializes to an empty string upstream, so
/// absence and emptiness share this path.
pub fn validate_speak_request(text: &str, output_path: &str) -> Result<(), ApiError> {
    if text.is_empty() || output_path.is_empty() {
        return Err(ApiError::InvalidInput(
            "Missing text or output_path".to_string(),
        ));
    }
    Ok(())
}
