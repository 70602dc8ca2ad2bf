use crate::errors::{ParityError, Result};

/// Serializes a value to pretty JSON with canonical error handling.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| ParityError::SerializationError(err.to_string()))
}

/// Deserializes JSON bytes.
pub fn from_json_bytes<T: serde::de::DeserializeOwned>(input: &[u8]) -> Result<T> {
    serde_json::from_slice(input).map_err(|err| ParityError::DeserializationError(err.to_string()))
}

/// Reads and deserializes a JSON file.
pub fn from_json_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<std::path::Path>,
) -> Result<T> {
    let bytes = std::fs::read(path.as_ref())?;
    from_json_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_round_trip() {
        let value = serde_json::json!({"location": "chinanorth"});
        let json = to_pretty_json(&value).expect("serialize");
        let decoded: serde_json::Value = from_json_bytes(json.as_bytes()).expect("deserialize");
        assert_eq!(decoded["location"], "chinanorth");
    }

    #[test]
    fn malformed_input_is_a_deserialization_error() {
        let result: Result<serde_json::Value> = from_json_bytes(b"[1,");
        assert!(matches!(result, Err(ParityError::DeserializationError(_))));
    }
}
