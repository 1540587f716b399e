//! JSON rule file parsing.
//!
//! Rule files are edited by hand and sometimes saved with a UTF-8 byte
//! order mark; it is stripped before parsing. The top-level value must be
//! an object.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{RulesetError, RulesetResult};

/// Load a JSON file whose top-level value must be an object.
pub fn load_json_object(path: &Path) -> RulesetResult<Map<String, Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RulesetError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RulesetError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let body = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let value: Value = serde_json::from_str(body).map_err(|e| RulesetError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RulesetError::NotAnObject {
            path: path.to_path_buf(),
            found: json_type_name(&other),
        }),
    }
}

/// Human-readable JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "real_params.json", r#"{"irpj": 0.15}"#);
        let map = load_json_object(&path).unwrap();
        assert_eq!(map["irpj"], serde_json::json!(0.15));
    }

    #[test]
    fn strips_byte_order_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bom.json", "\u{feff}{\"csll\": 0.09}");
        assert!(load_json_object(&path).unwrap().contains_key("csll"));
    }

    #[test]
    fn rejects_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "list.json", "[1, 2, 3]");
        match load_json_object(&path) {
            Err(RulesetError::NotAnObject { found, .. }) => assert_eq!(found, "array"),
            other => panic!("expected NotAnObject, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_json_object(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(RulesetError::FileNotFound { .. })));
    }

    #[test]
    fn invalid_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "broken.json", "{not json");
        let err = load_json_object(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
