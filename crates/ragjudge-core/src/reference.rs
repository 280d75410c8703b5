use std::path::Path;

use serde_json::Value;
use tokio::fs;

use crate::error::EvalError;

/// Load a JSON document from disk.
///
/// The file must hold valid UTF-8 JSON; no schema beyond that is
/// imposed. Reference standards and case files both come through here.
pub async fn load_reference(path: impl AsRef<Path>) -> Result<Value, EvalError> {
    let path = path.as_ref();
    let bytes = fs::read(path).await.map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => EvalError::NotFound {
            path: path.to_path_buf(),
        },
        _ => EvalError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    })?;
    serde_json::from_slice(&bytes).map_err(|err| EvalError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn loads_what_was_written() {
        let mut file = NamedTempFile::new().unwrap();
        let doc = json!({"clauses": [{"id": "6.2.5", "text": "Staff must receive IATA training."}]});
        write!(file, "{doc}").unwrap();

        let loaded = load_reference(file.path()).await.unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = load_reference("does/not/exist.json").await.unwrap_err();
        assert!(matches!(err, EvalError::NotFound { .. }));
    }

    #[tokio::test]
    async fn truncated_json_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"a\":").unwrap();

        let err = load_reference(file.path()).await.unwrap_err();
        assert!(matches!(err, EvalError::Parse { .. }));
    }
}
