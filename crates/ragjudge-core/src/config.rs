use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::suite::RagCase;

/// One evaluation run declared in YAML: which metrics, which case,
/// which judge model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default = "default_model")]
    pub model: String,
    pub metrics: Vec<String>,
    pub case: RagCase,
    /// JSON reference document to load into the case's documents slot.
    #[serde(default)]
    pub reference: Option<PathBuf>,
    /// Ask the judge for float scores instead of verdicts.
    #[serde(default)]
    pub continuous: bool,
}

fn default_model() -> String {
    "openai:o3-mini".to_string()
}

impl SuiteConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => EvalError::NotFound {
                    path: path.to_path_buf(),
                },
                _ => EvalError::Io {
                    path: path.to_path_buf(),
                    source: err,
                },
            })?;
        serde_yaml::from_str(&content).map_err(|err| EvalError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn loads_a_minimal_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
metrics:
  - groundedness
  - helpfulness
case:
  question: What does clause 6.2.5 require?
  answer: Staff must receive IATA training.
reference: demos/standard.json
"#
        )
        .unwrap();

        let config = SuiteConfig::load(file.path()).await.unwrap();
        assert_eq!(config.model, "openai:o3-mini");
        assert_eq!(config.metrics, vec!["groundedness", "helpfulness"]);
        assert_eq!(
            config.case.question.as_deref(),
            Some("What does clause 6.2.5 require?")
        );
        assert_eq!(config.reference, Some(PathBuf::from("demos/standard.json")));
        assert!(!config.continuous);
    }

    #[tokio::test]
    async fn rejects_unparseable_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "metrics: [unclosed").unwrap();

        let err = SuiteConfig::load(file.path()).await.unwrap_err();
        assert!(matches!(err, EvalError::Parse { .. }));
    }
}
