//! JSON dataset loader.
//!
//! Loads CyberMetric datasets (`{ "questions": [...] }`) from disk, and
//! validates them for common authoring mistakes.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{Answer, Dataset, QuestionRecord};

/// On-disk shape of a dataset file. Any other top-level fields are ignored.
#[derive(Debug, Deserialize)]
struct DatasetFile {
    questions: Vec<QuestionRecord>,
}

/// Load a dataset file into memory.
///
/// The whole file is read and parsed before returning. A missing file,
/// malformed JSON, an invalid `solution`, or an empty question list are all
/// reported as [`ConfigError`].
pub fn load_dataset(path: &Path) -> Result<Dataset, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::DatasetRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_dataset_str(&content, path)
}

/// Parse dataset JSON (useful for testing). `source_path` names the dataset.
pub fn parse_dataset_str(content: &str, source_path: &Path) -> Result<Dataset, ConfigError> {
    let parsed: DatasetFile =
        serde_json::from_str(content).map_err(|source| ConfigError::DatasetParse {
            path: source_path.to_path_buf(),
            source,
        })?;

    if parsed.questions.is_empty() {
        return Err(ConfigError::EmptyDataset {
            path: source_path.to_path_buf(),
        });
    }

    Ok(Dataset {
        name: dataset_name(source_path),
        questions: parsed.questions,
    })
}

/// The file name component of a dataset path, e.g. `CyberMetric-80-v1.json`.
pub fn dataset_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A validation warning for a dataset.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based question index (if applicable).
    pub index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a dataset for common issues.
pub fn validate_dataset(dataset: &Dataset) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for (i, q) in dataset.questions.iter().enumerate() {
        if !seen.insert(q.question.trim()) {
            warnings.push(ValidationWarning {
                index: Some(i),
                message: "duplicate question text".into(),
            });
        }
    }

    for (i, q) in dataset.questions.iter().enumerate() {
        if q.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                index: Some(i),
                message: "question text is empty".into(),
            });
        }
    }

    for (i, q) in dataset.questions.iter().enumerate() {
        let blank: Vec<String> = q
            .answers
            .iter()
            .filter(|(_, text)| text.trim().is_empty())
            .map(|(letter, _)| letter.to_string())
            .collect();
        if !blank.is_empty() {
            warnings.push(ValidationWarning {
                index: Some(i),
                message: format!("option(s) {} are empty", blank.join(", ")),
            });
        }
    }

    // Two options with the same text make the scoring ambiguous
    for (i, q) in dataset.questions.iter().enumerate() {
        let texts: HashSet<&str> = Answer::ALL
            .iter()
            .map(|a| q.answers.get(*a).trim())
            .filter(|t| !t.is_empty())
            .collect();
        let non_empty = q.answers.iter().filter(|(_, t)| !t.trim().is_empty()).count();
        if texts.len() < non_empty {
            warnings.push(ValidationWarning {
                index: Some(i),
                message: "two or more options share the same text".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{
  "questions": [
    {
      "question": "What does the 'S' in HTTPS stand for?",
      "answers": {"A": "Secure", "B": "Simple", "C": "Standard", "D": "Session"},
      "solution": "A"
    },
    {
      "question": "Which port does SSH use by default?",
      "answers": {"A": "21", "B": "22", "C": "23", "D": "25"},
      "solution": "B"
    }
  ]
}"#;

    #[test]
    fn parse_valid_dataset() {
        let set = parse_dataset_str(SAMPLE, Path::new("datasets/CyberMetric-2-v1.json")).unwrap();
        assert_eq!(set.name, "CyberMetric-2-v1.json");
        assert_eq!(set.len(), 2);
        assert_eq!(set.questions[1].solution, Answer::B);
        assert!(validate_dataset(&set).is_empty());
    }

    #[test]
    fn extra_top_level_fields_are_ignored() {
        let json = r#"{"version": 1, "questions": [
            {"question": "q", "answers": {"A": "1", "B": "2", "C": "3", "D": "4"}, "solution": "D"}
        ]}"#;
        let set = parse_dataset_str(json, Path::new("x.json")).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_dataset_is_config_error() {
        let err = parse_dataset_str(r#"{"questions": []}"#, Path::new("empty.json")).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDataset { .. }));
    }

    #[test]
    fn missing_questions_field_is_parse_error() {
        let err = parse_dataset_str(r#"{"items": []}"#, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, ConfigError::DatasetParse { .. }));
    }

    #[test]
    fn invalid_solution_is_parse_error() {
        let json = r#"{"questions": [
            {"question": "q", "answers": {"A": "1", "B": "2", "C": "3", "D": "4"}, "solution": "E"}
        ]}"#;
        let err = parse_dataset_str(json, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, ConfigError::DatasetParse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_dataset(&PathBuf::from("/nonexistent/CyberMetric.json")).unwrap_err();
        assert!(matches!(err, ConfigError::DatasetRead { .. }));
        assert!(err.to_string().contains("CyberMetric.json"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CyberMetric-2-v1.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let set = load_dataset(&path).unwrap();
        assert_eq!(set.name, "CyberMetric-2-v1.json");
        assert_eq!(set.questions[0].answers.a, "Secure");
    }

    #[test]
    fn validate_reports_problems() {
        let json = r#"{"questions": [
            {"question": "dup", "answers": {"A": "1", "B": "2", "C": "3", "D": "4"}, "solution": "A"},
            {"question": "dup", "answers": {"A": "1", "B": " ", "C": "3", "D": "4"}, "solution": "A"},
            {"question": "  ", "answers": {"A": "x", "B": "x", "C": "y", "D": "z"}, "solution": "C"}
        ]}"#;
        let set = parse_dataset_str(json, Path::new("warn.json")).unwrap();
        let warnings = validate_dataset(&set);

        assert!(warnings
            .iter()
            .any(|w| w.index == Some(1) && w.message.contains("duplicate")));
        assert!(warnings
            .iter()
            .any(|w| w.index == Some(1) && w.message.contains("B")));
        assert!(warnings
            .iter()
            .any(|w| w.index == Some(2) && w.message.contains("question text is empty")));
        assert!(warnings
            .iter()
            .any(|w| w.index == Some(2) && w.message.contains("same text")));
    }
}
