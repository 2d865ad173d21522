//! The `cybermetric init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("cybermetric.toml").exists() {
        println!("cybermetric.toml already exists, skipping.");
    } else {
        std::fs::write("cybermetric.toml", SAMPLE_CONFIG)?;
        println!("Created cybermetric.toml");
    }

    std::fs::create_dir_all("datasets")?;
    let example_path = Path::new("datasets/example.json");
    if example_path.exists() {
        println!("datasets/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DATASET)?;
        println!("Created datasets/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit cybermetric.toml (set OPENAI_API_KEY for the openai backend)");
    println!("  2. Run: cybermetric validate --test datasets/example.json");
    println!("  3. Run: cybermetric run --test datasets/example --model llama3.1:70b");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# cybermetric configuration

default_provider = "ollama"
default_model = "llama3.1:70b"
default_dataset = "CyberMetric-80-v1.json"
max_attempts = 5
backoff_unit_ms = 1000
output_dir = "evaluations"
save_evaluation = true
verbose = false

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;

const EXAMPLE_DATASET: &str = r#"{
  "questions": [
    {
      "question": "Which port does SSH listen on by default?",
      "answers": {"A": "21", "B": "22", "C": "23", "D": "443"},
      "solution": "B"
    },
    {
      "question": "Which of the following is an asymmetric encryption algorithm?",
      "answers": {"A": "AES", "B": "DES", "C": "RSA", "D": "Blowfish"},
      "solution": "C"
    },
    {
      "question": "What does the principle of least privilege require?",
      "answers": {
        "A": "Users receive only the access needed to perform their duties",
        "B": "Administrators share a single privileged account",
        "C": "Passwords are rotated every 30 days",
        "D": "All traffic is encrypted in transit"
      },
      "solution": "A"
    }
  ]
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use cybermetric_core::dataset::parse_dataset_str;

    #[test]
    fn example_dataset_parses() {
        let dataset = parse_dataset_str(EXAMPLE_DATASET, Path::new("example.json")).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn sample_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cybermetric.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let config = cybermetric_providers::config::load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "ollama");
        assert_eq!(config.max_attempts, 5);
        assert!(config.providers.contains_key("openai"));
    }
}
