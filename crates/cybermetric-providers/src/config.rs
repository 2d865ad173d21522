//! Harness configuration and client factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cybermetric_core::engine::EvalEngineConfig;
use cybermetric_core::traits::ModelClient;

use crate::ollama::OllamaClient;
use crate::openai::OpenAiClient;

/// Configuration for a single model backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyberMetricConfig {
    /// Backend configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Backend used when `--provider` is not given.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Dataset used when `--test` is not given.
    #[serde(default = "default_dataset")]
    pub default_dataset: String,
    /// Requests per question before recording no answer.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff unit in milliseconds; attempt `n` waits `unit * 2^n`.
    #[serde(default = "default_backoff_unit")]
    pub backoff_unit_ms: u64,
    /// Directory the evaluation logs are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_true")]
    pub save_evaluation: bool,
    #[serde(default)]
    pub verbose: bool,
}

fn default_provider() -> String {
    "ollama".to_string()
}
fn default_model() -> String {
    "llama3.1:70b".to_string()
}
fn default_dataset() -> String {
    "CyberMetric-80-v1.json".to_string()
}
fn default_max_attempts() -> u32 {
    5
}
fn default_backoff_unit() -> u64 {
    1000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("evaluations")
}
fn default_true() -> bool {
    true
}

impl Default for CyberMetricConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_dataset: default_dataset(),
            max_attempts: default_max_attempts(),
            backoff_unit_ms: default_backoff_unit(),
            output_dir: default_output_dir(),
            save_evaluation: true,
            verbose: false,
        }
    }
}

impl CyberMetricConfig {
    /// Retry settings for the evaluation engine.
    pub fn engine_config(&self) -> EvalEngineConfig {
        EvalEngineConfig {
            max_attempts: self.max_attempts,
            backoff_unit: Duration::from_millis(self.backoff_unit_ms),
        }
    }

    /// Look up a backend by name.
    pub fn provider(&self, name: &str) -> Result<&ProviderConfig> {
        self.providers.get(name).with_context(|| {
            let mut known: Vec<&str> = self.providers.keys().map(String::as_str).collect();
            known.sort_unstable();
            format!(
                "provider '{name}' is not configured (available: {})",
                known.join(", ")
            )
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        // Substituted values are not rescanned.
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Apply `CYBERMETRIC_OPENAI_KEY` / `CYBERMETRIC_OLLAMA_URL` overrides and
/// make sure an `ollama` entry always exists.
fn apply_overrides(config: &mut CyberMetricConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("CYBERMETRIC_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    let entry = config
        .providers
        .entry("ollama".into())
        .or_insert(ProviderConfig::Ollama {
            base_url: default_ollama_url(),
        });
    if let (Some(url), ProviderConfig::Ollama { base_url }) =
        (lookup("CYBERMETRIC_OLLAMA_URL"), entry)
    {
        *base_url = url;
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `cybermetric.toml` in the current directory
/// 2. `~/.config/cybermetric/config.toml`
///
/// Environment variable overrides: `CYBERMETRIC_OPENAI_KEY`, `CYBERMETRIC_OLLAMA_URL`.
pub fn load_config() -> Result<CyberMetricConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CyberMetricConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("cybermetric.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CyberMetricConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CyberMetricConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("cybermetric"))
}

/// Create a model client from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn ModelClient>> {
    tracing::debug!(provider = name, config = ?config, "creating model client");
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            if api_key.is_empty() {
                anyhow::bail!(
                    "provider '{name}' has no API key; set api_key in the config or CYBERMETRIC_OPENAI_KEY"
                );
            }
            Ok(Box::new(OpenAiClient::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
            )?))
        }
        ProviderConfig::Ollama { base_url } => Ok(Box::new(OllamaClient::new(base_url)?)),
    }
}
