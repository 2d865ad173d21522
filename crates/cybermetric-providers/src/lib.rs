//! cybermetric-providers: Model client backends.
//!
//! Implements the `ModelClient` trait for Ollama and OpenAI-compatible APIs,
//! plus a scripted mock, so the same benchmark can be run against local and
//! hosted models.

pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config, CyberMetricConfig, ProviderConfig};
pub use error::ProviderError;
pub use mock::{MockClient, MockReply};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
