//! The `cybermetric list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use cybermetric_providers::config::load_config_from;
use cybermetric_providers::create_provider;

pub async fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    if let Some(filter) = &provider_filter {
        config.provider(filter)?;
    }

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    for name in names {
        if provider_filter.as_ref().is_some_and(|f| f != name) {
            continue;
        }

        println!("Provider: {name}");
        let provider = match create_provider(name, config.provider(name)?) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(provider = %name, error = %e, "failed to create client");
                println!("  unavailable: {e}\n");
                continue;
            }
        };
        match provider.list_models().await {
            Ok(models) if models.is_empty() => println!("  (no models available)"),
            Ok(models) => {
                for model in &models {
                    if model.max_context > 0 {
                        println!(
                            "  {} ({}, {}K context)",
                            model.id,
                            model.name,
                            model.max_context / 1000
                        );
                    } else {
                        println!("  {}", model.id);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(provider = %name, error = %e, "failed to list models");
                println!("  unavailable: {e}");
            }
        }
        println!();
    }

    Ok(())
}
