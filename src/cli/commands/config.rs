//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::openai::api_key_available;
use anyhow::{Context, Result};

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered =
                toml::to_string_pretty(&settings).context("Failed to serialize config")?;
            println!("{}", rendered);

            Output::header("Resolved");
            Output::kv("Vector store", &settings.vector_store_path().display().to_string());
            Output::kv(
                "OpenAI",
                if api_key_available() {
                    "API key set (semantic search, generated answers)"
                } else {
                    "no API key (keyword search, templated answers)"
                },
            );
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
            if !config_path.exists() {
                Output::info("No config file yet; defaults are in use.");
            }
        }
    }

    Ok(())
}
