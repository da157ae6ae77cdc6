pub mod gemini;
pub mod ollama;

use std::sync::Arc;

use anyhow::{bail, Result};
use plainlaw_core::{completion::CompletionClient, config::Config};

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

/// Build the completion backend named by `config.backend`.
pub fn client_from_config(config: &Config) -> Result<Arc<dyn CompletionClient>> {
    let client: Arc<dyn CompletionClient> = match config.backend.as_str() {
        "gemini" => Arc::new(GeminiClient::new(
            &config.gemini_base_url,
            &config.gemini_model,
            &config.gemini_api_key,
            config.request_timeout_s,
        )?),
        "ollama" => Arc::new(OllamaClient::new(
            &config.ollama_base_url,
            &config.ollama_model,
            config.request_timeout_s,
        )?),
        other => bail!("unknown backend {other:?}"),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_backend_by_name() {
        let gemini = Config {
            gemini_api_key: "k".into(),
            ..Config::default()
        };
        assert_eq!(client_from_config(&gemini).unwrap().name(), "gemini");

        let ollama = Config {
            backend: "ollama".into(),
            ..Config::default()
        };
        assert_eq!(client_from_config(&ollama).unwrap().name(), "ollama");
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let config = Config {
            backend: "gpt".into(),
            ..Config::default()
        };
        assert!(client_from_config(&config).is_err());
    }
}
