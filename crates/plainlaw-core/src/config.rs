use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};

use crate::{completion::CompletionOptions, simplifier::SimplifierSettings};

/// Full application configuration.
/// Read from the process environment first, then `.env` in the working directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// "gemini" (default) or "ollama".
    pub backend: String,

    // Gemini
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,

    // Ollama
    pub ollama_base_url: String,
    pub ollama_model: String,

    // Simplification
    pub max_chunk_chars: usize,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub retry_attempts: u32,
    pub retry_backoff: f64,
    /// Per-call HTTP timeout for the completion backend.
    pub request_timeout_s: u64,

    // Web
    pub web_bind: String,
    pub web_port: u16,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "gemini".into(),
            gemini_api_key: String::new(),
            gemini_model: "gemini-1.5-flash".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            ollama_base_url: "http://127.0.0.1:11434".into(),
            ollama_model: "llama3.1".into(),
            max_chunk_chars: 3000,
            max_output_tokens: 512,
            temperature: 0.2,
            retry_attempts: 3,
            retry_backoff: 1.5,
            request_timeout_s: 120,
            web_bind: "127.0.0.1".into(),
            web_port: 5000,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

pub fn parse_dotenv(path: impl AsRef<Path>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(path) else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

/// First key (env, then dotenv) that has a value wins.
fn get(keys: &[&str], dotenv: &HashMap<String, String>) -> Option<String> {
    keys.iter().find_map(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| dotenv.get(*key).cloned())
    })
}

fn get_str(keys: &[&str], dotenv: &HashMap<String, String>, default: &str) -> String {
    get(keys, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_parsed<T: std::str::FromStr>(keys: &[&str], dotenv: &HashMap<String, String>, default: T) -> T {
    get(keys, dotenv)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_sources(&parse_dotenv(".env"))
    }

    /// Build from the environment, using `dotenv` for keys the environment lacks.
    pub fn from_sources(dotenv: &HashMap<String, String>) -> Result<Self> {
        let d = Self::default();
        let config = Config {
            backend: get_str(&["BACKEND"], dotenv, &d.backend).to_lowercase(),
            gemini_api_key: get_str(&["GEMINI_API_KEY"], dotenv, ""),
            gemini_model: get_str(&["GEMINI_MODEL"], dotenv, &d.gemini_model),
            gemini_base_url: get_str(&["GEMINI_BASE_URL"], dotenv, &d.gemini_base_url),
            ollama_base_url: get_str(&["OLLAMA_BASE_URL"], dotenv, &d.ollama_base_url),
            ollama_model: get_str(&["OLLAMA_MODEL"], dotenv, &d.ollama_model),
            max_chunk_chars: get_parsed(&["MAX_CHUNK_CHARS"], dotenv, d.max_chunk_chars),
            max_output_tokens: get_parsed(
                &["MAX_OUTPUT_TOKENS", "GEMINI_MAX_OUTPUT_TOKENS"],
                dotenv,
                d.max_output_tokens,
            ),
            temperature: get_parsed(&["TEMPERATURE", "GEMINI_TEMPERATURE"], dotenv, d.temperature),
            retry_attempts: get_parsed(
                &["RETRY_ATTEMPTS", "GEMINI_RETRY_ATTEMPTS"],
                dotenv,
                d.retry_attempts,
            ),
            retry_backoff: get_parsed(&["RETRY_BACKOFF", "GEMINI_RETRY_BACKOFF"], dotenv, d.retry_backoff),
            request_timeout_s: get_parsed(&["REQUEST_TIMEOUT_S"], dotenv, d.request_timeout_s),
            web_bind: get_str(&["WEB_BIND"], dotenv, &d.web_bind),
            web_port: get_parsed(&["WEB_PORT"], dotenv, d.web_port),
            max_body_bytes: get_parsed(&["MAX_BODY_BYTES"], dotenv, d.max_body_bytes),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend.as_str() {
            "gemini" => {
                if self.gemini_api_key.is_empty() {
                    bail!("GEMINI_API_KEY is not set; add it to the environment or .env");
                }
            },
            "ollama" => {},
            other => bail!("unknown BACKEND {other:?} (expected \"gemini\" or \"ollama\")"),
        }
        if self.max_chunk_chars == 0 {
            bail!("MAX_CHUNK_CHARS must be at least 1");
        }
        if self.retry_attempts == 0 {
            bail!("RETRY_ATTEMPTS must be at least 1");
        }
        if !self.retry_backoff.is_finite() || self.retry_backoff < 0.0 {
            bail!("RETRY_BACKOFF must be a non-negative number");
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            bail!("TEMPERATURE must be a non-negative number");
        }
        Ok(())
    }

    pub fn simplifier_settings(&self) -> SimplifierSettings {
        SimplifierSettings {
            max_chunk_chars: self.max_chunk_chars,
            retry_attempts: self.retry_attempts,
            retry_backoff_base: self.retry_backoff,
            completion: CompletionOptions {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}
