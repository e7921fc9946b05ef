use std::env;

use tracing::info;

use crate::error::SocialDssError;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Secrets and endpoints for the verification stage, loaded from the
/// environment (and a `.env` file when present).
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Language model (OpenAI-compatible endpoint)
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, SocialDssError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            neo4j_uri: required_env("NEO4J_URI")?,
            neo4j_user: required_env("NEO4J_USER")?,
            neo4j_password: required_env("NEO4J_PASSWORD")?,
            llm_api_key: required_env("GROQ_API_KEY")?,
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
        })
    }

    /// Log the loaded configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            neo4j_uri = self.neo4j_uri.as_str(),
            neo4j_user = self.neo4j_user.as_str(),
            neo4j_password = redact(&self.neo4j_password),
            llm_api_key = redact(&self.llm_api_key),
            llm_base_url = self.llm_base_url.as_str(),
            llm_model = self.llm_model.as_str(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> Result<String, SocialDssError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SocialDssError::Config(format!(
            "{key} environment variable is required"
        ))),
    }
}

fn redact(secret: &str) -> String {
    if secret.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_keeps_only_tail() {
        assert_eq!(redact("gsk_abcdef1234"), "****1234");
        assert_eq!(redact("abc"), "****");
    }
}
