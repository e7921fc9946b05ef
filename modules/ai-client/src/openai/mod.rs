mod client;
pub(crate) mod types;

use serde::de::DeserializeOwned;

use crate::error::{AiError, Result};
use crate::util::strip_code_blocks;
use client::OpenAiClient;
use types::{ChatRequest, WireMessage};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";

// =============================================================================
// OpenAI-compatible chat agent
// =============================================================================

/// Handle for any provider speaking the OpenAI chat-completions protocol.
/// Holds one HTTP client; cheap to clone and safe to share across calls.
#[derive(Clone)]
pub struct OpenAi {
    model: String,
    client: OpenAiClient,
}

impl OpenAi {
    pub fn with_endpoint(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Self {
        let api_key = api_key.into();
        Self {
            model: model.into(),
            client: OpenAiClient::new(&api_key, base_url.as_ref()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chat completion in JSON-object mode, deserialized into `T`.
    ///
    /// Any transport, API or decoding problem is returned as an `AiError`;
    /// a partially valid object is never produced.
    pub async fn extract_json<T: DeserializeOwned>(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<T> {
        let request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system))
            .message(WireMessage::user(user))
            .temperature(0.0)
            .max_tokens(4096)
            .json_object();

        let content = self
            .client
            .chat(&request)
            .await?
            .text()
            .ok_or(AiError::EmptyResponse)?;

        serde_json::from_str(strip_code_blocks(&content))
            .map_err(|e| AiError::Parse(format!("Failed to deserialize response: {e}")))
    }
}
