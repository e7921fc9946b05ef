use ai_client::{truncate_to_char_boundary, OpenAi};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use socialdss_common::{Config, Extraction};

/// Bytes of source text sent to the model per call.
pub const MAX_PROMPT_TEXT_BYTES: usize = 4000;

pub const SYSTEM_PROMPT: &str = r#"You are an expert Pharmacovigilance AI.
Your goal is to extract safety signals from consumer text.

OUTPUT JSON FORMAT:
{
  "Entities": [
    { "text": "entity_name", "type": "BRAND/SYMPTOM/INGREDIENT" }
  ],
  "Relations": [
    {
      "Subject": "Entity A",
      "Predicate": "CAUSES/CONTAINS/DOES_NOT_CONTAIN",
      "Object": "Entity B",
      "Type": "Adverse Event/Composition/Effect",
      "Sentiment": "Negative/Neutral"
    }
  ],
  "User_Intent": "Summary of what the user wants",
  "Recommendation_Request": boolean
}

RULES:
1. Map slang to standard medical terms (e.g., "the runs" -> "Diarrhea").
2. Identify Brands (Subject) vs Symptoms (Object).
3. Only output valid JSON."#;

// --- ClaimExtractor trait ---

/// Turns free text into entities and subject/predicate/object claims.
#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Extraction>;
}

/// Claim extractor backed by an OpenAI-compatible chat endpoint in JSON mode.
pub struct LlmClaimExtractor {
    llm: OpenAi,
}

impl LlmClaimExtractor {
    pub fn new(llm: OpenAi) -> Self {
        Self { llm }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(OpenAi::with_endpoint(
            &config.llm_api_key,
            &config.llm_model,
            &config.llm_base_url,
        ))
    }
}

pub fn build_user_prompt(text: &str) -> String {
    format!(
        "Analyze this text:\n{}",
        truncate_to_char_boundary(text, MAX_PROMPT_TEXT_BYTES)
    )
}

#[async_trait]
impl ClaimExtractor for LlmClaimExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction> {
        let extraction: Extraction = self
            .llm
            .extract_json(SYSTEM_PROMPT, build_user_prompt(text))
            .await?;

        debug!(
            model = self.llm.model(),
            entities = extraction.entities.len(),
            relations = extraction.relations.len(),
            "Extraction complete"
        );
        Ok(extraction)
    }
}
