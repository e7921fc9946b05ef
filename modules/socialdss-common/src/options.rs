use crate::error::SocialDssError;
use crate::horizon::TimeHorizon;
use crate::types::ADVERSE_EVENT;

pub const DEFAULT_POSTS_PER_SOURCE: usize = 100;
pub const MAX_POSTS_PER_SOURCE: usize = 300;
pub const DEFAULT_TEXTS_TO_ANALYZE: usize = 5;
pub const MAX_TEXTS_TO_ANALYZE: usize = 5000;

/// Split a comma-separated source list, trimming whitespace and dropping
/// empty entries.
pub fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub query: String,
    pub sources: Vec<String>,
    pub limit_per_source: usize,
    pub horizon: TimeHorizon,
}

impl CollectOptions {
    pub fn new(query: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            query: query.into(),
            sources,
            limit_per_source: DEFAULT_POSTS_PER_SOURCE,
            horizon: TimeHorizon::default(),
        }
    }

    /// Reject input before any network activity.
    pub fn validate(&self) -> Result<(), SocialDssError> {
        if self.query.trim().is_empty() {
            return Err(SocialDssError::Validation(
                "a brand or category query is required".to_string(),
            ));
        }
        if self.sources.iter().all(|s| s.trim().is_empty()) {
            return Err(SocialDssError::Validation(
                "at least one source is required".to_string(),
            ));
        }
        if !(1..=MAX_POSTS_PER_SOURCE).contains(&self.limit_per_source) {
            return Err(SocialDssError::Validation(format!(
                "limit per source must be between 1 and {MAX_POSTS_PER_SOURCE}, got {}",
                self.limit_per_source
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Cost bound: each processed text is one model call.
    pub max_to_process: usize,
    /// Relation category kept for verification.
    pub relation_type: String,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            max_to_process: DEFAULT_TEXTS_TO_ANALYZE,
            relation_type: ADVERSE_EVENT.to_string(),
        }
    }
}

impl VerifyOptions {
    pub fn validate(&self) -> Result<(), SocialDssError> {
        if !(1..=MAX_TEXTS_TO_ANALYZE).contains(&self.max_to_process) {
            return Err(SocialDssError::Validation(format!(
                "max posts to analyze must be between 1 and {MAX_TEXTS_TO_ANALYZE}, got {}",
                self.max_to_process
            )));
        }
        if self.relation_type.trim().is_empty() {
            return Err(SocialDssError::Validation(
                "relation type filter cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
