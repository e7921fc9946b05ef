use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Constants ---

/// Texts shorter than this (in characters) cannot carry a usable claim.
pub const MIN_CLAIM_TEXT_CHARS: usize = 20;

/// Characters of source text kept as provenance on a verification record.
pub const SOURCE_SUMMARY_CHARS: usize = 50;

/// Relation category the verification stage keeps by default.
pub const ADVERSE_EVENT: &str = "Adverse Event";

/// Predicate recorded when the model omitted one.
pub const DEFAULT_PREDICATE: &str = "RELATED_TO";

/// Category recorded when the model omitted one.
pub const DEFAULT_RELATION_TYPE: &str = "General";

// --- Posts ---

/// One search result from a single source. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub source: String,
    pub title: String,
    pub body: String,
    pub upvotes: u64,
    pub comments_count: u64,
    /// Creation time, epoch seconds (UTC).
    pub created_utc: i64,
    /// Unique within `source`.
    pub id: String,
    pub url: Option<String>,
}

impl Post {
    /// Creation time as a UTC datetime. `None` only for out-of-range timestamps.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc, 0)
    }

    /// Title and body joined the way the verification stage reads a post.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }

    pub fn engagement(&self) -> u64 {
        self.upvotes + self.comments_count
    }
}

// --- Extraction ---

/// A named thing the model found in the text (brand, symptom, ingredient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub entity_type: Option<String>,
}

/// Subject–Predicate–Object claim as returned by the model. Every field is
/// optional on the wire; consumers decide what a usable claim needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
    #[serde(rename = "Predicate", default)]
    pub predicate: Option<String>,
    #[serde(rename = "Object", default)]
    pub object: Option<String>,
    #[serde(rename = "Type", default)]
    pub relation_type: Option<String>,
    #[serde(rename = "Sentiment", default)]
    pub sentiment: Option<String>,
}

impl Relation {
    /// Subject and object, if both are present and non-blank.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        let subject = non_blank(self.subject.as_deref())?;
        let object = non_blank(self.object.as_deref())?;
        Some((subject, object))
    }

    pub fn is_of_type(&self, relation_type: &str) -> bool {
        self.relation_type.as_deref() == Some(relation_type)
    }

    /// Category filter plus the endpoint requirement: the only relations
    /// that can be checked against the graph.
    pub fn is_verifiable_as(&self, relation_type: &str) -> bool {
        self.is_of_type(relation_type) && self.endpoints().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Full structured response for one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(rename = "Entities", default)]
    pub entities: Vec<Entity>,
    #[serde(rename = "Relations", default)]
    pub relations: Vec<Relation>,
    #[serde(rename = "User_Intent", default)]
    pub user_intent: Option<String>,
    #[serde(rename = "Recommendation_Request", default)]
    pub recommendation_request: bool,
}

// --- Verification ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoveltyStatus {
    /// A matching edge already exists in the graph.
    Known,
    /// No matching edge at verification time.
    Novel,
}

impl NoveltyStatus {
    pub fn from_match(found: bool) -> Self {
        if found {
            NoveltyStatus::Known
        } else {
            NoveltyStatus::Novel
        }
    }
}

impl std::fmt::Display for NoveltyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoveltyStatus::Known => write!(f, "KNOWN"),
            NoveltyStatus::Novel => write!(f, "NOVEL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub relation_type: String,
    pub sentiment: Option<String>,
    pub status: NoveltyStatus,
    /// Truncated source text the claim was extracted from.
    pub source: Option<String>,
}

impl VerificationRecord {
    /// Build a record for a relation with both endpoints present.
    /// Returns `None` for relations missing either endpoint.
    pub fn for_relation(relation: &Relation, status: NoveltyStatus) -> Option<Self> {
        let (subject, object) = relation.endpoints()?;
        Some(Self {
            subject: subject.to_string(),
            predicate: relation
                .predicate
                .clone()
                .unwrap_or_else(|| DEFAULT_PREDICATE.to_string()),
            object: object.to_string(),
            relation_type: relation
                .relation_type
                .clone()
                .unwrap_or_else(|| DEFAULT_RELATION_TYPE.to_string()),
            sentiment: relation.sentiment.clone(),
            status,
            source: None,
        })
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_novel(&self) -> bool {
        self.status == NoveltyStatus::Novel
    }
}

/// First `SOURCE_SUMMARY_CHARS` characters of `text` followed by an ellipsis.
pub fn source_summary(text: &str) -> String {
    let head: String = text.chars().take(SOURCE_SUMMARY_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(subject: Option<&str>, object: Option<&str>, kind: Option<&str>) -> Relation {
        Relation {
            subject: subject.map(String::from),
            predicate: Some("CAUSES".to_string()),
            object: object.map(String::from),
            relation_type: kind.map(String::from),
            sentiment: None,
        }
    }

    #[test]
    fn extraction_parses_model_keys() {
        let json = r#"{
            "Entities": [{"text": "AG1", "type": "BRAND"}],
            "Relations": [{"Subject": "AG1", "Predicate": "CAUSES", "Object": "Bloating",
                           "Type": "Adverse Event", "Sentiment": "Negative"}],
            "User_Intent": "Asking whether bloating is normal",
            "Recommendation_Request": true
        }"#;
        let extraction: Extraction = serde_json::from_str(json).unwrap();
        assert_eq!(extraction.entities[0].entity_type.as_deref(), Some("BRAND"));
        assert_eq!(extraction.relations[0].object.as_deref(), Some("Bloating"));
        assert!(extraction.recommendation_request);
    }

    #[test]
    fn extraction_tolerates_missing_sections() {
        let extraction: Extraction = serde_json::from_str("{}").unwrap();
        assert!(extraction.relations.is_empty());
        assert!(!extraction.recommendation_request);
    }

    #[test]
    fn blank_object_is_not_verifiable() {
        let r = relation(Some("X"), Some(""), Some(ADVERSE_EVENT));
        assert!(r.endpoints().is_none());
        assert!(!r.is_verifiable_as(ADVERSE_EVENT));

        let r = relation(Some("X"), Some("   "), Some(ADVERSE_EVENT));
        assert!(!r.is_verifiable_as(ADVERSE_EVENT));
    }

    #[test]
    fn category_must_match_exactly() {
        let r = relation(Some("AG1"), Some("Nausea"), Some("Composition"));
        assert!(!r.is_verifiable_as(ADVERSE_EVENT));
        let r = relation(Some("AG1"), Some("Nausea"), Some(ADVERSE_EVENT));
        assert!(r.is_verifiable_as(ADVERSE_EVENT));
    }

    #[test]
    fn record_fills_defaults_for_missing_predicate_and_type() {
        let r = Relation {
            subject: Some("Creatine".into()),
            object: Some("Bloating".into()),
            ..Default::default()
        };
        let record = VerificationRecord::for_relation(&r, NoveltyStatus::Novel).unwrap();
        assert_eq!(record.predicate, DEFAULT_PREDICATE);
        assert_eq!(record.relation_type, DEFAULT_RELATION_TYPE);
        assert!(record.is_novel());
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&NoveltyStatus::Known).unwrap(), "\"KNOWN\"");
        assert_eq!(NoveltyStatus::Novel.to_string(), "NOVEL");
    }

    #[test]
    fn source_summary_counts_characters_not_bytes() {
        let text = "é".repeat(60);
        let summary = source_summary(&text);
        assert_eq!(summary.chars().count(), SOURCE_SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn post_date_and_text() {
        let post = Post {
            source: "supplements".into(),
            title: "AG1".into(),
            body: "made me bloated".into(),
            upvotes: 3,
            comments_count: 2,
            created_utc: 1_700_000_000,
            id: "abc".into(),
            url: None,
        };
        assert_eq!(post.text(), "AG1 made me bloated");
        assert_eq!(post.engagement(), 5);
        assert_eq!(post.date().unwrap().timestamp(), 1_700_000_000);
    }
}
