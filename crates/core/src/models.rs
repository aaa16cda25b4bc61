use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub page_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ArticleSummary {
    pub title: String,
    pub extract_text: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_disambiguation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenArticle {
    pub summary: ArticleSummary,
    pub page_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))?;

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        Some(Self(format!("Q{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EntityFacts {
    pub scientific_name: Option<String>,
    pub population: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

impl Candidate {
    pub fn is_complete(&self) -> bool {
        self.scientific_name.is_some()
            && self.common_name.is_some()
            && self.description.is_some()
            && self.image_url.is_some()
            && self.population.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunToken(pub u64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FailureReason {
    EmptyQuery,
    NoArticleFound,
    SearchUnavailable,
    SummaryUnavailable,
}

impl FailureReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "enter a species name to search for",
            Self::NoArticleFound => "no article found for this name",
            Self::SearchUnavailable => "search is unavailable right now, try again later",
            Self::SummaryUnavailable => "article details could not be loaded, try again later",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResolveStatus {
    Complete,
    Partial,
    Failed(FailureReason),
}

impl ResolveStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LookupStepKind {
    PageReference,
    TitleReference,
    TitleSearch,
    QuerySearch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub run: RunToken,
    pub query: String,
    pub candidate: Candidate,
    pub status: ResolveStatus,
    pub entity_id: Option<EntityId>,
    pub entity_found_by: Option<LookupStepKind>,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub summary_candidates: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            summary_candidates: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_accepts_qid_shape_only() {
        assert_eq!(
            EntityId::parse(" Q19939 ").map(|id| id.to_string()),
            Some("Q19939".to_string())
        );
        assert_eq!(EntityId::parse("q42").map(|id| id.to_string()), Some("Q42".to_string()));
        assert!(EntityId::parse("Q").is_none());
        assert!(EntityId::parse("P225").is_none());
        assert!(EntityId::parse("Q12a").is_none());
        assert!(EntityId::parse("").is_none());
    }

    #[test]
    fn candidate_completeness_requires_all_fields() {
        let mut candidate = Candidate {
            scientific_name: Some("Panthera tigris".to_string()),
            common_name: Some("Tiger".to_string()),
            description: Some("Large cat".to_string()),
            image_url: Some("https://example.org/tiger.jpg".to_string()),
            population: Some(3_900),
        };
        assert!(candidate.is_complete());

        candidate.population = None;
        assert!(!candidate.is_complete());
        assert!(!candidate.is_empty());
        assert!(Candidate::default().is_empty());
    }

    #[test]
    fn absent_candidate_fields_are_not_serialized() {
        let candidate = Candidate {
            common_name: Some("Tiger".to_string()),
            ..Candidate::default()
        };
        let value = serde_json::to_value(&candidate).expect("candidate serializes");
        assert_eq!(value, serde_json::json!({ "common_name": "Tiger" }));
    }
}
