use crate::encyclopedia::choose_article;
use crate::knowledge::lookup_entity_facts;
use crate::population::extract_population;
use crate::traits::{EncyclopediaSource, KnowledgeSource};
use crate::{
    ArticleError, ArticleSummary, Candidate, EntityFacts, FailureReason, Resolution,
    ResolveStatus, ResolverOptions, RunToken,
};
use chrono::Utc;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing::{debug, info};

pub struct SpeciesResolver<E, K>
where
    E: EncyclopediaSource,
    K: KnowledgeSource,
{
    encyclopedia: E,
    knowledge: K,
    options: ResolverOptions,
    runs: AtomicU64,
}

impl<E, K> SpeciesResolver<E, K>
where
    E: EncyclopediaSource + Send + Sync,
    K: KnowledgeSource + Send + Sync,
{
    pub fn new(encyclopedia: E, knowledge: K) -> Self {
        Self::with_options(encyclopedia, knowledge, ResolverOptions::default())
    }

    pub fn with_options(encyclopedia: E, knowledge: K, options: ResolverOptions) -> Self {
        Self {
            encyclopedia,
            knowledge,
            options,
            runs: AtomicU64::new(0),
        }
    }

    pub fn is_latest(&self, token: RunToken) -> bool {
        self.runs.load(Ordering::SeqCst) == token.0
    }

    pub async fn resolve(&self, query: &str) -> Resolution {
        let run = RunToken(self.runs.fetch_add(1, Ordering::SeqCst) + 1);
        let query = query.trim();

        if query.is_empty() {
            return failed(run, query, FailureReason::EmptyQuery);
        }

        let chosen =
            match choose_article(&self.encyclopedia, query, self.options.summary_candidates).await
            {
                Ok(chosen) => chosen,
                Err(error) => {
                    let reason = failure_reason(&error);
                    info!(run = run.0, query, %error, "resolution failed");
                    return failed(run, query, reason);
                }
            };

        let summary = &chosen.summary;
        let text_population = extract_population(summary.extract_text.as_deref());
        debug!(run = run.0, title = %summary.title, ?text_population, "article chosen");

        // The summary title can be a redirect target; the page id stays the hit's.
        let knowledge =
            lookup_entity_facts(&self.knowledge, &summary.title, chosen.page_id, query).await;

        let candidate = merge_candidate(summary, text_population, &knowledge.facts);
        let status = if candidate.is_complete() {
            ResolveStatus::Complete
        } else {
            ResolveStatus::Partial
        };

        info!(run = run.0, query, title = %summary.title, ?status, "resolution finished");

        Resolution {
            run,
            query: query.to_string(),
            candidate,
            status,
            entity_id: knowledge.entity.as_ref().map(|(id, _)| id.clone()),
            entity_found_by: knowledge.entity.map(|(_, kind)| kind),
            resolved_at: Utc::now(),
        }
    }
}

fn failed(run: RunToken, query: &str, reason: FailureReason) -> Resolution {
    Resolution {
        run,
        query: query.to_string(),
        candidate: Candidate::default(),
        status: ResolveStatus::Failed(reason),
        entity_id: None,
        entity_found_by: None,
        resolved_at: Utc::now(),
    }
}

fn failure_reason(error: &ArticleError) -> FailureReason {
    match error {
        ArticleError::NoArticleFound => FailureReason::NoArticleFound,
        ArticleError::SearchUnavailable(_) => FailureReason::SearchUnavailable,
        ArticleError::SummaryUnavailable(_) => FailureReason::SummaryUnavailable,
    }
}

pub fn merge_candidate(
    summary: &ArticleSummary,
    text_population: Option<u64>,
    facts: &EntityFacts,
) -> Candidate {
    let scientific_name = facts.scientific_name.clone().or_else(|| {
        looks_like_binomial(&summary.title).then(|| summary.title.trim().to_string())
    });

    Candidate {
        scientific_name,
        common_name: Some(summary.title.clone()).filter(|title| !title.trim().is_empty()),
        description: summary.extract_text.clone(),
        image_url: summary.thumbnail_url.clone(),
        population: facts
            .population
            .or(text_population)
            .filter(|count| *count > 0),
    }
}

pub fn looks_like_binomial(title: &str) -> bool {
    static BINOMIAL: OnceLock<Option<Regex>> = OnceLock::new();
    BINOMIAL
        .get_or_init(|| Regex::new(r"^[A-Z][a-z]+ [a-z]+(?:-[a-z]+)*$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(title.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityId, LookupStepKind, ResolveError, SearchHit};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeEncyclopedia {
        search_down: bool,
        hits: Vec<SearchHit>,
        summaries: HashMap<String, ArticleSummary>,
        calls: AtomicUsize,
    }

    #[derive(Default)]
    struct FakeKnowledge {
        entity: Option<&'static str>,
        facts: EntityFacts,
        calls: Mutex<Vec<String>>,
    }

    impl FakeKnowledge {
        fn record(&self, call: String) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default()
        }
    }

    impl FakeEncyclopedia {
        fn article(mut self, title: &str, extract: Option<&str>, disambiguation: bool) -> Self {
            self.hits.push(SearchHit {
                title: title.to_string(),
                page_id: Some(1_000 + self.hits.len() as u64),
            });
            self.summaries.insert(
                title.to_string(),
                ArticleSummary {
                    title: title.to_string(),
                    extract_text: extract.map(str::to_string),
                    thumbnail_url: Some(format!("https://upload.example.org/{title}.jpg")),
                    is_disambiguation: disambiguation,
                },
            );
            self
        }

        fn redirect(mut self, hit_title: &str, target_title: &str, extract: &str) -> Self {
            self.hits.push(SearchHit {
                title: hit_title.to_string(),
                page_id: Some(1_000 + self.hits.len() as u64),
            });
            self.summaries.insert(
                hit_title.to_string(),
                ArticleSummary {
                    title: target_title.to_string(),
                    extract_text: Some(extract.to_string()),
                    thumbnail_url: None,
                    is_disambiguation: false,
                },
            );
            self
        }
    }

    #[async_trait]
    impl EncyclopediaSource for FakeEncyclopedia {
        async fn search_articles(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<SearchHit>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.search_down {
                return Err(ResolveError::unavailable("fake", "503 Service Unavailable"));
            }
            Ok(self.hits.iter().take(limit).cloned().collect())
        }

        async fn article_summary(&self, title: &str) -> Result<ArticleSummary, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.summaries
                .get(title)
                .cloned()
                .ok_or_else(|| ResolveError::unavailable("fake", "404 Not Found"))
        }
    }

    #[async_trait]
    impl KnowledgeSource for FakeKnowledge {
        async fn entity_by_page_id(&self, page_id: u64) -> Result<Option<EntityId>, ResolveError> {
            self.record(format!("page:{page_id}"));
            Ok(self.entity.and_then(EntityId::parse))
        }

        async fn entity_by_title(&self, title: &str) -> Result<Option<EntityId>, ResolveError> {
            self.record(format!("title:{title}"));
            Ok(None)
        }

        async fn search_entity(&self, text: &str) -> Result<Option<EntityId>, ResolveError> {
            self.record(format!("search:{text}"));
            Err(ResolveError::unavailable("fake", "timeout"))
        }

        async fn entity_facts(&self, _id: &EntityId) -> Result<EntityFacts, ResolveError> {
            Ok(self.facts.clone())
        }
    }

    const TIGER_TEXT: &str =
        "The tiger is the largest living cat species, with a population of about 9,000 individuals.";

    #[tokio::test]
    async fn zero_hits_is_total_failure_with_empty_candidate() {
        let resolver = SpeciesResolver::new(FakeEncyclopedia::default(), FakeKnowledge::default());
        let resolution = resolver.resolve("qwertyuiop").await;

        assert_eq!(
            resolution.status,
            ResolveStatus::Failed(FailureReason::NoArticleFound)
        );
        assert!(resolution.candidate.is_empty());
        assert_eq!(resolution.entity_id, None);
    }

    #[tokio::test]
    async fn unavailable_search_is_reported_distinctly() {
        let encyclopedia = FakeEncyclopedia {
            search_down: true,
            ..FakeEncyclopedia::default()
        };
        let resolver = SpeciesResolver::new(encyclopedia, FakeKnowledge::default());
        let resolution = resolver.resolve("tiger").await;

        assert_eq!(
            resolution.status,
            ResolveStatus::Failed(FailureReason::SearchUnavailable)
        );
        assert!(resolution.candidate.is_empty());
    }

    #[tokio::test]
    async fn blank_query_makes_no_outbound_calls() {
        let resolver = SpeciesResolver::new(FakeEncyclopedia::default(), FakeKnowledge::default());
        let resolution = resolver.resolve("   ").await;

        assert_eq!(resolution.status, ResolveStatus::Failed(FailureReason::EmptyQuery));
        assert_eq!(resolver.encyclopedia.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn structured_population_outranks_text_population() {
        let encyclopedia = FakeEncyclopedia::default().article("Tiger", Some(TIGER_TEXT), false);
        let knowledge = FakeKnowledge {
            entity: Some("Q19939"),
            facts: EntityFacts {
                scientific_name: Some("Panthera tigris".to_string()),
                population: Some(500),
            },
            ..FakeKnowledge::default()
        };
        let resolver = SpeciesResolver::new(encyclopedia, knowledge);
        let resolution = resolver.resolve("  tiger ").await;

        assert_eq!(resolution.query, "tiger");
        assert_eq!(resolution.status, ResolveStatus::Complete);
        assert_eq!(resolution.candidate.population, Some(500));
        assert_eq!(
            resolution.candidate.scientific_name.as_deref(),
            Some("Panthera tigris")
        );
        assert_eq!(resolution.candidate.common_name.as_deref(), Some("Tiger"));
        assert_eq!(resolution.candidate.description.as_deref(), Some(TIGER_TEXT));
        assert_eq!(resolution.entity_found_by, Some(LookupStepKind::PageReference));
    }

    #[tokio::test]
    async fn text_population_fills_in_without_structured_facts() {
        let encyclopedia = FakeEncyclopedia::default().article("Tiger", Some(TIGER_TEXT), false);
        let resolver = SpeciesResolver::new(encyclopedia, FakeKnowledge::default());
        let resolution = resolver.resolve("tiger").await;

        assert_eq!(resolution.status, ResolveStatus::Partial);
        assert_eq!(resolution.candidate.population, Some(9_000));
        assert_eq!(resolution.candidate.scientific_name, None);
        assert_eq!(resolution.entity_id, None);
    }

    #[tokio::test]
    async fn all_disambiguation_hits_fall_back_to_first_hit() {
        let mut encyclopedia = FakeEncyclopedia::default();
        for title in ["Mercury", "Mercury (a)", "Mercury (b)", "Mercury (c)", "Mercury (d)"] {
            encyclopedia = encyclopedia.article(title, Some("may refer to:"), true);
        }
        let resolver = SpeciesResolver::new(encyclopedia, FakeKnowledge::default());
        let resolution = resolver.resolve("mercury").await;

        assert!(resolution.status.is_success());
        assert_eq!(resolution.candidate.common_name.as_deref(), Some("Mercury"));
        assert_eq!(resolution.candidate.description.as_deref(), Some("may refer to:"));
    }

    #[tokio::test]
    async fn redirected_title_is_paired_with_the_hit_page_id() {
        let encyclopedia = FakeEncyclopedia::default().redirect(
            "Amur tiger",
            "Siberian tiger",
            "The Siberian tiger is a population of the tiger in Russia.",
        );
        let resolver = SpeciesResolver::new(encyclopedia, FakeKnowledge::default());
        let resolution = resolver.resolve("amur tiger").await;

        assert_eq!(
            resolution.candidate.common_name.as_deref(),
            Some("Siberian tiger")
        );
        assert_eq!(
            resolver.knowledge.calls(),
            vec![
                "page:1000",
                "title:Siberian tiger",
                "search:Siberian tiger",
                "search:amur tiger",
            ]
        );
    }

    #[tokio::test]
    async fn binomial_title_is_used_as_scientific_name_fallback() {
        let encyclopedia =
            FakeEncyclopedia::default().article("Panthera tigris", Some("A cat."), false);
        let resolver = SpeciesResolver::new(encyclopedia, FakeKnowledge::default());
        let resolution = resolver.resolve("panthera tigris").await;
        assert_eq!(
            resolution.candidate.scientific_name.as_deref(),
            Some("Panthera tigris")
        );

        let encyclopedia = FakeEncyclopedia::default().article("Bengal Tiger", None, false);
        let resolver = SpeciesResolver::new(encyclopedia, FakeKnowledge::default());
        let resolution = resolver.resolve("bengal tiger").await;
        assert_eq!(resolution.candidate.scientific_name, None);
        assert_eq!(resolution.candidate.description, None);
        assert_eq!(resolution.status, ResolveStatus::Partial);
    }

    #[tokio::test]
    async fn repeated_runs_are_identical_and_tokens_increase() {
        let encyclopedia = FakeEncyclopedia::default().article("Tiger", Some(TIGER_TEXT), false);
        let knowledge = FakeKnowledge {
            entity: Some("Q19939"),
            facts: EntityFacts {
                scientific_name: Some("Panthera tigris".to_string()),
                population: None,
            },
            ..FakeKnowledge::default()
        };
        let resolver = SpeciesResolver::new(encyclopedia, knowledge);

        let first = resolver.resolve("tiger").await;
        assert!(resolver.is_latest(first.run));

        let second = resolver.resolve("tiger").await;
        assert_eq!(first.candidate, second.candidate);
        assert!(second.run > first.run);
        assert!(!resolver.is_latest(first.run));
        assert!(resolver.is_latest(second.run));
    }

    #[test]
    fn binomial_shape_detection() {
        assert!(looks_like_binomial("Panthera tigris"));
        assert!(looks_like_binomial("Ursus arctos"));
        assert!(looks_like_binomial("Hyla chrysoscelis-versicolor"));
        assert!(!looks_like_binomial("Bengal Tiger"));
        assert!(!looks_like_binomial("Tiger"));
        assert!(!looks_like_binomial("Panthera tigris tigris"));
        assert!(!looks_like_binomial("panthera tigris"));
    }

    #[test]
    fn merge_keeps_fields_absent_when_sources_are_silent() {
        let summary = ArticleSummary {
            title: "Okapi".to_string(),
            ..ArticleSummary::default()
        };
        let candidate = merge_candidate(&summary, None, &EntityFacts::default());

        assert_eq!(
            candidate,
            Candidate {
                common_name: Some("Okapi".to_string()),
                ..Candidate::default()
            }
        );
    }
}
