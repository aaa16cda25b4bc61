use crate::traits::KnowledgeSource;
use crate::{EntityFacts, EntityId, LookupStepKind, ResolveError};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStep {
    PageReference(u64),
    TitleReference(String),
    TitleSearch(String),
    QuerySearch(String),
}

impl LookupStep {
    pub fn kind(&self) -> LookupStepKind {
        match self {
            Self::PageReference(_) => LookupStepKind::PageReference,
            Self::TitleReference(_) => LookupStepKind::TitleReference,
            Self::TitleSearch(_) => LookupStepKind::TitleSearch,
            Self::QuerySearch(_) => LookupStepKind::QuerySearch,
        }
    }

    async fn run<S>(&self, source: &S) -> Result<Option<EntityId>, ResolveError>
    where
        S: KnowledgeSource + Sync + ?Sized,
    {
        match self {
            Self::PageReference(page_id) => source.entity_by_page_id(*page_id).await,
            Self::TitleReference(title) => source.entity_by_title(title).await,
            Self::TitleSearch(text) | Self::QuerySearch(text) => source.search_entity(text).await,
        }
    }
}

pub fn lookup_plan(title: &str, page_id: Option<u64>, query: &str) -> Vec<LookupStep> {
    let title = title.trim();
    let query = query.trim();
    let mut steps = Vec::with_capacity(4);

    if let Some(page_id) = page_id {
        steps.push(LookupStep::PageReference(page_id));
    }
    if !title.is_empty() {
        steps.push(LookupStep::TitleReference(title.to_string()));
        steps.push(LookupStep::TitleSearch(title.to_string()));
    }
    if !query.is_empty() && query != title {
        steps.push(LookupStep::QuerySearch(query.to_string()));
    }

    steps
}

// Failed calls count as nothing found.
pub async fn resolve_entity<S>(
    source: &S,
    steps: &[LookupStep],
) -> Option<(EntityId, LookupStepKind)>
where
    S: KnowledgeSource + Sync + ?Sized,
{
    for step in steps {
        match step.run(source).await {
            Ok(Some(id)) => {
                debug!(step = ?step.kind(), entity = %id, "entity lookup hit");
                return Some((id, step.kind()));
            }
            Ok(None) => debug!(step = ?step.kind(), "entity lookup miss"),
            Err(error) => warn!(step = ?step.kind(), %error, "entity lookup failed"),
        }
    }

    None
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KnowledgeOutcome {
    pub entity: Option<(EntityId, LookupStepKind)>,
    pub facts: EntityFacts,
}

pub async fn lookup_entity_facts<S>(
    source: &S,
    title: &str,
    page_id: Option<u64>,
    query: &str,
) -> KnowledgeOutcome
where
    S: KnowledgeSource + Sync + ?Sized,
{
    let plan = lookup_plan(title, page_id, query);
    let Some((id, kind)) = resolve_entity(source, &plan).await else {
        debug!(title, "no structured entity for article");
        return KnowledgeOutcome::default();
    };

    let facts = match source.entity_facts(&id).await {
        Ok(facts) => EntityFacts {
            scientific_name: facts.scientific_name.and_then(|name| normalize_taxon_name(&name)),
            population: facts.population.filter(|count| *count > 0),
        },
        Err(error) => {
            warn!(entity = %id, %error, "entity facts unavailable");
            EntityFacts::default()
        }
    };

    KnowledgeOutcome {
        entity: Some((id, kind)),
        facts,
    }
}

pub fn normalize_taxon_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_population_amount(amount: &str) -> Option<u64> {
    let trimmed = amount.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let value: f64 = unsigned.parse().ok()?;

    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let rounded = value.round();
    if rounded <= 0.0 || rounded >= u64::MAX as f64 {
        return None;
    }

    Some(rounded as u64)
}
