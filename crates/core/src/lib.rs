pub mod config;
pub mod encyclopedia;
pub mod error;
pub mod knowledge;
pub mod models;
pub mod orchestrator;
pub mod population;
pub mod stores;
pub mod traits;

pub use config::SourceEndpoints;
pub use encyclopedia::choose_article;
pub use error::{ArticleError, ResolveError};
pub use knowledge::{
    lookup_entity_facts, lookup_plan, parse_population_amount, resolve_entity, KnowledgeOutcome,
    LookupStep,
};
pub use models::{
    ArticleSummary, Candidate, ChosenArticle, EntityFacts, EntityId, FailureReason,
    LookupStepKind, Resolution, ResolveStatus, ResolverOptions, RunToken, SearchHit,
};
pub use orchestrator::{looks_like_binomial, merge_candidate, SpeciesResolver};
pub use population::extract_population;
pub use stores::{WikidataClient, WikipediaClient};
pub use traits::{EncyclopediaSource, KnowledgeSource};
