use crate::{ArticleSummary, EntityFacts, EntityId, ResolveError, SearchHit};
use async_trait::async_trait;

#[async_trait]
pub trait EncyclopediaSource {
    async fn search_articles(&self, query: &str, limit: usize)
        -> Result<Vec<SearchHit>, ResolveError>;

    async fn article_summary(&self, title: &str) -> Result<ArticleSummary, ResolveError>;
}

// Ok(None): the call succeeded but found nothing.
#[async_trait]
pub trait KnowledgeSource {
    async fn entity_by_page_id(&self, page_id: u64) -> Result<Option<EntityId>, ResolveError>;

    async fn entity_by_title(&self, title: &str) -> Result<Option<EntityId>, ResolveError>;

    async fn search_entity(&self, text: &str) -> Result<Option<EntityId>, ResolveError>;

    async fn entity_facts(&self, id: &EntityId) -> Result<EntityFacts, ResolveError>;
}
