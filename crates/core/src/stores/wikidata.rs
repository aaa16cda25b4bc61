use super::http::{get_json, ApiError};
use crate::knowledge::{normalize_taxon_name, parse_population_amount};
use crate::traits::KnowledgeSource;
use crate::{EntityFacts, EntityId, ResolveError, SourceEndpoints};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

const BACKEND: &str = "wikidata";
const PAGE_PROPS_BACKEND: &str = "wikipedia-pageprops";

pub const TAXON_NAME_PROPERTY: &str = "P225";
pub const POPULATION_PROPERTY: &str = "P1082";

pub struct WikidataClient {
    client: Arc<Client>,
    wikipedia_api: String,
    wikidata_api: String,
    language: String,
    user_agent: String,
}

impl WikidataClient {
    pub fn new(endpoints: &SourceEndpoints) -> Self {
        Self::with_client(Arc::new(Client::new()), endpoints)
    }

    pub fn with_client(client: Arc<Client>, endpoints: &SourceEndpoints) -> Self {
        Self {
            client,
            wikipedia_api: endpoints.wikipedia_api.clone(),
            wikidata_api: endpoints.wikidata_api.clone(),
            language: endpoints.language.clone(),
            user_agent: endpoints.user_agent.clone(),
        }
    }

    fn page_props_url(&self, selector: (&str, &str)) -> Result<Url, ResolveError> {
        Ok(Url::parse_with_params(
            &self.wikipedia_api,
            &[
                ("action", "query"),
                ("prop", "pageprops"),
                ("ppprop", "wikibase_item"),
                ("redirects", "1"),
                selector,
                ("format", "json"),
                ("formatversion", "2"),
            ],
        )?)
    }

    fn search_url(&self, text: &str) -> Result<Url, ResolveError> {
        Ok(Url::parse_with_params(
            &self.wikidata_api,
            &[
                ("action", "wbsearchentities"),
                ("search", text),
                ("language", self.language.as_str()),
                ("uselang", self.language.as_str()),
                ("type", "item"),
                ("limit", "1"),
                ("format", "json"),
            ],
        )?)
    }

    fn entity_url(&self, id: &EntityId) -> Result<Url, ResolveError> {
        Ok(Url::parse_with_params(
            &self.wikidata_api,
            &[
                ("action", "wbgetentities"),
                ("ids", id.as_str()),
                ("props", "claims"),
                ("format", "json"),
            ],
        )?)
    }

    async fn entity_from_page_props(&self, url: Url) -> Result<Option<EntityId>, ResolveError> {
        let response: PagePropsResponse =
            get_json(&self.client, url, &self.user_agent, PAGE_PROPS_BACKEND).await?;
        entity_from_page_props(response)
    }
}

#[derive(Debug, Deserialize)]
struct PagePropsResponse {
    #[serde(default)]
    query: Option<PagesBlock>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct PagesBlock {
    #[serde(default)]
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    wikibase_item: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntitySearchResponse {
    #[serde(default)]
    search: Option<Vec<RawEntityHit>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct RawEntityHit {
    id: String,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: Option<HashMap<String, RawEntity>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntity {
    #[serde(default)]
    claims: HashMap<String, Vec<RawClaim>>,
}

#[derive(Debug, Deserialize)]
struct RawClaim {
    mainsnak: RawSnak,
    #[serde(default)]
    rank: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSnak {
    #[serde(default)]
    datavalue: Option<RawDataValue>,
}

#[derive(Debug, Deserialize)]
struct RawDataValue {
    value: Value,
}

impl RawClaim {
    fn rank_is(&self, rank: &str) -> bool {
        self.rank.as_deref() == Some(rank)
    }

    fn value(&self) -> Option<&Value> {
        self.mainsnak.datavalue.as_ref().map(|data| &data.value)
    }
}

fn entity_from_page_props(response: PagePropsResponse) -> Result<Option<EntityId>, ResolveError> {
    if let Some(error) = response.error {
        return Err(error.into_resolve_error(PAGE_PROPS_BACKEND));
    }

    let block = response.query.ok_or_else(|| {
        ResolveError::parse_failure(PAGE_PROPS_BACKEND, "pageprops response has no query block")
    })?;

    Ok(block
        .pages
        .into_iter()
        .filter(|page| !page.missing)
        .filter_map(|page| page.pageprops?.wikibase_item)
        .find_map(|item| EntityId::parse(&item)))
}

fn entity_from_search(response: EntitySearchResponse) -> Result<Option<EntityId>, ResolveError> {
    if let Some(error) = response.error {
        return Err(error.into_resolve_error(BACKEND));
    }

    let hits = response
        .search
        .ok_or_else(|| ResolveError::parse_failure(BACKEND, "search response has no results list"))?;

    Ok(hits.first().and_then(|hit| EntityId::parse(&hit.id)))
}

fn facts_from_entities(
    response: EntitiesResponse,
    id: &EntityId,
) -> Result<EntityFacts, ResolveError> {
    if let Some(error) = response.error {
        return Err(error.into_resolve_error(BACKEND));
    }

    let mut entities = response
        .entities
        .ok_or_else(|| ResolveError::parse_failure(BACKEND, "entity response has no entities"))?;

    let entity = entities.remove(id.as_str()).unwrap_or_default();
    Ok(facts_from_claims(&entity.claims))
}

fn facts_from_claims(claims: &HashMap<String, Vec<RawClaim>>) -> EntityFacts {
    EntityFacts {
        scientific_name: taxon_name(claims),
        population: population(claims),
    }
}

fn taxon_name(claims: &HashMap<String, Vec<RawClaim>>) -> Option<String> {
    claims
        .get(TAXON_NAME_PROPERTY)?
        .iter()
        .find_map(|claim| claim.value())
        .and_then(Value::as_str)
        .and_then(normalize_taxon_name)
}

fn population(claims: &HashMap<String, Vec<RawClaim>>) -> Option<u64> {
    let statements = claims.get(POPULATION_PROPERTY)?;
    let chosen = statements
        .iter()
        .find(|claim| claim.rank_is("preferred") && claim.value().is_some())
        .or_else(|| {
            statements
                .iter()
                .find(|claim| !claim.rank_is("deprecated") && claim.value().is_some())
        })?;

    let amount = chosen.value()?.get("amount")?;
    match amount {
        Value::String(text) => parse_population_amount(text),
        Value::Number(number) => parse_population_amount(&number.to_string()),
        _ => None,
    }
}

#[async_trait]
impl KnowledgeSource for WikidataClient {
    async fn entity_by_page_id(&self, page_id: u64) -> Result<Option<EntityId>, ResolveError> {
        let page_id = page_id.to_string();
        let url = self.page_props_url(("pageids", page_id.as_str()))?;
        self.entity_from_page_props(url).await
    }

    async fn entity_by_title(&self, title: &str) -> Result<Option<EntityId>, ResolveError> {
        let url = self.page_props_url(("titles", title))?;
        self.entity_from_page_props(url).await
    }

    async fn search_entity(&self, text: &str) -> Result<Option<EntityId>, ResolveError> {
        let url = self.search_url(text)?;
        let response: EntitySearchResponse =
            get_json(&self.client, url, &self.user_agent, BACKEND).await?;
        entity_from_search(response)
    }

    async fn entity_facts(&self, id: &EntityId) -> Result<EntityFacts, ResolveError> {
        let url = self.entity_url(id)?;
        let response: EntitiesResponse =
            get_json(&self.client, url, &self.user_agent, BACKEND).await?;
        facts_from_entities(response, id)
    }
}
