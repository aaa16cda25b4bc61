use super::http::{get_json, ApiError};
use crate::traits::EncyclopediaSource;
use crate::{ArticleSummary, ResolveError, SearchHit, SourceEndpoints};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

const BACKEND: &str = "wikipedia";

pub struct WikipediaClient {
    client: Arc<Client>,
    api_endpoint: String,
    rest_endpoint: String,
    user_agent: String,
}

impl WikipediaClient {
    pub fn new(endpoints: &SourceEndpoints) -> Self {
        Self::with_client(Arc::new(Client::new()), endpoints)
    }

    pub fn with_client(client: Arc<Client>, endpoints: &SourceEndpoints) -> Self {
        Self {
            client,
            api_endpoint: endpoints.wikipedia_api.clone(),
            rest_endpoint: endpoints.wikipedia_rest.clone(),
            user_agent: endpoints.user_agent.clone(),
        }
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url, ResolveError> {
        let limit = limit.to_string();
        Ok(Url::parse_with_params(
            &self.api_endpoint,
            &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ],
        )?)
    }

    fn summary_url(&self, title: &str) -> Result<Url, ResolveError> {
        let mut url = Url::parse(&self.rest_endpoint)?;
        let page = title.trim().replace(' ', "_");
        url.path_segments_mut()
            .map_err(|_| {
                ResolveError::parse_failure(BACKEND, "summary endpoint cannot be a base URL")
            })?
            .pop_if_empty()
            .extend(["page", "summary", page.as_str()]);
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchBlock>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchBlock {
    #[serde(default)]
    search: Vec<RawSearchHit>,
}

#[derive(Debug, Deserialize)]
struct RawSearchHit {
    title: String,
    #[serde(default)]
    pageid: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    source: Option<String>,
}

fn hits_from_response(response: SearchResponse) -> Result<Vec<SearchHit>, ResolveError> {
    if let Some(error) = response.error {
        return Err(error.into_resolve_error(BACKEND));
    }

    let block = response
        .query
        .ok_or_else(|| ResolveError::parse_failure(BACKEND, "search response has no query block"))?;

    Ok(block
        .search
        .into_iter()
        .filter(|hit| !hit.title.trim().is_empty())
        .map(|hit| SearchHit {
            title: hit.title,
            page_id: hit.pageid,
        })
        .collect())
}

fn summary_from_response(response: SummaryResponse, requested_title: &str) -> ArticleSummary {
    let non_blank = |value: Option<String>| {
        value
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    };

    ArticleSummary {
        title: non_blank(response.title).unwrap_or_else(|| requested_title.to_string()),
        extract_text: non_blank(response.extract),
        thumbnail_url: non_blank(response.thumbnail.and_then(|thumb| thumb.source)),
        is_disambiguation: response
            .kind
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("disambiguation")),
    }
}

#[async_trait]
impl EncyclopediaSource for WikipediaClient {
    async fn search_articles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, ResolveError> {
        let url = self.search_url(query, limit)?;
        let response: SearchResponse = get_json(&self.client, url, &self.user_agent, BACKEND).await?;
        hits_from_response(response)
    }

    async fn article_summary(&self, title: &str) -> Result<ArticleSummary, ResolveError> {
        let url = self.summary_url(title)?;
        let response: SummaryResponse =
            get_json(&self.client, url, &self.user_agent, BACKEND).await?;
        Ok(summary_from_response(response, title))
    }
}
