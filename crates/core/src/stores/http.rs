use crate::ResolveError;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

impl ApiError {
    pub(crate) fn into_resolve_error(self, backend: &str) -> ResolveError {
        let details = match (self.code, self.info) {
            (Some(code), Some(info)) => format!("{code}: {info}"),
            (Some(code), None) => code,
            (None, Some(info)) => info,
            (None, None) => "unspecified api error".to_string(),
        };
        ResolveError::unavailable(backend, details)
    }
}

pub(crate) async fn get_json<T>(
    client: &Client,
    url: Url,
    user_agent: &str,
    backend: &str,
) -> Result<T, ResolveError>
where
    T: DeserializeOwned,
{
    debug!(backend, url = %url, "outbound request");

    let response = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|error| ResolveError::unavailable(backend, error.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ResolveError::unavailable(backend, status.to_string()));
    }

    let body = response.text().await?;
    decode(&body, backend)
}

pub(crate) fn decode<T>(body: &str, backend: &str) -> Result<T, ResolveError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|error| ResolveError::parse_failure(backend, error.to_string()))
}
