use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{backend} is unavailable: {details}")]
    SourceUnavailable { backend: String, details: String },

    #[error("invalid response from {backend}: {details}")]
    ParseFailure { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl ResolveError {
    pub fn unavailable(backend: &str, details: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            backend: backend.to_string(),
            details: details.into(),
        }
    }

    pub fn parse_failure(backend: &str, details: impl Into<String>) -> Self {
        Self::ParseFailure {
            backend: backend.to_string(),
            details: details.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::Http(_))
    }
}

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("no article found")]
    NoArticleFound,

    #[error("search unavailable: {0}")]
    SearchUnavailable(#[source] ResolveError),

    #[error("summary unavailable: {0}")]
    SummaryUnavailable(#[source] ResolveError),
}
