pub const DEFAULT_WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_WIKIPEDIA_REST: &str = "https://en.wikipedia.org/api/rest_v1";
pub const DEFAULT_WIKIDATA_API: &str = "https://www.wikidata.org/w/api.php";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_USER_AGENT: &str = concat!(
    "species-enrich/",
    env!("CARGO_PKG_VERSION"),
    " (https://crates.io/crates/species-enrich-core)"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoints {
    pub wikipedia_api: String,
    pub wikipedia_rest: String,
    pub wikidata_api: String,
    pub language: String,
    pub user_agent: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            wikipedia_api: DEFAULT_WIKIPEDIA_API.to_string(),
            wikipedia_rest: DEFAULT_WIKIPEDIA_REST.to_string(),
            wikidata_api: DEFAULT_WIKIDATA_API.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
