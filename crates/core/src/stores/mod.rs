mod http;
pub mod wikidata;
pub mod wikipedia;

pub use wikidata::WikidataClient;
pub use wikipedia::WikipediaClient;

pub use reqwest::Client as HttpClient;
