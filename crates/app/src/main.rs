use chrono::Utc;
use clap::{Parser, Subcommand};
use species_enrich_core::config::{
    DEFAULT_LANGUAGE, DEFAULT_USER_AGENT, DEFAULT_WIKIDATA_API, DEFAULT_WIKIPEDIA_API,
    DEFAULT_WIKIPEDIA_REST,
};
use species_enrich_core::stores::HttpClient;
use species_enrich_core::{
    extract_population, Candidate, Resolution, ResolveStatus, ResolverOptions, SourceEndpoints,
    SpeciesResolver, WikidataClient, WikipediaClient,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "species-enrich", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// MediaWiki Action API of the encyclopedia
    #[arg(long, env = "SPECIES_WIKIPEDIA_API", default_value = DEFAULT_WIKIPEDIA_API)]
    wikipedia_api: String,

    /// Encyclopedia REST base URL for page summaries
    #[arg(long, env = "SPECIES_WIKIPEDIA_REST", default_value = DEFAULT_WIKIPEDIA_REST)]
    wikipedia_rest: String,

    /// Structured-knowledge API
    #[arg(long, env = "SPECIES_WIKIDATA_API", default_value = DEFAULT_WIKIDATA_API)]
    wikidata_api: String,

    /// Language used for entity search
    #[arg(long, env = "SPECIES_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// User-Agent sent with every request
    #[arg(long, env = "SPECIES_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a species name into editable record defaults.
    Resolve {
        /// Free-text species name
        #[arg(long)]
        query: String,
        /// Number of top search hits inspected for a usable article.
        #[arg(long, default_value = "5")]
        candidates: usize,
        /// Print the resolution as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run only the population text parser over some prose.
    Population {
        /// Text to scan for a population figure
        #[arg(long)]
        text: String,
    },
}

impl Cli {
    fn endpoints(&self) -> SourceEndpoints {
        SourceEndpoints {
            wikipedia_api: self.wikipedia_api.clone(),
            wikipedia_rest: self.wikipedia_rest.clone(),
            wikidata_api: self.wikidata_api.clone(),
            language: self.language.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "species-enrich boot"
    );

    match &cli.command {
        Command::Resolve {
            query,
            candidates,
            json,
        } => {
            let endpoints = cli.endpoints();
            let client = Arc::new(HttpClient::new());
            let resolver = SpeciesResolver::with_options(
                WikipediaClient::with_client(Arc::clone(&client), &endpoints),
                WikidataClient::with_client(client, &endpoints),
                ResolverOptions {
                    summary_candidates: *candidates,
                },
            );

            let resolution = resolver.resolve(query).await;
            info!(run = resolution.run.0, status = ?resolution.status, "resolved");

            if *json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                print_resolution(&resolution);
            }

            if let ResolveStatus::Failed(reason) = resolution.status {
                anyhow::bail!("{reason}");
            }
        }
        Command::Population { text } => match extract_population(Some(text.as_str())) {
            Some(count) => println!("population: {count}"),
            None => println!("population: not found"),
        },
    }

    Ok(())
}

fn print_resolution(resolution: &Resolution) {
    println!("query: {}", resolution.query);
    match resolution.status {
        ResolveStatus::Failed(reason) => {
            println!("status: failed ({reason})");
            return;
        }
        ResolveStatus::Complete => println!("status: complete"),
        ResolveStatus::Partial => println!("status: partial, fill in the blanks manually"),
    }

    if let Some(id) = &resolution.entity_id {
        let found_by = resolution
            .entity_found_by
            .map(|kind| format!("{kind:?}"))
            .unwrap_or_default();
        println!("entity: {id} ({found_by})");
    }

    print_candidate(&resolution.candidate);
}

fn print_candidate(candidate: &Candidate) {
    let field = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    println!("scientific_name: {}", field(candidate.scientific_name.clone()));
    println!("common_name: {}", field(candidate.common_name.clone()));
    println!("population: {}", field(candidate.population.map(|count| count.to_string())));
    println!("image_url: {}", field(candidate.image_url.clone()));
    println!("description:\n{}", field(candidate.description.clone()));
}
