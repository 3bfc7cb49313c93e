//! paperbot - Entry Point
//!
//! `paperbot search --query "<text>"` searches every source, prints the
//! merged listing and saves each paper to a new Notion database.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paperbot::{
    Aggregator, Config, Pipeline,
    formatters::format_completion,
    llm::{GeminiClient, GeminiQueryAdapter, GeminiSummarizer},
    notion::{NotionClient, NotionWorkspace, database_title},
    sources::all_sources,
};

#[derive(Parser, Debug)]
#[command(name = "paperbot")]
#[command(about = "Search papers from multiple sources and save them to Notion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search all sources and save the results
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search query for papers
    #[arg(long)]
    query: String,

    /// Number of papers to fetch
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// Rewrite the query per source with Gemini first
    #[arg(long)]
    optimize_query: bool,

    /// Skip AI summaries
    #[arg(long)]
    no_summary: bool,

    /// Write into an existing data source instead of creating a database
    #[arg(long)]
    data_source: Option<String>,

    /// Language the summaries are written in
    #[arg(long)]
    summary_language: Option<String>,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

async fn search(mut config: Config, args: SearchArgs) -> anyhow::Result<()> {
    if let Some(language) = args.summary_language {
        config.summary_language = language;
    }

    let notion = NotionClient::new(&config)?;
    let (data_source_id, label) = match args.data_source {
        Some(id) => (id.clone(), id),
        None => {
            let title = database_title(&args.query, chrono::Local::now().date_naive());
            let id = notion
                .create_database(&config.notion_parent_id, &title)
                .await
                .context("Failed to create database")?;
            (id, title)
        }
    };

    let aggregator = Aggregator::new(all_sources(&config)?);
    let mut pipeline = Pipeline::new(aggregator, Box::new(NotionWorkspace::new(notion, data_source_id)));

    match GeminiClient::from_config(&config)? {
        Some(gemini) => {
            if args.optimize_query {
                let adapter = gemini.clone().with_model(config.gemini_query_model.clone(), None);
                pipeline = pipeline.with_query_adapter(Box::new(GeminiQueryAdapter::new(adapter)));
            }
            if !args.no_summary {
                pipeline = pipeline
                    .with_summarizer(Box::new(GeminiSummarizer::new(gemini, config.summary_language.clone())));
            }
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set; summaries and query adaptation are disabled");
        }
    }

    let report = pipeline.run(&args.query, args.limit).await;
    println!("\n{}", format_completion(report.saved.len(), report.failed.len(), &label));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting paperbot");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", e.hint());
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Search(args) => search(config, args).await,
    }
}
