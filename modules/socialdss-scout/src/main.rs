use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reddit_client::{FetchPolicy, RateLimitedFetcher};
use socialdss_common::options::{
    parse_sources, DEFAULT_POSTS_PER_SOURCE, DEFAULT_TEXTS_TO_ANALYZE,
};
use socialdss_common::{CollectOptions, Config, TimeHorizon, VerifyOptions, ADVERSE_EVENT};
use socialdss_graph::{GraphClient, MatchPolicy, NoveltyVerifier};
use socialdss_scout::{
    dataset, pipeline, ConcurrentCollector, LlmClaimExtractor, MarketPulse, VerificationPipeline,
    VerificationReport,
};

#[derive(Parser)]
#[command(name = "socialdss", about = "Forum signal collection and claim novelty verification")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search many sources concurrently and save the posts as CSV
    Collect(CollectArgs),
    /// Extract claims from texts and check them against the knowledge graph
    Verify(VerifyArgs),
}

#[derive(Args)]
struct CollectArgs {
    /// Brand or category to search for
    #[arg(long)]
    query: String,
    /// Comma-separated source ids
    #[arg(long, default_value = "supplements,nutrition,frugal,gymsnark,biohackers")]
    sources: String,
    #[arg(long, default_value_t = DEFAULT_POSTS_PER_SOURCE)]
    limit: usize,
    /// 30, 60, 90 or all
    #[arg(long, default_value = "30")]
    horizon: TimeHorizon,
    #[arg(long, default_value = "new")]
    sort: String,
    #[arg(long, default_value = "reddit_data.csv")]
    out: PathBuf,
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "csv", "json"])))]
struct VerifyArgs {
    /// A single text to analyze
    #[arg(long)]
    text: Option<String>,
    /// CSV with title/body (or selftext) columns
    #[arg(long)]
    csv: Option<PathBuf>,
    /// JSON array of posts
    #[arg(long)]
    json: Option<PathBuf>,
    /// Maximum number of texts sent to the model
    #[arg(long, default_value_t = DEFAULT_TEXTS_TO_ANALYZE)]
    max: usize,
    #[arg(long, default_value = ADVERSE_EVENT)]
    relation_type: String,
    /// substring or typed
    #[arg(long, default_value = "substring")]
    policy: MatchPolicy,
    /// Write the full report as JSON
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    match cli.command {
        Command::Collect(args) => collect(args).await,
        Command::Verify(args) => verify(args).await,
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("socialdss=info".parse()?)
        .add_directive("reddit_client=info".parse()?);
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

async fn collect(args: CollectArgs) -> Result<()> {
    let options = CollectOptions {
        query: args.query,
        sources: parse_sources(&args.sources),
        limit_per_source: args.limit,
        horizon: args.horizon,
    };

    let fetcher =
        RateLimitedFetcher::http()?.with_policy(FetchPolicy::default().with_sort(args.sort));
    let collection = ConcurrentCollector::new(fetcher).run(&options).await?;

    println!("\n=== Sources ===");
    for summary in &collection.sources {
        println!("  r/{:<20} {:>4} posts  {}", summary.source, summary.count, summary.outcome);
    }

    if collection.all_failed() {
        bail!("every source failed; no data collected for '{}'", options.query);
    }
    let failed = collection.failed_sources().len();
    if failed > 0 {
        warn!(failed, kept = collection.posts.len(), "Some sources failed, keeping partial results");
    }

    let collection = collection.within(options.horizon, Utc::now());
    if collection.posts.is_empty() {
        println!("\nNo data found in the {}.", options.horizon);
        return Ok(());
    }

    print_pulse(&MarketPulse::from_posts(&collection.posts), options.horizon);

    dataset::save_posts(&args.out, &collection.posts)?;
    println!("\nSaved {} posts to {}", collection.posts.len(), args.out.display());
    Ok(())
}

fn print_pulse(pulse: &MarketPulse, horizon: TimeHorizon) {
    println!("\n=== Market Pulse ({horizon}) ===");
    println!("  Volume:                   {}", pulse.volume);
    println!("  Engagement:               {}", pulse.engagement);
    println!("  Potential adverse events: {}", pulse.potential_adverse_events);

    println!("\n  Daily volume:");
    for (day, count) in &pulse.daily_counts {
        println!("    {day}  {count}");
    }

    println!("\n  Top posts:");
    for post in &pulse.top_posts {
        println!("    [{:>5}] r/{} {}", post.upvotes, post.source, post.title);
    }
}

async fn verify(args: VerifyArgs) -> Result<()> {
    let texts = if let Some(text) = args.text {
        vec![text]
    } else if let Some(path) = &args.csv {
        dataset::load_texts_from_csv(path)?
    } else if let Some(path) = &args.json {
        dataset::load_texts_from_json(path)?
    } else {
        bail!("one of --text, --csv or --json is required");
    };

    let options = VerifyOptions {
        max_to_process: args.max,
        relation_type: args.relation_type,
    };
    pipeline::check_input(&texts, &options)?;

    let config = Config::from_env()?;
    config.log_redacted();

    let client =
        GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await?;
    client.verify_connectivity().await?;

    let verifier = NoveltyVerifier::new(Arc::new(client)).with_policy(args.policy);
    let extractor = LlmClaimExtractor::from_config(&config);
    let pipeline = VerificationPipeline::new(Arc::new(extractor), verifier);

    info!(texts = texts.len(), max = options.max_to_process, "Running verification");
    let report = pipeline.run(&texts, &options).await?;

    print_report(&report);

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
        println!("\nReport written to {}", out.display());
    }
    Ok(())
}

fn print_report(report: &VerificationReport) {
    println!("\n=== Verification ===");
    println!(
        "  {:<24} {:<18} {:<24} {:<8} SOURCE",
        "SUBJECT", "PREDICATE", "OBJECT", "STATUS"
    );
    for record in &report.records {
        println!(
            "  {:<24} {:<18} {:<24} {:<8} {}",
            record.subject,
            record.predicate,
            record.object,
            record.status.to_string(),
            record.source.as_deref().unwrap_or("")
        );
    }

    println!(
        "\n  processed {}  skipped {}  failed {}  verified {}  novel {}",
        report.processed(),
        report.skipped(),
        report.failed(),
        report.verified(),
        report.novel()
    );
}
