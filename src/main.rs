// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the results as a table or as JSON on stdout
// 5. Exit with proper code (0 = success, 2 = error)
//
// All the crawling and classifying lives in the library (src/lib.rs);
// this file only turns its results into something readable.
// =============================================================================

mod cli; // src/cli.rs - command-line parsing

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CrawlArgs, OutputArgs};
use linkscout::{ClassifiedReport, CrawlConfig, CrawlProgress, CrawlReport, Crawler, Taxonomy};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays parseable
fn init_logging(verbose: bool) {
    let default = if verbose { "linkscout=debug" } else { "linkscout=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
        Commands::Classify { urls, output } => handle_classify(&urls, &output),
    }
}

fn load_taxonomy(path: Option<&Path>) -> Result<Taxonomy> {
    match path {
        Some(path) => Taxonomy::load(path)
            .with_context(|| format!("could not load taxonomy from {}", path.display())),
        None => Ok(Taxonomy::default()),
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: CrawlArgs) -> Result<()> {
    let taxonomy = load_taxonomy(args.output.taxonomy.as_deref())?;

    let config = CrawlConfig::new(args.url.as_str())
        .with_max_depth(args.max_depth)
        .with_max_concurrent(args.max_concurrent)
        .with_document_pattern(args.document_pattern.as_str())
        .with_user_agent(args.user_agent.as_str())
        .with_request_timeout(Duration::from_secs(args.timeout_secs))
        .with_refetch_json(args.refetch_json);

    // Ctrl-C stops the crawl after the current wave; we still print what
    // was found
    let cancel = CancellationToken::new();
    let crawler = Crawler::new(&config)
        .context("cannot start crawl")?
        .with_cancellation(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after the current wave...");
            cancel.cancel();
        }
    });

    eprintln!("🔍 Crawling: {}", crawler.settings().seed);
    eprintln!("📊 Max depth: {} | Concurrency: {}", args.max_depth, args.max_concurrent);

    let report = crawler.run(&taxonomy, print_progress).await?;
    eprintln!();

    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

// Rewrites a single status line on stderr
fn print_progress(progress: CrawlProgress) {
    eprint!(
        "\r   Pages crawled: {} | Queue: {}    ",
        progress.visited, progress.queued
    );
    let _ = std::io::stderr().flush();
}

#[derive(Serialize)]
struct ClassifiedUrl<'a> {
    url: &'a str,
    label: &'a str,
}

// Handles the 'classify' subcommand
fn handle_classify(urls: &[String], output: &OutputArgs) -> Result<()> {
    let taxonomy = load_taxonomy(output.taxonomy.as_deref())?;

    let results: Vec<ClassifiedUrl> = urls
        .iter()
        .map(|url| ClassifiedUrl {
            url,
            label: taxonomy.classify(url).label(),
        })
        .collect();

    if output.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{:<70} {:<30}", "URL", "CATEGORY");
        println!("{}", "=".repeat(100));
        for result in &results {
            println!("{:<70} {:<30}", truncate(result.url, 67), result.label);
        }
    }
    Ok(())
}

// Prints the crawl report as human-readable sections
fn print_report(report: &CrawlReport) {
    println!("📊 Summary:");
    println!("   📄 Pages crawled: {}", report.pages_crawled);
    println!("   🔗 Total links: {}", report.all_links.len());
    println!("   📑 Document links: {}", report.document_links.len());
    println!("   🧩 JSON links: {}", report.json_links_count);
    if report.stats.failed_pages() > 0 {
        println!("   ⚠️  Pages that failed: {}", report.stats.failed_pages());
    }
    if report.stats.cancelled {
        println!("   ⏹️  Crawl was cancelled before finishing");
    }
    println!();

    print_section("All Links", &report.all_links);
    print_section("Document Links", &report.document_links);

    println!("🗂️  Pages Containing Documents ({})", report.pages_with_documents.len());
    for (page, documents) in &report.pages_with_documents {
        println!("   {} ({} documents)", page, documents.len());
        for document in documents {
            println!("     ↳ {}", document);
        }
    }
    println!();

    print_classified("Links by Category", &report.classified_links);
    print_classified("Documents by Category", &report.classified_documents);
}

fn print_section(title: &str, links: &[String]) {
    println!("{} ({})", title, links.len());
    println!("{}", "=".repeat(100));
    for link in links {
        println!("   {}", link);
    }
    println!();
}

fn print_classified(title: &str, classified: &ClassifiedReport) {
    println!("{} ({} links)", title, classified.url_count());
    println!("{}", "=".repeat(100));
    for (label, urls) in classified.iter() {
        println!("   {} ({})", label, urls.len());
        for url in urls {
            println!("     {}", truncate(url, 95));
        }
    }
    println!();
}

// Shortens long URLs for table display
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
