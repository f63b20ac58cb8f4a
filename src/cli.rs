// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Subcommands:
// - crawl: crawl a site, list its links/documents, classify them
// - classify: classify URLs given on the command line (taxonomy testing)
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use linkscout::config::{
    DEFAULT_DOCUMENT_PATTERN, DEFAULT_MAX_CONCURRENT, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "linkscout",
    version,
    about = "Crawl a website for document links and classify every link it finds",
    long_about = "linkscout crawls a website breadth-first, collects every link and every \
                  document link (PDFs by default), digs links out of JSON on investor and \
                  press pages, and sorts all of them into a keyword taxonomy."
)]
pub struct Cli {
    /// Show debug logs (same as RUST_LOG=linkscout=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and report its links
    ///
    /// Example: linkscout crawl example.com --max-depth 2
    Crawl(CrawlArgs),

    /// Classify URLs against the taxonomy without crawling
    ///
    /// Example: linkscout classify https://example.com/investors/annual-report-2023.pdf
    Classify {
        /// URLs to classify
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Website to crawl; https:// is assumed if no scheme is given
    pub url: String,

    /// Maximum crawl depth (1 = only the starting page)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// How many pages are fetched at once, per wave
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Case-insensitive regex that marks a link as a document
    #[arg(long, default_value = DEFAULT_DOCUMENT_PATTERN)]
    pub document_pattern: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Re-request investor/press pages as JSON to find more links
    #[arg(long)]
    pub refetch_json: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

// Options shared by both subcommands
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Load the taxonomy from a JSON file instead of the built-in one
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::parse_from(["linkscout", "crawl", "example.com"]);
        match cli.command {
            Commands::Crawl(args) => {
                assert_eq!(args.url, "example.com");
                assert_eq!(args.max_depth, DEFAULT_MAX_DEPTH);
                assert_eq!(args.max_concurrent, DEFAULT_MAX_CONCURRENT);
                assert_eq!(args.document_pattern, DEFAULT_DOCUMENT_PATTERN);
                assert!(!args.refetch_json);
                assert!(!args.output.json);
                assert!(args.output.taxonomy.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_classify_args() {
        let cli = Cli::parse_from([
            "linkscout",
            "classify",
            "--json",
            "--taxonomy",
            "rules.json",
            "https://example.com/a",
            "https://example.com/b",
        ]);
        match cli.command {
            Commands::Classify { urls, output } => {
                assert_eq!(urls.len(), 2);
                assert!(output.json);
                assert_eq!(output.taxonomy, Some(PathBuf::from("rules.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
