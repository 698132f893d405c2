// ABOUTME: The morning binary: loads config, gathers articles from feeds and Hacker News, writes the paper.
// ABOUTME: Articles are filtered and sorted, grouped by source, then rendered as HTML, Markdown or JSON.

mod render;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use morning_extract::ExtractorBuilder;
use morning_feed::{assemble, filter_and_sort, AppConfig, HackerNewsFetcher, RssFetcher};
use tracing::{info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use crate::render::{file_name, render, PaperFormat};

/// Build a morning paper from RSS feeds and Hacker News.
#[derive(Parser, Debug)]
#[command(name = "morning")]
#[command(about = "Fetch, extract and assemble a morning paper", long_about = None)]
struct Args {
    /// Configuration file; created with defaults when missing.
    #[arg(short = 'c', long, default_value = morning_feed::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write the paper here instead of the configured output_directory.
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = PaperFormat::Html)]
    format: PaperFormat,

    /// Edition date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Skip Hacker News regardless of configuration.
    #[arg(long, default_value_t = false)]
    no_hacker_news: bool,

    /// Debug logging on stderr.
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

fn load_config(path: &Path) -> AppConfig {
    match AppConfig::load_or_create(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid configuration, using defaults");
            AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(&args.config);
    if args.no_hacker_news {
        config.hacker_news.include = false;
    }

    let extractor = ExtractorBuilder::from_config(config.extraction()).build();

    let mut articles = RssFetcher::new(&config, extractor.clone())
        .fetch_articles()
        .await;
    articles.extend(
        HackerNewsFetcher::new(&config, extractor)
            .fetch_articles()
            .await,
    );
    info!(count = articles.len(), "collected articles");

    let articles = filter_and_sort(articles, &config.filter_rules());
    if articles.is_empty() {
        bail!("no articles to generate a paper from");
    }

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let paper = assemble(config.newspaper_title.clone(), date, articles);
    let body = render(&paper, args.format, config.columns)?;

    let dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.output_directory));
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(file_name(date, args.format));
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), articles = paper.article_count(), "paper written");
    println!("{}", path.display());
    Ok(())
}
