// ABOUTME: CLI binary for the morning-extract article extractor.
// ABOUTME: Extracts article fragments from URLs or a local HTML file and prints them as HTML, Markdown or text.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use morning_extract::formats::render;
use morning_extract::{Extractor, OutputFormat};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "morning-extract")]
#[command(about = "Extract the main article body from web pages")]
struct Args {
    /// Output format: html (default), markdown/md, text/txt
    #[arg(short = 'f', long = "format", default_value = "html")]
    format: String,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Emit a JSON array of {url, content, error} objects
    #[arg(long = "json")]
    json_output: bool,

    /// HTML file to extract from (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL the HTML file was fetched from (required with --html)
    #[arg(long = "url")]
    url: Option<String>,

    /// Keep images in the extracted fragment
    #[arg(long = "include-images")]
    include_images: bool,

    /// Maximum fragment length in characters
    #[arg(long = "max-length")]
    max_length: Option<usize>,

    /// Run the density-scoring pass before the selector tiers
    #[arg(long = "readability")]
    readability: bool,

    /// Extraction budget in seconds
    #[arg(long = "timeout", default_value_t = 15)]
    timeout: u64,

    /// Debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// URLs to extract (fetch mode)
    #[arg()]
    urls: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
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

struct Outcome {
    url: String,
    result: Result<String, String>,
}

fn format_output(outcomes: &[Outcome], format: OutputFormat, json_output: bool) -> String {
    if json_output {
        let items: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(content) => serde_json::json!({
                    "url": o.url,
                    "content": render(content, format),
                    "error": null,
                }),
                Err(e) => serde_json::json!({ "url": o.url, "content": null, "error": e }),
            })
            .collect();
        return serde_json::to_string_pretty(&items).unwrap_or_default();
    }

    outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .map(|content| render(content, format))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.html.is_some() && args.url.is_none() {
        eprintln!("error: --url is required when using --html");
        return ExitCode::from(1);
    }

    if args.html.is_none() && args.urls.is_empty() {
        eprintln!("error: at least one URL is required, or use --html with --url");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.urls.is_empty() {
        eprintln!("error: cannot use both --html and positional URLs");
        return ExitCode::from(1);
    }

    let format = OutputFormat::from(args.format.as_str());
    let mut builder = Extractor::builder()
        .include_images(args.include_images)
        .readability(args.readability)
        .extraction_timeout(Duration::from_secs(args.timeout));
    if let Some(max) = args.max_length {
        builder = builder.max_content_length(max);
    }
    let extractor = builder.build();

    let mut outcomes = Vec::new();

    match (&args.html, &args.url) {
        (Some(html_path), Some(url)) => {
            let result = match fs::read(html_path) {
                Ok(bytes) => extractor
                    .extract_html(url, bytes)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(format!("error reading file {:?}: {}", html_path, e)),
            };
            outcomes.push(Outcome {
                url: url.clone(),
                result,
            });
        }
        _ => {
            for url in &args.urls {
                let result = extractor
                    .fetch_and_extract(url)
                    .await
                    .map_err(|e| e.to_string());
                outcomes.push(Outcome {
                    url: url.clone(),
                    result,
                });
            }
        }
    }

    let mut had_error = false;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            eprintln!("error extracting {}: {}", outcome.url, e);
            had_error = true;
        }
    }

    let output = format_output(&outcomes, format, args.json_output);
    if !output.is_empty() {
        if let Some(path) = &args.output {
            if let Err(e) = fs::write(path, &output) {
                eprintln!("error writing output to {:?}: {}", path, e);
                return ExitCode::from(1);
            }
        } else {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", output);
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
