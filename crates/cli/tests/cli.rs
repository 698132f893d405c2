// ABOUTME: End-to-end tests for the morning binary against a mocked feed server.
// ABOUTME: Checks the written paper file, the JSON format, the output override and the empty-paper failure.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use morning_feed::{AppConfig, FeedConfig};
use predicates::prelude::*;
use tempfile::TempDir;

fn long_summary(topic: &str) -> String {
    format!(
        "{} {}",
        topic,
        "A summary long enough to pass the minimum length filter on its own. ".repeat(4)
    )
}

fn serve_feed(server: &MockServer) {
    let items: String = [
        ("Older story", "/older", "Mon, 01 Jan 2024 08:00:00 +0000", "Older"),
        ("Newer story", "/newer", "Tue, 02 Jan 2024 08:00:00 +0000", "Newer"),
    ]
    .iter()
    .map(|(title, path, date, topic)| {
        format!(
            "<item><title>{}</title><link>{}</link><pubDate>{}</pubDate>\
             <description>{}</description></item>",
            title,
            server.url(*path),
            date,
            long_summary(topic)
        )
    })
    .collect();
    let body = format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Wire</title>{}</channel></rss>"#,
        items
    );
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200).body(body);
    });
}

fn write_config(dir: &Path, feed_url: String) -> std::path::PathBuf {
    let mut config = AppConfig {
        rss_feeds: vec![FeedConfig {
            name: "Wire Service".to_string(),
            url: feed_url,
            max_articles: 5,
        }],
        output_directory: dir.join("papers").display().to_string(),
        newspaper_title: "Test Gazette".to_string(),
        columns: 2,
        extract_full_content: false,
        ..AppConfig::default()
    };
    config.hacker_news.include = false;

    let path = dir.join("config.json");
    config.save(&path).unwrap();
    path
}

#[test]
fn writes_html_paper() {
    let server = MockServer::start();
    serve_feed(&server);
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), server.url("/feed.xml"));

    Command::cargo_bin("morning")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .args(["--date", "2024-03-09"])
        .assert()
        .success()
        .stdout(predicate::str::contains("morning_paper_2024-03-09.html"));

    let html = fs::read_to_string(tmp.path().join("papers/morning_paper_2024-03-09.html")).unwrap();
    assert!(html.contains("<h1>Test Gazette</h1>"));
    assert!(html.contains("Saturday, March 09, 2024"));
    assert!(html.contains("<h2>Wire Service</h2>"));
    assert!(html.contains("column-count: 2;"));

    let newer = html.find("Newer story").unwrap();
    let older = html.find("Older story").unwrap();
    assert!(newer < older);
}

#[test]
fn json_format_and_output_override() {
    let server = MockServer::start();
    serve_feed(&server);
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), server.url("/feed.xml"));
    let out_dir = tmp.path().join("elsewhere");

    Command::cargo_bin("morning")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(&out_dir)
        .args(["--format", "json", "--date", "2024-03-09"])
        .assert()
        .success();

    let raw = fs::read_to_string(out_dir.join("morning_paper_2024-03-09.json")).unwrap();
    let paper: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(paper["title"], "Test Gazette");
    assert_eq!(paper["sections"][0]["source"], "Wire Service");
    assert_eq!(paper["sections"][0]["articles"][0]["title"], "Newer story");
    assert!(paper["sections"][0]["articles"][0]["content"]
        .as_str()
        .unwrap()
        .starts_with("<p>Newer "));
    assert!(!tmp.path().join("papers").exists());
}

#[test]
fn fails_when_nothing_survives() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(503);
    });
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), server.url("/feed.xml"));

    Command::cargo_bin("morning")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no articles"));
}

#[test]
fn rejects_unknown_format() {
    Command::cargo_bin("morning")
        .unwrap()
        .args(["--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
