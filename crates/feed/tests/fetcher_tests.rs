// ABOUTME: Integration tests for the RSS and Hacker News fetchers against httpmock servers.
// ABOUTME: Covers summary fallbacks, invalid links, failing feeds, self-post rules and extraction markers.

use std::time::Duration;

use httpmock::prelude::*;
use morning_extract::Extractor;
use morning_feed::{
    AppConfig, ApiEndpoints, FeedConfig, HackerNewsConfig, HackerNewsFetcher, RssFetcher,
};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"<html><body>
    <nav>Menu</nav>
    <article><p>The full story body, fetched from the article page.</p></article>
</body></html>"#;

fn rss(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, summary)| {
            format!(
                "<item><title>{}</title><link>{}</link><description>{}</description>\
                 <pubDate>Mon, 15 Jan 2024 10:00:00 +0000</pubDate></item>",
                title, link, summary
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Feed</title>{}</channel></rss>"#,
        body
    )
}

fn feed(name: &str, url: String, max_articles: usize) -> FeedConfig {
    FeedConfig {
        name: name.to_string(),
        url,
        max_articles,
    }
}

fn hn_config(server: &MockServer, only_self_posts: bool, max_articles: usize) -> HackerNewsConfig {
    HackerNewsConfig {
        include: true,
        max_articles,
        only_self_posts,
        api_endpoints: ApiEndpoints {
            top_stories: server.url("/topstories.json"),
            item: server.url("/item/{}.json"),
            discussion_url: server.url("/discuss/{}"),
        },
    }
}

fn mock_item(server: &MockServer, id: u64, json: &str) {
    let path = format!("/item/{}.json", id);
    let json = json.to_string();
    server.mock(move |when, then| {
        when.method(GET).path(path);
        then.status(200)
            .header("content-type", "application/json")
            .body(json);
    });
}

#[tokio::test]
async fn rss_without_extraction_wraps_summaries() {
    let server = MockServer::start();
    let link1 = server.url("/a1");
    let link3 = server.url("/a3");
    let body = rss(&[
        ("One", link1.as_str(), "First summary"),
        ("Two", "not-a-link", "Second summary"),
        ("Three", link3.as_str(), "Third summary"),
        ("Four", server.url("/a4").as_str(), "Fourth summary"),
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(body);
    });

    let config = AppConfig {
        rss_feeds: vec![feed("Example", server.url("/feed.xml"), 3)],
        extract_full_content: false,
        ..AppConfig::default()
    };
    let fetcher = RssFetcher::new(&config, Extractor::builder().build()).with_pause(Duration::ZERO);
    let articles = fetcher.fetch_articles().await;

    let got: Vec<(&str, &str, &str)> = articles
        .iter()
        .map(|a| (a.title.as_str(), a.source.as_str(), a.content.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("One", "Example", "<p>First summary</p>"),
            ("Three", "Example", "<p>Third summary</p>"),
        ]
    );
}

#[tokio::test]
async fn rss_extraction_uses_page_or_falls_back() {
    let server = MockServer::start();
    let good = server.url("/good");
    let broken = server.url("/broken");
    let body = rss(&[
        ("Good", good.as_str(), "Good summary"),
        ("Broken", broken.as_str(), "Broken summary"),
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200).body(body);
    });
    server.mock(|when, then| {
        when.method(GET).path("/good");
        then.status(200)
            .header("content-type", "text/html")
            .body(PAGE);
    });
    server.mock(|when, then| {
        when.method(GET).path("/broken");
        then.status(404);
    });

    let config = AppConfig {
        rss_feeds: vec![feed("Example", server.url("/feed.xml"), 5)],
        ..AppConfig::default()
    };
    let fetcher = RssFetcher::new(&config, Extractor::builder().build()).with_pause(Duration::ZERO);
    let articles = fetcher.fetch_articles().await;

    assert_eq!(articles.len(), 2);
    assert!(articles[0].content.contains("The full story body"));
    assert!(!articles[0].content.contains("Menu"));
    assert_eq!(articles[1].content, "<p>Broken summary</p>");
}

#[tokio::test]
async fn failing_feed_is_skipped() {
    let server = MockServer::start();
    let link = server.url("/a");
    let body = rss(&[("Kept", link.as_str(), "Summary")]);
    server.mock(|when, then| {
        when.method(GET).path("/down.xml");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/garbage.xml");
        then.status(200).body("definitely not xml");
    });
    server.mock(|when, then| {
        when.method(GET).path("/up.xml");
        then.status(200).body(body);
    });

    let config = AppConfig {
        rss_feeds: vec![
            feed("Down", server.url("/down.xml"), 5),
            feed("Garbage", server.url("/garbage.xml"), 5),
            feed("Up", server.url("/up.xml"), 5),
        ],
        extract_full_content: false,
        ..AppConfig::default()
    };
    let fetcher = RssFetcher::new(&config, Extractor::builder().build()).with_pause(Duration::ZERO);
    let articles = fetcher.fetch_articles().await;

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].source, "Up");
}

#[tokio::test]
async fn feed_served_with_non_authoritative_status_is_read() {
    let server = MockServer::start();
    let link = server.url("/a");
    let body = rss(&[("Cached", link.as_str(), "Cached summary")]);
    server.mock(|when, then| {
        when.method(GET).path("/cached.xml");
        then.status(203).body(body);
    });

    let config = AppConfig {
        rss_feeds: vec![feed("Proxy", server.url("/cached.xml"), 5)],
        extract_full_content: false,
        ..AppConfig::default()
    };
    let fetcher = RssFetcher::new(&config, Extractor::builder().build()).with_pause(Duration::ZERO);
    let articles = fetcher.fetch_articles().await;

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].content, "<p>Cached summary</p>");
}

#[tokio::test]
async fn failed_extraction_still_pauses() {
    let server = MockServer::start();
    let first = server.url("/gone1");
    let second = server.url("/gone2");
    let body = rss(&[
        ("First", first.as_str(), "First summary"),
        ("Second", second.as_str(), "Second summary"),
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200).body(body);
    });
    for path in ["/gone1", "/gone2"] {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(410);
        });
    }

    let config = AppConfig {
        rss_feeds: vec![feed("Example", server.url("/feed.xml"), 5)],
        ..AppConfig::default()
    };
    let fetcher = RssFetcher::new(&config, Extractor::builder().build())
        .with_pause(Duration::from_millis(150));
    let started = std::time::Instant::now();
    let articles = fetcher.fetch_articles().await;

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[1].content, "<p>Second summary</p>");
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn hacker_news_self_posts() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/topstories.json");
        then.status(200).body("[1, 2, 3]");
    });
    mock_item(
        &server,
        1,
        r#"{"id": 1, "title": "Ask HN: Favorite tools?", "text": "<p>Tell me <script>x()</script>about it</p>",
            "score": 42, "descendants": 7, "time": 1704067200}"#,
    );
    mock_item(
        &server,
        2,
        r#"{"id": 2, "title": "A link elsewhere", "url": "https://example.com/story", "score": 1, "time": 1704067200}"#,
    );
    mock_item(
        &server,
        3,
        r#"{"id": 3, "title": "Untitled musings", "score": 5, "descendants": 0, "time": 1704067200}"#,
    );
    let discussion = server.mock(|when, then| {
        when.method(GET).path("/discuss/3");
        then.status(500);
    });

    let config = AppConfig {
        hacker_news: hn_config(&server, true, 5),
        ..AppConfig::default()
    };
    let fetcher =
        HackerNewsFetcher::new(&config, Extractor::builder().build()).with_pause(Duration::ZERO);
    let articles = fetcher.fetch_articles().await;

    assert_eq!(articles.len(), 2);

    let ask = &articles[0];
    assert_eq!(ask.title, "Ask HN: Favorite tools?");
    assert_eq!(ask.source, "Hacker News");
    assert_eq!(ask.link, server.url("/discuss/1"));
    assert_eq!(ask.published, "2024-01-01 00:00:00");
    assert_eq!(ask.summary, "Points: 42 | Comments: 7");
    assert!(ask.content.starts_with("<div class='hn-text'>"));
    assert!(ask.content.contains("about it"));
    assert!(!ask.content.contains("script"));

    let musing = &articles[1];
    assert_eq!(
        musing.content,
        "<p>Points: 5 | Comments: 0</p><p><em>Content extraction failed</em></p>"
    );
    discussion.assert();
}

#[tokio::test]
async fn hacker_news_link_posts_mark_timeouts() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/topstories.json");
        then.status(200).body("[10]");
    });
    let slow_url = server.url("/slow-story");
    mock_item(
        &server,
        10,
        &format!(
            r#"{{"id": 10, "title": "Slow site", "url": "{}", "score": 3, "descendants": 2, "time": 0}}"#,
            slow_url
        ),
    );
    server.mock(|when, then| {
        when.method(GET).path("/slow-story");
        then.status(200).delay(Duration::from_secs(2)).body(PAGE);
    });

    let config = AppConfig {
        hacker_news: hn_config(&server, false, 5),
        ..AppConfig::default()
    };
    let extractor = Extractor::builder()
        .request_timeout(Duration::from_millis(200))
        .build();
    let fetcher = HackerNewsFetcher::new(&config, extractor).with_pause(Duration::ZERO);
    let articles = fetcher.fetch_articles().await;

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].link, slow_url);
    assert_eq!(articles[0].published, "1970-01-01 00:00:00");
    assert_eq!(
        articles[0].content,
        "<p>Points: 3 | Comments: 2</p><p><em>Content extraction timed out</em></p>"
    );
}

#[tokio::test]
async fn hacker_news_is_capped_at_ten() {
    let server = MockServer::start();
    let ids: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
    let list = format!("[{}]", ids.join(","));
    server.mock(|when, then| {
        when.method(GET).path("/topstories.json");
        then.status(200).body(list);
    });
    for id in 1..=12u64 {
        mock_item(
            &server,
            id,
            &format!(r#"{{"id": {}, "title": "Ask HN: {}", "text": "body {}"}}"#, id, id, id),
        );
    }

    let config = AppConfig {
        hacker_news: hn_config(&server, true, 20),
        ..AppConfig::default()
    };
    let fetcher =
        HackerNewsFetcher::new(&config, Extractor::builder().build()).with_pause(Duration::ZERO);
    assert_eq!(fetcher.fetch_articles().await.len(), 10);
}

#[tokio::test]
async fn hacker_news_bad_top_list_yields_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/topstories.json");
        then.status(200).body(r#"{"not": "a list"}"#);
    });

    let config = AppConfig {
        hacker_news: hn_config(&server, true, 5),
        ..AppConfig::default()
    };
    let fetcher =
        HackerNewsFetcher::new(&config, Extractor::builder().build()).with_pause(Duration::ZERO);
    assert!(fetcher.fetch_articles().await.is_empty());

    let disabled = AppConfig {
        hacker_news: HackerNewsConfig {
            include: false,
            ..hn_config(&server, true, 5)
        },
        ..AppConfig::default()
    };
    let fetcher =
        HackerNewsFetcher::new(&disabled, Extractor::builder().build()).with_pause(Duration::ZERO);
    assert!(fetcher.fetch_articles().await.is_empty());
}
