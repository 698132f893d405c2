// ABOUTME: Renders an assembled Paper as a standalone HTML page, Markdown or JSON.
// ABOUTME: Article bodies pass through the HTML sanitizer; titles, sources and links are escaped.

use std::fmt::Write as _;

use chrono::NaiveDate;
use morning_extract::formats::{html_to_markdown, sanitize_html};
use morning_feed::{Article, Paper};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PaperFormat {
    Html,
    Markdown,
    Json,
}

impl PaperFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PaperFormat::Html => "html",
            PaperFormat::Markdown => "md",
            PaperFormat::Json => "json",
        }
    }
}

pub fn file_name(date: NaiveDate, format: PaperFormat) -> String {
    format!("morning_paper_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

pub fn heading_date(date: NaiveDate) -> String {
    date.format("%A, %B %d, %Y").to_string()
}

pub fn render(paper: &Paper, format: PaperFormat, columns: u8) -> anyhow::Result<String> {
    Ok(match format {
        PaperFormat::Html => render_html(paper, columns),
        PaperFormat::Markdown => render_markdown(paper),
        PaperFormat::Json => serde_json::to_string_pretty(paper)?,
    })
}

const STYLE: &str = r#"
body { font-family: Georgia, "Times New Roman", serif; max-width: 60em; margin: 2em auto; padding: 0 1em; color: #111; }
header.masthead { text-align: center; border-bottom: 3px double #111; margin-bottom: 1.5em; }
header.masthead h1 { font-size: 3em; margin: 0.2em 0; }
.date { font-style: italic; }
section.source { margin-bottom: 2em; }
section.source > h2 { border-bottom: 1px solid #999; text-transform: uppercase; letter-spacing: 0.05em; }
.articles { column-gap: 2em; }
article { break-inside: avoid-column; margin-bottom: 1.5em; }
article h3 { margin-bottom: 0.2em; }
.meta { color: #555; font-size: 0.85em; }
.hn-text { white-space: normal; }
img { max-width: 100%; height: auto; }
"#;

pub fn render_html(paper: &Paper, columns: u8) -> String {
    let mut out = String::new();
    let title = escape(&paper.title);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}.articles {{ column-count: {columns}; }}\n</style>\n\
         </head>\n<body>\n<header class=\"masthead\">\n<h1>{title}</h1>\n\
         <p class=\"date\">{date}</p>\n</header>\n",
        title = title,
        columns = columns.max(1),
        date = heading_date(paper.date),
    );

    for section in &paper.sections {
        let _ = write!(
            out,
            "<section class=\"source\">\n<h2>{}</h2>\n<div class=\"articles\">\n",
            escape(&section.source)
        );
        for article in &section.articles {
            render_article(&mut out, article);
        }
        out.push_str("</div>\n</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_article(out: &mut String, article: &Article) {
    let _ = write!(
        out,
        "<article>\n<h3><a href=\"{link}\">{title}</a></h3>\n\
         <p class=\"meta\">{published}</p>\n<div class=\"content\">{content}</div>\n</article>\n",
        link = escape(&article.link),
        title = escape(&article.title),
        published = escape(&article.published),
        content = sanitize_html(&article.content),
    );
}

pub fn render_markdown(paper: &Paper) -> String {
    let mut out = format!("# {}\n\n_{}_\n", paper.title, heading_date(paper.date));
    for section in &paper.sections {
        let _ = write!(out, "\n## {}\n", section.source);
        for article in &section.articles {
            let _ = write!(
                out,
                "\n### [{}]({})\n\n_{}_\n\n{}\n",
                article.title,
                article.link,
                article.published,
                html_to_markdown(&article.content).trim()
            );
        }
    }
    out
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use morning_feed::assemble;
    use pretty_assertions::assert_eq;

    fn paper() -> Paper {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assemble(
            "Morning <Paper>",
            date,
            vec![Article {
                title: "Fish & Chips".to_string(),
                source: "Food".to_string(),
                link: "https://example.com/fish?a=1&b=2".to_string(),
                published: "2024-03-09 07:00:00".to_string(),
                summary: String::new(),
                content: "<p>Crispy <strong>batter</strong>.</p>".to_string(),
            }],
        )
    }

    #[test]
    fn file_names_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(file_name(date, PaperFormat::Html), "morning_paper_2024-03-09.html");
        assert_eq!(file_name(date, PaperFormat::Markdown), "morning_paper_2024-03-09.md");
        assert_eq!(heading_date(date), "Saturday, March 09, 2024");
    }

    #[test]
    fn html_escapes_metadata_and_keeps_body_markup() {
        let html = render_html(&paper(), 2);
        assert!(html.contains("<h1>Morning &lt;Paper&gt;</h1>"));
        assert!(html.contains("Saturday, March 09, 2024"));
        assert!(html.contains("column-count: 2;"));
        assert!(html.contains("<h2>Food</h2>"));
        assert!(html.contains(r#"href="https://example.com/fish?a=1&amp;b=2""#));
        assert!(html.contains(">Fish &amp; Chips</a>"));
        assert!(html.contains("<p>Crispy <strong>batter</strong>.</p>"));
    }

    #[test]
    fn html_bodies_are_sanitized() {
        let mut paper = paper();
        paper.sections[0].articles[0].content = concat!(
            r#"<p onclick="steal()">Kept text</p>"#,
            r#"<script>steal()</script>"#,
            r#"<a href="javascript:steal()"><img src="https://example.com/a.jpg" onerror="steal()"></a>"#,
        )
        .to_string();

        let html = render_html(&paper, 1);
        assert!(html.contains("<p>Kept text</p>"));
        assert!(html.contains(r#"src="https://example.com/a.jpg""#));
        assert!(!html.contains("steal()"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn markdown_converts_bodies() {
        let md = render_markdown(&paper());
        assert!(md.starts_with("# Morning <Paper>\n"));
        assert!(md.contains("## Food"));
        assert!(md.contains("### [Fish & Chips](https://example.com/fish?a=1&b=2)"));
        assert!(md.contains("**batter**"));
    }

    #[test]
    fn json_is_the_paper() {
        let json = render(&paper(), PaperFormat::Json, 1).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["date"], "2024-03-09");
        assert_eq!(value["sections"][0]["articles"][0]["title"], "Fish & Chips");
    }
}
