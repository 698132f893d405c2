// ABOUTME: Document assembly: groups sorted articles into per-source sections for rendering.
// ABOUTME: Sections follow first appearance in the sorted list; articles keep their sorted order.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Article;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub source: String,
    pub articles: Vec<Article>,
}

/// Everything a renderer needs for one edition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    pub title: String,
    pub date: NaiveDate,
    pub sections: Vec<Section>,
}

impl Paper {
    pub fn article_count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

pub fn assemble(title: impl Into<String>, date: NaiveDate, articles: Vec<Article>) -> Paper {
    let mut sections: Vec<Section> = Vec::new();
    for article in articles {
        match sections.iter_mut().find(|s| s.source == article.source) {
            Some(section) => section.articles.push(article),
            None => sections.push(Section {
                source: article.source.clone(),
                articles: vec![article],
            }),
        }
    }

    Paper {
        title: title.into(),
        date,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(title: &str, source: &str) -> Article {
        Article {
            title: title.to_string(),
            source: source.to_string(),
            ..Article::default()
        }
    }

    #[test]
    fn groups_by_first_appearance() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let paper = assemble(
            "Morning Paper",
            date,
            vec![
                article("a", "BBC"),
                article("b", "Hacker News"),
                article("c", "BBC"),
                article("d", "NYT"),
            ],
        );

        let layout: Vec<(&str, Vec<&str>)> = paper
            .sections
            .iter()
            .map(|s| {
                (
                    s.source.as_str(),
                    s.articles.iter().map(|a| a.title.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            layout,
            vec![
                ("BBC", vec!["a", "c"]),
                ("Hacker News", vec!["b"]),
                ("NYT", vec!["d"]),
            ]
        );
        assert_eq!(paper.article_count(), 4);
    }

    #[test]
    fn no_articles_no_sections() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let paper = assemble("Empty", date, Vec::new());
        assert!(paper.is_empty());
        assert_eq!(paper.article_count(), 0);
    }
}
