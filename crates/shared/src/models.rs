use serde::{Deserialize, Serialize};

/// One news article, normalized from the provider's response shape.
/// Only the URL is guaranteed; everything else is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub url: String,
    pub published_at: Option<String>,
}

/// Sort newest first. Timestamps are provider-native ISO-8601-like strings,
/// so a lexical comparison is enough; articles without a timestamp sort last.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| match (&a.published_at, &b.published_at) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, published_at: Option<&str>) -> Article {
        Article {
            title: None,
            description: None,
            source: None,
            url: url.to_string(),
            published_at: published_at.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut articles = vec![
            article("a", Some("2024-01-02")),
            article("b", Some("2024-01-05")),
            article("c", None),
        ];
        sort_newest_first(&mut articles);
        let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_missing_timestamps_go_last() {
        let mut articles = vec![
            article("a", None),
            article("b", Some("2024-06-01T10:00:00Z")),
        ];
        sort_newest_first(&mut articles);
        assert_eq!(articles[0].url, "b");
        assert_eq!(articles[1].url, "a");
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let mut articles = vec![
            article("first", Some("2024-01-01")),
            article("second", Some("2024-01-01")),
        ];
        sort_newest_first(&mut articles);
        assert_eq!(articles[0].url, "first");
        assert_eq!(articles[1].url, "second");
    }
}
