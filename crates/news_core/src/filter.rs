//! crates/news_core/src/filter.rs
//!
//! Pure article-filtering predicates used by the dashboard feed. These are
//! deliberately simple keyword/charset checks, not language detection or
//! semantic matching; false positives and negatives are acceptable.

use crate::domain::Article;

/// Returns true when `text` is composed entirely of ASCII letters, digits,
/// whitespace, and common punctuation. Used to discard non-English results
/// when the provider's own language tagging is unreliable.
pub fn is_english(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || c.is_ascii_whitespace()
            || matches!(c, '.' | ',' | '!' | '?' | '"' | '\'' | '-' | ':' | ';' | '(' | ')' | '/' | '@')
    })
}

/// Case-insensitive substring match of any interest term against the
/// article's title, description, and content.
pub fn is_relevant(article: &Article, interests: &[String]) -> bool {
    let combined = format!(
        "{} {} {}",
        article.title,
        article.description.as_deref().unwrap_or(""),
        article.content.as_deref().unwrap_or("")
    )
    .to_lowercase();
    interests
        .iter()
        .any(|term| combined.contains(&term.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(title: &str, description: Option<&str>, content: Option<&str>) -> Article {
        Article {
            source: "Test Wire".to_string(),
            author: None,
            title: title.to_string(),
            description: description.map(str::to_string),
            url: "https://example.com/a".to_string(),
            image_url: None,
            published_at: Utc::now(),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn english_text_is_accepted() {
        assert!(is_english("Breaking: SpaceX launches 21 satellites, again!"));
        assert!(is_english("Why Rust? A \"systems\" story (part 1/2) - @rustlang"));
    }

    #[test]
    fn non_ascii_text_is_rejected() {
        assert!(!is_english("חדשות היום"));
        assert!(!is_english("Nouvelle journée à Paris — résumé"));
        assert!(!is_english(""));
    }

    #[test]
    fn relevance_is_case_insensitive_substring() {
        let a = article("Breaking Football News", None, None);
        assert!(is_relevant(&a, &["football".to_string()]));
        assert!(is_relevant(&a, &["FOOTBALL".to_string()]));
        assert!(!is_relevant(&a, &["Chess".to_string()]));
    }

    #[test]
    fn relevance_searches_description_and_content() {
        let a = article(
            "Daily roundup",
            Some("A quiet day in markets"),
            Some("...except for space stocks"),
        );
        assert!(is_relevant(&a, &["Space".to_string()]));
        assert!(is_relevant(&a, &["markets".to_string()]));
        assert!(!is_relevant(&a, &["cooking".to_string()]));
    }

    #[test]
    fn no_interests_matches_nothing() {
        let a = article("Anything", None, None);
        assert!(!is_relevant(&a, &[]));
    }
}
