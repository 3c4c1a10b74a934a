//! Weather-conditioned headline selection
//!
//! The current temperature picks a [`Tier`], each tier owns a fixed keyword
//! list, and [`classify`] keeps the articles mentioning any of them. When
//! nothing matches the first articles are shown unfiltered.

use serde::{Deserialize, Serialize};

use crate::models::NewsArticle;

/// Upper bound on the number of selected articles
pub const MAX_SELECTED: usize = 10;

/// Below this temperature (Celsius) the Cold tier applies
pub const COLD_BELOW: f64 = 10.0;

/// Above this temperature (Celsius) the Hot tier applies
pub const HOT_ABOVE: f64 = 25.0;

const COLD_KEYWORDS: [&str; 10] = [
    "death",
    "crisis",
    "problem",
    "issue",
    "fail",
    "loss",
    "decline",
    "drop",
    "struggle",
    "difficulty",
];

const HOT_KEYWORDS: [&str; 10] = [
    "danger", "threat", "risk", "warning", "alarm", "concern", "worry", "fear", "panic", "crisis",
];

const MILD_KEYWORDS: [&str; 10] = [
    "win",
    "success",
    "victory",
    "achieve",
    "celebrate",
    "happy",
    "joy",
    "breakthrough",
    "triumph",
    "excellent",
];

/// Temperature bucket deciding which keywords select headlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Cold,
    Hot,
    Mild,
}

impl Tier {
    /// Tier for a temperature in Celsius. Boundaries 10 and 25 are Mild.
    #[must_use]
    pub fn for_temperature(celsius: f64) -> Self {
        if celsius < COLD_BELOW {
            Self::Cold
        } else if celsius > HOT_ABOVE {
            Self::Hot
        } else {
            Self::Mild
        }
    }

    /// Lowercase keywords matched against titles and descriptions
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Cold => &COLD_KEYWORDS,
            Self::Hot => &HOT_KEYWORDS,
            Self::Mild => &MILD_KEYWORDS,
        }
    }

    /// One line banner shown above the selected headlines
    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            Self::Cold => "Cold Weather - Focusing on challenging news",
            Self::Hot => "Hot Weather - Showing concerning updates",
            Self::Mild => "Cool Weather - Highlighting positive news",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Cold => "Shows news with challenging or concerning themes",
            Self::Hot => "Displays news related to risks and warnings",
            Self::Mild => "Highlights positive and uplifting news stories",
        }
    }

    /// Whether the article mentions one of this tier's keywords.
    /// Articles with a missing or empty title never match.
    #[must_use]
    pub fn matches(self, article: &NewsArticle) -> bool {
        let Some(title) = article.title.as_deref().filter(|t| !t.is_empty()) else {
            return false;
        };
        let title = title.to_lowercase();
        let description = article.description.as_deref().map(str::to_lowercase);

        self.keywords().iter().any(|keyword| {
            title.contains(keyword)
                || description
                    .as_deref()
                    .is_some_and(|text| text.contains(keyword))
        })
    }
}

/// Select at most [`MAX_SELECTED`] articles for the given temperature (Celsius).
///
/// Matching articles keep their input order. If none match, the first
/// [`MAX_SELECTED`] input articles are returned unchanged.
#[must_use]
pub fn classify(celsius: f64, articles: &[NewsArticle]) -> Vec<NewsArticle> {
    let tier = Tier::for_temperature(celsius);

    let matched: Vec<NewsArticle> = articles
        .iter()
        .filter(|article| tier.matches(article))
        .take(MAX_SELECTED)
        .cloned()
        .collect();

    if matched.is_empty() {
        tracing::debug!(
            "No {:?} headlines among {} articles, showing the first {}",
            tier,
            articles.len(),
            MAX_SELECTED
        );
        return articles.iter().take(MAX_SELECTED).cloned().collect();
    }

    tracing::debug!(
        "Selected {} {:?} headlines from {} articles",
        matched.len(),
        tier,
        articles.len()
    );
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: Some(title.to_string()),
            source_name: "Wire".to_string(),
            url: format!("https://news.example/{}", title.len()),
            ..Default::default()
        }
    }

    fn with_description(title: &str, description: &str) -> NewsArticle {
        NewsArticle {
            description: Some(description.to_string()),
            ..article(title)
        }
    }

    fn titles(articles: &[NewsArticle]) -> Vec<&str> {
        articles.iter().filter_map(|a| a.title.as_deref()).collect()
    }

    #[rstest]
    #[case(-15.0, Tier::Cold)]
    #[case(9.99, Tier::Cold)]
    #[case(10.0, Tier::Mild)]
    #[case(18.0, Tier::Mild)]
    #[case(25.0, Tier::Mild)]
    #[case(25.01, Tier::Hot)]
    #[case(41.0, Tier::Hot)]
    fn test_tier_thresholds(#[case] celsius: f64, #[case] expected: Tier) {
        assert_eq!(Tier::for_temperature(celsius), expected);
    }

    #[test]
    fn test_nan_temperature_is_mild() {
        assert_eq!(Tier::for_temperature(f64::NAN), Tier::Mild);
    }

    #[rstest]
    #[case(5.0, "Factory closure deepens regional DECLINE")]
    #[case(30.0, "Officials issue heat Warning for the weekend")]
    #[case(20.0, "Local team celebrates championship")]
    fn test_case_insensitive_title_match(#[case] celsius: f64, #[case] title: &str) {
        let articles = vec![article("Nothing to see here"), article(title)];
        let selected = classify(celsius, &articles);
        assert_eq!(titles(&selected), vec![title]);
    }

    #[test]
    fn test_description_match() {
        let articles = vec![
            article("Quarterly report released"),
            with_description("Markets today", "Investors worry about rates"),
        ];
        let selected = classify(32.0, &articles);
        assert_eq!(titles(&selected), vec!["Markets today"]);
    }

    #[test]
    fn test_cold_returns_only_cold_matches_in_order() {
        let articles = vec![
            article("Team wins the cup"),
            article("Housing crisis worsens"),
            article("Sunny skies ahead"),
            article("Airline reports record loss"),
            article("Danger on the roads"),
        ];
        let selected = classify(2.0, &articles);
        assert_eq!(
            titles(&selected),
            vec!["Housing crisis worsens", "Airline reports record loss"]
        );
        assert!(selected.iter().all(|a| Tier::Cold.matches(a)));
    }

    #[test]
    fn test_crisis_matches_both_cold_and_hot() {
        let articles = vec![article("Energy crisis talks")];
        assert_eq!(classify(0.0, &articles).len(), 1);
        assert_eq!(classify(35.0, &articles).len(), 1);
        // Mild has no overlap, so the fallback returns the same article
        assert_eq!(classify(15.0, &articles), articles);
    }

    #[test]
    fn test_fallback_returns_first_ten_in_order() {
        let articles: Vec<NewsArticle> = (0..15).map(|i| article(&format!("Plain story {i}"))).collect();
        let selected = classify(5.0, &articles);
        assert_eq!(selected, articles[..10].to_vec());
    }

    #[test]
    fn test_fallback_with_fewer_than_ten() {
        let articles = vec![article("One"), article("Two"), article("Three")];
        assert_eq!(classify(5.0, &articles), articles);
    }

    #[test]
    fn test_matches_truncated_to_ten() {
        let articles: Vec<NewsArticle> = (0..25)
            .map(|i| {
                if i % 2 == 0 {
                    article(&format!("Story {i}: big win"))
                } else {
                    article(&format!("Story {i}"))
                }
            })
            .collect();
        let selected = classify(20.0, &articles);
        assert_eq!(selected.len(), MAX_SELECTED);
        assert_eq!(selected[0].title.as_deref(), Some("Story 0: big win"));
        assert_eq!(selected[9].title.as_deref(), Some("Story 18: big win"));
    }

    #[test]
    fn test_untitled_articles_never_match() {
        let untitled = NewsArticle {
            title: None,
            description: Some("A total failure".to_string()),
            ..Default::default()
        };
        assert!(!Tier::Cold.matches(&untitled));

        let articles = vec![untitled.clone(), article("Stocks drop sharply")];
        assert_eq!(titles(&classify(1.0, &articles)), vec!["Stocks drop sharply"]);

        // untitled articles still appear in the unfiltered fallback
        let only_untitled = vec![untitled];
        assert_eq!(classify(1.0, &only_untitled), only_untitled);
    }

    #[test]
    fn test_empty_title_never_matches() {
        let empty = with_description("", "Markets in panic");
        assert!(!Tier::Hot.matches(&empty));
    }

    #[test]
    fn test_whitespace_title_matches_on_description() {
        let articles = vec![
            with_description("  ", "Traders panic as prices swing"),
            article("calm"),
        ];
        assert!(Tier::Hot.matches(&articles[0]));

        let selected = classify(30.0, &articles);
        assert_eq!(selected, articles[..1].to_vec());
    }

    #[test]
    fn test_empty_input() {
        assert!(classify(12.0, &[]).is_empty());
    }

    #[test]
    fn test_labels() {
        assert!(Tier::Cold.headline().starts_with("Cold Weather"));
        assert!(Tier::Hot.description().contains("risks"));
        assert_eq!(Tier::Mild.keywords().len(), 10);
    }
}
