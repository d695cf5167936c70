//! Built-in selector and filter presets for common site types

use crate::extract::{FieldSelector, SelectorSpec};
use crate::filter::FilterSpec;
use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A named bundle of selector chains and filter predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Ecommerce,
    Blog,
    Social,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Ecommerce, Preset::Blog, Preset::Social];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Ecommerce => "ecommerce",
            Preset::Blog => "blog",
            Preset::Social => "social",
        }
    }

    pub fn selectors(&self) -> SelectorSpec {
        match self {
            Preset::Ecommerce => SelectorSpec::new()
                .with_title(["h1", ".product-title", ".title", "title"])
                .with_description([".product-description", ".description", ".summary"])
                .with_content([".product-details", ".product-info", ".specifications"]),
            Preset::Blog => SelectorSpec::new()
                .with_title(["h1", ".post-title", ".article-title", "title"])
                .with_description([
                    FieldSelector::css(".excerpt"),
                    FieldSelector::css(".summary"),
                    FieldSelector::meta("meta[name='description']"),
                ])
                .with_content(["article", ".post-content", ".entry-content", ".article-body"]),
            Preset::Social => SelectorSpec::new()
                .with_title(["h1", ".title", ".post-title"])
                .with_description([".bio", ".description", ".about"])
                .with_content([".post", ".content", ".feed-item"]),
        }
    }

    pub fn filter(&self) -> FilterSpec {
        match self {
            Preset::Ecommerce => FilterSpec::new()
                .with_keywords(["price", "buy", "product", "shop"])
                .with_exclude_keywords(["out of stock", "unavailable"])
                .with_min_length(50),
            Preset::Blog => FilterSpec::new()
                .with_keywords(["article", "post", "news"])
                .with_exclude_keywords(["advertisement", "ads", "spam"])
                .with_min_length(200),
            Preset::Social => FilterSpec::new()
                .with_keywords(["social", "profile", "post"])
                .with_min_length(20),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_html;

    #[test]
    fn test_parse_names() {
        assert_eq!("blog".parse::<Preset>().unwrap(), Preset::Blog);
        assert_eq!(" Ecommerce ".parse::<Preset>().unwrap(), Preset::Ecommerce);
        assert!("forum".parse::<Preset>().is_err());
    }

    #[test]
    fn test_blog_preset_extracts_post() {
        let html = r#"<html><head><meta name="description" content="Weekly notes"></head>
            <body><h1>Release post</h1><div class="post-content">News about the release</div></body></html>"#;
        let extracted = extract_html(html, &Preset::Blog.selectors());
        assert_eq!(extracted.title, "Release post");
        assert_eq!(extracted.description, "Weekly notes");
        assert_eq!(extracted.content, "News about the release");
    }

    #[test]
    fn test_ecommerce_filter_rejects_out_of_stock() {
        let filter = Preset::Ecommerce.filter();
        let listing = "Blue kettle product page. Buy now for the best price in town, shipped fast.";
        assert!(filter.accepts(listing));
        assert!(!filter.accepts(&format!("{} Currently OUT OF STOCK.", listing)));
    }
}
