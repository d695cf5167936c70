use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use web_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Delay: {:?}", config.session.delay());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the exact configuration used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FieldSelector;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
urls = ["https://quotes.toscrape.com/", "https://quotes.toscrape.com/page/2/"]

[session]
timeout-secs = 5
delay-secs = 0.5
robots-user-agent = "TestBot"

[session.headers]
User-Agent = "TestBot/1.0"

[session.proxies]
https = "http://proxy.local:3128"

[render]
enabled = true
settle-secs = 2
script = "window.scrollTo(0, document.body.scrollHeight)"

[selectors]
title = ["h1", "title"]
description = [{ selector = "meta[name=description]" }, ".summary"]
links = ["a.tag"]

[filters]
keywords = ["quote"]
exclude-keywords = ["spam"]
min-length = 10
regex = "einstein"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.session.timeout(), Duration::from_secs(5));
        assert_eq!(config.session.delay(), Duration::from_millis(500));
        assert_eq!(config.session.robots_user_agent, "TestBot");
        assert_eq!(config.session.headers.get("User-Agent").unwrap(), "TestBot/1.0");
        assert!(config.render.enabled);
        assert_eq!(config.render.settle(), Duration::from_secs(2));
        assert_eq!(
            config.selectors.description.as_ref().unwrap()[0],
            FieldSelector::meta("meta[name=description]")
        );
        assert_eq!(config.selectors.links, Some(vec!["a.tag".to_string()]));

        let filter = config.filter_spec().unwrap().unwrap();
        assert_eq!(filter.min_length(), 10);
        assert_eq!(filter.regex(), Some("einstein"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.urls.is_empty());
        assert_eq!(config.session.timeout(), Duration::from_secs(10));
        assert!(!config.render.enabled);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/crawler.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("urls = [\"not a url\"]");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_huge_delay_does_not_pass_as_zero() {
        let result = parse_config("[session]\ndelay-secs = 1e20\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
