use crate::config::types::{Config, RenderConfig, SessionConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for the inter-request delay (seconds)
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Upper bound for the render settle wait (seconds)
///
/// Kept below the browser's idle timeout so the DevTools connection
/// survives the wait.
pub const MAX_SETTLE_SECS: f64 = 60.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_session_config(&config.session)?;
    validate_render_config(&config.render)?;
    validate_urls(&config.urls)?;

    // Compiles the regex and resolves the preset name
    config.filter_spec()?;
    config.selector_spec()?;

    Ok(())
}

/// Validates session configuration
pub fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if !config.delay_secs.is_finite() || config.delay_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_secs must be a non-negative number, got {}",
            config.delay_secs
        )));
    }

    if config.delay_secs > MAX_DELAY_SECS {
        return Err(ConfigError::Validation(format!(
            "delay_secs must be at most {}, got {}",
            MAX_DELAY_SECS, config.delay_secs
        )));
    }

    if config.robots_user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "robots_user_agent cannot be empty".to_string(),
        ));
    }

    config.header_map()?;
    config.proxy_list()?;

    Ok(())
}

/// Validates rendering configuration
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if !config.settle_secs.is_finite() || config.settle_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "settle_secs must be a non-negative number, got {}",
            config.settle_secs
        )));
    }

    if config.settle_secs > MAX_SETTLE_SECS {
        return Err(ConfigError::Validation(format!(
            "settle_secs must be at most {}, got {}",
            MAX_SETTLE_SECS, config.settle_secs
        )));
    }

    Ok(())
}

/// Validates the URL list
pub fn validate_urls(urls: &[String]) -> Result<(), ConfigError> {
    for raw in urls {
        let url = Url::parse(raw)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "'{}' must use the http or https scheme",
                raw
            )));
        }
    }

    Ok(())
}
