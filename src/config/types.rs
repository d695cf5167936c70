use crate::config::presets::Preset;
use crate::extract::SelectorSpec;
use crate::filter::{FilterConfig, FilterSpec};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Proxy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// URLs to crawl, in order
    #[serde(default)]
    pub urls: Vec<String>,

    /// Optional preset supplying selectors and filters for unset fields
    #[serde(default)]
    pub preset: Option<String>,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub selectors: SelectorSpec,

    #[serde(default)]
    pub filters: FilterConfig,
}

impl Config {
    /// Resolves the configured preset name
    pub fn preset(&self) -> Result<Option<Preset>, ConfigError> {
        self.preset.as_deref().map(str::parse).transpose()
    }

    /// Selector spec with preset chains filling unset fields
    pub fn selector_spec(&self) -> Result<SelectorSpec, ConfigError> {
        let spec = match self.preset()? {
            Some(preset) => self.selectors.clone().or(&preset.selectors()),
            None => self.selectors.clone(),
        };
        Ok(spec)
    }

    /// Compiled filter spec, or `None` when no predicate is configured
    pub fn filter_spec(&self) -> Result<Option<FilterSpec>, ConfigError> {
        let mut spec = FilterSpec::try_from(&self.filters)?;
        if let Some(preset) = self.preset()? {
            spec = spec.or(&preset.filter());
        }
        Ok(if spec.is_empty() { None } else { Some(spec) })
    }
}

/// HTTP session settings, fixed for the lifetime of a crawl session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Request headers; browser-like defaults are used when empty
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Proxy URLs keyed by `http`, `https`, or `all`
    #[serde(default)]
    pub proxies: BTreeMap<String, String>,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause before every plain fetch (seconds)
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    /// User agent token matched against robots.txt groups
    #[serde(default = "default_robots_user_agent")]
    pub robots_user_agent: String,

    /// Whether plain crawls consult robots.txt
    #[serde(default = "default_true")]
    pub respect_robots: bool,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_delay_secs() -> f64 {
    1.0
}

fn default_robots_user_agent() -> String {
    "*".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            proxies: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            delay_secs: default_delay_secs(),
            robots_user_agent: default_robots_user_agent(),
            respect_robots: true,
        }
    }
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Inter-request delay
    ///
    /// Values that fail validation collapse to zero; a validated config
    /// never takes that path.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or_default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_secs = delay.as_secs_f64();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_proxy(mut self, scheme: impl Into<String>, url: impl Into<String>) -> Self {
        self.proxies.insert(scheme.into(), url.into());
        self
    }

    /// Converts the configured headers into a typed header map
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::InvalidHeader(format!("{}: {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ConfigError::InvalidHeader(format!("{}: {}", name, e)))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Builds one reqwest proxy per configured scheme
    pub fn proxy_list(&self) -> Result<Vec<Proxy>, ConfigError> {
        self.proxies
            .iter()
            .map(|(scheme, url)| {
                let proxy = match scheme.to_ascii_lowercase().as_str() {
                    "http" => Proxy::http(url),
                    "https" => Proxy::https(url),
                    "all" => Proxy::all(url),
                    other => {
                        return Err(ConfigError::InvalidProxy {
                            scheme: other.to_string(),
                            message: "expected http, https, or all".to_string(),
                        })
                    }
                };
                proxy.map_err(|e| ConfigError::InvalidProxy {
                    scheme: scheme.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

/// Rendering (headless browser) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenderConfig {
    /// Use the rendering strategy instead of plain HTTP
    #[serde(default)]
    pub enabled: bool,

    /// Wait after navigation before capturing the page (seconds)
    #[serde(default = "default_settle_secs")]
    pub settle_secs: f64,

    /// Apply robots, dedup, and delay to rendered fetches as well
    #[serde(default)]
    pub gate_rendered: bool,

    /// Script evaluated in the page after the settle wait
    #[serde(default)]
    pub script: Option<String>,
}

fn default_settle_secs() -> f64 {
    3.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            settle_secs: default_settle_secs(),
            gate_rendered: false,
            script: None,
        }
    }
}

impl RenderConfig {
    pub fn settle(&self) -> Duration {
        Duration::try_from_secs_f64(self.settle_secs).unwrap_or_default()
    }
}
