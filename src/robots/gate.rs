//! Politeness gate
//!
//! Answers "may this URL be fetched?" from robots.txt, fetching each origin's
//! file at most once per session.

use crate::robots::{fetch_robots, RobotsCache};
use reqwest::Client;
use url::Url;

/// Robots.txt permission checks with a per-origin cache
///
/// Fails open: when robots.txt cannot be obtained the origin is treated as
/// fully permitted.
pub struct PolitenessGate {
    client: Client,
    cache: RobotsCache,
}

impl PolitenessGate {
    /// Creates a gate that fetches robots.txt with `client`
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: RobotsCache::new(),
        }
    }

    /// Checks whether `url` may be fetched by `user_agent`
    ///
    /// # Arguments
    ///
    /// * `url` - The page URL
    /// * `user_agent` - Robots user agent token; `*` matches the global group
    ///
    /// # Returns
    ///
    /// * `true` - Allowed, or robots.txt could not be obtained
    /// * `false` - Disallowed by the origin's robots.txt
    pub async fn is_allowed(&mut self, url: &str, user_agent: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Cannot check robots.txt for unparsable URL {}: {}", url, e);
                return true;
            }
        };

        let origin = parsed.origin().ascii_serialization();

        if let Some(cached) = self.cache.get(&origin) {
            tracing::debug!("Using cached robots.txt for {}", origin);
            return cached.is_allowed(url, user_agent);
        }

        let robots = fetch_robots(&self.client, &parsed).await;
        let allowed = robots.is_allowed(url, user_agent);
        self.cache.insert(origin, robots);

        allowed
    }

    /// Number of origins with cached rules
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    /// Forgets every cached robots.txt
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve_robots(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_allows_and_denies_by_rules() {
        let server = serve_robots(200, "User-agent: *\nDisallow: /admin").await;
        let mut gate = PolitenessGate::new(Client::new());

        assert!(gate.is_allowed(&format!("{}/page", server.uri()), "*").await);
        assert!(!gate.is_allowed(&format!("{}/admin/users", server.uri()), "*").await);
    }

    #[tokio::test]
    async fn test_fetches_once_per_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let mut gate = PolitenessGate::new(Client::new());
        for page in ["/a", "/b", "/c"] {
            assert!(gate.is_allowed(&format!("{}{}", server.uri(), page), "*").await);
        }
        assert_eq!(gate.cached_origins(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_robots_fails_open() {
        let mut gate = PolitenessGate::new(Client::new());
        assert!(gate.is_allowed("http://127.0.0.1:1/page", "*").await);
    }

    #[tokio::test]
    async fn test_unparsable_url_fails_open() {
        let mut gate = PolitenessGate::new(Client::new());
        assert!(gate.is_allowed("not a url", "*").await);
        assert_eq!(gate.cached_origins(), 0);
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let server = serve_robots(404, "").await;
        let mut gate = PolitenessGate::new(Client::new());
        assert!(gate.is_allowed(&format!("{}/anything", server.uri()), "*").await);
    }

    #[tokio::test]
    async fn test_server_error_fails_open() {
        let server = serve_robots(503, "").await;
        let mut gate = PolitenessGate::new(Client::new());
        assert!(gate.is_allowed(&format!("{}/anything", server.uri()), "*").await);
    }

    #[tokio::test]
    async fn test_forbidden_robots_disallows_all() {
        let server = serve_robots(403, "").await;
        let mut gate = PolitenessGate::new(Client::new());
        assert!(!gate.is_allowed(&format!("{}/anything", server.uri()), "*").await);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(2)
            .mount(&server)
            .await;

        let mut gate = PolitenessGate::new(Client::new());
        let url = format!("{}/page", server.uri());
        gate.is_allowed(&url, "*").await;
        gate.clear();
        gate.is_allowed(&url, "*").await;
    }
}
