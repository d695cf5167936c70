//! Rendering fetch strategy
//!
//! Pages that build their content with JavaScript are loaded in a headless
//! browser. Browser control is synchronous, so every render runs on the
//! blocking thread pool and owns one isolated browser session from launch
//! to teardown.

use crate::crawler::fetcher::{random_user_agent, FetchError, FetchStrategy, FetchedPage};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Extra wait after a user script so its effects reach the DOM
pub const SCRIPT_SETTLE: Duration = Duration::from_secs(1);

/// Longest settle wait; stays well inside [`ChromeLauncher`]'s idle timeout
pub const MAX_SETTLE: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Failed to capture page content: {0}")]
    Capture(String),

    #[error("Render task aborted: {0}")]
    Task(String),
}

/// Starts isolated browser sessions
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self, user_agent: &str) -> Result<Box<dyn BrowserSession>, RenderError>;
}

/// One live browser session
///
/// `close` is called exactly once, by the render loop, whatever the outcome.
pub trait BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError>;
    fn evaluate(&mut self, script: &str) -> Result<(), RenderError>;
    fn content(&mut self) -> Result<String, RenderError>;
    fn close(&mut self);
}

/// Closes the wrapped session when dropped
struct SessionGuard {
    session: Box<dyn BrowserSession>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.close();
    }
}

/// Per-fetch rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Wait after navigation before the script runs and the DOM is captured
    pub settle: Duration,
    /// Script evaluated in the page; blank scripts are ignored
    pub script: Option<String>,
    /// Wait after the script has run
    pub script_settle: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(3),
            script: None,
            script_settle: SCRIPT_SETTLE,
        }
    }
}

impl RenderOptions {
    fn script(&self) -> Option<&str> {
        self.script.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Fetch strategy backed by a headless browser
///
/// Reports a synthetic status of 200; the browser does not expose the
/// document's real status.
#[derive(Clone)]
pub struct RenderingFetcher {
    launcher: Arc<dyn BrowserLauncher>,
    options: RenderOptions,
}

impl RenderingFetcher {
    /// Creates a rendering fetcher
    ///
    /// Settle waits longer than [`MAX_SETTLE`] are clamped to it.
    pub fn new(launcher: Arc<dyn BrowserLauncher>, mut options: RenderOptions) -> Self {
        if options.settle > MAX_SETTLE {
            tracing::warn!(
                "Settle wait of {:?} exceeds {:?}, clamping",
                options.settle,
                MAX_SETTLE
            );
            options.settle = MAX_SETTLE;
        }
        Self { launcher, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

#[async_trait]
impl FetchStrategy for RenderingFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let launcher = Arc::clone(&self.launcher);
        let options = self.options.clone();
        let url = url.to_string();

        let page = tokio::task::spawn_blocking(move || {
            render_blocking(launcher.as_ref(), &url, &options)
        })
        .await
        .map_err(|e| RenderError::Task(e.to_string()))??;

        Ok(page)
    }
}

/// Runs one render to completion on the current thread
fn render_blocking(
    launcher: &dyn BrowserLauncher,
    url: &str,
    options: &RenderOptions,
) -> Result<FetchedPage, RenderError> {
    let user_agent = random_user_agent();
    tracing::debug!(url, user_agent, "Launching browser session");

    let mut guard = SessionGuard {
        session: launcher.launch(user_agent)?,
    };

    let started = Instant::now();
    guard.session.navigate(url)?;
    thread::sleep(options.settle);

    if let Some(script) = options.script() {
        tracing::debug!(url, "Evaluating page script");
        guard.session.evaluate(script)?;
        thread::sleep(options.script_settle);
    }

    let html = guard.session.content()?;

    Ok(FetchedPage {
        html,
        status_code: 200,
        response_time: started.elapsed(),
    })
}

/// Launches headless Chrome, one fresh browser per session
///
/// `idle_timeout` must exceed [`MAX_SETTLE`] plus [`SCRIPT_SETTLE`], or the
/// DevTools connection drops while a page settles.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    pub window_size: (u32, u32),
    pub sandbox: bool,
    pub idle_timeout: Duration,
}

impl Default for ChromeLauncher {
    fn default() -> Self {
        Self {
            window_size: (1920, 1080),
            sandbox: false,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self, user_agent: &str) -> Result<Box<dyn BrowserSession>, RenderError> {
        let user_agent_arg = OsString::from(format!("--user-agent={}", user_agent));
        let args: Vec<&OsStr> = vec![
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--no-first-run"),
            user_agent_arg.as_os_str(),
        ];

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.sandbox)
            .window_size(Some(self.window_size))
            .idle_browser_timeout(self.idle_timeout)
            .args(args)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| RenderError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        Ok(Box::new(ChromeSession {
            browser: Some(browser),
            tab,
        }))
    }
}

struct ChromeSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn evaluate(&mut self, script: &str) -> Result<(), RenderError> {
        self.tab
            .evaluate(script, true)
            .map(|_| ())
            .map_err(|e| RenderError::Script(e.to_string()))
    }

    fn content(&mut self) -> Result<String, RenderError> {
        self.tab
            .get_content()
            .map_err(|e| RenderError::Capture(e.to_string()))
    }

    fn close(&mut self) {
        if let Err(e) = self.tab.close(false) {
            tracing::debug!("Tab close failed: {}", e);
        }
        // Dropping the browser kills the Chrome process
        drop(self.browser.take());
    }
}
