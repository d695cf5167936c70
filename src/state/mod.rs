//! State module for tracking crawl progress
//!
//! This module provides the per-session state the orchestrator owns.
//!
//! # Components
//!
//! - `VisitedSet`: URLs already processed in the current session

mod visited;

pub use visited::VisitedSet;
