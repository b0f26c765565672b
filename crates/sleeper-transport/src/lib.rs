//! Sleeper Transport Layer
//!
//! Read-only access to the Sleeper fantasy API.
//!
//! This crate provides:
//! - [`RemoteSource`]: the fetch-by-path seam, implemented over HTTP by [`HttpSource`]
//! - [`SleeperApi`]: typed wrappers for every endpoint the workspace consumes
//! - [`FetchError`]: typed failures (not found, rate limited, upstream, transport, decode)
//!
//! # Example
//!
//! ```ignore
//! use sleeper_transport::{HttpSource, SleeperApi};
//!
//! let api = SleeperApi::new(HttpSource::from_env());
//! let state = api.nfl_state().await?;
//! let rosters = api.rosters("1048236040712904704").await?;
//! ```

pub mod api;
pub mod error;
pub mod source;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{SleeperApi, TrendKind, DEFAULT_SPORT};
pub use error::FetchError;
pub use source::{HttpSource, RemoteSource, DEFAULT_BASE_URL};
