#![forbid(unsafe_code)]

//! Dataset sources for the cyclegrid engine.
//!
//! A [`CycleSource`] turns a [`RequestKey`](cyclegrid_core::RequestKey) into
//! a [`CycleDataset`](cyclegrid_core::CycleDataset). Two implementations ship:
//!
//! - [`HttpSource`]: `GET <api>/cycles?base=<m>&centered=<bool>` against the
//!   cycles service.
//! - [`FixtureSource`]: the same response bodies read from a directory.
//!
//! Sources are blocking. The runtime calls them from a worker thread.

pub mod config;
pub mod error;
pub mod fixture;
pub mod http;
pub mod response;
pub mod source;

pub use config::{
    API_BASE_ENV, ClientConfig, DEFAULT_API_BASE, MAX_BASE, MIN_BASE, check_base, clamp_base,
};
pub use error::{FetchError, Result};
pub use fixture::FixtureSource;
pub use http::HttpSource;
pub use response::CyclesResponse;
pub use source::CycleSource;
