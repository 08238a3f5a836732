#![forbid(unsafe_code)]

//! Datasets read from a directory of saved service responses.
//!
//! Files are named `cycles-<base>.json` and `cycles-<base>-centered.json`
//! and hold the exact body the service returns for that request.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cyclegrid_core::{CycleDataset, RequestKey};
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::response::CyclesResponse;
use crate::source::CycleSource;

#[derive(Debug, Clone)]
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name holding the response for `key`.
    pub fn file_name(key: RequestKey) -> String {
        if key.mode.is_centered() {
            format!("cycles-{}-centered.json", key.modulus)
        } else {
            format!("cycles-{}.json", key.modulus)
        }
    }

    pub fn path_for(&self, key: RequestKey) -> PathBuf {
        self.dir.join(Self::file_name(key))
    }
}

impl CycleSource for FixtureSource {
    fn fetch(&self, key: RequestKey) -> Result<CycleDataset> {
        let path = self.path_for(key);
        let body = match std::fs::read_to_string(&path) {
            Ok(body) => body,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                return Err(FetchError::MissingFixture {
                    key,
                    dir: self.dir.clone(),
                });
            }
            Err(source) => return Err(FetchError::Io { path, source }),
        };
        let parsed = CyclesResponse::parse(&body)?;
        debug!(path = %path.display(), sequences = parsed.sequences.len(), "fixture loaded");
        Ok(parsed.into_dataset())
    }

    fn describe(&self) -> String {
        format!("fixtures:{}", self.dir.display())
    }
}
