#![forbid(unsafe_code)]

use std::sync::Arc;

use cyclegrid_core::{CycleDataset, RequestKey};

use crate::error::Result;

/// Something that can produce the dataset for a request key.
///
/// Implementations block; callers run them off the event loop.
pub trait CycleSource: Send + Sync {
    fn fetch(&self, key: RequestKey) -> Result<CycleDataset>;

    /// Human-readable origin for status lines and logs.
    fn describe(&self) -> String;
}

impl<S: CycleSource + ?Sized> CycleSource for Arc<S> {
    fn fetch(&self, key: RequestKey) -> Result<CycleDataset> {
        (**self).fetch(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: CycleSource + ?Sized> CycleSource for Box<S> {
    fn fetch(&self, key: RequestKey) -> Result<CycleDataset> {
        (**self).fetch(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
