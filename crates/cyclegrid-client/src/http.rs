#![forbid(unsafe_code)]

//! Blocking HTTP source for the cycles service.

use std::time::Instant;

use cyclegrid_core::{CycleDataset, RequestKey};
use reqwest::blocking::Client;
use tracing::{debug, debug_span};

use crate::config::{ClientConfig, check_base};
use crate::error::{FetchError, Result};
use crate::response::CyclesResponse;
use crate::source::CycleSource;

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The URL requested for `key`.
    pub fn request_url(&self, key: RequestKey) -> String {
        format!(
            "{}?base={}&centered={}",
            self.endpoint,
            key.modulus,
            key.mode.is_centered()
        )
    }
}

impl CycleSource for HttpSource {
    fn fetch(&self, key: RequestKey) -> Result<CycleDataset> {
        check_base(key.modulus)?;
        let url = self.request_url(key);
        let _span = debug_span!("fetch_cycles", %url).entered();
        let started = Instant::now();

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text()?;
        let parsed = CyclesResponse::parse(&body)?;
        debug!(
            bytes = body.len(),
            sequences = parsed.sequences.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cycles response parsed"
        );
        Ok(parsed.into_dataset())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
