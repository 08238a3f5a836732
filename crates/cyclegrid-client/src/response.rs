#![forbid(unsafe_code)]

//! Wire format of the cycles service.
//!
//! ```json
//! { "base": 4, "sequences": [[1,1,2,3,1,0],[0,2,2]], "cycles_pairs": [...] }
//! ```
//!
//! `cycles_pairs` is accepted and ignored on input; pairs are recomputed
//! from `sequences` by the engine. It is written back out when serializing
//! so saved fixtures have the same shape the service produces.
//!
//! A `base` outside `MIN_BASE..=MAX_BASE` is rejected at parse time.

use cyclegrid_core::{CycleDataset, circular_pairs};
use serde::{Deserialize, Serialize};

use crate::config::check_base;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclesResponse {
    pub base: i64,
    pub sequences: Vec<Vec<i64>>,
    #[serde(default)]
    pub cycles_pairs: Vec<Vec<(i64, i64)>>,
}

impl CyclesResponse {
    /// Parse a response body.
    pub fn parse(body: &str) -> Result<Self> {
        let response: Self = serde_json::from_str(body)?;
        check_base(response.base)?;
        Ok(response)
    }

    /// Response shape for an existing dataset, pairs included.
    pub fn from_dataset(dataset: &CycleDataset) -> Self {
        Self {
            base: dataset.modulus(),
            sequences: dataset.sequences().to_vec(),
            cycles_pairs: dataset
                .sequences()
                .iter()
                .map(|seq| circular_pairs(seq))
                .collect(),
        }
    }

    pub fn into_dataset(self) -> CycleDataset {
        CycleDataset::new(self.base, self.sequences)
    }
}

impl From<CyclesResponse> for CycleDataset {
    fn from(response: CyclesResponse) -> Self {
        response.into_dataset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[test]
    fn parses_service_body_and_ignores_pairs() {
        let body = r#"{
            "base": 4,
            "sequences": [[1,1,2,3,1,0],[0,2,2],[0]],
            "cycles_pairs": [[[9,9]]]
        }"#;
        let dataset = CyclesResponse::parse(body).unwrap().into_dataset();
        assert_eq!(dataset.modulus(), 4);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.series(cyclegrid_core::SeriesId(2)), Some(&[0][..]));
    }

    #[test]
    fn pairs_are_optional() {
        let response = CyclesResponse::parse(r#"{"base":2,"sequences":[[1,1,0],[0]]}"#).unwrap();
        assert!(response.cycles_pairs.is_empty());
        assert_eq!(CycleDataset::from(response).total_pairs(), 4);
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        for body in ["", "not json", r#"{"base":"four","sequences":[]}"#, r#"{"sequences":[]}"#] {
            let err = CyclesResponse::parse(body).unwrap_err();
            assert!(matches!(err, FetchError::Parse(_)), "{body}: {err}");
        }
    }

    #[test]
    fn base_outside_service_range_is_rejected() {
        for base in [i64::MAX, 701, 0, -3] {
            let body = format!(r#"{{"base":{base},"sequences":[[0]]}}"#);
            let err = CyclesResponse::parse(&body).unwrap_err();
            assert!(
                matches!(err, FetchError::BaseOutOfRange { base: b, .. } if b == base),
                "{base}: {err}"
            );
        }
        for base in [1, 700] {
            let body = format!(r#"{{"base":{base},"sequences":[[0]]}}"#);
            assert_eq!(CyclesResponse::parse(&body).unwrap().base, base);
        }
    }

    #[test]
    fn from_dataset_matches_service_pair_layout() {
        // The service's state cycles are (a_i, a_{i+1}) with wrap-around.
        let dataset = CycleDataset::new(3, vec![vec![1, 1, 2, 0, 2, 2, 1, 0], vec![0]]);
        let response = CyclesResponse::from_dataset(&dataset);
        assert_eq!(response.cycles_pairs[1], vec![(0, 0)]);
        assert_eq!(response.cycles_pairs[0][0], (1, 1));
        assert_eq!(response.cycles_pairs[0][7], (0, 1));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["cycles_pairs"][0][2], serde_json::json!([2, 0]));
    }
}
