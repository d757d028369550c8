//! Aggregation options.
//!
//! Options are serialized under the same string keys other multigrid setups use
//! in their parameter lists, so a JSON parameter file looks like
//!
//! ```json
//! {
//!     "aggregation: min agg size": 3,
//!     "aggregation: error on nodes with no on-rank neighbors": true
//! }
//! ```
//!
//! Missing keys take their default value. Unknown keys are rejected.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{Error, Result};

/// Order in which Phase 1 visits root candidates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Ordering {
    Natural,
    Random,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationParams {
    /// Fail instead of creating a singleton when Phase 3 meets a vertex with
    /// no usable on-rank neighbor.
    #[serde(rename = "aggregation: error on nodes with no on-rank neighbors")]
    pub error_on_isolated: bool,

    /// Keep Dirichlet rows as singleton aggregates instead of ignoring them.
    #[serde(rename = "aggregation: preserve Dirichlet points")]
    pub preserve_dirichlet: bool,

    #[serde(rename = "aggregation: min agg size")]
    pub min_agg_size: usize,

    /// `None` means unbounded.
    #[serde(rename = "aggregation: max agg size")]
    pub max_agg_size: Option<usize>,

    /// How many already aggregated neighbors a Phase 1 root may have.
    #[serde(rename = "aggregation: max selected neighbors")]
    pub max_selected_neighbors: usize,

    #[serde(rename = "aggregation: ordering")]
    pub ordering: Ordering,

    #[serde(rename = "aggregation: random seed")]
    pub seed: u64,

    /// Off-diagonal entries at or below this magnitude are not graph edges.
    #[serde(rename = "aggregation: drop tol")]
    pub drop_tolerance: f64,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            error_on_isolated: false,
            preserve_dirichlet: false,
            min_agg_size: 2,
            max_agg_size: None,
            max_selected_neighbors: 0,
            ordering: Ordering::Natural,
            seed: 0,
            drop_tolerance: 0.0,
        }
    }
}

impl AggregationParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_agg_size == 0 {
            return Err(Error::InvalidParameter {
                name: "aggregation: min agg size",
                message: "must be at least 1".into(),
            });
        }
        if let Some(max) = self.max_agg_size {
            if max < self.min_agg_size {
                return Err(Error::InvalidParameter {
                    name: "aggregation: max agg size",
                    message: format!(
                        "{} is smaller than the min agg size {}",
                        max, self.min_agg_size
                    ),
                });
            }
        }
        if self.drop_tolerance.is_nan() || self.drop_tolerance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "aggregation: drop tol",
                message: format!("{} is not a non-negative number", self.drop_tolerance),
            });
        }
        Ok(())
    }
}
