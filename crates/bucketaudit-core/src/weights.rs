//! Per-control score deductions.
//!
//! A [`Weights`] table maps every [`ControlId`] to the number of points its
//! failure takes off the score. Different tables express different risk
//! tolerances; the defaults put most of the weight on public exposure.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bucketaudit_model::ControlId;
use serde::{Deserialize, Serialize};

/// Deduction per control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights(BTreeMap<ControlId, u32>);

impl Default for Weights {
    fn default() -> Self {
        Self(BTreeMap::from([
            (ControlId::PublicAccessBlock, 40),
            (ControlId::BucketPolicy, 30),
            (ControlId::Cors, 10),
            (ControlId::Encryption, 10),
            (ControlId::Versioning, 10),
            (ControlId::SecureTransport, 5),
            (ControlId::AccessLogging, 5),
            (ControlId::PresignedUrl, 0),
        ]))
    }
}

impl Weights {
    /// Points deducted when `control` does not pass. Unknown controls weigh 0.
    #[must_use]
    pub fn get(&self, control: ControlId) -> u32 {
        self.0.get(&control).copied().unwrap_or(0)
    }

    /// Replace the weight of one control.
    #[must_use]
    pub fn with(mut self, control: ControlId, weight: u32) -> Self {
        self.0.insert(control, weight);
        self
    }

    /// Apply `control=weight,...` overrides on top of these weights.
    pub fn apply_overrides(mut self, spec: &str) -> Result<Self, WeightParseError> {
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| WeightParseError(format!("expected control=weight, got '{pair}'")))?;
            let control = name.parse::<ControlId>().map_err(WeightParseError)?;
            let weight = value
                .trim()
                .parse::<u32>()
                .map_err(|e| WeightParseError(format!("invalid weight for {control}: {e}")))?;
            self.0.insert(control, weight);
        }
        Ok(self)
    }
}

impl FromStr for Weights {
    type Err = WeightParseError;

    /// Parse overrides applied to the default table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::default().apply_overrides(s)
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (control, weight) in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{control}={weight}")?;
            first = false;
        }
        Ok(())
    }
}

/// A malformed weight override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid weight override: {0}")]
pub struct WeightParseError(String);
