//! Risk/return curves
//!
//! Maps an exchange's risk parameter `z` to its per-step explosion
//! probability and premium. Both curves decay exponentially from their
//! maxima at `z = 0`:
//!
//! ```text
//! risk(z)    = max_risk    * exp(-ruin_decay    * z)
//! premium(z) = max_premium * exp(-premium_decay * z)
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Per-step characteristics derived from `z`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Probability of exploding on any given step, in [0, 1]
    pub risk: f64,
    /// Excess return per bet paid on a step the exchange survives
    pub premium: f64,
}

/// Parameters of the two decay curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskModel {
    max_risk: f64,
    ruin_decay: f64,
    max_premium: f64,
    premium_decay: f64,
}

impl RiskModel {
    /// Create a model, rejecting parameters outside their domains
    pub fn new(
        max_risk: f64,
        ruin_decay: f64,
        max_premium: f64,
        premium_decay: f64,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&max_risk) {
            return Err(ConfigError::InvalidParameter {
                field: "max_risk",
                value: max_risk,
                reason: "must be a probability in [0, 1]",
            });
        }
        non_negative("ruin_decay", ruin_decay)?;
        non_negative("max_premium", max_premium)?;
        non_negative("premium_decay", premium_decay)?;

        Ok(Self {
            max_risk,
            ruin_decay,
            max_premium,
            premium_decay,
        })
    }

    pub fn max_risk(&self) -> f64 {
        self.max_risk
    }

    pub fn max_premium(&self) -> f64 {
        self.max_premium
    }

    /// Evaluate both curves at `z`. Negative or non-finite `z` is rejected.
    pub fn profile(&self, z: f64) -> Result<RiskProfile, ConfigError> {
        if !z.is_finite() || z < 0.0 {
            return Err(ConfigError::InvalidParameter {
                field: "z",
                value: z,
                reason: "risk parameter must be finite and non-negative",
            });
        }

        Ok(RiskProfile {
            risk: self.max_risk * (-self.ruin_decay * z).exp(),
            premium: self.max_premium * (-self.premium_decay * z).exp(),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            field,
            value,
            reason: "must be finite and non-negative",
        })
    }
}
