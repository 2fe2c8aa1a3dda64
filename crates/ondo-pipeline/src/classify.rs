//! Temperature tier classification.
//!
//! Buckets a temperature estimate into one of three ordered tiers
//! using a pair of threshold boundaries. Two independent boundary
//! sites exist: one for the whole-image verdict and one for per-region
//! histogram counting. Their default constants differ and are
//! deliberately not unified; each pair partitions the real line into
//! exactly three tiers with no gap and no overlap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ConfigError, RegionHistogram};

/// One of the three ordered thermal classifications.
///
/// Ordering is total: `Cold < Normal < Hot`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureTier {
    /// Below the lower boundary.
    Cold,
    /// Between the boundaries, both ends inclusive.
    Normal,
    /// Above the upper boundary.
    Hot,
}

impl TemperatureTier {
    /// Clinical label for the tier.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cold => "hypothermic",
            Self::Normal => "normal",
            Self::Hot => "inflamed",
        }
    }
}

impl fmt::Display for TemperatureTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cold => "cold",
            Self::Normal => "normal",
            Self::Hot => "hot",
        };
        f.write_str(name)
    }
}

/// A pair of boundaries partitioning temperatures into tiers.
///
/// `value < low` → [`TemperatureTier::Cold`],
/// `low ≤ value ≤ high` → [`TemperatureTier::Normal`],
/// `value > high` → [`TemperatureTier::Hot`].
///
/// Constructed via [`new`](Self::new), which rejects `low > high`;
/// deserialization applies the same validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTierThresholds")]
pub struct TierThresholds {
    low: f64,
    high: f64,
}

impl TierThresholds {
    /// Default whole-image boundaries.
    pub const IMAGE_DEFAULT: Self = Self {
        low: 29.0,
        high: 33.0,
    };

    /// Default per-region boundaries.
    ///
    /// Numerically different from [`Self::IMAGE_DEFAULT`]; the two
    /// sites are configured independently (see module docs).
    pub const REGION_DEFAULT: Self = Self {
        low: 30.0,
        high: 34.0,
    };

    /// Build a validated threshold pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedThresholds`] if `low > high`.
    pub fn new(low: f64, high: f64) -> Result<Self, ConfigError> {
        if low > high {
            return Err(ConfigError::InvertedThresholds { low, high });
        }
        Ok(Self { low, high })
    }

    /// Lower boundary (first temperature classified Normal).
    #[must_use]
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Upper boundary (last temperature classified Normal).
    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Classify a temperature into its tier.
    ///
    /// Exactly one tier applies to any finite value.
    #[must_use]
    pub fn classify(&self, temperature: f64) -> TemperatureTier {
        if temperature < self.low {
            TemperatureTier::Cold
        } else if temperature <= self.high {
            TemperatureTier::Normal
        } else {
            TemperatureTier::Hot
        }
    }
}

/// Serde proxy enforcing the `low ≤ high` invariant on deserialization.
#[derive(Deserialize)]
struct RawTierThresholds {
    low: f64,
    high: f64,
}

impl TryFrom<RawTierThresholds> for TierThresholds {
    type Error = ConfigError;

    fn try_from(raw: RawTierThresholds) -> Result<Self, Self::Error> {
        Self::new(raw.low, raw.high)
    }
}

/// Whole-image condition text, one fixed entry per tier.
#[must_use]
pub const fn condition_text(tier: TemperatureTier) -> &'static str {
    match tier {
        TemperatureTier::Cold => {
            "Cold regions detected - May indicate poor blood circulation or hypothermia."
        }
        TemperatureTier::Normal => "Normal temperature - No abnormalities detected.",
        TemperatureTier::Hot => {
            "Hot regions detected - May indicate inflammation or infection."
        }
    }
}

/// Whole-image verdict: estimate, tier, and condition text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageClassification {
    /// Biased whole-image temperature estimate.
    pub estimated_temperature: f64,
    /// Tier the estimate falls into.
    pub tier: TemperatureTier,
    /// Human-readable condition for the tier.
    pub condition: String,
}

/// Classify the whole-image temperature estimate (post-bias).
#[must_use]
pub fn classify_image(
    estimated_temperature: f64,
    thresholds: &TierThresholds,
) -> ImageClassification {
    let tier = thresholds.classify(estimated_temperature);
    ImageClassification {
        estimated_temperature,
        tier,
        condition: condition_text(tier).to_owned(),
    }
}

/// Count per-region temperature estimates into a tier histogram.
///
/// The histogram total always equals the number of estimates; an empty
/// iterator yields the all-zero histogram.
pub fn classify_regions<I>(estimates: I, thresholds: &TierThresholds) -> RegionHistogram
where
    I: IntoIterator<Item = f64>,
{
    let mut histogram = RegionHistogram::default();
    for estimate in estimates {
        histogram.record(thresholds.classify(estimate));
    }
    histogram
}
