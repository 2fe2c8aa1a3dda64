//! Body-part-keyed advisory text.
//!
//! Maps a normalized body-part key and temperature tier to a fixed
//! multi-line advisory block. Unknown body parts fall back to the
//! reserved `"default"` entry. Table integrity (a default entry
//! present, every tier defined with non-empty text) is enforced when
//! the table is constructed or deserialized, never at request time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::TemperatureTier;
use crate::types::ConfigError;

/// Reserved key used when a body part is not in the table.
pub const DEFAULT_KEY: &str = "default";

/// Advisory text for each tier of a single body part.
///
/// All three tiers are required; a table override missing one fails to
/// deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAdvice {
    /// Advice for the cold/hypothermic tier.
    pub cold: String,
    /// Advice for the normal tier.
    pub normal: String,
    /// Advice for the hot/inflamed tier.
    pub hot: String,
}

impl TierAdvice {
    /// Text for the given tier.
    #[must_use]
    pub fn for_tier(&self, tier: TemperatureTier) -> &str {
        match tier {
            TemperatureTier::Cold => &self.cold,
            TemperatureTier::Normal => &self.normal,
            TemperatureTier::Hot => &self.hot,
        }
    }

    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        for tier in [
            TemperatureTier::Cold,
            TemperatureTier::Normal,
            TemperatureTier::Hot,
        ] {
            if self.for_tier(tier).trim().is_empty() {
                return Err(ConfigError::EmptyAdvice {
                    key: key.to_owned(),
                    tier,
                });
            }
        }
        Ok(())
    }
}

/// Validated (body part, tier) → advisory text table.
///
/// The default entry is held apart from the named parts so fallback
/// cannot fail; [`resolve`](Self::resolve) is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, TierAdvice>",
    into = "BTreeMap<String, TierAdvice>"
)]
pub struct ImplicationTable {
    default: TierAdvice,
    parts: BTreeMap<String, TierAdvice>,
}

impl ImplicationTable {
    /// Build a validated table from raw entries.
    ///
    /// Keys are normalized (trimmed, lowercased); the entry keyed
    /// [`DEFAULT_KEY`] becomes the fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDefault`] if no default entry is
    /// present and [`ConfigError::EmptyAdvice`] if any entry has empty
    /// text for some tier.
    pub fn new(entries: BTreeMap<String, TierAdvice>) -> Result<Self, ConfigError> {
        let mut default = None;
        let mut parts = BTreeMap::new();
        for (key, advice) in entries {
            let key = normalize_key(&key);
            advice.validate(&key)?;
            if key == DEFAULT_KEY {
                default = Some(advice);
            } else {
                parts.insert(key, advice);
            }
        }
        default.map_or(Err(ConfigError::MissingDefault), |default| {
            Ok(Self { default, parts })
        })
    }

    /// Parse and validate a table override from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML (including a
    /// key missing one of the three tiers), plus the validation errors
    /// of [`new`](Self::new).
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let entries: BTreeMap<String, TierAdvice> = toml::from_str(input)?;
        Self::new(entries)
    }

    /// Advisory text for a body part and tier.
    ///
    /// The key is matched case-insensitively; unknown parts resolve
    /// through the default entry. Always returns non-empty text.
    #[must_use]
    pub fn resolve(&self, body_part: &str, tier: TemperatureTier) -> &str {
        let key = normalize_key(body_part);
        self.parts
            .get(&key)
            .unwrap_or(&self.default)
            .for_tier(tier)
    }

    /// Keys of the named (non-default) entries, in sorted order.
    pub fn part_keys(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// The built-in table covering the common screening body parts.
    #[must_use]
    pub fn builtin() -> Self {
        let mut parts = BTreeMap::new();

        parts.insert(
            "head".to_owned(),
            advice(
                "Reduced temperature across the head region.\n\
                 This can reflect poor scalp circulation or recent cold exposure.\n\
                 Persistent coldness with dizziness or confusion warrants clinical assessment.",
                "Head region temperature is within the expected range.\n\
                 No abnormal thermal pattern detected.\n\
                 No follow-up is indicated by this screening.",
                "Elevated temperature across the head region.\n\
                 This can accompany sinus inflammation, local infection, or fever.\n\
                 If headache or fever persists, seek medical review.",
            ),
        );
        parts.insert(
            "chest".to_owned(),
            advice(
                "Reduced temperature across the chest.\n\
                 This can indicate restricted surface circulation.\n\
                 Recurring coldness with shortness of breath warrants clinical assessment.",
                "Chest temperature is within the expected range.\n\
                 No abnormal thermal pattern detected.\n\
                 No follow-up is indicated by this screening.",
                "Elevated temperature across the chest.\n\
                 This can accompany respiratory infection or local inflammation.\n\
                 If cough, pain, or fever persists, seek medical review.",
            ),
        );
        parts.insert(
            "arm".to_owned(),
            advice(
                "Reduced temperature in the arm.\n\
                 This can indicate restricted blood flow to the limb.\n\
                 Numbness or tingling alongside coldness warrants clinical assessment.",
                "Arm temperature is within the expected range.\n\
                 No abnormal thermal pattern detected.\n\
                 No follow-up is indicated by this screening.",
                "Elevated temperature in the arm.\n\
                 This can accompany joint inflammation or soft-tissue injury.\n\
                 If swelling or pain persists, seek medical review.",
            ),
        );
        parts.insert(
            "leg".to_owned(),
            advice(
                "Reduced temperature in the leg.\n\
                 This can indicate impaired peripheral circulation.\n\
                 Persistent coldness with discoloration warrants clinical assessment.",
                "Leg temperature is within the expected range.\n\
                 No abnormal thermal pattern detected.\n\
                 No follow-up is indicated by this screening.",
                "Elevated temperature in the leg.\n\
                 This can accompany vein inflammation, infection, or injury.\n\
                 If localized swelling or warmth persists, seek medical review.",
            ),
        );
        parts.insert(
            "back".to_owned(),
            advice(
                "Reduced temperature across the back.\n\
                 This can reflect restricted surface circulation.\n\
                 Recurring coldness with stiffness warrants clinical assessment.",
                "Back temperature is within the expected range.\n\
                 No abnormal thermal pattern detected.\n\
                 No follow-up is indicated by this screening.",
                "Elevated temperature across the back.\n\
                 This can accompany muscular strain or spinal inflammation.\n\
                 If pain limits movement or persists, seek medical review.",
            ),
        );

        Self {
            default: advice(
                "Reduced surface temperature detected.\n\
                 This can indicate restricted blood flow or prolonged cold exposure.\n\
                 If numbness, discoloration, or pain persists, consult a clinician.",
                "Surface temperature is within the expected range.\n\
                 No thermal abnormality detected for this area.\n\
                 No follow-up is indicated by this screening.",
                "Elevated surface temperature detected.\n\
                 Localized warmth can indicate inflammation or infection.\n\
                 If swelling, redness, or pain accompanies it, seek medical review.",
            ),
            parts,
        }
    }
}

impl TryFrom<BTreeMap<String, TierAdvice>> for ImplicationTable {
    type Error = ConfigError;

    fn try_from(entries: BTreeMap<String, TierAdvice>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<ImplicationTable> for BTreeMap<String, TierAdvice> {
    fn from(table: ImplicationTable) -> Self {
        let mut entries = table.parts;
        entries.insert(DEFAULT_KEY.to_owned(), table.default);
        entries
    }
}

fn advice(cold: &str, normal: &str, hot: &str) -> TierAdvice {
    TierAdvice {
        cold: cold.to_owned(),
        normal: normal.to_owned(),
        hot: hot.to_owned(),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}
