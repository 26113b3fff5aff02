// ── Access packages ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A purchasable access tier.
///
/// The wire name doubles as the hotspot profile name on the router, so a
/// package choice maps 1:1 to a `/ip/hotspot/user/profile` entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Package {
    #[serde(rename = "1_day")]
    #[strum(serialize = "1_day")]
    OneDay,
    #[serde(rename = "7_days")]
    #[strum(serialize = "7_days")]
    SevenDays,
    #[serde(rename = "30_days")]
    #[strum(serialize = "30_days")]
    ThirtyDays,
}

impl Package {
    /// Access duration granted on approval.
    pub fn duration_days(self) -> i64 {
        match self {
            Self::OneDay => 1,
            Self::SevenDays => 7,
            Self::ThirtyDays => 30,
        }
    }

    /// Price in Bangladeshi taka.
    pub fn price_bdt(self) -> u32 {
        match self {
            Self::OneDay => 10,
            Self::SevenDays => 30,
            Self::ThirtyDays => 100,
        }
    }

    /// Hotspot profile name on the router (same as the wire name).
    pub fn profile(self) -> &'static str {
        match self {
            Self::OneDay => "1_day",
            Self::SevenDays => "7_days",
            Self::ThirtyDays => "30_days",
        }
    }

    /// Human-readable label, e.g. `"7 Days"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::OneDay => "1 Day",
            Self::SevenDays => "7 Days",
            Self::ThirtyDays => "30 Days",
        }
    }
}
