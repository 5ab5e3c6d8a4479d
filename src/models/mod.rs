use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BUY" | "0" => Some(Side::Buy),
            "SELL" | "1" => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Subscription tier. Gates refresh cadence, batch sizes and feature flags.
/// Anything unrecognized is treated as the lowest tier rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Team,
}

impl Tier {
    pub fn from_str_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pro" => Tier::Pro,
            "team" => Tier::Team,
            _ => Tier::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Team => "team",
        }
    }

    /// Pro and Team share the paid feature set; Team adds portfolio copy.
    pub fn is_at_least_pro(&self) -> bool {
        matches!(self, Tier::Pro | Tier::Team)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WatchItem
// ---------------------------------------------------------------------------

/// A watchlisted market. Deduplicated by condition id, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchItem {
    pub condition_id: String,
    pub slug: String,
    pub question: String,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_api_str() {
        assert_eq!(Side::from_api_str("buy"), Some(Side::Buy));
        assert_eq!(Side::from_api_str("SELL"), Some(Side::Sell));
        assert_eq!(Side::from_api_str("1"), Some(Side::Sell));
        assert_eq!(Side::from_api_str("hold"), None);
    }

    #[test]
    fn test_tier_lenient_parse_defaults_to_free() {
        assert_eq!(Tier::from_str_lenient("PRO"), Tier::Pro);
        assert_eq!(Tier::from_str_lenient(" team "), Tier::Team);
        assert_eq!(Tier::from_str_lenient("enterprise"), Tier::Free);
        assert_eq!(Tier::from_str_lenient(""), Tier::Free);
    }

    #[test]
    fn test_tier_gating() {
        assert!(!Tier::Free.is_at_least_pro());
        assert!(Tier::Pro.is_at_least_pro());
        assert!(Tier::Team.is_at_least_pro());
    }
}
