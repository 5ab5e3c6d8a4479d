use std::time::Duration;

use crate::models::Tier;

/// Feature gates per tier. Everything here is client-trusted presentation
/// policy, not security enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierFlags {
    pub csv_export: bool,
    pub leaderboards: bool,
    pub copy_to_watchlist: bool,
}

/// Engine parameters derived from the subscription tier.
///
/// Paid tiers scan a bigger slice of the tape, lower the notional floor and
/// refresh faster; the visible row count stays fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    /// Tape fetch size.
    pub tape_limit: u32,
    /// Radar fetch sizes (market grouping scans fewer rows than wallet grouping).
    pub radar_market_limit: u32,
    pub radar_wallet_limit: u32,
    /// Tape slice scanned when building ranking candidates.
    pub ranking_scan_limit: u32,
    /// Minimum notional (USDC) a trade must clear to enter the tape.
    pub min_notional: u64,
    pub tape_refresh: Duration,
    pub radar_refresh: Duration,
    pub ranking_refresh: Duration,
    /// Age after which a cached batch is refetched on read.
    pub stale_time: Duration,
    pub visible_rows: usize,
    /// Wallets carried from phase-1 tape aggregation into per-wallet
    /// enrichment. Zero disables the ranking entirely.
    pub candidate_wallets: usize,
    pub flags: TierFlags,
}

impl TierPolicy {
    /// Total mapping; every tier yields a complete parameter set.
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Free => Self {
                tape_limit: 15,
                radar_market_limit: 60,
                radar_wallet_limit: 80,
                ranking_scan_limit: 200,
                min_notional: 1000,
                tape_refresh: Duration::from_secs(30),
                radar_refresh: Duration::from_secs(60),
                ranking_refresh: Duration::from_secs(30),
                stale_time: Duration::from_secs(20),
                visible_rows: 10,
                candidate_wallets: 0,
                flags: TierFlags {
                    csv_export: false,
                    leaderboards: false,
                    copy_to_watchlist: false,
                },
            },
            Tier::Pro => Self {
                tape_limit: 40,
                radar_market_limit: 200,
                radar_wallet_limit: 250,
                ranking_scan_limit: 600,
                min_notional: 150,
                tape_refresh: Duration::from_secs(10),
                radar_refresh: Duration::from_secs(20),
                ranking_refresh: Duration::from_secs(30),
                stale_time: Duration::from_secs(20),
                visible_rows: 10,
                candidate_wallets: 10,
                flags: TierFlags {
                    csv_export: true,
                    leaderboards: true,
                    copy_to_watchlist: false,
                },
            },
            Tier::Team => Self {
                flags: TierFlags {
                    csv_export: true,
                    leaderboards: true,
                    copy_to_watchlist: true,
                },
                ..Self::for_tier(Tier::Pro)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_is_total() {
        for tier in [Tier::Free, Tier::Pro, Tier::Team] {
            let p = TierPolicy::for_tier(tier);
            assert!(p.tape_limit > 0);
            assert!(p.visible_rows > 0);
            assert!(p.min_notional > 0);
        }
    }

    #[test]
    fn test_free_tier_parameters() {
        let p = TierPolicy::for_tier(Tier::Free);
        assert_eq!(p.tape_limit, 15);
        assert_eq!(p.min_notional, 1000);
        assert_eq!(p.candidate_wallets, 0, "ranking disabled on free");
        assert!(!p.flags.csv_export);
        assert!(!p.flags.copy_to_watchlist);
    }

    #[test]
    fn test_paid_tiers_widen_and_speed_up() {
        let free = TierPolicy::for_tier(Tier::Free);
        let pro = TierPolicy::for_tier(Tier::Pro);
        assert!(pro.tape_limit > free.tape_limit);
        assert!(pro.min_notional < free.min_notional);
        assert!(pro.tape_refresh < free.tape_refresh);
        assert!(pro.flags.csv_export);
    }

    #[test]
    fn test_team_is_pro_plus_copy() {
        let pro = TierPolicy::for_tier(Tier::Pro);
        let team = TierPolicy::for_tier(Tier::Team);
        assert_eq!(team.tape_limit, pro.tape_limit);
        assert!(!pro.flags.copy_to_watchlist);
        assert!(team.flags.copy_to_watchlist);
    }

    #[test]
    fn test_unrecognized_tier_string_gets_free_policy() {
        let p = TierPolicy::for_tier(Tier::from_str_lenient("platinum"));
        assert_eq!(p, TierPolicy::for_tier(Tier::Free));
    }
}
