use serde::Serialize;
use std::fmt;

use crate::feed::ApiTrade;

/// Heuristic read on what a tape entry represents, keyed on price band and
/// side. A pro-tier annotation; purely informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternTag {
    HighConviction,
    Longshot,
    Momentum,
    PositionBuild,
    ExitNearDollar,
    CutHedge,
    Trim,
}

impl PatternTag {
    pub fn label(&self) -> &'static str {
        match self {
            PatternTag::HighConviction => "High conviction",
            PatternTag::Longshot => "Longshot",
            PatternTag::Momentum => "Momentum",
            PatternTag::PositionBuild => "Position build",
            PatternTag::ExitNearDollar => "Exit (near $1)",
            PatternTag::CutHedge => "Cut / hedge",
            PatternTag::Trim => "Trim",
        }
    }
}

impl fmt::Display for PatternTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tag a trade by price band. Returns `None` for non-finite prices and
/// unrecognized sides rather than guessing.
pub fn pattern_tag(trade: &ApiTrade) -> Option<PatternTag> {
    let p = trade.price;
    if !p.is_finite() {
        return None;
    }

    match trade.side.as_str() {
        "BUY" => Some(if p >= 0.9 {
            PatternTag::HighConviction
        } else if p <= 0.1 {
            PatternTag::Longshot
        } else if p >= 0.6 {
            PatternTag::Momentum
        } else {
            PatternTag::PositionBuild
        }),
        "SELL" => Some(if p >= 0.9 {
            PatternTag::ExitNearDollar
        } else if p <= 0.2 {
            PatternTag::CutHedge
        } else {
            PatternTag::Trim
        }),
        _ => None,
    }
}
