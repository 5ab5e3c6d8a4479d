use chrono::DateTime;

/// Compact USD rendering used by the leaderboards: `$1.50M`, `$2.5k`, `$42`.
/// Non-finite values render as an em-dash placeholder.
pub fn format_usd(v: f64) -> String {
    if !v.is_finite() {
        return "—".to_string();
    }
    if v >= 1_000_000.0 {
        format!("${:.2}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("${:.1}k", v / 1_000.0)
    } else {
        format!("${:.0}", v)
    }
}

/// Sign-aware variant for PnL columns: `-$1.2k`, `$340`.
pub fn format_usd_signed(v: f64) -> String {
    if !v.is_finite() {
        return "—".to_string();
    }
    let formatted = format_usd(v.abs());
    if v < 0.0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Shorten a wallet address to `0x` + `chars` prefix chars, an ellipsis,
/// and the last `chars` chars. Strings already short enough pass through,
/// and the full address stays available to callers for copy/verify.
pub fn short_addr(addr: &str, chars: usize) -> String {
    if addr.is_empty() {
        return String::new();
    }
    if addr.len() <= 2 * chars + 2 {
        return addr.to_string();
    }
    let prefix: String = addr.chars().take(2 + chars).collect();
    let suffix: String = {
        let all: Vec<char> = addr.chars().collect();
        all[all.len() - chars..].iter().collect()
    };
    format!("{prefix}…{suffix}")
}

/// Tape timestamp: `2024-01-15 08:30 UTC`. Zero and out-of-range stamps
/// render as a placeholder.
pub fn format_time(ts: i64) -> String {
    if ts == 0 {
        return "—".to_string();
    }
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "—".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Explorer links
// ---------------------------------------------------------------------------

pub fn polygonscan_tx(hash: &str) -> String {
    format!("https://polygonscan.com/tx/{hash}")
}

pub fn polygonscan_address(addr: &str) -> String {
    format!("https://polygonscan.com/address/{addr}")
}

pub fn market_url(slug: &str) -> String {
    format!("https://polymarket.com/market/{slug}")
}
