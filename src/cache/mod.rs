pub mod poller;

pub use poller::{PollConfig, PollState, Poller};

/// Deterministic cache key from an endpoint name and its query pairs.
/// Two pollers built from identical parameters share a key, so dedup and
/// supersession guards apply across them.
pub fn cache_key(endpoint: &str, pairs: &[(&str, String)]) -> String {
    let mut key = String::from(endpoint);
    for (k, v) in pairs {
        key.push('&');
        key.push_str(k);
        key.push('=');
        key.push_str(v);
    }
    key
}
