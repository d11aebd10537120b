//! Switch value parsing
//!
//! Switches are tokens such as `-force` or `-depth=3`. Keys are compared
//! without their leading dashes, so `get_switch_value(&switches, "depth")`
//! and `get_switch_value(&switches, "-depth")` are the same lookup.

fn normalize_key(key: &str) -> &str {
    key.trim_start_matches('-')
}

/// Recognized `(key, value)` pairs of the switches that carry a value
///
/// Tokens without `=` are boolean switches and do not appear here. The
/// token is split on its first `=` only; a trailing `=` gives an empty value.
pub fn parse_switch_values(switches: &[String]) -> Vec<(String, String)> {
    switches
        .iter()
        .filter_map(|switch| switch.split_once('='))
        .map(|(key, value)| (normalize_key(key).to_string(), value.to_string()))
        .collect()
}

/// Value of the first switch matching `key`, or an empty string
pub fn get_switch_value(switches: &[String], key: &str) -> String {
    let wanted = normalize_key(key);
    parse_switch_values(switches)
        .into_iter()
        .find(|(name, _)| name == wanted)
        .map(|(_, value)| value)
        .unwrap_or_default()
}

/// Whether a switch named `key` was passed, with or without a value
pub fn contains_switch(switches: &[String], key: &str) -> bool {
    let wanted = normalize_key(key);
    switches.iter().any(|switch| {
        let name = switch.split_once('=').map_or(switch.as_str(), |(k, _)| k);
        normalize_key(name) == wanted
    })
}
