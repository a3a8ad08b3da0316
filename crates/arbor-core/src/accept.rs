//! `Accept` header parsing.

use std::collections::BTreeMap;

/// Parse an `Accept` header into media types, most preferred first.
///
/// Entries are bucketed by `floor(q * 100)`; buckets are emitted from the
/// highest preference down and keep header order inside a bucket. Entries
/// without a `q` parameter weigh `1.0`; entries with `q=0` are dropped. An
/// empty header accepts anything (`*/*`).
pub fn parse_accept(header: &str) -> Vec<String> {
    let mut buckets: BTreeMap<u32, Vec<String>> = BTreeMap::new();

    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let media_type = parts.next().unwrap_or_default().trim();
        if media_type.is_empty() {
            continue;
        }

        let mut weight = 100;
        for param in parts {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("q") {
                weight = quantize(value.trim());
            }
        }
        if weight == 0 {
            continue;
        }

        buckets
            .entry(weight)
            .or_default()
            .push(media_type.to_ascii_lowercase());
    }

    if buckets.is_empty() {
        return vec!["*/*".to_string()];
    }

    buckets.into_values().rev().flatten().collect()
}

/// `floor(q * 100)` without going through floating point, clamped to
/// `0..=100`. Unparseable weights count as `1.0`.
fn quantize(q: &str) -> u32 {
    let (whole, fraction) = q.split_once('.').unwrap_or((q, ""));
    let Ok(whole) = whole.parse::<u32>() else {
        return 100;
    };
    if whole >= 1 {
        return 100;
    }

    let digits: String = fraction.chars().take(2).collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return 100;
    }
    let padded = format!("{:0<2}", digits);
    padded.parse::<u32>().unwrap_or(100)
}
