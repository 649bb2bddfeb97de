//! String and duration helpers shared by the listers and the renderers

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

/// Strip one layer of matching quotes, or surrounding whitespace otherwise.
///
/// `"'abc'"` and `"\"abc\""` become `abc`; `"  abc  "` becomes `abc`.
/// Escaped or nested quotes are not interpreted.
pub fn trim_quote_and_space(input: &str) -> &str {
    let bytes = input.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &input[1..input.len() - 1];
        }
    }
    input.trim()
}

/// Render an elapsed number of seconds the way kubectl prints ages
/// (`45s`, `3m20s`, `5h`, `2d4h`, `1y30d`).
///
/// Up to one second of clock skew into the future reads as `0s`; anything
/// further is `<invalid>`.
pub fn human_duration(seconds: i64) -> String {
    if seconds < -1 {
        return "<invalid>".to_string();
    } else if seconds < 0 {
        return "0s".to_string();
    } else if seconds < 60 * 2 {
        return format!("{}s", seconds);
    }

    let minutes = seconds / 60;
    if minutes < 10 {
        let s = seconds % 60;
        if s == 0 {
            return format!("{}m", minutes);
        }
        return format!("{}m{}s", minutes, s);
    } else if minutes < 60 * 3 {
        return format!("{}m", minutes);
    }

    let hours = seconds / 3600;
    if hours < 8 {
        let m = minutes % 60;
        if m == 0 {
            return format!("{}h", hours);
        }
        return format!("{}h{}m", hours, m);
    } else if hours < 48 {
        return format!("{}h", hours);
    } else if hours < 24 * 8 {
        let h = hours % 24;
        if h == 0 {
            return format!("{}d", hours / 24);
        }
        return format!("{}d{}h", hours / 24, h);
    } else if hours < 24 * 365 * 2 {
        return format!("{}d", hours / 24);
    } else if hours < 24 * 365 * 8 {
        let d = (hours / 24) % 365;
        if d == 0 {
            return format!("{}y", hours / 24 / 365);
        }
        return format!("{}y{}d", hours / 24 / 365, d);
    }
    format!("{}y", hours / 24 / 365)
}

/// Age of an object given its creation timestamp
pub fn age(created: Option<&Time>) -> String {
    match created {
        Some(time) => human_duration(now_epoch_seconds() - time.0.timestamp()),
        None => "<unknown>".to_string(),
    }
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Join pairs as `k1=v1,k2=v2`.
///
/// Output order follows the iterator. `BTreeMap` (what k8s-openapi uses for
/// labels and selectors) therefore yields key order; a `HashMap` does not.
pub fn keys_string<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
