//! Wall-clock helper for record timestamps.

use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC time truncated to millisecond precision.
///
/// Records carry ISO-8601 timestamps with millisecond resolution, so a value
/// written and read back compares equal.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn now_has_millisecond_precision() {
        let t = now();
        assert_eq!(t.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn now_serializes_as_rfc3339_utc() {
        let t = now();
        let json = serde_json::to_value(t).unwrap();
        let s = json.as_str().unwrap();
        assert!(s.ends_with('Z'));
        let back: DateTime<Utc> = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, t);
    }
}
