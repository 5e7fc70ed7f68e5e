//! Restock countdown math
//!
//! Two models are in play. Shops that restock on a fixed interval count down
//! from the `updatedAt` their provider reports. The honey shop restocks at
//! the top of every hour on the reference clock, so its countdown depends
//! only on the wall-clock time and must be recomputed on every render.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::stock::AggregateSnapshot;

/// Gear and seed shop restock interval
pub const GEAR_SEED_RESTOCK_SECS: i64 = 300;
/// Egg shop restock interval
pub const EGG_RESTOCK_SECS: i64 = 600;
/// Cosmetics shop restock interval
pub const COSMETICS_RESTOCK_SECS: i64 = 14_400;

const SECS_PER_HOUR: u32 = 3600;
const MANILA_OFFSET_SECS: i32 = 8 * 3600;

/// Fixed timezone the game's restock clock and "last updated" stamps use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    /// Asia/Manila, UTC+08:00 with no daylight saving
    pub fn manila() -> Self {
        Self {
            offset: FixedOffset::east_opt(MANILA_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
        }
    }

    /// Zone at a whole-hour offset from UTC, `None` if out of range
    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(|offset| Self { offset })
    }

    /// Convert an instant into the reference zone
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// 12-hour clock stamp, e.g. `03:04:05 PM`
    pub fn format_clock(&self, instant: DateTime<Utc>) -> String {
        self.localize(instant).format("%I:%M:%S %p").to_string()
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::manila()
    }
}

/// Seconds left until a fixed-interval restock, clamped to `0..=interval_secs`
///
/// A missing `updated_at`, or one too far in the past to subtract, is treated
/// as already elapsed. One in the future never shows more than a full interval.
pub fn remaining_secs(updated_at_ms: Option<i64>, interval_secs: i64, now: DateTime<Utc>) -> i64 {
    let Some(updated_at) = updated_at_ms else {
        return 0;
    };
    let Some(passed_ms) = now.timestamp_millis().checked_sub(updated_at) else {
        return 0;
    };
    let passed = passed_ms.div_euclid(1000);
    interval_secs.saturating_sub(passed).clamp(0, interval_secs.max(0))
}

/// Render seconds as `{h}h {m}m {s}s`, dropping the hour segment when zero
pub fn format_remaining(remaining_secs: i64) -> String {
    let remaining = remaining_secs.max(0);
    let h = remaining / 3600;
    let m = (remaining % 3600) / 60;
    let s = remaining % 60;

    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else {
        format!("{}m {}s", m, s)
    }
}

/// Fixed-interval restock countdown display
pub fn restock_countdown(updated_at_ms: Option<i64>, interval_secs: i64, now: DateTime<Utc>) -> String {
    format_remaining(remaining_secs(updated_at_ms, interval_secs, now))
}

/// Countdown to the next top of the hour, rendered `MMm SSs`
///
/// For any time with a non-zero second this is `59 - minute` minutes and
/// `60 - second` seconds. On an exact minute boundary it rolls over to whole
/// minutes (`12:30:00` gives `30m 00s`) rather than showing `29m 60s`.
pub fn honey_countdown<T: Timelike>(local_time: &T) -> String {
    let elapsed = local_time.minute() * 60 + local_time.second().min(59);
    let remaining = SECS_PER_HOUR - elapsed;
    format!("{:02}m {:02}s", remaining / 60, remaining % 60)
}

/// Every countdown shown alongside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockCountdowns {
    pub gear_seed: String,
    pub egg: String,
    pub cosmetics: String,
    pub honey: String,
}

impl RestockCountdowns {
    /// Compute all countdowns for a snapshot at `now`
    pub fn compute(snapshot: &AggregateSnapshot, now: DateTime<Utc>, zone: ReferenceZone) -> Self {
        Self {
            gear_seed: restock_countdown(snapshot.gear_seed_updated_at, GEAR_SEED_RESTOCK_SECS, now),
            egg: restock_countdown(snapshot.egg_updated_at, EGG_RESTOCK_SECS, now),
            cosmetics: restock_countdown(snapshot.cosmetics_updated_at, COSMETICS_RESTOCK_SECS, now),
            honey: honey_countdown(&zone.localize(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_fixed_interval_omits_zero_hours() {
        let now = Utc::now();
        let updated_at = now.timestamp_millis() - 250_000;
        assert_eq!(restock_countdown(Some(updated_at), 300, now), "0m 50s");
    }

    #[test]
    fn test_fixed_interval_clamps_at_zero() {
        let now = Utc::now();
        let updated_at = now.timestamp_millis() - 400_000;
        assert_eq!(restock_countdown(Some(updated_at), 300, now), "0m 0s");
    }

    #[test]
    fn test_fixed_interval_floors_partial_seconds() {
        let now = Utc.timestamp_millis_opt(1_717_000_010_999).unwrap();
        // 10.999s elapsed counts as 10s
        assert_eq!(remaining_secs(Some(1_717_000_000_000), 300, now), 290);
    }

    #[test]
    fn test_fixed_interval_with_hours() {
        let now = Utc::now();
        let updated_at = now.timestamp_millis() - 61_000;
        assert_eq!(restock_countdown(Some(updated_at), COSMETICS_RESTOCK_SECS, now), "3h 58m 59s");
    }

    #[test]
    fn test_extreme_updated_at_does_not_overflow() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 4, 10, 20).unwrap();
        assert_eq!(remaining_secs(Some(i64::MIN), GEAR_SEED_RESTOCK_SECS, now), 0);
        assert_eq!(remaining_secs(Some(i64::MIN + 1), EGG_RESTOCK_SECS, now), 0);
        assert_eq!(restock_countdown(Some(i64::MAX), GEAR_SEED_RESTOCK_SECS, now), "5m 0s");
        assert_eq!(restock_countdown(Some(i64::MAX), COSMETICS_RESTOCK_SECS, now), "4h 0m 0s");
    }

    #[test]
    fn test_future_updated_at_caps_at_interval() {
        let now = Utc::now();
        let updated_at = now.timestamp_millis() + 5_000;
        assert_eq!(restock_countdown(Some(updated_at), EGG_RESTOCK_SECS, now), "10m 0s");
    }

    #[test]
    fn test_missing_updated_at_is_elapsed() {
        assert_eq!(restock_countdown(None, EGG_RESTOCK_SECS, Utc::now()), "0m 0s");
    }

    #[test]
    fn test_honey_countdown() {
        assert_eq!(honey_countdown(&at(12, 15, 15)), "44m 45s");
        assert_eq!(honey_countdown(&at(12, 0, 15)), "59m 45s");
        assert_eq!(honey_countdown(&at(12, 59, 59)), "00m 01s");
        assert_eq!(honey_countdown(&at(12, 50, 51)), "09m 09s");
    }

    #[test]
    fn test_honey_countdown_minute_boundary_rolls_over() {
        assert_eq!(honey_countdown(&at(12, 30, 0)), "30m 00s");
        assert_eq!(honey_countdown(&at(12, 0, 0)), "60m 00s");
        assert_eq!(honey_countdown(&at(12, 59, 0)), "01m 00s");
    }

    #[test]
    fn test_reference_zone_is_utc_plus_eight() {
        let zone = ReferenceZone::manila();
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 7, 4, 5).unwrap();
        assert_eq!(zone.format_clock(instant), "03:04:05 PM");
        assert_eq!(honey_countdown(&zone.localize(instant)), "55m 55s");
    }

    #[test]
    fn test_compute_all_countdowns() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 4, 10, 20).unwrap();
        let mut snapshot = AggregateSnapshot::empty(now);
        snapshot.gear_seed_updated_at = Some(now.timestamp_millis() - 100_000);
        snapshot.egg_updated_at = Some(now.timestamp_millis());

        let countdowns = RestockCountdowns::compute(&snapshot, now, ReferenceZone::manila());
        assert_eq!(countdowns.gear_seed, "3m 20s");
        assert_eq!(countdowns.egg, "10m 0s");
        assert_eq!(countdowns.cosmetics, "0m 0s");
        assert_eq!(countdowns.honey, "49m 40s");
    }
}
