//! Point timestamps: the path format used by range queries and the
//! millisecond encoding used in storage.

use time::{
    Duration, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

const NANOS_PER_MILLI: i128 = 1_000_000;

/// `YYYY-MM-DDTHH:MM:SS±HHMM`, e.g. `2024-01-01T00:00:00+0000`.
pub const PATH_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

pub fn parse_path_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(raw, PATH_FORMAT)
}

/// Current UTC time truncated to what storage keeps.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000_000))
}

/// Whole milliseconds at or before `ts`; the stored form of a point's time.
pub fn to_unix_millis(ts: OffsetDateTime) -> i64 {
    ts.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI) as i64
}

/// Whole milliseconds at or after `ts`. Window bounds go through this so
/// `stored >= ceil(start)` and `stored < ceil(end)` match `start <= ts < end`
/// for millisecond-precision points.
pub fn to_unix_millis_ceil(ts: OffsetDateTime) -> i64 {
    let nanos = ts.unix_timestamp_nanos();
    let millis = nanos.div_euclid(NANOS_PER_MILLI);
    if nanos.rem_euclid(NANOS_PER_MILLI) == 0 {
        millis as i64
    } else {
        (millis + 1) as i64
    }
}

pub fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map(|ts| ts.to_offset(UtcOffset::UTC))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn parses_path_format_with_offset() {
        let ts = parse_path_timestamp("2024-01-01T02:00:00+0200").unwrap();
        assert_eq!(ts, datetime!(2024-01-01 00:00:00 UTC));
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_path_timestamp("2024-01-01").is_err());
        assert!(parse_path_timestamp("2024-01-01T00:00:00Z").is_err());
        assert!(parse_path_timestamp("2024-01-01T00:00:00+00:00").is_err());
        assert!(parse_path_timestamp("yesterday").is_err());
    }

    #[test]
    fn millis_survive_storage() {
        let now = now_utc();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
        assert_eq!(from_unix_millis(to_unix_millis(now)).unwrap(), now);
    }

    #[test]
    fn ceil_rounds_only_partial_millis() {
        let whole = datetime!(2024-01-01 00:00:00 UTC);
        assert_eq!(to_unix_millis_ceil(whole), to_unix_millis(whole));

        let partial = whole + Duration::microseconds(500);
        assert_eq!(to_unix_millis(partial), 1_704_067_200_000);
        assert_eq!(to_unix_millis_ceil(partial), 1_704_067_200_001);

        let before_epoch = OffsetDateTime::UNIX_EPOCH - Duration::microseconds(500);
        assert_eq!(to_unix_millis(before_epoch), -1);
        assert_eq!(to_unix_millis_ceil(before_epoch), 0);
    }

    #[test]
    fn millis_are_offset_independent() {
        let utc = datetime!(2024-01-01 00:00:00 UTC);
        let shifted = datetime!(2024-01-01 05:30:00 +05:30);
        assert_eq!(to_unix_millis(utc), to_unix_millis(shifted));
        assert_eq!(to_unix_millis(utc), 1_704_067_200_000);
    }
}
