use crate::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;

/// How far ahead a desk is booked
pub const DAYS_AHEAD: u64 = 7;

/// Working day booked on the target date, in local time
pub const WORKDAY_START_HOUR: u32 = 6;
pub const WORKDAY_END_HOUR: u32 = 18;

/// The slot to book: a calendar date one week out, 06:00-18:00 local.
///
/// Times are epoch milliseconds, the unit the booking dashboard expects in
/// its `startTime`/`endTime` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingWindow {
    pub date: NaiveDate,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl BookingWindow {
    /// Compute the window for the given "now".
    ///
    /// Calendar days are added to the local date, so daylight-saving
    /// transitions never move the booking to a different day.
    pub fn compute<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Self> {
        let tz = now.timezone();
        let date = now
            .date_naive()
            .checked_add_days(Days::new(DAYS_AHEAD))
            .ok_or_else(|| Error::InvalidTime(format!("{} days after {} overflows", DAYS_AHEAD, now.date_naive())))?;

        let start_ms = local_millis(&tz, date, WORKDAY_START_HOUR)?;
        let end_ms = local_millis(&tz, date, WORKDAY_END_HOUR)?;

        tracing::debug!(%date, start_ms, end_ms, "Computed booking window");

        Ok(Self {
            date,
            start_ms,
            end_ms,
        })
    }
}

fn local_millis<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32) -> Result<i64> {
    let time = NaiveTime::from_hms_milli_opt(hour, 0, 0, 0)
        .ok_or_else(|| Error::InvalidTime(format!("invalid hour {}", hour)))?;

    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| {
            Error::InvalidTime(format!("{} {:02}:00 does not exist in local time", date, hour))
        })
}
