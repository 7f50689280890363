//! Session clock — timezone-aware trading windows and session dates.
//!
//! Futures sessions do not align with calendar days: the Globex session
//! opens at 18:00 exchange time the prior evening, so a bar stamped 19:00
//! Monday belongs to Tuesday's session. Daily risk counters key off the
//! session date, not the UTC calendar date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One intraday trading window in exchange-local time, inclusive bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TradingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TradingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Exchange session description: timezone, tradable windows, and the
/// local hour at which bars roll into the next session date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSpec {
    pub timezone: Tz,
    pub windows: Vec<TradingWindow>,
    pub rollover_hour: u32,
}

impl SessionSpec {
    /// Globex equity-index default: trade RTH 09:30–16:00 New York,
    /// sessions roll at 18:00.
    pub fn globex_rth() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            windows: vec![TradingWindow::new(
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            )],
            rollover_hour: 18,
        }
    }

    /// Whether a timestamp falls inside any configured trading window.
    ///
    /// An empty window list means the instrument trades around the clock.
    pub fn in_trading_window(&self, ts: DateTime<Utc>) -> bool {
        if self.windows.is_empty() {
            return true;
        }
        let local = ts.with_timezone(&self.timezone).time();
        self.windows.iter().any(|w| w.contains(local))
    }

    /// Session date a timestamp belongs to.
    ///
    /// Bars at or after `rollover_hour` in exchange-local time belong to
    /// the next day's session.
    pub fn session_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        let local = ts.with_timezone(&self.timezone);
        if local.time().hour() >= self.rollover_hour {
            local.date_naive() + Duration::days(1)
        } else {
            local.date_naive()
        }
    }

    /// Convert an exchange-local wall-clock moment to UTC.
    ///
    /// Ambiguous local times (DST fold) resolve to the earlier instant.
    pub fn local_to_utc(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        self.timezone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
