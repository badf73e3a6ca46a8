//! Trading session schedules and market calendars.
//!
//! A `SessionSchedule` is the engine's read-only view of a symbol's
//! trading hours: regular sessions, extended hours (pre-market and
//! after-hours), and a holiday calendar with early closes and late
//! opens. Sessions are defined in exchange-local time via `chrono_tz`;
//! DST transitions are handled by the timezone conversion.
//!
//! The schedule is computed and owned by the surrounding platform's
//! calendar subsystem; the fill engine only queries it.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Custom serde module for `chrono_tz::Tz`
mod tz_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Tz, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Custom serde module for `chrono::NaiveTime`
mod time_serde {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M:%S").map_err(serde::de::Error::custom)
    }
}

/// Session type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    /// Regular trading hours
    #[default]
    Regular,
    /// Pre-market trading
    PreMarket,
    /// After-hours trading
    AfterHours,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Regular => write!(f, "REGULAR"),
            SessionType::PreMarket => write!(f, "PRE_MARKET"),
            SessionType::AfterHours => write!(f, "AFTER_HOURS"),
        }
    }
}

/// Market status at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    /// Regular session is trading
    Open,
    /// Pre-market session is trading
    PreMarket,
    /// After-hours session is trading
    AfterHours,
    /// No session is trading
    #[default]
    Closed,
}

impl MarketStatus {
    /// True for the extended-hours statuses
    pub fn is_extended_hours(&self) -> bool {
        matches!(self, MarketStatus::PreMarket | MarketStatus::AfterHours)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketStatus::Open => write!(f, "OPEN"),
            MarketStatus::PreMarket => write!(f, "PRE_MARKET"),
            MarketStatus::AfterHours => write!(f, "AFTER_HOURS"),
            MarketStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Resolved session state at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current market status
    pub status: MarketStatus,
    /// Why the market is closed, when known (e.g. "Holiday")
    pub reason: Option<String>,
}

/// A single trading session within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSession {
    /// Session name (e.g. "Regular", "Pre-Market")
    pub name: String,
    /// Session type
    pub session_type: SessionType,
    /// Days this session is active
    pub active_days: Vec<Weekday>,
    /// Session start time (local timezone)
    #[serde(with = "time_serde")]
    pub start_time: NaiveTime,
    /// Session end time (local timezone).
    /// If end_time < start_time, the session crosses midnight.
    #[serde(with = "time_serde")]
    pub end_time: NaiveTime,
}

fn weekdays() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

impl TradingSession {
    /// Create a new trading session
    pub fn new(
        name: impl Into<String>,
        session_type: SessionType,
        start_time: NaiveTime,
        end_time: NaiveTime,
        active_days: Vec<Weekday>,
    ) -> Self {
        Self {
            name: name.into(),
            session_type,
            active_days,
            start_time,
            end_time,
        }
    }

    /// Create a regular trading session
    pub fn regular(start_time: NaiveTime, end_time: NaiveTime, active_days: Vec<Weekday>) -> Self {
        Self::new("Regular", SessionType::Regular, start_time, end_time, active_days)
    }

    /// Create a pre-market session
    pub fn pre_market(start_time: NaiveTime, end_time: NaiveTime, active_days: Vec<Weekday>) -> Self {
        Self::new(
            "Pre-Market",
            SessionType::PreMarket,
            start_time,
            end_time,
            active_days,
        )
    }

    /// Create an after-hours session
    pub fn after_hours(start_time: NaiveTime, end_time: NaiveTime, active_days: Vec<Weekday>) -> Self {
        Self::new(
            "After-Hours",
            SessionType::AfterHours,
            start_time,
            end_time,
            active_days,
        )
    }

    /// Create a continuous 24/7 session
    pub fn continuous() -> Self {
        let mut days = weekdays();
        days.push(Weekday::Sat);
        days.push(Weekday::Sun);
        Self::new(
            "Continuous",
            SessionType::Regular,
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
            days,
        )
    }

    /// Check if this session is active at the given day and time
    pub fn is_active(&self, weekday: Weekday, time: NaiveTime) -> bool {
        if !self.active_days.contains(&weekday) {
            return false;
        }

        // Handle sessions that cross midnight
        if self.end_time < self.start_time {
            time >= self.start_time || time < self.end_time
        } else {
            time >= self.start_time && time < self.end_time
        }
    }
}

/// Holiday calendar with early closes and late opens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketCalendar {
    /// Full-day holidays with an optional description
    #[serde(default)]
    pub holidays: HashMap<NaiveDate, Option<String>>,
    /// Dates where the regular session closes early
    #[serde(default)]
    pub early_closes: HashMap<NaiveDate, NaiveTime>,
    /// Dates where the regular session opens late
    #[serde(default)]
    pub late_opens: HashMap<NaiveDate, NaiveTime>,
}

impl MarketCalendar {
    /// Add a full-day holiday
    pub fn add_holiday(&mut self, date: NaiveDate, description: Option<String>) {
        self.holidays.insert(date, description);
    }

    /// Add an early close
    pub fn add_early_close(&mut self, date: NaiveDate, close: NaiveTime) {
        self.early_closes.insert(date, close);
    }

    /// Add a late open
    pub fn add_late_open(&mut self, date: NaiveDate, open: NaiveTime) {
        self.late_opens.insert(date, open);
    }

    /// Check if a date is a holiday
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }
}

/// Complete session schedule for a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSchedule {
    /// Exchange timezone (e.g. "America/New_York")
    #[serde(with = "tz_serde")]
    pub timezone: Tz,
    /// Regular trading sessions
    #[serde(default)]
    pub regular_sessions: Vec<TradingSession>,
    /// Extended hours sessions (pre-market, after-hours)
    #[serde(default)]
    pub extended_sessions: Vec<TradingSession>,
    /// Market calendar for holidays and irregular days
    #[serde(default)]
    pub calendar: MarketCalendar,
}

impl SessionSchedule {
    /// Create a new session schedule with the given timezone
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            regular_sessions: Vec::new(),
            extended_sessions: Vec::new(),
            calendar: MarketCalendar::default(),
        }
    }

    /// Create a 24/7 schedule (no restrictions)
    pub fn always_open() -> Self {
        Self::new(chrono_tz::UTC).with_session(TradingSession::continuous())
    }

    /// US equity hours: regular 09:30-16:00, pre-market 04:00-09:30,
    /// after-hours 16:00-20:00, Monday through Friday, New York time.
    pub fn us_equity() -> Self {
        let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        Self::new(chrono_tz::America::New_York)
            .with_session(TradingSession::regular(open, close, weekdays()))
            .with_session(TradingSession::pre_market(
                NaiveTime::from_hms_opt(4, 0, 0).unwrap(),
                open,
                weekdays(),
            ))
            .with_session(TradingSession::after_hours(
                close,
                NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                weekdays(),
            ))
    }

    /// Add a trading session
    pub fn with_session(mut self, session: TradingSession) -> Self {
        match session.session_type {
            SessionType::Regular => self.regular_sessions.push(session),
            _ => self.extended_sessions.push(session),
        }
        self
    }

    /// Add a holiday to the calendar
    pub fn with_holiday(mut self, date: NaiveDate, description: Option<String>) -> Self {
        self.calendar.add_holiday(date, description);
        self
    }

    /// Add an early close to the calendar
    pub fn with_early_close(mut self, date: NaiveDate, close: NaiveTime) -> Self {
        self.calendar.add_early_close(date, close);
        self
    }

    /// Check if a regular session is trading at the given UTC time
    pub fn is_open(&self, utc_time: DateTime<Utc>) -> bool {
        let local_time = utc_time.with_timezone(&self.timezone);
        let date = local_time.date_naive();
        let time = local_time.time();
        let weekday = local_time.weekday();

        if self.calendar.is_holiday(date) {
            return false;
        }

        self.regular_sessions
            .iter()
            .any(|s| s.is_active(weekday, time))
    }

    /// Check if an extended-hours session is trading at the given UTC time
    pub fn is_extended_hours(&self, utc_time: DateTime<Utc>) -> bool {
        let local_time = utc_time.with_timezone(&self.timezone);
        let date = local_time.date_naive();
        let time = local_time.time();
        let weekday = local_time.weekday();

        if self.calendar.is_holiday(date) {
            return false;
        }

        self.extended_sessions
            .iter()
            .any(|s| s.is_active(weekday, time))
    }

    /// Resolve the session state at the given UTC time
    pub fn state_at(&self, utc_time: DateTime<Utc>) -> SessionState {
        let local_time = utc_time.with_timezone(&self.timezone);
        let date = local_time.date_naive();
        let time = local_time.time();
        let weekday = local_time.weekday();

        if self.calendar.is_holiday(date) {
            return SessionState {
                status: MarketStatus::Closed,
                reason: Some("Holiday".to_string()),
            };
        }

        if self
            .regular_sessions
            .iter()
            .any(|s| s.is_active(weekday, time))
        {
            return SessionState {
                status: MarketStatus::Open,
                reason: None,
            };
        }

        for session in &self.extended_sessions {
            if session.is_active(weekday, time) {
                let status = match session.session_type {
                    SessionType::PreMarket => MarketStatus::PreMarket,
                    SessionType::AfterHours => MarketStatus::AfterHours,
                    SessionType::Regular => MarketStatus::Open,
                };
                return SessionState {
                    status,
                    reason: None,
                };
            }
        }

        SessionState {
            status: MarketStatus::Closed,
            reason: None,
        }
    }

    /// Regular session open time on a date, honoring late opens
    pub fn session_open_time(&self, date: NaiveDate) -> Option<NaiveTime> {
        if self.calendar.is_holiday(date) {
            return None;
        }

        if let Some(late) = self.calendar.late_opens.get(&date) {
            return Some(*late);
        }

        let weekday = date.weekday();
        self.regular_sessions
            .iter()
            .filter(|s| s.active_days.contains(&weekday))
            .map(|s| s.start_time)
            .min()
    }

    /// Regular session close time on a date, honoring early closes
    pub fn session_close_time(&self, date: NaiveDate) -> Option<NaiveTime> {
        if self.calendar.is_holiday(date) {
            return None;
        }

        if let Some(early) = self.calendar.early_closes.get(&date) {
            return Some(*early);
        }

        let weekday = date.weekday();
        self.regular_sessions
            .iter()
            .filter(|s| s.active_days.contains(&weekday))
            .map(|s| s.end_time)
            .max()
    }

    /// Regular session open on a date, as a UTC instant
    pub fn session_open_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let open = self.session_open_time(date)?;
        self.timezone
            .from_local_datetime(&date.and_time(open))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Regular session close on a date, as a UTC instant
    pub fn session_close_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let close = self.session_close_time(date)?;
        self.timezone
            .from_local_datetime(&date.and_time(close))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Exchange-local calendar date of a UTC instant
    pub fn local_date(&self, utc_time: DateTime<Utc>) -> NaiveDate {
        utc_time.with_timezone(&self.timezone).date_naive()
    }
}

impl Default for SessionSchedule {
    fn default() -> Self {
        Self::always_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2024-03-04 is a Monday
    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        // 14:30 UTC == 09:30 New York (EST)
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn test_us_equity_regular_session() {
        let schedule = SessionSchedule::us_equity();
        assert!(!schedule.is_open(utc(14, 29)));
        assert!(schedule.is_open(utc(14, 30)));
        assert!(schedule.is_open(utc(20, 59)));
        assert!(!schedule.is_open(utc(21, 0)));
    }

    #[test]
    fn test_us_equity_extended_hours() {
        let schedule = SessionSchedule::us_equity();
        // 09:00 New York == 14:00 UTC -> pre-market
        assert_eq!(schedule.state_at(utc(14, 0)).status, MarketStatus::PreMarket);
        // 16:30 New York == 21:30 UTC -> after-hours
        assert_eq!(schedule.state_at(utc(21, 30)).status, MarketStatus::AfterHours);
        // 02:00 New York == 07:00 UTC -> closed
        assert_eq!(schedule.state_at(utc(7, 0)).status, MarketStatus::Closed);
    }

    #[test]
    fn test_weekend_closed() {
        let schedule = SessionSchedule::us_equity();
        // 2024-03-02 is a Saturday
        let saturday = Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
        assert!(!schedule.is_open(saturday));
        assert!(!schedule.is_extended_hours(saturday));
    }

    #[test]
    fn test_holiday_closed_with_reason() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let schedule = SessionSchedule::us_equity().with_holiday(date, Some("Test holiday".into()));
        let state = schedule.state_at(utc(15, 0));
        assert_eq!(state.status, MarketStatus::Closed);
        assert_eq!(state.reason.as_deref(), Some("Holiday"));
        assert_eq!(schedule.session_open_time(date), None);
    }

    #[test]
    fn test_session_open_close_utc() {
        let schedule = SessionSchedule::us_equity();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(schedule.session_open_utc(date), Some(utc(14, 30)));
        assert_eq!(schedule.session_close_utc(date), Some(utc(21, 0)));
    }

    #[test]
    fn test_early_close_overrides_schedule() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let schedule = SessionSchedule::us_equity()
            .with_early_close(date, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        // 13:00 New York == 18:00 UTC
        assert_eq!(schedule.session_close_utc(date), Some(utc(18, 0)));
    }

    #[test]
    fn test_midnight_crossing_session() {
        let session = TradingSession::regular(
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            vec![Weekday::Mon],
        );
        assert!(session.is_active(Weekday::Mon, NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
        assert!(session.is_active(Weekday::Mon, NaiveTime::from_hms_opt(2, 0, 0).unwrap()));
        assert!(!session.is_active(Weekday::Mon, NaiveTime::from_hms_opt(16, 30, 0).unwrap()));
    }

    #[test]
    fn test_always_open() {
        let schedule = SessionSchedule::always_open();
        assert!(schedule.is_open(utc(3, 0)));
        assert_eq!(schedule.state_at(utc(3, 0)).status, MarketStatus::Open);
    }
}
