use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Wall-clock `HH:MM` serialization for availability window times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Calendar weekday, Monday-first. Declaration order drives both `Ord` and the
/// serialized order of the weekly table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Weekday of a calendar date (proleptic Gregorian, Monday = 0).
    pub fn from_date(date: NaiveDate) -> Weekday {
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|day| day.name() == s)
            .ok_or_else(|| AvailabilityError::InvalidWeekdayName(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl TimeWindow {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self { start_time, end_time }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start_time <= time && time <= self.end_time
    }
}

/// Per-doctor weekly schedule. A day mapped to `None` (or absent entirely) is
/// a day the doctor does not see patients.
pub type WeekSchedule = BTreeMap<Weekday, Option<TimeWindow>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub availability: WeekSchedule,
}

impl WeeklyAvailability {
    /// Schedule assigned when a doctor account is provisioned: weekdays
    /// 09:00-17:00, Saturday closed, Sunday 09:00-14:00.
    pub fn default_week() -> WeekSchedule {
        let nine_to_five = TimeWindow::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        );
        let sunday_window = TimeWindow::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        );

        let mut schedule = WeekSchedule::new();
        for day in [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
        ] {
            schedule.insert(day, Some(nine_to_five));
        }
        schedule.insert(Weekday::Saturday, None);
        schedule.insert(Weekday::Sunday, Some(sunday_window));
        schedule
    }

    fn window_for(&self, day: Weekday) -> Option<&TimeWindow> {
        self.availability.get(&day).and_then(|window| window.as_ref())
    }

    /// Admission check for a requested appointment timestamp.
    pub fn validate_slot(&self, at: NaiveDateTime) -> Result<(), AvailabilityError> {
        let day = Weekday::from_date(at.date());
        let window = self
            .window_for(day)
            .ok_or(AvailabilityError::UnavailableWeekday)?;

        if !window.contains(at.time()) {
            return Err(AvailabilityError::OutsideTimeWindow);
        }

        Ok(())
    }

    /// Boolean availability query. A closed day and an out-of-window time are
    /// indistinguishable here, unlike the admission path.
    pub fn is_open_at(&self, date: NaiveDate, time: NaiveTime) -> bool {
        match self.window_for(Weekday::from_date(date)) {
            Some(window) => window.contains(time),
            None => false,
        }
    }

    /// Replace a single weekday's window. Window ordering is not validated
    /// here; the stored schedule reflects whatever the caller submitted.
    pub fn set_window(&mut self, day: Weekday, window: TimeWindow) {
        self.availability.insert(day, Some(window));
    }
}

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Doctor availability data not found")]
    NoAvailabilityRecord,

    #[error("Doctor is not available on the selected day")]
    UnavailableWeekday,

    #[error("Doctor is not available at the selected time")]
    OutsideTimeWindow,

    #[error("Invalid day of the week")]
    InvalidWeekdayName(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityWindowRequest {
    pub day_of_week: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}
