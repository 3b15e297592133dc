//! Timetable merging and next departure lookup.

use chrono::{Timelike, Utc};
use chrono_tz::Tz;
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A departure time of day, as written in the dataset ("08:30").
///
/// Ordered by minute of day first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartureTime {
    minutes: u16,
    label: String,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TimeParseError {
    #[error("\"{0}\" isn't in HH:MM format")]
    Malformed(String),

    #[error("\"{0}\" has a non-numeric hour or minute")]
    NotANumber(String),

    #[error("\"{0}\" is outside of a day")]
    OutOfRange(String),
}

impl DepartureTime {
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let s = s.trim();
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| TimeParseError::Malformed(s.to_string()))?;

        // u16::from_str also takes a leading '+' and any number of digits
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(TimeParseError::NotANumber(s.to_string()));
        }
        if !(1..=2).contains(&hour.len()) || minute.len() != 2 {
            return Err(TimeParseError::Malformed(s.to_string()));
        }

        let not_a_number = |_| TimeParseError::NotANumber(s.to_string());
        let hour: u16 = hour.parse().map_err(not_a_number)?;
        let minute: u16 = minute.parse().map_err(not_a_number)?;

        if hour >= 24 || minute >= 60 {
            return Err(TimeParseError::OutOfRange(s.to_string()));
        }

        Ok(DepartureTime {
            minutes: hour * 60 + minute,
            label: s.to_string(),
        })
    }

    /// Minute of day, `hours * 60 + minutes`
    pub fn minutes(&self) -> u16 {
        self.minutes
    }

    pub fn hour(&self) -> u16 {
        self.minutes / 60
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn period(&self) -> Period {
        if self.hour() < 12 {
            Period::Morning
        } else {
            Period::Afternoon
        }
    }
}

impl FromStr for DepartureTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DepartureTime::parse(s)
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for DepartureTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Afternoon,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Today,
    Tomorrow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NextDeparture {
    pub time: DepartureTime,
    pub day: Day,
}

/// Malformed entries are logged and left out rather than failing the route
fn parse_all<'a>(times: impl IntoIterator<Item = &'a String>) -> impl Iterator<Item = DepartureTime> {
    times
        .into_iter()
        .filter_map(|t| match DepartureTime::parse(t) {
            Ok(time) => Some(time),
            Err(e) => {
                warn!("skipping departure time: {e}");
                None
            }
        })
}

/// The single timetable shown to riders.
///
/// A non-empty `schedule` is trusted as-is. Otherwise every vehicle's times are merged in
/// vehicle id order, deduplicated and sorted.
pub fn canonical_timetable(
    schedule: Option<&[String]>,
    schedule_by_vehicle: Option<&BTreeMap<String, Vec<String>>>,
) -> Vec<DepartureTime> {
    if let Some(schedule) = schedule.filter(|s| !s.is_empty()) {
        return parse_all(schedule).collect();
    }

    let Some(by_vehicle) = schedule_by_vehicle else {
        return vec![];
    };

    let mut times = parse_all(by_vehicle.values().flatten())
        .unique_by(|t| t.label.clone())
        .collect_vec();
    times.sort();

    times
}

/// First departure strictly after `now_minutes`, or tomorrow's first one if today's are over.
///
/// `times` must be ascending.
pub fn find_next(times: &[DepartureTime], now_minutes: u16) -> Option<NextDeparture> {
    if let Some(time) = times.iter().find(|t| t.minutes > now_minutes) {
        return Some(NextDeparture {
            time: time.clone(),
            day: Day::Today,
        });
    }

    times.first().map(|time| NextDeparture {
        time: time.clone(),
        day: Day::Tomorrow,
    })
}

#[derive(Clone, Debug, Serialize)]
pub struct Slot {
    pub time: DepartureTime,
    pub is_next: bool,
    /// Already departed today
    pub is_past: bool,
}

/// Everything the schedule panel needs, split into AM and PM
#[derive(Clone, Debug, Default, Serialize)]
pub struct ScheduleBoard {
    pub next: Option<NextDeparture>,
    pub morning: Vec<Slot>,
    pub afternoon: Vec<Slot>,
}

impl ScheduleBoard {
    pub fn build(times: &[DepartureTime], now_minutes: u16) -> Self {
        let next = find_next(times, now_minutes);
        let mut board = ScheduleBoard {
            next,
            ..Default::default()
        };

        for time in times {
            let slot = Slot {
                is_next: board.next.as_ref().is_some_and(|n| n.time.label == time.label),
                is_past: time.minutes < now_minutes,
                time: time.clone(),
            };

            match time.period() {
                Period::Morning => board.morning.push(slot),
                Period::Afternoon => board.afternoon.push(slot),
            }
        }

        board
    }

    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.afternoon.is_empty()
    }
}

/// Current minute of day in the service's time zone
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    tz: Tz,
    fixed: Option<u16>,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        Clock { tz, fixed: None }
    }

    /// A clock stuck at the given minute of day
    pub fn fixed(tz: Tz, minutes: u16) -> Self {
        Clock {
            tz,
            fixed: Some(minutes % MINUTES_PER_DAY),
        }
    }

    pub fn now_minutes(&self) -> u16 {
        if let Some(minutes) = self.fixed {
            return minutes;
        }

        let now = Utc::now().with_timezone(&self.tz);
        (now.hour() * 60 + now.minute()) as u16
    }
}
