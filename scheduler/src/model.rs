use crate::clock::ClockTime;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// A cultural institution offering visits.
///
/// `availability` maps each open date to the start times offered on that
/// date, in the order they were declared. Dates iterate in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Classes that can visit at the same time.
    pub capacity: u32,
    /// Program length in minutes.
    pub duration: u32,
    #[serde(default)]
    pub availability: BTreeMap<NaiveDate, Vec<ClockTime>>,
}

impl Institution {
    /// Every `(date, time)` the institution offers, in enumeration order.
    pub fn slots(&self) -> impl Iterator<Item = (NaiveDate, ClockTime)> + '_ {
        self.availability
            .iter()
            .flat_map(|(&date, times)| times.iter().map(move |&time| (date, time)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPart {
    Morning,
    Afternoon,
}

impl DayPart {
    /// Whether a visit starting at `time` falls in this part of the day.
    pub fn contains(self, time: ClockTime) -> bool {
        match self {
            DayPart::Morning => time < ClockTime::AFTERNOON_START,
            DayPart::Afternoon => time >= ClockTime::AFTERNOON_START,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day part {0:?}, expected morning or afternoon")]
pub struct DayPartError(String);

impl FromStr for DayPart {
    type Err = DayPartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "ochtend" => Ok(DayPart::Morning),
            "afternoon" | "middag" => Ok(DayPart::Afternoon),
            _ => Err(DayPartError(s.to_string())),
        }
    }
}

/// A registered school class waiting for one or two visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRegistration {
    pub id: String,
    pub teacher_name: String,
    pub college: String,
    pub school_address: String,
    pub class_name: String,
    pub student_count: String,
    pub year: String,
    /// Institution names the class visited before, matched exactly.
    #[serde(default)]
    pub previous_visits: Vec<String>,
    /// `None` means any date is fine.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub selected_day: Option<NaiveDate>,
    pub activity_count: u8,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub day_part: Option<DayPart>,
}

impl ClassRegistration {
    pub fn accepts_date(&self, date: NaiveDate) -> bool {
        self.selected_day.is_none_or(|day| day == date)
    }

    pub fn has_visited(&self, institution_name: &str) -> bool {
        self.previous_visits.iter().any(|visit| visit == institution_name)
    }
}

/// One committed visit of one class to one institution slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub class_id: String,
    pub institution_id: String,
    pub date: NaiveDate,
    pub time: ClockTime,
    pub duration: u32,
}

impl Assignment {
    pub fn occupies(&self, institution_id: &str, date: NaiveDate, time: ClockTime) -> bool {
        self.institution_id == institution_id && self.date == date && self.time == time
    }

    /// Minutes since midnight at which the visit ends.
    pub fn end_minutes(&self) -> u32 {
        self.time.minutes_after(self.duration)
    }
}

/// The result of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// In the order they were committed.
    pub assignments: Vec<Assignment>,
    pub conflicts: Vec<String>,
    pub stats: ScheduleStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStats {
    pub total_classes: usize,
    pub assigned_classes: usize,
    pub unassigned_classes: usize,
    pub total_activities: usize,
    pub conflicts: usize,
    pub diversity_score: f64,
}

/// Treats a missing, null or blank string as `None` and parses anything else.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
