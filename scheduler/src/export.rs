//! Read-only views of a finished schedule, one per audience.
//!
//! Every view sorts by date and then start time. Records that reference a
//! class or institution that is not in the lookup data are kept and shown
//! as `Unknown`.

use crate::clock::ClockTime;
use crate::model::{Assignment, ClassRegistration, Institution};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const UNKNOWN: &str = "Unknown";

/// One visit as seen by the hosting institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionVisit {
    pub date: NaiveDate,
    pub time: ClockTime,
    pub class_name: String,
    pub college: String,
    pub student_count: String,
}

/// One visit as seen by the visiting class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassVisit {
    pub activity_number: usize,
    pub institution_name: String,
    pub address: String,
    pub date: NaiveDate,
    pub time: ClockTime,
    pub duration: u32,
}

/// One visit by any class of a college.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeVisit {
    pub date: NaiveDate,
    pub time: ClockTime,
    pub class_name: String,
    pub teacher_name: String,
    pub institution_name: String,
    pub address: String,
    pub duration: u32,
}

/// Who is where at one start time of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOverview {
    pub time: ClockTime,
    pub institution_name: String,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverview {
    pub date: NaiveDate,
    pub slots: Vec<SlotOverview>,
}

fn by_date_and_time(a: &Assignment, b: &Assignment) -> std::cmp::Ordering {
    (a.date, a.time).cmp(&(b.date, b.time))
}

fn classes_by_id(classes: &[ClassRegistration]) -> HashMap<&str, &ClassRegistration> {
    classes.iter().map(|class| (class.id.as_str(), class)).collect()
}

fn institutions_by_id(institutions: &[Institution]) -> HashMap<&str, &Institution> {
    institutions
        .iter()
        .map(|institution| (institution.id.as_str(), institution))
        .collect()
}

/// The program of one institution.
pub fn institution_view(
    institution_id: &str,
    assignments: &[Assignment],
    classes: &[ClassRegistration],
) -> Vec<InstitutionVisit> {
    let classes = classes_by_id(classes);
    assignments
        .iter()
        .filter(|assignment| assignment.institution_id == institution_id)
        .sorted_by(|a, b| by_date_and_time(a, b))
        .map(|assignment| {
            let class = classes.get(assignment.class_id.as_str());
            InstitutionVisit {
                date: assignment.date,
                time: assignment.time,
                class_name: class.map_or(UNKNOWN, |class| class.class_name.as_str()).to_string(),
                college: class.map_or(UNKNOWN, |class| class.college.as_str()).to_string(),
                student_count: class.map_or(UNKNOWN, |class| class.student_count.as_str()).to_string(),
            }
        })
        .collect()
}

/// The program of one class, numbered in the order the visits happen.
pub fn class_view(class_id: &str, assignments: &[Assignment], institutions: &[Institution]) -> Vec<ClassVisit> {
    let institutions = institutions_by_id(institutions);
    assignments
        .iter()
        .filter(|assignment| assignment.class_id == class_id)
        .sorted_by(|a, b| by_date_and_time(a, b))
        .enumerate()
        .map(|(index, assignment)| {
            let institution = institutions.get(assignment.institution_id.as_str());
            ClassVisit {
                activity_number: index + 1,
                institution_name: institution.map_or(UNKNOWN, |i| i.name.as_str()).to_string(),
                address: institution.map_or(UNKNOWN, |i| i.address.as_str()).to_string(),
                date: assignment.date,
                time: assignment.time,
                duration: assignment.duration,
            }
        })
        .collect()
}

/// Every visit of every class of `college`.
pub fn college_view(
    college: &str,
    assignments: &[Assignment],
    classes: &[ClassRegistration],
    institutions: &[Institution],
) -> Vec<CollegeVisit> {
    let classes = classes_by_id(classes);
    let institutions = institutions_by_id(institutions);
    assignments
        .iter()
        .filter_map(|assignment| {
            let class = classes.get(assignment.class_id.as_str())?;
            (class.college == college).then_some((assignment, *class))
        })
        .map(|(assignment, class)| {
            let institution = institutions.get(assignment.institution_id.as_str());
            CollegeVisit {
                date: assignment.date,
                time: assignment.time,
                class_name: class.class_name.clone(),
                teacher_name: class.teacher_name.clone(),
                institution_name: institution.map_or(UNKNOWN, |i| i.name.as_str()).to_string(),
                address: institution.map_or(UNKNOWN, |i| i.address.as_str()).to_string(),
                duration: assignment.duration,
            }
        })
        .sorted_by(|a, b| (a.date, a.time, &a.class_name).cmp(&(b.date, b.time, &b.class_name)))
        .collect()
}

/// What happens on `date`, slot by slot.
pub fn day_overview(
    date: NaiveDate,
    assignments: &[Assignment],
    classes: &[ClassRegistration],
    institutions: &[Institution],
) -> DayOverview {
    let classes = classes_by_id(classes);
    let institutions = institutions_by_id(institutions);

    let mut grouped: BTreeMap<(ClockTime, &str, &str), Vec<String>> = BTreeMap::new();
    for assignment in assignments.iter().filter(|assignment| assignment.date == date) {
        let institution_name = institutions
            .get(assignment.institution_id.as_str())
            .map_or(UNKNOWN, |institution| institution.name.as_str());
        let class = match classes.get(assignment.class_id.as_str()) {
            Some(class) => format!("{} ({})", class.class_name, class.college),
            None => UNKNOWN.to_string(),
        };
        grouped
            .entry((assignment.time, institution_name, assignment.institution_id.as_str()))
            .or_default()
            .push(class);
    }

    // Institutions sharing a name stay apart and keep a stable order by id.
    let slots = grouped
        .into_iter()
        .map(|((time, institution_name, _), classes)| SlotOverview {
            time,
            institution_name: institution_name.to_string(),
            classes,
        })
        .collect();

    DayOverview { date, slots }
}
