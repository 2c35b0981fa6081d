//! Synthetic planning inputs and an independent check of planner output.
//!
//! Used by the evaluation binary and by the planner's own tests.

use crate::clock::ClockTime;
use crate::model::{ClassRegistration, DayPart, Institution, Schedule};
use crate::planner::MIN_GAP_MINUTES;
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};

const DISTRICTS: [&str; 8] = [
    "Amsterdam Centrum",
    "Amsterdam Noord",
    "Amsterdam Oost",
    "Amsterdam Zuidoost",
    "Amsterdam West",
    "Amsterdam Nieuw-West",
    "Amsterdam Westpoort",
    "Amsterdam Zuid",
];

const COLLEGES: [&str; 8] = [
    "MBO College Centrum",
    "MBO College Noord",
    "MBO College West",
    "MBO College Westpoort",
    "MBO College Zuid",
    "MBO College Zuidoost",
    "Mediacollege",
    "Hout en Meubileringscollege",
];

const DURATIONS: [u32; 3] = [60, 75, 90];
const STUDENT_COUNTS: [&str; 3] = ["<20", "<25", "<30"];
const OFFERED_TIMES: [&str; 8] = ["09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00"];

#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub institutions: usize,
    pub classes: usize,
    /// Consecutive event days starting at `first_day`.
    pub days: u64,
    pub first_day: NaiveDate,
    pub max_capacity: u32,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            institutions: 6,
            classes: 40,
            days: 5,
            first_day: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap_or_default(),
            max_capacity: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub institutions: Vec<Institution>,
    pub classes: Vec<ClassRegistration>,
}

/// Builds a reproducible random event from `seed`.
pub fn random_scenario(seed: u64, params: &ScenarioParams) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);
    let event_days: Vec<NaiveDate> = (0..params.days)
        .filter_map(|offset| params.first_day.checked_add_days(Days::new(offset)))
        .collect();

    let institutions = (1..=params.institutions)
        .map(|i| {
            let mut availability = BTreeMap::new();
            for &day in &event_days {
                if !rng.random_bool(0.6) {
                    continue;
                }
                let times: Vec<ClockTime> = OFFERED_TIMES
                    .iter()
                    .filter(|_| rng.random_bool(0.5))
                    .filter_map(|time| time.parse().ok())
                    .collect();
                if !times.is_empty() {
                    availability.insert(day, times);
                }
            }

            Institution {
                id: format!("inst-{i}"),
                name: format!("Institution {i}"),
                address: format!("Museumstraat {i}, {}", pick(&mut rng, &DISTRICTS)),
                capacity: rng.random_range(1..=params.max_capacity.max(1)),
                duration: *DURATIONS.choose(&mut rng).unwrap_or(&60),
                availability,
            }
        })
        .collect::<Vec<_>>();

    let classes = (1..=params.classes)
        .map(|i| {
            let activity_count = if rng.random_bool(0.4) { 2 } else { 1 };
            let previous_visits = institutions
                .iter()
                .filter(|_| rng.random_bool(0.15))
                .map(|institution| institution.name.clone())
                .collect();
            let selected_day = if rng.random_bool(0.5) {
                event_days.choose(&mut rng).copied()
            } else {
                None
            };
            let day_part = match (activity_count, rng.random_range(0..3)) {
                (1, 0) => Some(DayPart::Morning),
                (1, 1) => Some(DayPart::Afternoon),
                _ => None,
            };

            ClassRegistration {
                id: format!("class-{i}"),
                teacher_name: format!("Teacher {i}"),
                college: pick(&mut rng, &COLLEGES).to_string(),
                school_address: format!("Schoolweg {i}, {}", pick(&mut rng, &DISTRICTS)),
                class_name: format!("{}{}", i, ['A', 'B', 'C'][i % 3]),
                student_count: pick(&mut rng, &STUDENT_COUNTS).to_string(),
                year: rng.random_range(1..=4).to_string(),
                previous_visits,
                selected_day,
                activity_count,
                day_part,
            }
        })
        .collect();

    Scenario { institutions, classes }
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("slot {institution_id} {date} {time} holds {booked} classes, capacity is {capacity}")]
    OverCapacity {
        institution_id: String,
        date: NaiveDate,
        time: ClockTime,
        booked: u32,
        capacity: u32,
    },
    #[error("class {0} was booked into a slot that is not offered")]
    UnknownSlot(String),
    #[error("class {0} has its second visit too close to the first")]
    Gap(String),
    #[error("class {0} was booked on a day it did not select")]
    WrongDay(String),
    #[error("class {class_id} has {placed} visits and {conflicts} conflicts for {expected} activities")]
    Unaccounted {
        class_id: String,
        placed: usize,
        conflicts: usize,
        expected: usize,
    },
}

/// Checks a schedule against the planning rules without reusing planner
/// code paths.
pub fn verify_schedule(
    institutions: &[Institution],
    classes: &[ClassRegistration],
    schedule: &Schedule,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let institutions_by_id: HashMap<&str, &Institution> = institutions
        .iter()
        .map(|institution| (institution.id.as_str(), institution))
        .collect();

    let mut booked: BTreeMap<(&str, NaiveDate, ClockTime), u32> = BTreeMap::new();
    for assignment in &schedule.assignments {
        let offered = institutions_by_id
            .get(assignment.institution_id.as_str())
            .and_then(|institution| institution.availability.get(&assignment.date))
            .is_some_and(|times| times.contains(&assignment.time));
        if !offered {
            violations.push(Violation::UnknownSlot(assignment.class_id.clone()));
        }
        *booked
            .entry((assignment.institution_id.as_str(), assignment.date, assignment.time))
            .or_insert(0) += 1;
    }

    for ((institution_id, date, time), count) in booked {
        let capacity = institutions_by_id
            .get(institution_id)
            .map_or(0, |institution| institution.capacity);
        if count > capacity {
            violations.push(Violation::OverCapacity {
                institution_id: institution_id.to_string(),
                date,
                time,
                booked: count,
                capacity,
            });
        }
    }

    for class in classes {
        let visits: Vec<_> = schedule
            .assignments
            .iter()
            .filter(|assignment| assignment.class_id == class.id)
            .collect();

        if let Some(day) = class.selected_day
            && visits.iter().any(|visit| visit.date != day)
        {
            violations.push(Violation::WrongDay(class.id.clone()));
        }

        if let [first, second] = visits.as_slice() {
            let same_day_too_close =
                second.date == first.date && second.time.minutes() < first.end_minutes().saturating_add(MIN_GAP_MINUTES);
            if second.date < first.date || same_day_too_close {
                violations.push(Violation::Gap(class.id.clone()));
            }
        }

        let marker = format!("class {} ({})", class.class_name, class.college);
        let conflicts = schedule
            .conflicts
            .iter()
            .filter(|conflict| conflict.contains(&marker))
            .count();
        let expected = usize::from(class.activity_count);
        if visits.len() + conflicts != expected || visits.len() > expected {
            violations.push(Violation::Unaccounted {
                class_id: class.id.clone(),
                placed: visits.len(),
                conflicts,
                expected,
            });
        }
    }

    violations
}
