use crate::capacity::{CapacityTracker, SlotKey};
use crate::clock::ClockTime;
use crate::error::{InputError, validate};
use crate::model::{Assignment, ClassRegistration, Institution, Schedule, ScheduleStats};
use crate::scoring::{ScoringContext, ScoringWeights, score_assignment};
use chrono::NaiveDate;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Minimum pause between the end of a class's first visit and the start of
/// its second visit on the same day.
pub const MIN_GAP_MINUTES: u32 = 90;

/// Where and when a class's first activity ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstVisit {
    pub date: NaiveDate,
    pub end_minutes: u32,
}

impl FirstVisit {
    pub fn of(assignment: &Assignment) -> Self {
        Self {
            date: assignment.date,
            end_minutes: assignment.end_minutes(),
        }
    }

    /// Whether a second activity may start at `time` on `date`.
    ///
    /// Later dates are always fine, earlier dates never are.
    pub fn allows(&self, date: NaiveDate, time: ClockTime) -> bool {
        match date.cmp(&self.date) {
            Ordering::Less => false,
            Ordering::Greater => true,
            Ordering::Equal => time.minutes() >= self.end_minutes.saturating_add(MIN_GAP_MINUTES),
        }
    }
}

/// Plans visits for all classes with the default weights.
///
/// See [`generate_schedule_with`].
pub fn generate_schedule(
    institutions: &[Institution],
    classes: &[ClassRegistration],
) -> Result<Schedule, InputError> {
    generate_schedule_with(institutions, classes, &ScoringWeights::default())
}

/// Plans visits for all classes.
///
/// Classes are handled one at a time, hardest first (see
/// [`order_by_difficulty`]). For every activity of a class all open slots of
/// all institutions are scored and the best one is booked; the first slot
/// seen wins a tie. Slots are visited institution by institution in input
/// order, then by ascending date, then in the declared order of times.
/// Nothing that was booked is ever moved again.
///
/// # Parameters
/// - `institutions`: The institutions and their open slots
/// - `classes`: The registered classes
/// - `weights`: The weights of the placement score
///
/// # Returns
/// `Ok(Schedule)` holding the booked assignments in booking order, one
/// conflict message for every activity that could not be placed, and the
/// run statistics.
///
/// # Errors
/// Returns an `InputError` for malformed input (zero capacity or duration,
/// an activity count other than 1 or 2, duplicate ids). The check runs
/// before anything is planned. A class that simply does not fit is never an
/// error.
pub fn generate_schedule_with(
    institutions: &[Institution],
    classes: &[ClassRegistration],
    weights: &ScoringWeights,
) -> Result<Schedule, InputError> {
    validate(institutions, classes)?;

    let started = Instant::now();
    let classes_by_id: HashMap<&str, &ClassRegistration> =
        classes.iter().map(|class| (class.id.as_str(), class)).collect();
    let mut tracker = CapacityTracker::new(institutions);
    let mut assignments: Vec<Assignment> = Vec::new();
    let mut conflicts: Vec<String> = Vec::new();

    for class in order_by_difficulty(classes) {
        for activity in 0..class.activity_count {
            let first_visit = if activity == 1 {
                assignments
                    .iter()
                    .find(|assignment| assignment.class_id == class.id)
                    .map(FirstVisit::of)
            } else {
                None
            };

            let placement = {
                let context = ScoringContext {
                    weights,
                    committed: &assignments,
                    classes_by_id: &classes_by_id,
                };
                best_placement(class, first_visit.as_ref(), institutions, &tracker, &context)
            };

            match placement {
                Some((institution, assignment, score)) => {
                    let occupancy = tracker.commit(SlotKey::new(&institution.id, assignment.date, assignment.time));
                    debug!(
                        "class {} activity {} -> {} on {} at {} (score {score}, {occupancy}/{})",
                        class.id,
                        activity + 1,
                        institution.name,
                        assignment.date,
                        assignment.time,
                        institution.capacity,
                    );
                    assignments.push(assignment);
                }
                None => {
                    let message = conflict_message(class, activity);
                    warn!("{message}");
                    conflicts.push(message);
                }
            }
        }
    }

    let stats = ScheduleStats::calculate(classes, &assignments, conflicts.len());
    info!(
        "planned {} of {} classes ({} activities, {} conflicts, diversity {:.2}) in {:?}",
        stats.assigned_classes,
        stats.total_classes,
        assignments.len(),
        conflicts.len(),
        stats.diversity_score,
        started.elapsed(),
    );

    Ok(Schedule {
        assignments,
        conflicts,
        stats,
    })
}

/// Orders classes hardest first.
///
/// More previous visits come first, then two-activity classes before
/// one-activity classes. Equal classes keep their input order.
pub fn order_by_difficulty(classes: &[ClassRegistration]) -> Vec<&ClassRegistration> {
    classes
        .iter()
        .sorted_by(|a, b| {
            b.previous_visits
                .len()
                .cmp(&a.previous_visits.len())
                .then_with(|| b.activity_count.cmp(&a.activity_count))
        })
        .collect()
}

/// The message recorded when activity `activity` (0-based) of `class` has
/// nowhere to go.
pub fn conflict_message(class: &ClassRegistration, activity: u8) -> String {
    format!(
        "No suitable slot found for class {} ({}) - activity {}",
        class.class_name,
        class.college,
        activity + 1
    )
}

fn best_placement<'a>(
    class: &ClassRegistration,
    first_visit: Option<&FirstVisit>,
    institutions: &'a [Institution],
    tracker: &CapacityTracker<'_>,
    context: &ScoringContext<'_>,
) -> Option<(&'a Institution, Assignment, i32)> {
    let mut best: Option<(&'a Institution, Assignment, i32)> = None;

    for institution in institutions {
        for (date, time) in institution.slots() {
            if !class.accepts_date(date) {
                continue;
            }
            if !tracker.has_room(&SlotKey::new(&institution.id, date, time)) {
                continue;
            }
            if first_visit.is_some_and(|first| !first.allows(date, time)) {
                continue;
            }

            let score = score_assignment(class, institution, date, time, context);
            trace!("class {} at {} {date} {time}: {score}", class.id, institution.id);

            if best.as_ref().is_none_or(|&(_, _, best_score)| score > best_score) {
                let assignment = Assignment {
                    class_id: class.id.clone(),
                    institution_id: institution.id.clone(),
                    date,
                    time,
                    duration: institution.duration,
                };
                best = Some((institution, assignment, score));
            }
        }
    }

    best
}

impl ScheduleStats {
    /// Summarises a finished run.
    ///
    /// A class counts as assigned as soon as one of its activities was
    /// placed.
    pub fn calculate(classes: &[ClassRegistration], assignments: &[Assignment], conflicts: usize) -> Self {
        let placed: HashSet<&str> = assignments
            .iter()
            .map(|assignment| assignment.class_id.as_str())
            .collect();
        let assigned_classes = classes
            .iter()
            .filter(|class| placed.contains(class.id.as_str()))
            .count();

        let classes_by_id: HashMap<&str, &ClassRegistration> =
            classes.iter().map(|class| (class.id.as_str(), class)).collect();

        Self {
            total_classes: classes.len(),
            assigned_classes,
            unassigned_classes: classes.len() - assigned_classes,
            total_activities: classes.iter().map(|class| usize::from(class.activity_count)).sum(),
            conflicts,
            diversity_score: diversity_score(assignments, &classes_by_id),
        }
    }
}

/// Average number of distinct colleges per institution that received at
/// least one visit, rounded to two decimals. `0.0` when nothing was placed.
pub fn diversity_score(assignments: &[Assignment], classes_by_id: &HashMap<&str, &ClassRegistration>) -> f64 {
    let mut colleges_per_institution: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for assignment in assignments {
        if let Some(class) = classes_by_id.get(assignment.class_id.as_str()) {
            colleges_per_institution
                .entry(assignment.institution_id.as_str())
                .or_default()
                .insert(class.college.as_str());
        }
    }

    if colleges_per_institution.is_empty() {
        return 0.0;
    }

    let total: usize = colleges_per_institution.values().map(HashSet::len).sum();
    let average = total as f64 / colleges_per_institution.len() as f64;
    (average * 100.0).round() / 100.0
}
