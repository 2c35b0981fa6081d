use crate::clock::ClockTime;
use crate::model::{Assignment, ClassRegistration, Institution};
use crate::zone::Zone;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weights of the placement heuristic. Penalties are stored as positive
/// numbers and subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub base: i32,
    /// Per step of zone distance between school and institution.
    pub distance_penalty: i32,
    pub repeat_visit_penalty: i32,
    /// Per class already booked into the same slot.
    pub shared_slot_bonus: i32,
    /// Per class from the same college already booked into the same slot.
    pub same_college_penalty: i32,
    pub day_part_penalty: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 100,
            distance_penalty: 30,
            repeat_visit_penalty: 50,
            shared_slot_bonus: 5,
            same_college_penalty: 10,
            day_part_penalty: 20,
        }
    }
}

impl ScoringWeights {
    /// Weights that never penalise sharing a slot with the same college.
    pub fn without_same_college_penalty(self) -> Self {
        Self {
            same_college_penalty: 0,
            ..self
        }
    }
}

/// Everything a score depends on besides the candidate itself.
pub struct ScoringContext<'a> {
    pub weights: &'a ScoringWeights,
    pub committed: &'a [Assignment],
    pub classes_by_id: &'a HashMap<&'a str, &'a ClassRegistration>,
}

/// The individual terms of one placement score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub distance: i32,
    pub repeat_visit: i32,
    pub shared_slot: i32,
    pub same_college: i32,
    pub day_part: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.base + self.distance + self.repeat_visit + self.shared_slot + self.same_college + self.day_part
    }
}

/// Scores placing `class` at `institution` on `date` at `time`.
///
/// Higher is better. The score only reads its inputs, so it can be called
/// for every candidate before anything is committed.
pub fn score_assignment(
    class: &ClassRegistration,
    institution: &Institution,
    date: NaiveDate,
    time: ClockTime,
    context: &ScoringContext<'_>,
) -> i32 {
    score_breakdown(class, institution, date, time, context).total()
}

pub fn score_breakdown(
    class: &ClassRegistration,
    institution: &Institution,
    date: NaiveDate,
    time: ClockTime,
    context: &ScoringContext<'_>,
) -> ScoreBreakdown {
    let weights = context.weights;
    let (shared_slot, same_college) = slot_sharing_adjustment(class, institution, date, time, context);

    ScoreBreakdown {
        base: weights.base,
        distance: -weights.distance_penalty * distance_between(class, institution),
        repeat_visit: if class.has_visited(&institution.name) {
            -weights.repeat_visit_penalty
        } else {
            0
        },
        shared_slot,
        same_college,
        day_part: match class.day_part {
            Some(day_part) if !day_part.contains(time) => -weights.day_part_penalty,
            _ => 0,
        },
    }
}

fn distance_between(class: &ClassRegistration, institution: &Institution) -> i32 {
    let school_zone = Zone::of_address(&class.school_address);
    let institution_zone = Zone::of_address(&institution.address);
    i32::from(school_zone.distance(institution_zone))
}

/// Bonus for filling a slot that already has occupants, and the penalty for
/// occupants coming from the candidate's own college.
fn slot_sharing_adjustment(
    class: &ClassRegistration,
    institution: &Institution,
    date: NaiveDate,
    time: ClockTime,
    context: &ScoringContext<'_>,
) -> (i32, i32) {
    let occupants: Vec<&Assignment> = context
        .committed
        .iter()
        .filter(|assignment| assignment.occupies(&institution.id, date, time))
        .collect();

    let same_college = occupants
        .iter()
        .filter_map(|assignment| context.classes_by_id.get(assignment.class_id.as_str()))
        .filter(|occupant| occupant.college == class.college)
        .count();

    let weights = context.weights;
    (
        weights.shared_slot_bonus * occupants.len() as i32,
        -weights.same_college_penalty * same_college as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DayPart;
    use std::collections::BTreeMap;

    mod common {
        use super::*;

        pub(crate) fn date(day: &str) -> NaiveDate {
            day.parse().unwrap()
        }

        pub(crate) fn time(hm: &str) -> ClockTime {
            hm.parse().unwrap()
        }

        pub(crate) fn institution(address: &str) -> Institution {
            Institution {
                id: "nemo".into(),
                name: "NEMO Science Museum".into(),
                address: address.into(),
                capacity: 3,
                duration: 75,
                availability: BTreeMap::from([(date("2026-08-31"), vec![time("09:00"), time("13:00")])]),
            }
        }

        pub(crate) fn class(id: &str, college: &str, address: &str) -> ClassRegistration {
            ClassRegistration {
                id: id.into(),
                teacher_name: "Jan Jansen".into(),
                college: college.into(),
                school_address: address.into(),
                class_name: format!("class {id}"),
                student_count: "<25".into(),
                year: "1".into(),
                previous_visits: vec![],
                selected_day: None,
                activity_count: 1,
                day_part: None,
            }
        }

        pub(crate) fn booked(class_id: &str, at: &str) -> Assignment {
            Assignment {
                class_id: class_id.into(),
                institution_id: "nemo".into(),
                date: date("2026-08-31"),
                time: time(at),
                duration: 75,
            }
        }
    }

    mod unit_tests {
        use super::{common::*, *};

        fn score_with(
            candidate: &ClassRegistration,
            at: &str,
            committed: &[Assignment],
            others: &[ClassRegistration],
            weights: &ScoringWeights,
        ) -> ScoreBreakdown {
            let classes_by_id: HashMap<&str, &ClassRegistration> =
                others.iter().map(|class| (class.id.as_str(), class)).collect();
            let context = ScoringContext {
                weights,
                committed,
                classes_by_id: &classes_by_id,
            };
            let institution = institution("Oosterdok 2, Amsterdam Centrum");
            score_breakdown(candidate, &institution, date("2026-08-31"), time(at), &context)
        }

        #[test]
        fn test_baseline_for_same_zone_and_empty_slot() {
            let candidate = class("1", "MBO College Centrum", "Wibautstraat 2, Amsterdam Centrum");
            let breakdown = score_with(&candidate, "09:00", &[], &[], &ScoringWeights::default());
            assert_eq!(breakdown.total(), 100);
            assert_eq!(breakdown, ScoreBreakdown { base: 100, ..ScoreBreakdown::default() });
        }

        #[test]
        fn test_distance_penalty_per_zone_step() {
            let adjacent = class("1", "MBO College Noord", "Zamenhofstraat 3, Amsterdam Noord");
            assert_eq!(score_with(&adjacent, "09:00", &[], &[], &ScoringWeights::default()).distance, -30);

            let context_weights = ScoringWeights::default();
            let classes_by_id = HashMap::new();
            let context = ScoringContext {
                weights: &context_weights,
                committed: &[],
                classes_by_id: &classes_by_id,
            };
            let far_institution = institution("NDSM-plein 1, Amsterdam Noord");
            let far_class = class("2", "MBO College Zuidoost", "Bijlmerplein 888, Amsterdam Zuidoost");
            let score = score_assignment(&far_class, &far_institution, date("2026-08-31"), time("09:00"), &context);
            assert_eq!(score, 40);
        }

        #[test]
        fn test_repeat_visit_penalty() {
            let mut candidate = class("1", "MBO College Centrum", "Amsterdam Centrum");
            candidate.previous_visits = vec!["NEMO Science Museum".into()];
            let breakdown = score_with(&candidate, "09:00", &[], &[], &ScoringWeights::default());
            assert_eq!(breakdown.repeat_visit, -50);
            assert_eq!(breakdown.total(), 50);
        }

        #[test]
        fn test_shared_slot_bonus_counts_only_the_exact_slot() {
            let candidate = class("3", "MBO College Centrum", "Amsterdam Centrum");
            let others = [
                class("1", "MBO College West", "Amsterdam West"),
                class("2", "MBO College Zuid", "Amsterdam Zuid"),
            ];
            let committed = [booked("1", "09:00"), booked("2", "13:00")];
            let breakdown = score_with(&candidate, "09:00", &committed, &others, &ScoringWeights::default());
            assert_eq!(breakdown.shared_slot, 5);
            assert_eq!(breakdown.same_college, 0);
            assert_eq!(breakdown.total(), 105);
        }

        #[test]
        fn test_same_college_penalty_per_matching_occupant() {
            let candidate = class("3", "MBO College Centrum", "Amsterdam Centrum");
            let others = [
                class("1", "MBO College Centrum", "Amsterdam Centrum"),
                class("2", "MBO College West", "Amsterdam West"),
            ];
            let committed = [booked("1", "09:00"), booked("2", "09:00")];
            let breakdown = score_with(&candidate, "09:00", &committed, &others, &ScoringWeights::default());
            assert_eq!(breakdown.shared_slot, 10);
            assert_eq!(breakdown.same_college, -10);
            assert_eq!(breakdown.total(), 100);
        }

        #[test]
        fn test_same_college_penalty_can_be_switched_off() {
            let candidate = class("2", "MBO College Centrum", "Amsterdam Centrum");
            let others = [class("1", "MBO College Centrum", "Amsterdam Centrum")];
            let committed = [booked("1", "09:00")];
            let weights = ScoringWeights::default().without_same_college_penalty();
            let breakdown = score_with(&candidate, "09:00", &committed, &others, &weights);
            assert_eq!(breakdown.shared_slot, 5);
            assert_eq!(breakdown.same_college, 0);
            assert_eq!(breakdown.total(), 105);
        }

        #[test]
        fn test_unresolved_occupants_only_count_for_the_bonus() {
            let candidate = class("2", "MBO College Centrum", "Amsterdam Centrum");
            let committed = [booked("ghost", "09:00")];
            let breakdown = score_with(&candidate, "09:00", &committed, &[], &ScoringWeights::default());
            assert_eq!(breakdown.shared_slot, 5);
            assert_eq!(breakdown.same_college, 0);
        }

        #[test]
        fn test_day_part_penalty() {
            let mut morning = class("1", "MBO College Centrum", "Amsterdam Centrum");
            morning.day_part = Some(DayPart::Morning);
            let weights = ScoringWeights::default();
            assert_eq!(score_with(&morning, "09:00", &[], &[], &weights).day_part, 0);
            assert_eq!(score_with(&morning, "13:00", &[], &[], &weights).day_part, -20);

            let mut afternoon = morning.clone();
            afternoon.day_part = Some(DayPart::Afternoon);
            assert_eq!(score_with(&afternoon, "09:00", &[], &[], &weights).day_part, -20);
            assert_eq!(score_with(&afternoon, "13:00", &[], &[], &weights).day_part, 0);
        }

        #[test]
        fn test_all_terms_combine() {
            let mut candidate = class("9", "MBO College Noord", "Zamenhofstraat 3, Amsterdam Noord");
            candidate.previous_visits = vec!["NEMO Science Museum".into()];
            candidate.day_part = Some(DayPart::Afternoon);
            let others = [class("1", "MBO College Noord", "Amsterdam Noord")];
            let committed = [booked("1", "09:00")];
            let breakdown = score_with(&candidate, "09:00", &committed, &others, &ScoringWeights::default());
            // 100 - 30 - 50 + 5 - 10 - 20
            assert_eq!(breakdown.total(), -5);
        }
    }
}
