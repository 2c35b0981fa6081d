use crate::clock::MINUTES_PER_DAY;
use crate::model::{ClassRegistration, Institution};
use std::collections::HashSet;

/// Input the planner refuses to work with.
///
/// Unplaceable classes are not errors; they end up as conflicts in the
/// returned schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("institution {0} has a capacity of zero")]
    ZeroCapacity(String),
    #[error("institution {0} has a program duration of zero minutes")]
    ZeroDuration(String),
    #[error("institution {id} has a program duration of {duration} minutes, more than a day")]
    DurationTooLong { id: String, duration: u32 },
    #[error("class {id} asks for {count} activities, expected 1 or 2")]
    ActivityCount { id: String, count: u8 },
    #[error("institution id {0} is used more than once")]
    DuplicateInstitution(String),
    #[error("class id {0} is used more than once")]
    DuplicateClass(String),
}

/// Checks the whole input before any planning state exists.
pub fn validate(institutions: &[Institution], classes: &[ClassRegistration]) -> Result<(), InputError> {
    let mut institution_ids = HashSet::new();
    for institution in institutions {
        if !institution_ids.insert(institution.id.as_str()) {
            return Err(InputError::DuplicateInstitution(institution.id.clone()));
        }
        if institution.capacity == 0 {
            return Err(InputError::ZeroCapacity(institution.id.clone()));
        }
        if institution.duration == 0 {
            return Err(InputError::ZeroDuration(institution.id.clone()));
        }
        if institution.duration > MINUTES_PER_DAY {
            return Err(InputError::DurationTooLong {
                id: institution.id.clone(),
                duration: institution.duration,
            });
        }
    }

    let mut class_ids = HashSet::new();
    for class in classes {
        if !class_ids.insert(class.id.as_str()) {
            return Err(InputError::DuplicateClass(class.id.clone()));
        }
        if !(1..=2).contains(&class.activity_count) {
            return Err(InputError::ActivityCount {
                id: class.id.clone(),
                count: class.activity_count,
            });
        }
    }

    Ok(())
}
