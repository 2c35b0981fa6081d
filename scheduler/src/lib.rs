//! Greedy visit planner for a museum education week.
//!
//! Classes register for one or two visits; institutions publish the dates
//! and start times they can host classes. [`generate_schedule`] books every
//! activity into the best scoring open slot, hardest classes first, and
//! never revisits a booking.

pub mod capacity;
pub mod clock;
pub mod error;
pub mod export;
pub mod model;
pub mod planner;
pub mod scoring;
pub mod utils;
pub mod zone;

pub use clock::{ClockTime, ClockTimeError};
pub use error::InputError;
pub use export::{
    ClassVisit, CollegeVisit, DayOverview, InstitutionVisit, SlotOverview, class_view, college_view, day_overview,
    institution_view,
};
pub use model::{Assignment, ClassRegistration, DayPart, DayPartError, Institution, Schedule, ScheduleStats};
pub use planner::{generate_schedule, generate_schedule_with};
pub use scoring::ScoringWeights;
pub use zone::Zone;
