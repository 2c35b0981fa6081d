use crate::db_config::*;
use chrono::{Days, NaiveDate};
use scheduler::ScoringWeights;
use sqlx::{Pool, Postgres};
use std::env::var;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const DEFAULT_EVENT_START_DATE: &str = "2026-08-31";

/// The application state
///
/// # Fields
/// - `planning_data`: Thread-safe storage for the database pool. Generating or clearing the
///   planning takes the write lock so two runs never interleave.
/// - `settings`: Event settings read from the environment at startup
pub struct AppState {
    pub planning_data: Arc<RwLock<PlanningData>>,
    pub settings: PlanningSettings,
}

impl AppState {
    /// Creates a new `AppState` instance.
    ///
    /// # Returns
    /// `Ok(AppState)`, or an error if unable to initialize PlanningData or read the settings
    ///
    /// # Errors
    /// This function will return an error if:
    /// - PlanningData cannot be initialized
    /// - `EVENT_START_DATE` is set but is not a `YYYY-MM-DD` date
    pub async fn new() -> Result<Self, Box<dyn Error>> {
        let settings = PlanningSettings::from_env()?;
        Ok(Self::with_pool(db_setup().await?, settings))
    }

    pub fn with_pool(planning_db: Pool<Postgres>, settings: PlanningSettings) -> Self {
        Self {
            planning_data: Arc::new(RwLock::new(PlanningData { planning_db })),
            settings,
        }
    }
}

/// The struct holds the database connection pool
///
/// # Fields
/// - `planning_db`: The database connection pool
#[derive(Debug)]
pub struct PlanningData {
    pub planning_db: Pool<Postgres>,
}

/// Whether classes of the same college are pushed apart within a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameCollegePenalty {
    Apply,
    Off,
}

impl SameCollegePenalty {
    pub fn from_env() -> SameCollegePenalty {
        let setting = var("SAME_COLLEGE_PENALTY").unwrap_or(String::from("apply"));
        Self::parse(&setting)
    }

    fn parse(setting: &str) -> SameCollegePenalty {
        match setting.trim().to_lowercase().as_str() {
            "apply" | "on" => SameCollegePenalty::Apply,
            "off" => SameCollegePenalty::Off,
            other => {
                warn!("unknown SAME_COLLEGE_PENALTY {other:?}, applying the penalty");
                SameCollegePenalty::Apply
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanningSettings {
    pub calendar: EventCalendar,
    pub weights: ScoringWeights,
}

impl PlanningSettings {
    pub fn new(calendar: EventCalendar, penalty: SameCollegePenalty) -> Self {
        let weights = match penalty {
            SameCollegePenalty::Apply => ScoringWeights::default(),
            SameCollegePenalty::Off => ScoringWeights::default().without_same_college_penalty(),
        };
        Self { calendar, weights }
    }

    /// Reads `EVENT_START_DATE` and `SAME_COLLEGE_PENALTY`.
    pub fn from_env() -> Result<Self, chrono::ParseError> {
        let start = var("EVENT_START_DATE").unwrap_or(String::from(DEFAULT_EVENT_START_DATE));
        let calendar = EventCalendar::new(start.trim().parse()?);
        let penalty = SameCollegePenalty::from_env();
        info!("event week starts {}, same-college penalty {:?}", calendar.monday, penalty);
        Ok(Self::new(calendar, penalty))
    }
}

/// The five weekdays of the event week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCalendar {
    pub monday: NaiveDate,
}

impl EventCalendar {
    pub fn new(monday: NaiveDate) -> Self {
        Self { monday }
    }

    /// Turns a registered day preference into a date.
    ///
    /// Accepts an ISO date or a weekday name in English or Dutch. Anything
    /// else, including an empty preference, means any day is fine.
    pub fn resolve_day(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(date) = text.parse::<NaiveDate>() {
            return Some(date);
        }

        let offset = match text.to_lowercase().as_str() {
            "monday" | "maandag" => 0,
            "tuesday" | "dinsdag" => 1,
            "wednesday" | "woensdag" => 2,
            "thursday" | "donderdag" => 3,
            "friday" | "vrijdag" => 4,
            _ => return None,
        };
        self.monday.checked_add_days(Days::new(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> EventCalendar {
        EventCalendar::new("2026-08-31".parse().unwrap())
    }

    #[test]
    fn resolves_weekday_names() {
        let calendar = calendar();
        assert_eq!(calendar.resolve_day("Monday"), Some("2026-08-31".parse().unwrap()));
        assert_eq!(calendar.resolve_day("woensdag"), Some("2026-09-02".parse().unwrap()));
        assert_eq!(calendar.resolve_day(" VRIJDAG "), Some("2026-09-04".parse().unwrap()));
    }

    #[test]
    fn resolves_iso_dates_as_is() {
        assert_eq!(calendar().resolve_day("2026-09-03"), Some("2026-09-03".parse().unwrap()));
    }

    #[test]
    fn anything_else_means_any_day() {
        let calendar = calendar();
        assert_eq!(calendar.resolve_day(""), None);
        assert_eq!(calendar.resolve_day("   "), None);
        assert_eq!(calendar.resolve_day("saturday"), None);
        assert_eq!(calendar.resolve_day("geen voorkeur"), None);
    }

    #[test]
    fn same_college_penalty_setting() {
        assert_eq!(SameCollegePenalty::parse("apply"), SameCollegePenalty::Apply);
        assert_eq!(SameCollegePenalty::parse("OFF"), SameCollegePenalty::Off);
        assert_eq!(SameCollegePenalty::parse("sometimes"), SameCollegePenalty::Apply);

        let settings = PlanningSettings::new(calendar(), SameCollegePenalty::Off);
        assert_eq!(settings.weights.same_college_penalty, 0);
        let settings = PlanningSettings::new(calendar(), SameCollegePenalty::Apply);
        assert_eq!(settings.weights.same_college_penalty, 10);
    }
}
