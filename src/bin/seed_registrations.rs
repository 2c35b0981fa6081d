use chrono::{Days, NaiveDate, NaiveTime};
use clap::Parser;
use cultureday::config::{DEFAULT_EVENT_START_DATE, PlanningSettings};
use cultureday::db_config::db_setup;
use dotenvy::dotenv;
use fake::Fake;
use fake::faker::address::raw::StreetName;
use fake::faker::company::raw::CompanyName;
use fake::faker::internet::raw::SafeEmail;
use fake::faker::name::raw::Name;
use fake::locales::EN;
use rand::Rng;
use rand::seq::IndexedRandom;
use sqlx::{Pool, Postgres};
use std::error::Error;

const DISTRICTS: [&str; 6] = [
    "Amsterdam Centrum",
    "Amsterdam Noord",
    "Amsterdam Oost",
    "Amsterdam West",
    "Amsterdam Zuid",
    "Amsterdam Zuidoost",
];

const COLLEGES: [&str; 6] = [
    "MBO College Centrum",
    "MBO College Noord",
    "MBO College West",
    "MBO College Zuidoost",
    "Mediacollege",
    "Hout en Meubileringscollege",
];

const START_TIMES: [&str; 6] = ["09:00", "10:00", "11:00", "13:00", "14:00", "15:00"];
const DURATIONS: [i32; 3] = [60, 75, 90];
const STUDENT_COUNTS: [&str; 3] = ["<20", "<25", "<30"];
const DAY_NAMES: [&str; 5] = ["maandag", "dinsdag", "woensdag", "donderdag", "vrijdag"];
const DAY_PARTS: [&str; 2] = ["ochtend", "middag"];

#[derive(Parser)]
#[command(author, version, about = "Fills the database with fake institutions and class registrations")]
struct Cli {
    /// Number of institutions
    #[arg(long, default_value_t = 8)]
    institutions: u32,

    /// Number of teachers; every teacher registers one to three classes
    #[arg(long, default_value_t = 15)]
    teachers: u32,

    /// Remove all registrations and planning before seeding
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() {
    // load env vars
    dotenv().ok();

    let cli = Cli::parse();
    println!("Using parameters:");
    println!("Institutions: {}", cli.institutions);
    println!("Teachers: {}", cli.teachers);

    match cli.generate_data().await {
        Ok(()) => println!("Successfully generated data"),
        Err(err) => {
            eprintln!("Error: {err:?}");
            std::process::exit(1);
        }
    }
}

impl Cli {
    async fn generate_data(&self) -> Result<(), Box<dyn Error>> {
        let settings = PlanningSettings::from_env()?;
        let db_pool = db_setup().await?;
        if self.reset {
            self.reset_data(&db_pool).await?;
        }

        let event_days: Vec<NaiveDate> = (0..5)
            .filter_map(|offset| settings.calendar.monday.checked_add_days(Days::new(offset)))
            .collect();
        println!(
            "Event week starts {} (default {DEFAULT_EVENT_START_DATE})",
            settings.calendar.monday
        );

        let institution_names = self.generate_institutions(&db_pool, &event_days).await?;
        self.generate_registrations(&db_pool, &institution_names).await?;

        Ok(())
    }

    async fn reset_data(&self, db_pool: &Pool<Postgres>) -> Result<(), Box<dyn Error>> {
        sqlx::query("TRUNCATE planning, classes, teachers, institution_availability, institutions")
            .execute(db_pool)
            .await?;
        println!("Removed existing data");
        Ok(())
    }

    async fn generate_institutions(
        &self,
        db_pool: &Pool<Postgres>,
        event_days: &[NaiveDate],
    ) -> Result<Vec<String>, Box<dyn Error>> {
        let mut rng = rand::rng();
        let mut names = vec![];

        for _ in 1..=self.institutions {
            let name: String = CompanyName(EN).fake();
            let street: String = StreetName(EN).fake();
            let district = DISTRICTS.choose(&mut rng).copied().unwrap_or(DISTRICTS[0]);
            let duration = DURATIONS.choose(&mut rng).copied().unwrap_or(60);

            let institution_id: String = sqlx::query_scalar(
                r#"
                INSERT INTO institutions (name, contact_person, email, visit_address, capacity_per_slot, program_duration)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id"#,
            )
            .bind(&name)
            .bind(Name(EN).fake::<String>())
            .bind(SafeEmail(EN).fake::<String>())
            .bind(format!("{street} {}, {district}", rng.random_range(1..200)))
            .bind(rng.random_range(1..=3))
            .bind(duration)
            .fetch_one(db_pool)
            .await?;

            for &date in event_days {
                if !rng.random_bool(0.6) {
                    continue;
                }
                let starts: Vec<&str> = START_TIMES.iter().copied().filter(|_| rng.random_bool(0.5)).collect();
                for start in starts {
                    let start_time = NaiveTime::parse_from_str(start, "%H:%M")?;
                    let end_time = start_time + chrono::Duration::minutes(i64::from(duration));
                    sqlx::query(
                        r#"
                        INSERT INTO institution_availability (institution_id, date, start_time, end_time, is_available)
                        VALUES ($1, $2, $3, $4, $5)"#,
                    )
                    .bind(&institution_id)
                    .bind(date)
                    .bind(start_time)
                    .bind(end_time)
                    .bind(rng.random_bool(0.9))
                    .execute(db_pool)
                    .await?;
                }
            }

            names.push(name);
        }

        Ok(names)
    }

    async fn generate_registrations(
        &self,
        db_pool: &Pool<Postgres>,
        institution_names: &[String],
    ) -> Result<(), Box<dyn Error>> {
        let mut rng = rand::rng();
        let mut class_total = 0;

        for _ in 1..=self.teachers {
            let college = COLLEGES.choose(&mut rng).copied().unwrap_or(COLLEGES[0]);
            let district = DISTRICTS.choose(&mut rng).copied().unwrap_or(DISTRICTS[0]);
            let street: String = StreetName(EN).fake();

            let teacher_id: String = sqlx::query_scalar(
                r#"
                INSERT INTO teachers (name, college, address, email)
                VALUES ($1, $2, $3, $4)
                RETURNING id"#,
            )
            .bind(Name(EN).fake::<String>())
            .bind(college)
            .bind(format!("{street} {}, {district}", rng.random_range(1..200)))
            .bind(SafeEmail(EN).fake::<String>())
            .fetch_one(db_pool)
            .await?;

            for _ in 0..rng.random_range(1..=3) {
                class_total += 1;
                let activity_count: i32 = if rng.random_bool(0.4) { 2 } else { 1 };
                let previous_visits = institution_names
                    .iter()
                    .filter(|_| rng.random_bool(0.15))
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                let preferred_day = rng
                    .random_bool(0.5)
                    .then(|| DAY_NAMES.choose(&mut rng).copied())
                    .flatten();
                let preferred_time_slot = (activity_count == 1 && rng.random_bool(0.5))
                    .then(|| DAY_PARTS.choose(&mut rng).copied())
                    .flatten();

                sqlx::query(
                    r#"
                    INSERT INTO classes
                        (teacher_id, class_name, student_count, year, previous_visits, preferred_day, preferred_time_slot, activity_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
                )
                .bind(&teacher_id)
                .bind(format!("{}{}", rng.random_range(1..=4), ['A', 'B', 'C', 'D'][class_total % 4]))
                .bind(STUDENT_COUNTS.choose(&mut rng).copied().unwrap_or(STUDENT_COUNTS[0]))
                .bind(rng.random_range(1..=4))
                .bind((!previous_visits.is_empty()).then_some(previous_visits))
                .bind(preferred_day)
                .bind(preferred_time_slot)
                .bind(activity_count)
                .execute(db_pool)
                .await?;
            }
        }

        println!("Registered {class_total} classes");
        Ok(())
    }
}
