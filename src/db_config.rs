use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use std::error::Error;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DbSetupError {
    #[error("bad password variable: expected POSTGRES_PASSWORD, got {0}")]
    BadPwVariable(String),
    #[error("no password variable: expected POSTGRES_PASSWORD")]
    NoPwVariable,
}

/// Sets up the database connection pool
///
/// This function reads the environment variables for the database connection and sets up the
/// connection pool, then runs any migrations that are needed.
///
/// # Returns
/// `Ok(Pool<Postgres>)` if the connection is successful, or an error if not.
///
/// # Errors
/// This function will return an error if:
/// - The environment variables are not set
/// - The password file cannot be read or does not hold `POSTGRES_PASSWORD=...`
/// - The connection to the database cannot be established
/// - The migrations cannot be run
pub async fn db_setup() -> Result<Pool<Postgres>, Box<dyn Error>> {
    use std::env::var;
    use std::fs;

    let pg_user = var("PG_USER")?;
    let password_file = var("PG_PASSWORDFILE")?;
    let password_var = fs::read_to_string(password_file)?;
    let password = password_from_file(&password_var)?;
    let pg_host = var("PG_HOST")?;
    let pg_port = var("PG_PORT")?;
    let pg_dbname = var("PG_DBNAME")?;

    let connection = db_connect(&pg_user, password, &pg_host, &pg_port, &pg_dbname).await?;
    info!("Connected to: {:?}", connection);
    info!("Running migrations if any are needed");
    sqlx::migrate!().run(&connection).await?;

    Ok(connection)
}

/// Pulls the password out of a `POSTGRES_PASSWORD=secret` file.
fn password_from_file(contents: &str) -> Result<&str, DbSetupError> {
    match contents.trim().split_once('=') {
        Some(("POSTGRES_PASSWORD", password)) => Ok(password),
        Some((password_var, _)) => Err(DbSetupError::BadPwVariable(password_var.to_owned())),
        None => Err(DbSetupError::NoPwVariable),
    }
}

/// Connects to the database
///
/// # Parameters
/// - `pg_user`: The username for the database
/// - `password`: The password for the database
/// - `pg_host`: The hostname for the database
/// - `pg_port`: The port the database listens on
/// - `pg_dbname`: The name of the database
///
/// # Errors
/// This function will return an error if the connection to the database cannot be established.
async fn db_connect(
    pg_user: &str,
    password: &str,
    pg_host: &str,
    pg_port: &str,
    pg_dbname: &str,
) -> Result<Pool<Postgres>, sqlx::Error> {
    let url = format!(
        "postgresql://{}:{}@{}:{}/{}",
        pg_user,
        password.trim(),
        pg_host,
        pg_port,
        pg_dbname,
    );

    let url_without_pw = format!("postgresql://{pg_user}:REDACTED@{pg_host}:{pg_port}/{pg_dbname}");
    info!("Attempting Connection to: {}", url_without_pw);

    PgPoolOptions::new().connect(&url).await
}
