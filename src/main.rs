#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod db;
mod env;
mod error;
mod models;
mod stats;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use api::{bad_request_api, unprocessable_api};
use auth::{NewPerson, Registration, forbidden_api, not_found_api, unauthorized_api};
use db::{admin_exists, clean_expired_sessions, create_person};
use env::{PortalConfig, load_environment};
use error::AppError;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket, tokio};
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;

use sqlx::SqlitePool;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Environment(String),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("{0}")]
    Rocket(#[from] rocket::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

const SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[rocket::main]
async fn main() -> Result<(), Error> {
    load_environment().map_err(|e| Error::Environment(e.to_string()))?;
    let _otel_guard = init_tracing()?;

    let database_url = std::env::var("DATABASE_URL").unwrap_or_default();
    let pool = SqlitePool::connect(&database_url).await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(AppError::from)?;
    info!("Migrations completed successfully");

    let pool_clone = pool.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match clean_expired_sessions(&pool_clone).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to clean expired sessions: {}", e);
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(
                SESSION_CLEANUP_INTERVAL_SECS,
            ))
            .await;
        }
    });

    init_rocket(pool).await.launch().await?;

    Ok(())
}

pub async fn init_rocket(pool: SqlitePool) -> Rocket<Build> {
    info!("Starting academic portal");

    rocket::build()
        .manage(pool)
        .mount("/api", api::routes())
        .register(
            "/api",
            catchers![
                unauthorized_api,
                forbidden_api,
                not_found_api,
                bad_request_api,
                unprocessable_api
            ],
        )
        .attach(AdHoc::config::<PortalConfig>())
        .attach(AdHoc::try_on_ignite("Bootstrap admin", bootstrap_admin))
        .attach(TelemetryFairing)
}

/// Creates the configured admin account when the store has none yet.
async fn bootstrap_admin(rocket: Rocket<Build>) -> Result<Rocket<Build>, Rocket<Build>> {
    let (Some(pool), Some(config)) = (
        rocket.state::<SqlitePool>(),
        rocket.state::<PortalConfig>(),
    ) else {
        error!("Bootstrap admin fairing ran without pool or config");
        return Err(rocket);
    };

    let Some((username, password)) = config.bootstrap_admin() else {
        return Ok(rocket);
    };

    let result = async {
        if admin_exists(pool).await? {
            return Ok::<_, AppError>(false);
        }

        let registration = Registration {
            role: "Admin".to_string(),
            name: "Administrator".to_string(),
            username: Some(username.to_string()),
            sap_id: None,
            department: None,
            year: None,
            division: None,
            subject: None,
            password: password.to_string(),
        };
        let new_person = NewPerson::try_from(&registration)?;
        create_person(pool, &new_person, password).await?;

        Ok(true)
    }
    .await;

    match result {
        Ok(true) => {
            info!(username = %username, "Bootstrap admin created");
            Ok(rocket)
        }
        Ok(false) => Ok(rocket),
        Err(err) => {
            err.log_and_record("Bootstrap admin");
            Err(rocket)
        }
    }
}
