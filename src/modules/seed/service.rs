use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::users::model::Role;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;

const SEED_PASSWORD: &str = "123123";

/// Outcome of a seeding run. Counters only cover rows created by this run;
/// rows that already existed are skipped.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub users_created: usize,
    pub courses_created: usize,
}

pub struct SeedService;

impl SeedService {
    /// Populate the database with demo data. Safe to call repeatedly.
    #[instrument(skip(db))]
    pub async fn seed(db: &PgPool) -> Result<SeedReport, AppError> {
        let mut report = SeedReport::default();

        for role in Role::ALL {
            UserService::ensure_role(db, role)
                .await
                .context("Failed to seed roles")
                .map_err(AppError::database)?;
        }

        for (prefix, role) in [
            ("user", Role::User),
            ("teacher", Role::Teacher),
            ("admin", Role::Admin),
        ] {
            for n in 1..=4 {
                let username = format!("{prefix}{n}");
                if UserService::find_by_username(db, &username).await?.is_some() {
                    continue;
                }
                let email = format!("{username}@example.com");
                UserService::create_user(db, &username, &email, SEED_PASSWORD, None, role).await?;
                report.users_created += 1;
            }
        }

        for n in 1..=4 {
            let title = format!("Course {n}");
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM courses WHERE title = $1)",
            )
            .bind(&title)
            .fetch_one(db)
            .await
            .context("Failed to check course existence")
            .map_err(AppError::database)?;
            if exists {
                continue;
            }

            sqlx::query(
                "INSERT INTO courses (title, description, credit_hours) VALUES ($1, $2, $3)",
            )
            .bind(&title)
            .bind(format!("Description for course {n}"))
            .bind(3i32)
            .execute(db)
            .await
            .context("Failed to seed course")
            .map_err(AppError::database)?;
            report.courses_created += 1;
        }

        Ok(report)
    }
}
