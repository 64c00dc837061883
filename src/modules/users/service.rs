use std::collections::HashMap;

use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::modules::users::model::{
    CreateStudentDto, Role, StudentView, UpdateStudentDto, UserRecord,
};
use crate::utils::errors::AppError;
use crate::utils::filter::{FilterRule, Matcher, echo_params, fetch_page, push_filters, rule};
use crate::utils::pagination::{PageEnvelope, PageQuery};
use crate::utils::password::hash_password;

const STUDENT_FILTERS: &[FilterRule] = &[
    rule("name", "u.username", Matcher::ExactFold),
    rule("email", "u.email", Matcher::ExactFold),
    rule("group", "u.user_group", Matcher::ExactFold),
    rule("name_like", "u.username", Matcher::Prefix),
];

const STUDENT_SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "u.id"),
    ("name", "u.username"),
    ("username", "u.username"),
    ("email", "u.email"),
    ("group", "u.user_group"),
];

/// Restricts a `users u` query to users holding ROLE_USER.
const STUDENT_ROLE_CLAUSE: &str = " AND EXISTS (
        SELECT 1 FROM users_roles ur
        JOIN roles r ON r.id = ur.role_id
        WHERE ur.user_id = u.id AND r.name = 'ROLE_USER'
    )";

pub struct UserService;

impl UserService {
    /// Look up the role's id, creating the row when it does not exist yet.
    pub async fn ensure_role<'e, E>(executor: E, role: Role) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO roles (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(role.as_str())
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_username(
        db: &PgPool,
        username: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, password, user_group FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by username")
        .map_err(AppError::database)?;

        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, password, user_group FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by id")
        .map_err(AppError::database)?;

        Ok(user)
    }

    pub async fn get_roles(db: &PgPool, user_id: i64) -> Result<Vec<Role>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM roles r
             JOIN users_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch user roles")
        .map_err(AppError::database)?;

        Ok(names.iter().filter_map(|name| name.parse().ok()).collect())
    }

    /// Email addresses of every user holding `role`, or of all users when
    /// `role` is `None`. Blank addresses are excluded.
    pub async fn emails_by_role(db: &PgPool, role: Option<Role>) -> Result<Vec<String>, AppError> {
        let emails = match role {
            Some(role) => sqlx::query_scalar::<_, String>(
                "SELECT u.email FROM users u
                 JOIN users_roles ur ON ur.user_id = u.id
                 JOIN roles r ON r.id = ur.role_id
                 WHERE r.name = $1 AND u.email <> ''",
            )
            .bind(role.as_str())
            .fetch_all(db)
            .await,
            None => {
                sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE email <> ''")
                    .fetch_all(db)
                    .await
            }
        }
        .context("Failed to fetch recipient emails")
        .map_err(AppError::database)?;

        Ok(emails)
    }

    /// Create a user with a single role. Shared by registration and the
    /// student create endpoint.
    #[instrument(skip(db, password))]
    pub async fn create_user(
        db: &PgPool,
        username: &str,
        email: &str,
        password: &str,
        group: Option<&str>,
        role: Role,
    ) -> Result<UserRecord, AppError> {
        if Self::find_by_username(db, username).await?.is_some() {
            return Err(AppError::bad_request(
                "User with this username already exists",
            ));
        }

        let hashed = hash_password(password)?;

        let mut tx = db.begin().await?;

        let user = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, email, password, user_group)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, email, password, user_group",
        )
        .bind(username)
        .bind(email)
        .bind(&hashed)
        .bind(group)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request(format!(
                        "User with username {} or email {} already exists",
                        username, email
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        let role_id = Self::ensure_role(&mut *tx, role).await?;

        sqlx::query("INSERT INTO users_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user.id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    #[instrument(skip(db, dto))]
    pub async fn create_student(
        db: &PgPool,
        dto: CreateStudentDto,
    ) -> Result<StudentView, AppError> {
        let user = Self::create_user(
            db,
            &dto.username,
            &dto.email,
            &dto.password,
            dto.group.as_deref(),
            Role::User,
        )
        .await?;

        Ok(StudentView {
            id: user.id,
            username: user.username,
            email: user.email,
            group: user.user_group,
        })
    }

    /// All users holding ROLE_USER, in id order.
    #[instrument(skip(db))]
    pub async fn get_students(db: &PgPool) -> Result<Vec<StudentView>, AppError> {
        let students = sqlx::query_as::<_, StudentView>(
            "SELECT u.id, u.username, u.email, u.user_group FROM users u
             WHERE EXISTS (
                 SELECT 1 FROM users_roles ur
                 JOIN roles r ON r.id = ur.role_id
                 WHERE ur.user_id = u.id AND r.name = 'ROLE_USER'
             )
             ORDER BY u.id",
        )
        .fetch_all(db)
        .await
        .context("Failed to fetch students")
        .map_err(AppError::database)?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: i64) -> Result<StudentView, AppError> {
        let user = Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Student not found"))?;

        Ok(StudentView {
            id: user.id,
            username: user.username,
            email: user.email,
            group: user.user_group,
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: i64,
        dto: UpdateStudentDto,
    ) -> Result<StudentView, AppError> {
        let existing = Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Student not found"))?;

        let password = match dto.password.as_deref() {
            Some(plain) if !plain.is_empty() => hash_password(plain)?,
            _ => existing.password,
        };

        let updated = sqlx::query_as::<_, UserRecord>(
            "UPDATE users SET username = $1, password = $2
             WHERE id = $3
             RETURNING id, username, email, password, user_group",
        )
        .bind(&dto.username)
        .bind(&password)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::bad_request(format!(
                        "User with username {} already exists",
                        dto.username
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(StudentView {
            id: updated.id,
            username: updated.username,
            email: updated.email,
            group: updated.user_group,
        })
    }

    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Student not found"));
        }

        Ok(())
    }

    /// Filtered, paginated student listing over users holding ROLE_USER.
    #[instrument(skip(db, params, paging))]
    pub async fn list_students_filtered(
        db: &PgPool,
        params: &HashMap<String, String>,
        paging: &PageQuery,
    ) -> Result<PageEnvelope<StudentView>, AppError> {
        let request = paging
            .resolve("id,asc", STUDENT_SORT_COLUMNS, "u.id")
            .map_err(|e| {
                tracing::error!(error = %e, "invalid student paging parameters");
                AppError::internal("Filtering failed")
            })?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE TRUE");
        count.push(STUDENT_ROLE_CLAUSE);
        push_filters(&mut count, STUDENT_FILTERS, params);

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT u.id, u.username, u.email, u.user_group FROM users u WHERE TRUE",
        );
        select.push(STUDENT_ROLE_CLAUSE);
        push_filters(&mut select, STUDENT_FILTERS, params);

        let page = fetch_page::<StudentView>(db, count, select, &request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "student filter query failed");
                AppError::internal("Filtering failed")
            })?;

        Ok(PageEnvelope::new(page.rows, &request, page.total).with_filters(echo_params(params)))
    }
}
