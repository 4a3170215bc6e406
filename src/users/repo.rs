use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{User, UserFields};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("user_name already exists")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Duplicate,
            _ => Self::Database(e),
        }
    }
}

/// Storage for users. Handlers only see this trait, so tests can swap the backend.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a user unless `user_name` is taken.
    async fn create(&self, fields: &UserFields) -> Result<User, RepoError>;
    async fn list(&self) -> Result<Vec<User>, RepoError>;
    async fn find(&self, id: i32) -> Result<Option<User>, RepoError>;
    /// Overwrites every mutable column. `None` when no row has this id.
    async fn update(&self, id: i32, fields: &UserFields) -> Result<Option<User>, RepoError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, fields: &UserFields) -> Result<User, RepoError> {
        let mut tx = self.db.begin().await?;

        // Serializes concurrent creates of the same name until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&fields.user_name)
            .execute(&mut *tx)
            .await?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_name = $1)")
                .bind(&fields.user_name)
                .fetch_one(&mut *tx)
                .await?;
        if taken {
            return Err(RepoError::Duplicate);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_name, first_name, last_name, email, user_status, department)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, user_name, first_name, last_name, email, user_status, department
            "#,
        )
        .bind(&fields.user_name)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.user_status)
        .bind(&fields.department)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, first_name, last_name, email, user_status, department
            FROM users
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i32) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, first_name, last_name, email, user_status, department
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: i32, fields: &UserFields) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET user_name = $1, first_name = $2, last_name = $3,
                   email = $4, user_status = $5, department = $6
             WHERE user_id = $7
            RETURNING user_id, user_name, first_name, last_name, email, user_status, department
            "#,
        )
        .bind(&fields.user_name)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.user_status)
        .bind(&fields.department)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
