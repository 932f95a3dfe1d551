//! Postgres-backed store.
//!
//! The schema is applied at connect time with idempotent statements, so a
//! fresh database needs no external migration step.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::{GateConfig, NewStudent, Outcome, Principal, Store, StoreError, Student};

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS admins (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )",
    r"
    CREATE TABLE IF NOT EXISTS students (
        id UUID PRIMARY KEY,
        nis TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        birth_date DATE NOT NULL,
        outcome TEXT NOT NULL,
        notes TEXT
    )",
    r"
    CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        is_open BOOLEAN NOT NULL,
        announcement_date TIMESTAMPTZ
    )",
];

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn db_span(operation: &str, query: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = query
    )
}

fn student_from_row(row: &PgRow) -> Result<Student> {
    let outcome: String = row.get("outcome");
    let outcome =
        Outcome::parse(&outcome).ok_or_else(|| anyhow!("unknown outcome value: {outcome}"))?;
    Ok(Student {
        id: row.get("id"),
        primary_identifier: row.get("nis"),
        name: row.get("name"),
        category: row.get("category"),
        birth_date: row.get("birth_date"),
        outcome,
        notes: row.get("notes"),
    })
}

fn principal_from_row(row: &PgRow) -> Principal {
    Principal {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
    }
}

/// Postgres [`Store`]. One pool per process.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to Postgres and apply the schema.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be established or a schema
    /// statement fails.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;
        let store = Self { pool };
        store.apply_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply_schema(&self) -> Result<()> {
        for query in SCHEMA {
            let span = db_span("DDL", query);
            sqlx::query(query)
                .execute(&self.pool)
                .instrument(span)
                .await
                .with_context(|| format!("failed to apply schema statement: {query}"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn principal_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let query = "SELECT id, email, password_hash FROM admins WHERE email = $1";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to lookup admin by email")?;
        Ok(row.as_ref().map(principal_from_row))
    }

    async fn principal_by_id(&self, id: Uuid) -> Result<Option<Principal>, StoreError> {
        let query = "SELECT id, email, password_hash FROM admins WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to lookup admin by id")?;
        Ok(row.as_ref().map(principal_from_row))
    }

    async fn create_principal(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Principal, StoreError> {
        let id = Uuid::new_v4();
        let query = "INSERT INTO admins (id, email, password_hash) VALUES ($1, $2, $3)";
        let result = sqlx::query(query)
            .bind(id)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await;
        match result {
            Ok(_) => Ok(Principal {
                id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            }),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to insert admin")
                .into()),
        }
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let query =
            "SELECT id, nis, name, category, birth_date, outcome, notes FROM students ORDER BY nis";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to list students")?;
        let mut students = Vec::with_capacity(rows.len());
        for row in &rows {
            students.push(student_from_row(row)?);
        }
        Ok(students)
    }

    async fn student_by_identifier(
        &self,
        primary_identifier: &str,
    ) -> Result<Option<Student>, StoreError> {
        let query =
            "SELECT id, nis, name, category, birth_date, outcome, notes FROM students WHERE nis = $1";
        let row = sqlx::query(query)
            .bind(primary_identifier)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to lookup student")?;
        match row {
            Some(row) => Ok(Some(student_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let id = Uuid::new_v4();
        let query = r"
            INSERT INTO students (id, nis, name, category, birth_date, outcome, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(&new.primary_identifier)
            .bind(&new.name)
            .bind(&new.category)
            .bind(new.birth_date)
            .bind(new.outcome.as_str())
            .bind(&new.notes)
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await;
        match result {
            Ok(_) => Ok(Student {
                id,
                primary_identifier: new.primary_identifier,
                name: new.name,
                category: new.category,
                birth_date: new.birth_date,
                outcome: new.outcome,
                notes: new.notes,
            }),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to insert student")
                .into()),
        }
    }

    async fn update_student(&self, id: Uuid, new: NewStudent) -> Result<Student, StoreError> {
        let query = r"
            UPDATE students
            SET nis = $2, name = $3, category = $4, birth_date = $5, outcome = $6, notes = $7
            WHERE id = $1
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(&new.primary_identifier)
            .bind(&new.name)
            .bind(&new.category)
            .bind(new.birth_date)
            .bind(new.outcome.as_str())
            .bind(&new.notes)
            .execute(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound),
            Ok(_) => Ok(Student {
                id,
                primary_identifier: new.primary_identifier,
                name: new.name,
                category: new.category,
                birth_date: new.birth_date,
                outcome: new.outcome,
                notes: new.notes,
            }),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to update student")
                .into()),
        }
    }

    async fn delete_student(&self, id: Uuid) -> Result<(), StoreError> {
        let query = "DELETE FROM students WHERE id = $1";
        let done = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await
            .context("failed to delete student")?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn gate_config(&self) -> Result<Option<GateConfig>, StoreError> {
        let query = "SELECT is_open, announcement_date FROM settings WHERE id = 1";
        let row = sqlx::query(query)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to read gate configuration")?;
        Ok(row.map(|row| GateConfig {
            is_open: row.get("is_open"),
            announcement_date: row.get("announcement_date"),
        }))
    }

    async fn set_gate_config(&self, config: GateConfig) -> Result<GateConfig, StoreError> {
        // There is always exactly one logical row; id is pinned to 1.
        let query = r"
            INSERT INTO settings (id, is_open, announcement_date)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE
            SET is_open = EXCLUDED.is_open, announcement_date = EXCLUDED.announcement_date
        ";
        sqlx::query(query)
            .bind(config.is_open)
            .bind(config.announcement_date)
            .execute(&self.pool)
            .instrument(db_span("UPSERT", query))
            .await
            .context("failed to write gate configuration")?;
        Ok(config)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let query = "SELECT 1";
        sqlx::query(query)
            .execute(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("database ping failed")?;
        Ok(())
    }
}
