//! First-start provisioning.
//!
//! [`run`] is idempotent: it creates the administrator account and the gate
//! row only when they are missing, plus an optional pair of demo students for
//! local development. Concurrent instances may race on the same rows, so
//! duplicate errors from the store are tolerated rather than fatal.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::{
    hash::CredentialHasher,
    storage::{GateConfig, NewStudent, Outcome, Store, StoreError},
};

/// Provision the store on startup.
///
/// # Errors
/// Returns an error if the store is unreachable or password hashing fails.
pub async fn run(
    store: &dyn Store,
    hasher: CredentialHasher,
    admin_email: &str,
    admin_password: &SecretString,
    seed_demo: bool,
) -> Result<()> {
    ensure_admin(store, hasher, admin_email, admin_password).await?;
    ensure_gate(store).await?;
    if seed_demo {
        ensure_demo_students(store).await?;
    }
    Ok(())
}

async fn ensure_admin(
    store: &dyn Store,
    hasher: CredentialHasher,
    email: &str,
    password: &SecretString,
) -> Result<()> {
    if store.principal_by_email(email).await?.is_some() {
        debug!("Administrator already present");
        return Ok(());
    }

    let password = password.expose_secret().to_string();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("password hashing task failed")??;

    match store.create_principal(email, &password_hash).await {
        Ok(_) => info!(email = %email, "Administrator created"),
        // Another instance won the race, nothing left to do.
        Err(StoreError::Duplicate) => {}
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

// The gate row is only created, never reset. An operator who opened the gate
// keeps it open across restarts.
async fn ensure_gate(store: &dyn Store) -> Result<()> {
    if store.gate_config().await?.is_none() {
        store.set_gate_config(GateConfig::default()).await?;
        info!("Gate configuration created, announcements start closed");
    }
    Ok(())
}

async fn ensure_demo_students(store: &dyn Store) -> Result<()> {
    for row in demo_students() {
        let identifier = row.primary_identifier.clone();
        match store.create_student(row).await {
            Ok(_) => info!(primary_identifier = %identifier, "Demo student created"),
            Err(StoreError::Duplicate) => {
                debug!(primary_identifier = %identifier, "Demo student already present");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn demo_students() -> Vec<NewStudent> {
    vec![
        NewStudent {
            primary_identifier: "12345".to_string(),
            name: "Budi Santoso".to_string(),
            category: "Teknik Komputer dan Jaringan".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2006, 5, 15).unwrap_or_default(),
            outcome: Outcome::Passed,
            notes: Some("Selamat, tingkatkan terus prestasimu!".to_string()),
        },
        NewStudent {
            primary_identifier: "12346".to_string(),
            name: "Siti Aminah".to_string(),
            category: "Rekayasa Perangkat Lunak".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2006, 8, 20).unwrap_or_default(),
            outcome: Outcome::Failed,
            notes: Some("Jangan menyerah, tetap semangat belajar!".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemStore;

    fn cheap_hasher() -> CredentialHasher {
        CredentialHasher::new().with_params(4, 2, 1)
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = MemStore::new();
        let password = SecretString::from("admin123");

        run(&store, cheap_hasher(), "admin@smkn2godean.sch.id", &password, true)
            .await
            .unwrap();
        run(&store, cheap_hasher(), "admin@smkn2godean.sch.id", &password, true)
            .await
            .unwrap();

        let admin = store
            .principal_by_email("admin@smkn2godean.sch.id")
            .await
            .unwrap()
            .unwrap();
        assert!(cheap_hasher().verify("admin123", &admin.password_hash));

        let gate = store.gate_config().await.unwrap().unwrap();
        assert!(!gate.is_open);
        assert_eq!(gate.announcement_date, None);

        let roster = store.list_students().await.unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[tokio::test]
    async fn demo_students_only_with_flag() {
        let store = MemStore::new();
        let password = SecretString::from("admin123");

        run(&store, cheap_hasher(), "admin@smkn2godean.sch.id", &password, false)
            .await
            .unwrap();

        assert!(store.list_students().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_admin_is_left_alone() {
        let store = MemStore::new();
        let hasher = cheap_hasher();
        let original_hash = hasher.hash("original-secret").unwrap();
        store
            .create_principal("admin@smkn2godean.sch.id", &original_hash)
            .await
            .unwrap();

        let password = SecretString::from("admin123");
        run(&store, hasher, "admin@smkn2godean.sch.id", &password, false)
            .await
            .unwrap();

        let admin = store
            .principal_by_email("admin@smkn2godean.sch.id")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.password_hash, original_hash);
    }

    #[tokio::test]
    async fn open_gate_survives_restart() {
        let store = MemStore::new();
        store
            .set_gate_config(GateConfig {
                is_open: true,
                announcement_date: None,
            })
            .await
            .unwrap();

        let password = SecretString::from("admin123");
        run(&store, cheap_hasher(), "admin@smkn2godean.sch.id", &password, false)
            .await
            .unwrap();

        let gate = store.gate_config().await.unwrap().unwrap();
        assert!(gate.is_open);
    }

    #[tokio::test]
    async fn demo_rows_carry_verdicts() {
        let rows = demo_students();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].outcome, Outcome::Passed);
        assert_eq!(rows[1].outcome, Outcome::Failed);
        assert!(rows.iter().all(|row| row.notes.is_some()));
    }
}
