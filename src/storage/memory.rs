//! In-memory store used by tests and DSN-less deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{GateConfig, NewStudent, Principal, Store, StoreError, Student};

/// Map-backed [`Store`]. State lives for the process lifetime only.
#[derive(Default)]
pub struct MemStore {
    principals: Mutex<HashMap<Uuid, Principal>>,
    students: Mutex<HashMap<Uuid, Student>>,
    gate: Mutex<Option<GateConfig>>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn principal_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let principals = self.principals.lock().await;
        Ok(principals.values().find(|p| p.email == email).cloned())
    }

    async fn principal_by_id(&self, id: Uuid) -> Result<Option<Principal>, StoreError> {
        let principals = self.principals.lock().await;
        Ok(principals.get(&id).cloned())
    }

    async fn create_principal(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Principal, StoreError> {
        let mut principals = self.principals.lock().await;
        if principals.values().any(|p| p.email == email) {
            return Err(StoreError::Duplicate);
        }
        let principal = Principal {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let students = self.students.lock().await;
        let mut rows: Vec<Student> = students.values().cloned().collect();
        rows.sort_by(|a, b| a.primary_identifier.cmp(&b.primary_identifier));
        Ok(rows)
    }

    async fn student_by_identifier(
        &self,
        primary_identifier: &str,
    ) -> Result<Option<Student>, StoreError> {
        let students = self.students.lock().await;
        Ok(students
            .values()
            .find(|s| s.primary_identifier == primary_identifier)
            .cloned())
    }

    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let mut students = self.students.lock().await;
        if students
            .values()
            .any(|s| s.primary_identifier == new.primary_identifier)
        {
            return Err(StoreError::Duplicate);
        }
        let student = Student {
            id: Uuid::new_v4(),
            primary_identifier: new.primary_identifier,
            name: new.name,
            category: new.category,
            birth_date: new.birth_date,
            outcome: new.outcome,
            notes: new.notes,
        };
        students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update_student(&self, id: Uuid, new: NewStudent) -> Result<Student, StoreError> {
        let mut students = self.students.lock().await;
        if !students.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if students
            .values()
            .any(|s| s.id != id && s.primary_identifier == new.primary_identifier)
        {
            return Err(StoreError::Duplicate);
        }
        let student = Student {
            id,
            primary_identifier: new.primary_identifier,
            name: new.name,
            category: new.category,
            birth_date: new.birth_date,
            outcome: new.outcome,
            notes: new.notes,
        };
        students.insert(id, student.clone());
        Ok(student)
    }

    async fn delete_student(&self, id: Uuid) -> Result<(), StoreError> {
        let mut students = self.students.lock().await;
        match students.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn gate_config(&self) -> Result<Option<GateConfig>, StoreError> {
        Ok(*self.gate.lock().await)
    }

    async fn set_gate_config(&self, config: GateConfig) -> Result<GateConfig, StoreError> {
        *self.gate.lock().await = Some(config);
        Ok(config)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
