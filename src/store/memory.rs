use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, DUPLICATE_STUDENT};
use crate::models::{StatusCheck, Student, StudentWork, WorkPatch};
use crate::Error;

#[derive(Default)]
struct Collections {
    status_checks: Vec<StatusCheck>,
    students: HashMap<Uuid, Student>,
    works: HashMap<Uuid, StudentWork>,
}

/// In-process store for development runs without a database, and for tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), Error> {
        self.inner.write().await.status_checks.push(check.clone());
        Ok(())
    }

    async fn list_status_checks(&self, limit: usize) -> Result<Vec<StatusCheck>, Error> {
        let inner = self.inner.read().await;
        Ok(inner.status_checks.iter().take(limit).cloned().collect())
    }

    async fn insert_student(&self, student: &Student) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        let taken = inner
            .students
            .values()
            .any(|s| s.username == student.username || s.email == student.email);
        if taken {
            return Err(Error::conflict(DUPLICATE_STUDENT));
        }
        inner.students.insert(student.id, student.clone());
        Ok(())
    }

    async fn find_student_by_username(&self, username: &str) -> Result<Option<Student>, Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .students
            .values()
            .find(|s| s.username == username)
            .cloned())
    }

    async fn insert_work(&self, work: &StudentWork) -> Result<(), Error> {
        self.inner.write().await.works.insert(work.id, work.clone());
        Ok(())
    }

    async fn list_works(&self, student_id: Uuid, limit: usize) -> Result<Vec<StudentWork>, Error> {
        let inner = self.inner.read().await;
        let mut works: Vec<StudentWork> = inner
            .works
            .values()
            .filter(|w| w.student_id == student_id)
            .cloned()
            .collect();
        works.sort_by_key(|w| w.created_at);
        works.truncate(limit);
        Ok(works)
    }

    async fn find_work(&self, id: Uuid, student_id: Uuid) -> Result<Option<StudentWork>, Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .works
            .get(&id)
            .filter(|w| w.student_id == student_id)
            .cloned())
    }

    async fn update_work(
        &self,
        id: Uuid,
        student_id: Uuid,
        patch: WorkPatch,
    ) -> Result<Option<StudentWork>, Error> {
        let mut inner = self.inner.write().await;
        let work = match inner.works.get_mut(&id) {
            Some(work) if work.student_id == student_id => work,
            _ => return Ok(None),
        };
        work.title = patch.title;
        work.content = patch.content;
        work.updated_at = patch
            .updated_at
            .max(work.updated_at + Duration::microseconds(1));
        Ok(Some(work.clone()))
    }

    async fn delete_work(&self, id: Uuid, student_id: Uuid) -> Result<u64, Error> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .works
            .get(&id)
            .map_or(false, |w| w.student_id == student_id);
        if !owned {
            return Ok(0);
        }
        inner.works.remove(&id);
        Ok(1)
    }

    async fn close(&self) {
        log::debug!("Memory store closed");
    }
}
