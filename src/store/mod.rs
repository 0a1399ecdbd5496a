//! Persistence gateway over the three collections the API touches.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{StatusCheck, Student, StudentWork, WorkPatch};
use crate::Error;

/// Cap applied by every list endpoint.
pub const LIST_LIMIT: usize = 1000;

pub(crate) const DUPLICATE_STUDENT: &str = "Username or email already registered";

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), Error>;

    async fn list_status_checks(&self, limit: usize) -> Result<Vec<StatusCheck>, Error>;

    /// Inserts `student` unless its username or email is already taken, in
    /// which case `Error::Conflict` is returned. Check and insert are atomic.
    async fn insert_student(&self, student: &Student) -> Result<(), Error>;

    async fn find_student_by_username(&self, username: &str) -> Result<Option<Student>, Error>;

    async fn insert_work(&self, work: &StudentWork) -> Result<(), Error>;

    async fn list_works(&self, student_id: Uuid, limit: usize) -> Result<Vec<StudentWork>, Error>;

    async fn find_work(&self, id: Uuid, student_id: Uuid) -> Result<Option<StudentWork>, Error>;

    /// Applies `patch` to the work owned by `student_id`. The stored
    /// `updated_at` always moves strictly forward.
    async fn update_work(
        &self,
        id: Uuid,
        student_id: Uuid,
        patch: WorkPatch,
    ) -> Result<Option<StudentWork>, Error>;

    /// Returns the number of removed works (0 or 1).
    async fn delete_work(&self, id: Uuid, student_id: Uuid) -> Result<u64, Error>;

    async fn close(&self);
}
