use std::str::FromStr;

use axum::extract::Path;
use axum::Extension;
use uuid::Uuid;

use crate::auth::CurrentStudent;
use crate::models::{self, Message, StudentWork, WorkBody, WorkPatch};
use crate::store::LIST_LIMIT;
use crate::valid::ValidJson;
use crate::{proceeds, AppState, Error, Payload};

fn work_not_found() -> Error {
    Error::not_found("Work not found")
}

/// Ids that are not UUIDs cannot name any stored work.
fn parse_work_id(raw: &str) -> Result<Uuid, Error> {
    Uuid::from_str(raw).map_err(|_| work_not_found())
}

pub async fn create_work(
    Extension(state): Extension<AppState>,
    CurrentStudent(student): CurrentStudent,
    ValidJson(body): ValidJson<WorkBody>,
) -> Payload<StudentWork> {
    let work = StudentWork::new(student.id, body);
    state.store.insert_work(&work).await?;
    proceeds(work)
}

pub async fn list_works(
    Extension(state): Extension<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Payload<Vec<StudentWork>> {
    proceeds(state.store.list_works(student.id, LIST_LIMIT).await?)
}

pub async fn get_work(
    Path(work_id): Path<String>,
    Extension(state): Extension<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Payload<StudentWork> {
    let id = parse_work_id(&work_id)?;
    match state.store.find_work(id, student.id).await? {
        Some(work) => proceeds(work),
        None => Err(work_not_found()),
    }
}

pub async fn update_work(
    Path(work_id): Path<String>,
    Extension(state): Extension<AppState>,
    CurrentStudent(student): CurrentStudent,
    ValidJson(body): ValidJson<WorkBody>,
) -> Payload<StudentWork> {
    let id = parse_work_id(&work_id)?;
    let patch = WorkPatch {
        title: body.title,
        content: body.content,
        updated_at: models::now(),
    };
    match state.store.update_work(id, student.id, patch).await? {
        Some(work) => proceeds(work),
        None => Err(work_not_found()),
    }
}

pub async fn delete_work(
    Path(work_id): Path<String>,
    Extension(state): Extension<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Payload<Message> {
    let id = parse_work_id(&work_id)?;
    if state.store.delete_work(id, student.id).await? == 0 {
        return Err(work_not_found());
    }
    proceeds(Message::new("Work deleted successfully"))
}
