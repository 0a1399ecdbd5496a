use axum::{Extension, Json};

use crate::models::{CreateStatusCheck, Message, StatusCheck};
use crate::store::LIST_LIMIT;
use crate::valid::ValidJson;
use crate::{proceeds, AppState, Payload};

pub async fn root() -> Json<Message> {
    Json(Message::new("Hello World"))
}

pub async fn create_status_check(
    Extension(state): Extension<AppState>,
    ValidJson(body): ValidJson<CreateStatusCheck>,
) -> Payload<StatusCheck> {
    let check = StatusCheck::new(body.client_name);
    state.store.insert_status_check(&check).await?;
    log::debug!("Status check from `{}`", check.client_name);
    proceeds(check)
}

pub async fn list_status_checks(Extension(state): Extension<AppState>) -> Payload<Vec<StatusCheck>> {
    proceeds(state.store.list_status_checks(LIST_LIMIT).await?)
}
