use axum::async_trait;
use axum::extract::{FromRequest, RequestParts, TypedHeader};
use axum::headers::authorization::Bearer;
use axum::headers::Authorization;
use axum::Extension;
use uuid::Uuid;

use crate::models::{self, AccessToken, CreateStudent, LoginStudent, Student};
use crate::password::{hash_password, verify_password};
use crate::valid::{ValidForm, ValidJson};
use crate::{proceeds, AppState, Error, Payload};

const BAD_CREDENTIALS: &str = "Could not validate credentials";
const BAD_LOGIN: &str = "Incorrect username or password";

/// The student behind the request's bearer token, re-resolved on every request.
#[derive(Debug, Clone)]
pub struct CurrentStudent(pub Student);

#[async_trait]
impl<B> FromRequest<B> for CurrentStudent
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Extension(state) = Extension::<AppState>::from_request(req)
            .await
            .map_err(|err| Error::InternalError {
                kind: "StateError",
                message: err.to_string(),
            })?;

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request(req)
                .await
                .map_err(|_| Error::unauthorized(BAD_CREDENTIALS))?;

        let username = state.tokens.validate(bearer.token()).map_err(|err| {
            log::debug!("Rejected bearer token: {}", err);
            Error::unauthorized(BAD_CREDENTIALS)
        })?;

        match state.store.find_student_by_username(&username).await? {
            Some(student) => Ok(CurrentStudent(student)),
            None => Err(Error::unauthorized(BAD_CREDENTIALS)),
        }
    }
}

pub async fn register_student(
    Extension(state): Extension<AppState>,
    ValidJson(student): ValidJson<CreateStudent>,
) -> Payload<Student> {
    let student = Student {
        id: Uuid::new_v4(),
        hashed_password: hash_password(&student.password)?,
        email: student.email,
        username: student.username,
        full_name: student.full_name,
        created_at: models::now(),
    };

    state.store.insert_student(&student).await?;
    log::info!("Registered student `{}`", student.username);
    proceeds(student)
}

pub async fn login_student(
    Extension(state): Extension<AppState>,
    ValidForm(login): ValidForm<LoginStudent>,
) -> Payload<AccessToken> {
    let student = state.store.find_student_by_username(&login.username).await?;

    let student = match student {
        Some(student) if verify_password(&login.password, &student.hashed_password) => student,
        _ => {
            log::info!("Failed login for `{}`", login.username);
            return Err(Error::unauthorized(BAD_LOGIN));
        }
    };

    let token = state.tokens.issue(&student.username)?;
    proceeds(AccessToken::bearer(token))
}
