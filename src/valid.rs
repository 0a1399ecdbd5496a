//! Body extractors that deserialize and then run `validator` checks, so
//! handlers only ever see well-formed input.

use axum::async_trait;
use axum::body::HttpBody;
use axum::extract::{FromRequest, RequestParts};
use axum::{BoxError, Form, Json};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::Error;

pub struct ValidJson<T>(pub T);

pub struct ValidForm<T>(pub T);

#[async_trait]
impl<T, B> FromRequest<B> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    B: HttpBody + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req)
            .await
            .map_err(|rejection| invalid(rejection.to_string()))?;
        value.validate().map_err(describe)?;
        Ok(ValidJson(value))
    }
}

#[async_trait]
impl<T, B> FromRequest<B> for ValidForm<T>
where
    T: DeserializeOwned + Validate,
    B: HttpBody + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req)
            .await
            .map_err(|rejection| invalid(rejection.to_string()))?;
        value.validate().map_err(describe)?;
        Ok(ValidForm(value))
    }
}

fn invalid(message: String) -> Error {
    Error::ValidationError { message }
}

fn describe(errors: ValidationErrors) -> Error {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    fields.sort();

    if fields.is_empty() {
        invalid("Validation failed".to_string())
    } else {
        invalid(fields.join("; "))
    }
}
