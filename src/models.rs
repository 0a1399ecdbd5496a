use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Current instant at the microsecond precision the database keeps, so a
/// freshly created record serializes the same as when it is read back.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct StatusCheck {
    pub id: Uuid,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(client_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_name,
            timestamp: now(),
        }
    }
}

/// A registered student. The password hash is kept out of every response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Student {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct StudentWork {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentWork {
    pub fn new(student_id: Uuid, body: WorkBody) -> Self {
        let created_at = now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            title: body.title,
            content: body.content,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Replacement title/content for a work; `updated_at` is the requested
/// modification instant.
#[derive(Debug, Clone)]
pub struct WorkPatch {
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// Any client name is accepted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStatusCheck {
    pub client_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    pub full_name: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginStudent {
    pub username: String,
    pub password: String,
}

/// Title and content are free text; empty values are allowed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WorkBody {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}
