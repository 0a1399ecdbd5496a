use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, DUPLICATE_STUDENT};
use crate::models::{StatusCheck, Student, StudentWork, WorkPatch};
use crate::Error;

pub struct PgStore {
    pg: PgPool,
}

impl PgStore {
    /// Opens the pool and brings the schema up to date.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pg = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        sqlx::migrate!("./migrations").run(&pg).await?;
        Ok(Self { pg })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), Error> {
        sqlx::query("INSERT INTO status_checks VALUES ($1, $2, $3)")
            .bind(&check.id)
            .bind(&check.client_name)
            .bind(&check.timestamp)
            .execute(&self.pg)
            .await?;
        Ok(())
    }

    async fn list_status_checks(&self, limit: usize) -> Result<Vec<StatusCheck>, Error> {
        Ok(sqlx::query_as::<_, StatusCheck>(
            "SELECT * FROM status_checks ORDER BY timestamp LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pg)
        .await?)
    }

    async fn insert_student(&self, student: &Student) -> Result<(), Error> {
        let res = sqlx::query(
            "INSERT INTO students VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT DO NOTHING",
        )
        .bind(&student.id)
        .bind(&student.email)
        .bind(&student.username)
        .bind(&student.full_name)
        .bind(&student.hashed_password)
        .bind(&student.created_at)
        .execute(&self.pg)
        .await?;

        if res.rows_affected() < 1 {
            return Err(Error::conflict(DUPLICATE_STUDENT));
        }
        Ok(())
    }

    async fn find_student_by_username(&self, username: &str) -> Result<Option<Student>, Error> {
        Ok(
            sqlx::query_as::<_, Student>("SELECT * FROM students WHERE username = $1 LIMIT 1")
                .bind(username)
                .fetch_optional(&self.pg)
                .await?,
        )
    }

    async fn insert_work(&self, work: &StudentWork) -> Result<(), Error> {
        sqlx::query("INSERT INTO student_works VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(&work.id)
            .bind(&work.student_id)
            .bind(&work.title)
            .bind(&work.content)
            .bind(&work.created_at)
            .bind(&work.updated_at)
            .execute(&self.pg)
            .await?;
        Ok(())
    }

    async fn list_works(&self, student_id: Uuid, limit: usize) -> Result<Vec<StudentWork>, Error> {
        Ok(sqlx::query_as::<_, StudentWork>(
            "SELECT * FROM student_works WHERE student_id = $1 ORDER BY created_at LIMIT $2",
        )
        .bind(student_id)
        .bind(limit as i64)
        .fetch_all(&self.pg)
        .await?)
    }

    async fn find_work(&self, id: Uuid, student_id: Uuid) -> Result<Option<StudentWork>, Error> {
        Ok(sqlx::query_as::<_, StudentWork>(
            "SELECT * FROM student_works WHERE id = $1 AND student_id = $2 LIMIT 1",
        )
        .bind(id)
        .bind(student_id)
        .fetch_optional(&self.pg)
        .await?)
    }

    async fn update_work(
        &self,
        id: Uuid,
        student_id: Uuid,
        patch: WorkPatch,
    ) -> Result<Option<StudentWork>, Error> {
        Ok(sqlx::query_as::<_, StudentWork>(
            "UPDATE student_works \
             SET title = $3, content = $4, \
                 updated_at = GREATEST($5, updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 AND student_id = $2 \
             RETURNING *",
        )
        .bind(id)
        .bind(student_id)
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.updated_at)
        .fetch_optional(&self.pg)
        .await?)
    }

    async fn delete_work(&self, id: Uuid, student_id: Uuid) -> Result<u64, Error> {
        let res = sqlx::query("DELETE FROM student_works WHERE id = $1 AND student_id = $2")
            .bind(id)
            .bind(student_id)
            .execute(&self.pg)
            .await?;
        Ok(res.rows_affected())
    }

    async fn close(&self) {
        self.pg.close().await;
        log::info!("Database pool closed");
    }
}
