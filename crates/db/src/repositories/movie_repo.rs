//! Repository for the `movies` table.

use async_trait::async_trait;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use sqlx::PgPool;

use super::common::{ensure_references, Table};
use crate::error::classify;
use crate::models::movie::{CreateMovie, Movie, UpdateMovie};

const TABLE: Table = Table {
    name: "movies",
    columns: "id, name, description, image_url, video_source, video_path, video_url, \
              status, category_id, created_at, updated_at",
};

/// Provides CRUD operations for movies.
pub struct MovieRepo {
    pool: PgPool,
}

impl MovieRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Movie> for MovieRepo {
    async fn create(&self, input: &CreateMovie) -> Result<Movie, CoreError> {
        ensure_references::<Movie>(&self.pool, input).await?;
        let video = input.video();
        let query = format!(
            "INSERT INTO movies
                (name, description, image_url, video_source, video_path, video_url, status, category_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(video.source().as_str())
            .bind(video.uploaded_path())
            .bind(video.link_url())
            .bind(input.status.as_str())
            .bind(input.category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<Movie>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Movie, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Movie>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    /// The three video columns are rewritten together when the patch
    /// restates `video_source`, and left alone otherwise.
    async fn update(
        &self,
        id: DbId,
        input: &UpdateMovie,
    ) -> Result<Revision<Movie>, CoreError> {
        ensure_references::<Movie>(&self.pool, input).await?;
        let video = input.video();
        let query = format!(
            "UPDATE movies SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                video_source = COALESCE($5, video_source),
                video_path = CASE WHEN $5::text IS NULL THEN video_path ELSE $6 END,
                video_url = CASE WHEN $5::text IS NULL THEN video_url ELSE $7 END,
                status = COALESCE($8, status),
                category_id = COALESCE($9, category_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<Movie>)?;
        let previous = TABLE.lock::<Movie>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(video.as_ref().map(|v| v.source().as_str()))
            .bind(video.as_ref().and_then(|v| v.uploaded_path()))
            .bind(video.as_ref().and_then(|v| v.link_url()))
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.category_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<Movie>)?;
        tx.commit().await.map_err(classify::<Movie>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<Movie, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<Movie>(&self.pool).await
    }
}
