//! Query helpers shared by every Postgres repository.

use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::Entity;
use ott_core::types::DbId;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};

use crate::error::{classify, column_name};

/// Table name and column list of one entity.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Table {
    pub name: &'static str,
    pub columns: &'static str,
}

impl Table {
    pub async fn find_by_id<E>(&self, pool: &PgPool, id: DbId) -> Result<E, CoreError>
    where
        E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
    {
        let query = format!("SELECT {} FROM {} WHERE id = $1", self.columns, self.name);
        sqlx::query_as::<_, E>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(classify::<E>)?
            .ok_or(CoreError::NotFound {
                entity: E::LABEL,
                id,
            })
    }

    /// Read a row and hold its lock until the surrounding transaction ends.
    pub async fn lock<E>(&self, conn: &mut PgConnection, id: DbId) -> Result<E, CoreError>
    where
        E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
    {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
            self.columns, self.name
        );
        sqlx::query_as::<_, E>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(classify::<E>)?
            .ok_or(CoreError::NotFound {
                entity: E::LABEL,
                id,
            })
    }

    /// One page plus the unpaged total, newest first.
    pub async fn find_many<E>(
        &self,
        pool: &PgPool,
        query: &ListQuery,
    ) -> Result<(Vec<E>, i64), CoreError>
    where
        E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
    {
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {}",
            self.columns, self.name
        ));
        push_conditions::<E>(&mut select, query);
        select.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = query.limit {
            select.push(" LIMIT ").push_bind(limit);
            select.push(" OFFSET ").push_bind(query.offset());
        }
        let rows = select
            .build_query_as::<E>()
            .fetch_all(pool)
            .await
            .map_err(classify::<E>)?;

        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", self.name));
        push_conditions::<E>(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(classify::<E>)?;

        Ok((rows, total))
    }

    pub async fn delete<E>(&self, pool: &PgPool, id: DbId) -> Result<E, CoreError>
    where
        E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
    {
        let query = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {}",
            self.name, self.columns
        );
        sqlx::query_as::<_, E>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(classify::<E>)?
            .ok_or(CoreError::NotFound {
                entity: E::LABEL,
                id,
            })
    }

    pub async fn count<E: Entity>(&self, pool: &PgPool) -> Result<i64, CoreError> {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", self.name))
            .fetch_one(pool)
            .await
            .map_err(classify::<E>)
    }
}

/// Append `WHERE` clauses for the search term and filters.
///
/// Column names come from the entity's static field lists, never from the
/// request, so they are safe to splice into the SQL.
fn push_conditions<E: Entity>(qb: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
    let mut separator = " WHERE ";

    if let (Some(search), false) = (&query.search, E::SEARCH_FIELDS.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(separator).push("(");
        for (i, field) in E::SEARCH_FIELDS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(column_name(field))
                .push(" ILIKE ")
                .push_bind(pattern.clone());
        }
        qb.push(")");
        separator = " AND ";
    }

    for filter in &query.filters {
        qb.push(separator)
            .push(column_name(filter.field))
            .push("::text = ANY(")
            .push_bind(filter.values.clone())
            .push(")");
        separator = " AND ";
    }
}

/// Escape `%`, `_` and `\` so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fail with `Reference` when a payload points at a missing row.
///
/// Advisory only: the foreign key constraint still decides, this just turns
/// the common case into a clear message before the write.
pub(crate) async fn ensure_references<E: Entity>(
    pool: &PgPool,
    input: &impl Serialize,
) -> Result<(), CoreError> {
    if E::REFERENCES.is_empty() {
        return Ok(());
    }
    let value = serde_json::to_value(input)
        .map_err(|e| CoreError::Internal(format!("Failed to inspect payload: {e}")))?;
    for reference in E::REFERENCES {
        let Some(id) = value.get(reference.field).and_then(|v| v.as_i64()) else {
            continue;
        };
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            reference.table
        ))
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(classify::<E>)?;
        if !exists {
            return Err(CoreError::Reference(reference.missing_message()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
