use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;
use crate::error::AppError;
use crate::pagination::PageRequest;

const MOVIE_COLUMNS: &str = "m.id, m.judul, m.category_id, c.nama AS category_nama, \
     m.sinopsis, m.tahun, m.pemain, m.foto_sampul, m.created_at, m.updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i64,
    pub judul: String,
    pub category_id: i64,
    pub category_nama: Option<String>,
    pub sinopsis: String,
    pub tahun: i32,
    pub pemain: String,
    /// Cover reference: a storage-disk path (`movie_covers/...`) or a bare
    /// file name in the public image directory.
    pub foto_sampul: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The editable, non-file fields of a movie, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFields {
    pub judul: String,
    pub category_id: i64,
    pub sinopsis: String,
    pub tahun: i32,
    pub pemain: String,
}

/// Escapes LIKE wildcards so the search term matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl Movie {
    pub async fn find(db: &Database, id: i64) -> Result<Option<Movie>, sqlx::Error> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies m \
             LEFT JOIN categories c ON c.id = m.category_id \
             WHERE m.id = $1"
        );

        sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_or_fail(db: &Database, id: i64) -> Result<Movie, AppError> {
        Self::find(db, id).await?.ok_or(AppError::NotFound("Film"))
    }

    /// One page of movies, newest first, optionally filtered by a
    /// case-insensitive title substring. Returns the page and the total
    /// number of matching rows.
    pub async fn latest(
        db: &Database,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Movie>, i64), sqlx::Error> {
        let pattern = search.map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM movies m \
             WHERE ($1::text IS NULL OR m.judul ILIKE $1 ESCAPE '\\')",
        )
        .bind(&pattern)
        .fetch_one(db)
        .await?;

        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies m \
             LEFT JOIN categories c ON c.id = m.category_id \
             WHERE ($1::text IS NULL OR m.judul ILIKE $1 ESCAPE '\\') \
             ORDER BY m.created_at DESC, m.id DESC \
             LIMIT $2 OFFSET $3"
        );

        let movies = sqlx::query_as::<_, Movie>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(db)
            .await?;

        Ok((movies, total))
    }

    pub async fn create(
        db: &Database,
        fields: &MovieFields,
        foto_sampul: Option<&str>,
    ) -> Result<Movie, sqlx::Error> {
        let sql = format!(
            "WITH m AS ( \
                 INSERT INTO movies (judul, category_id, sinopsis, tahun, pemain, foto_sampul) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING * \
             ) \
             SELECT {MOVIE_COLUMNS} FROM m \
             LEFT JOIN categories c ON c.id = m.category_id"
        );

        sqlx::query_as::<_, Movie>(&sql)
            .bind(&fields.judul)
            .bind(fields.category_id)
            .bind(&fields.sinopsis)
            .bind(fields.tahun)
            .bind(&fields.pemain)
            .bind(foto_sampul)
            .fetch_one(db)
            .await
    }

    /// Overwrites the five editable fields. The cover is only replaced when
    /// `foto_sampul` is `Some`.
    pub async fn update(
        db: &Database,
        id: i64,
        fields: &MovieFields,
        foto_sampul: Option<&str>,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let sql = format!(
            "WITH m AS ( \
                 UPDATE movies SET \
                     judul = $1, \
                     category_id = $2, \
                     sinopsis = $3, \
                     tahun = $4, \
                     pemain = $5, \
                     foto_sampul = COALESCE($6, foto_sampul), \
                     updated_at = NOW() \
                 WHERE id = $7 \
                 RETURNING * \
             ) \
             SELECT {MOVIE_COLUMNS} FROM m \
             LEFT JOIN categories c ON c.id = m.category_id"
        );

        sqlx::query_as::<_, Movie>(&sql)
            .bind(&fields.judul)
            .bind(fields.category_id)
            .bind(&fields.sinopsis)
            .bind(fields.tahun)
            .bind(&fields.pemain)
            .bind(foto_sampul)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn delete(db: &Database, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_term() {
        assert_eq!(like_pattern("dune"), "%dune%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
