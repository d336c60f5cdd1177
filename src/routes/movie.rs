use axum::{
    extract::{Path, RawQuery, State},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::flash::Flash;
use crate::models::{Category, Movie};
use crate::pagination::{PageRequest, Paginated, QueryString};
use crate::state::AppState;
use crate::upload::MovieFormInput;
use crate::validation;

pub const PAGINATION_HOME: i64 = 6;
pub const PAGINATION_ADMIN: i64 = 10;

const STORE_SUCCESS: &str = "Film berhasil ditambahkan.";
const UPDATE_SUCCESS: &str = "Data berhasil diperbarui";
const DELETE_SUCCESS: &str = "Data berhasil dihapus";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(index).post(store))
        .route("/movies/create", get(create))
        .route("/movies/data", get(data))
        .route("/movies/detail/:id", get(detail))
        .route("/movies/edit/:id", get(form_edit).post(update).put(update))
        .route("/movies/delete/:id", post(delete).delete(delete))
}

/// Ids that are not integers cannot match a row, so they are a 404 like any
/// other unknown id.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim().parse().map_err(|_| AppError::NotFound("Film"))
}

/// Homepage listing, filtered by `search`.
pub async fn index(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Value>)> {
    let query = QueryString::parse(raw.as_deref());
    let search = query
        .get("search")
        .map(str::trim)
        .filter(|search| !search.is_empty());
    let page = PageRequest::new(query.page(), PAGINATION_HOME);

    let (rows, total) = Movie::latest(&state.db, search, page).await?;
    let movies = Paginated::new(rows, total, page, "/movies", &query);

    let (jar, flash) = Flash::take(jar);

    Ok((
        jar,
        Json(json!({
            "status": "success",
            "view": "homepage",
            "search": search,
            "movies": movies,
            "success": flash.success
        })),
    ))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let movie = Movie::find_or_fail(&state.db, parse_id(&id)?).await?;

    Ok(Json(json!({
        "status": "success",
        "view": "detail",
        "movie": movie
    })))
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Value>)> {
    let categories = Category::all(&state.db).await?;
    let (jar, flash) = Flash::take(jar);

    Ok((
        jar,
        Json(json!({
            "status": "success",
            "view": "input",
            "categories": categories,
            "errors": flash.errors,
            "old": flash.old
        })),
    ))
}

pub async fn store(
    State(state): State<AppState>,
    jar: CookieJar,
    form: MovieFormInput,
) -> AppResult<Response> {
    let fields = match validation::validate(&form) {
        Ok(fields) => fields,
        Err(errors) => {
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Store rejected");
            return Ok(Flash::invalid(errors, form.old_input()).redirect(jar, "/movies/create"));
        }
    };

    let foto_sampul = match &form.foto_sampul {
        Some(file) => Some(state.covers.store_on_disk(file).await?),
        None => None,
    };

    let created = Movie::create(&state.db, &fields, foto_sampul.as_deref()).await;
    if created.is_err() {
        if let Some(reference) = &foto_sampul {
            discard_cover(&state, reference).await;
        }
    }
    let movie = created?;

    tracing::info!(movie_id = movie.id, judul = %movie.judul, "Movie created");

    Ok(Flash::success(STORE_SUCCESS).redirect(jar, "/movies"))
}

/// Admin table; takes no search filter.
pub async fn data(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Value>)> {
    let query = QueryString::parse(raw.as_deref());
    let page = PageRequest::new(query.page(), PAGINATION_ADMIN);

    let (rows, total) = Movie::latest(&state.db, None, page).await?;
    let movies = Paginated::new(rows, total, page, "/movies/data", &query);

    let (jar, flash) = Flash::take(jar);

    Ok((
        jar,
        Json(json!({
            "status": "success",
            "view": "data-movies",
            "movies": movies,
            "success": flash.success
        })),
    ))
}

pub async fn form_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Value>)> {
    let movie = Movie::find_or_fail(&state.db, parse_id(&id)?).await?;
    let categories = Category::all(&state.db).await?;
    let (jar, flash) = Flash::take(jar);

    Ok((
        jar,
        Json(json!({
            "status": "success",
            "view": "form-edit",
            "movie": movie,
            "categories": categories,
            "errors": flash.errors,
            "old": flash.old
        })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
    form: MovieFormInput,
) -> AppResult<Response> {
    let id = parse_id(&id)?;

    let fields = match validation::validate(&form) {
        Ok(fields) => fields,
        Err(errors) => {
            tracing::debug!(id, fields = ?errors.keys().collect::<Vec<_>>(), "Update rejected");
            let back = format!("/movies/edit/{id}");
            return Ok(Flash::invalid(errors, form.old_input()).redirect(jar, &back));
        }
    };

    let movie = Movie::find_or_fail(&state.db, id).await?;

    let new_cover = match &form.foto_sampul {
        Some(file) => Some(state.covers.store_image(file).await?),
        None => None,
    };

    let updated = Movie::update(&state.db, movie.id, &fields, new_cover.as_deref())
        .await
        .map_err(AppError::from)
        .and_then(|row| row.ok_or(AppError::NotFound("Film")));
    if updated.is_err() {
        if let Some(reference) = &new_cover {
            discard_cover(&state, reference).await;
        }
    }
    let updated = updated?;

    // The row now points at the new file; only then may the old one go.
    if let (Some(_), Some(old)) = (&new_cover, movie.foto_sampul.as_deref()) {
        if let Err(err) = state.covers.delete_cover(old).await {
            tracing::warn!(reference = %old, error = %err, "Replaced cover could not be removed");
        }
    }

    tracing::info!(movie_id = updated.id, cover_replaced = new_cover.is_some(), "Movie updated");

    Ok(Flash::success(UPDATE_SUCCESS).redirect(jar, "/movies/data"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let movie = Movie::find_or_fail(&state.db, parse_id(&id)?).await?;

    if let Some(cover) = movie.foto_sampul.as_deref() {
        state.covers.delete_cover(cover).await?;
    }

    Movie::delete(&state.db, movie.id).await?;

    tracing::info!(movie_id = movie.id, "Movie deleted");

    Ok(Flash::success(DELETE_SUCCESS).redirect(jar, "/movies/data"))
}

/// Removes a cover written for a save that did not go through.
async fn discard_cover(state: &AppState, reference: &str) {
    match state.covers.delete_cover(reference).await {
        Ok(_) => tracing::warn!(reference = %reference, "Save failed, new cover removed"),
        Err(err) => {
            tracing::warn!(reference = %reference, error = %err, "Save failed, new cover left behind")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound("Film"))));
        assert!(matches!(parse_id(""), Err(AppError::NotFound("Film"))));
    }
}
