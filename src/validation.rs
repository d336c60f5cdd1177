//! Rules for the movie form, shared by `store` and `update`.

use std::collections::BTreeMap;

use crate::models::MovieFields;
use crate::upload::{MovieFormInput, UploadedFile};

pub const MAX_JUDUL_CHARS: usize = 255;
pub const MAX_COVER_BYTES: usize = 2048 * 1024;
pub const COVER_EXTENSIONS: &[&str] = &["jpeg", "png", "jpg", "gif", "svg"];

const COVER_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/svg+xml",
];

/// Field name to messages, in field order.
pub type ErrorBag = BTreeMap<String, Vec<String>>;

fn label(field: &str) -> &'static str {
    match field {
        "judul" => "Judul",
        "category_id" => "Kategori",
        "sinopsis" => "Sinopsis",
        "tahun" => "Tahun",
        "pemain" => "Pemain",
        "foto_sampul" => "Foto sampul",
        _ => "Field",
    }
}

fn push(errors: &mut ErrorBag, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

fn required<'a>(errors: &mut ErrorBag, field: &str, value: Option<&'a str>) -> Option<&'a str> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v),
        None => {
            push(errors, field, format!("{} wajib diisi.", label(field)));
            None
        }
    }
}

fn integer<T: std::str::FromStr>(errors: &mut ErrorBag, field: &str, value: Option<&str>) -> Option<T> {
    let value = required(errors, field, value)?;
    match value.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            push(
                errors,
                field,
                format!("{} harus berupa bilangan bulat.", label(field)),
            );
            None
        }
    }
}

fn check_cover(errors: &mut ErrorBag, file: &UploadedFile) {
    let extension = file.client_extension();
    let extension_ok = extension
        .as_deref()
        .is_some_and(|ext| COVER_EXTENSIONS.contains(&ext));

    let is_image = file
        .detected_mime()
        .is_some_and(|mime| COVER_MIME_TYPES.contains(&mime));

    if !is_image {
        push(
            errors,
            "foto_sampul",
            format!("{} harus berupa gambar.", label("foto_sampul")),
        );
    } else if !extension_ok {
        push(
            errors,
            "foto_sampul",
            format!(
                "{} harus berformat {}.",
                label("foto_sampul"),
                COVER_EXTENSIONS.join(", ")
            ),
        );
    }

    if file.size() > MAX_COVER_BYTES {
        push(
            errors,
            "foto_sampul",
            format!(
                "{} maksimal {} KB.",
                label("foto_sampul"),
                MAX_COVER_BYTES / 1024
            ),
        );
    }
}

/// Checks every rule and collects all failures. On success returns the
/// trimmed, typed fields; the cover file stays on `input`.
pub fn validate(input: &MovieFormInput) -> Result<MovieFields, ErrorBag> {
    let mut errors = ErrorBag::new();

    let judul = required(&mut errors, "judul", input.judul.as_deref());
    if let Some(judul) = judul {
        if judul.chars().count() > MAX_JUDUL_CHARS {
            push(
                &mut errors,
                "judul",
                format!("Judul maksimal {MAX_JUDUL_CHARS} karakter."),
            );
        }
    }
    let category_id = integer::<i64>(&mut errors, "category_id", input.category_id.as_deref());
    let sinopsis = required(&mut errors, "sinopsis", input.sinopsis.as_deref());
    let tahun = integer::<i32>(&mut errors, "tahun", input.tahun.as_deref());
    let pemain = required(&mut errors, "pemain", input.pemain.as_deref());

    if let Some(file) = &input.foto_sampul {
        check_cover(&mut errors, file);
    }

    match (judul, category_id, sinopsis, tahun, pemain) {
        (Some(judul), Some(category_id), Some(sinopsis), Some(tahun), Some(pemain))
            if errors.is_empty() =>
        {
            Ok(MovieFields {
                judul: judul.to_string(),
                category_id,
                sinopsis: sinopsis.to_string(),
                tahun,
                pemain: pemain.to_string(),
            })
        }
        _ => Err(errors),
    }
}
