//! Flash data: survives exactly one redirect.
//!
//! Stored client-side in the `flash` cookie as URL-safe base64 JSON. A page
//! handler takes it (reading and clearing the cookie) before rendering.

use std::collections::BTreeMap;

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::validation::ErrorBag;

pub const FLASH_COOKIE: &str = "flash";

/// Budget for the encoded cookie value. Browsers drop cookies past about
/// 4 KB, counting name and attributes.
const MAX_COOKIE_BYTES: usize = 3800;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: ErrorBag,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub old: BTreeMap<String, String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            ..Default::default()
        }
    }

    /// Validation failure plus the submitted values. Old input is shortened
    /// (longest value first) until the cookie fits; errors are kept whole.
    pub fn invalid(errors: ErrorBag, mut old: BTreeMap<String, String>) -> Self {
        for value in old.values_mut() {
            truncate_chars(value, MAX_COOKIE_BYTES);
        }

        let mut flash = Self {
            errors,
            old,
            ..Default::default()
        };
        flash.fit_old_input();
        flash
    }

    fn fit_old_input(&mut self) {
        while self.encode().len() > MAX_COOKIE_BYTES {
            let longest = self
                .old
                .iter()
                .map(|(field, value)| (field.clone(), value.chars().count()))
                .max_by_key(|(_, chars)| *chars);
            let Some((field, chars)) = longest else {
                break;
            };

            if chars <= 1 {
                self.old.remove(&field);
            } else if let Some(value) = self.old.get_mut(&field) {
                truncate_chars(value, chars / 2);
            }
        }
    }

    fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    fn decode(encoded: &str) -> Option<Self> {
        let json = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Reads the pending flash, if any, and clears it.
    pub fn take(jar: CookieJar) -> (CookieJar, Flash) {
        let flash = match jar.get(FLASH_COOKIE) {
            Some(cookie) => Flash::decode(cookie.value()).unwrap_or_default(),
            None => return (jar, Flash::default()),
        };

        let removal = Cookie::build((FLASH_COOKIE, "")).path("/").build();
        (jar.remove(removal), flash)
    }

    fn put(self, jar: CookieJar) -> CookieJar {
        let cookie = Cookie::build((FLASH_COOKIE, self.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        jar.add(cookie)
    }

    /// 303 to `to` with this flash attached.
    pub fn redirect(self, jar: CookieJar, to: &str) -> Response {
        (self.put(jar), Redirect::to(to)).into_response()
    }
}

fn truncate_chars(value: &mut String, max_chars: usize) {
    if let Some((at, _)) = value.char_indices().nth(max_chars) {
        value.truncate(at);
    }
}
