//! Length-aware pagination for the listing pages.
//!
//! Page links carry every other query parameter of the current request, so a
//! search survives paging.

use serde::Serialize;
use url::form_urlencoded;

/// Parsed query string of the current request, in original order.
#[derive(Debug, Clone, Default)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|raw| {
                form_urlencoded::parse(raw.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Requested page; anything missing, unparsable or below 1 is page 1.
    pub fn page(&self) -> i64 {
        self.get("page")
            .and_then(|page| page.trim().parse::<i64>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }

    fn url_for_page(&self, path: &str, page: i64) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs.iter().filter(|(key, _)| key != "page") {
            serializer.append_pair(key, value);
        }
        serializer.append_pair("page", &page.to_string());
        format!("{path}?{}", serializer.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub path: String,
    pub first_page_url: String,
    pub last_page_url: String,
    pub prev_page_url: Option<String>,
    pub next_page_url: Option<String>,
}

impl<T> Paginated<T> {
    pub fn new(
        data: Vec<T>,
        total: i64,
        request: PageRequest,
        path: &str,
        query: &QueryString,
    ) -> Self {
        let current_page = request.page;
        let per_page = request.per_page;
        let last_page = ((total + per_page - 1) / per_page).max(1);

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset() + 1;
            (Some(from), Some(from + data.len() as i64 - 1))
        };

        let prev_page_url = (current_page > 1).then(|| query.url_for_page(path, current_page - 1));
        let next_page_url =
            (current_page < last_page).then(|| query.url_for_page(path, current_page + 1));

        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
            path: path.to_string(),
            first_page_url: query.url_for_page(path, 1),
            last_page_url: query.url_for_page(path, last_page),
            prev_page_url,
            next_page_url,
        }
    }
}
