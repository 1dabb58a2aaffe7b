//! Supabase Backend
//!
//! PostgREST for table access, GoTrue for email/password auth.
//! Both share one endpoint and one session hub so data calls carry the
//! signed-in user's bearer token.

mod rest;
mod auth;

pub use rest::SupabaseStore;
pub use auth::SupabaseAuth;

use async_trait::async_trait;
use serde::Deserialize;

use crate::repository::session_hub::SessionHub;

/// Where `SupabaseStore` gets the bearer token for each request.
///
/// `SupabaseAuth` refreshes an expired session first. A bare `SessionHub`
/// hands out whatever it holds; an empty one means the anon key is used.
#[async_trait(?Send)]
pub trait AccessTokenSource {
    async fn access_token(&self) -> Option<String>;
}

#[async_trait(?Send)]
impl AccessTokenSource for SessionHub {
    async fn access_token(&self) -> Option<String> {
        SessionHub::access_token(self)
    }
}

/// Project URL plus the public anon key
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseEndpoint {
    url: String,
    anon_key: String,
}

impl SupabaseEndpoint {
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    /// `apikey` + `Authorization` headers. Without a session the anon key
    /// doubles as the bearer token.
    pub(crate) fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        request
            .header("apikey", self.anon_key.as_str())
            .header("Authorization", format!("Bearer {bearer}"))
    }
}

/// Error body shapes used by PostgREST (`message`) and GoTrue
/// (`msg`, `error_description`, `error`)
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Best human-readable message for a failed response body
pub(crate) fn error_message(status: u16, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    [parsed.message, parsed.msg, parsed.error_description, parsed.error]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body.trim().to_string()
            }
        })
}
