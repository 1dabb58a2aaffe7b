//! PostgREST Table Client
//!
//! Maps the `RemoteStore` calls onto `/rest/v1/{table}`:
//! equality filters become `field=eq.value`, ordering becomes
//! `order=field.desc`.

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::Value;

use super::{error_message, AccessTokenSource, SupabaseEndpoint};
use crate::repository::filters::{Filters, OrderBy};
use crate::repository::traits::RemoteStore;
use crate::error::{StoreError, StoreResult};

pub struct SupabaseStore {
    http: Client,
    endpoint: SupabaseEndpoint,
    tokens: Rc<dyn AccessTokenSource>,
}

impl SupabaseStore {
    /// Pass the `SupabaseAuth` in use as `tokens` so requests run as the
    /// signed-in user; an empty `SessionHub` keeps every request anonymous.
    pub fn new(endpoint: SupabaseEndpoint, tokens: Rc<dyn AccessTokenSource>) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            tokens,
        }
    }

    pub(crate) fn table_url(
        &self,
        table: &str,
        filters: &Filters,
        order: Option<&OrderBy>,
        select: bool,
    ) -> StoreResult<Url> {
        let mut params: Vec<(String, String)> = Vec::new();
        if select {
            params.push(("select".into(), "*".into()));
        }
        for (field, value) in filters.iter() {
            params.push((field.to_string(), format!("eq.{value}")));
        }
        if let Some(order) = order {
            let direction = if order.descending { "desc" } else { "asc" };
            params.push(("order".into(), format!("{}.{}", order.field, direction)));
        }
        Url::parse_with_params(&self.endpoint.rest_url(table), &params)
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))
    }

    async fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let token = self.tokens.access_token().await;
        self.endpoint.authorize(self.http.request(method, url), token.as_deref())
    }
}

/// Turn a non-2xx response into `StoreError::Backend`
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Backend {
        status: status.as_u16(),
        message: error_message(status.as_u16(), &body),
    })
}

#[async_trait(?Send)]
impl RemoteStore for SupabaseStore {
    async fn list(&self, table: &str, filters: &Filters, order: &OrderBy) -> StoreResult<Vec<Value>> {
        let url = self.table_url(table, filters, Some(order), true)?;
        log::debug!("GET {url}");
        let response = check(self.request(reqwest::Method::GET, url).await.send().await?).await?;
        let rows: Option<Vec<Value>> = response.json().await?;
        Ok(rows.unwrap_or_default())
    }

    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        let url = self.table_url(table, &Filters::new(), None, true)?;
        log::debug!("POST {url}");
        let response = self
            .request(reqwest::Method::POST, url)
            .await
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".into()))
    }

    async fn update(&self, table: &str, filters: &Filters, patch: Value) -> StoreResult<()> {
        if filters.is_empty() {
            return Err(StoreError::InvalidRequest("refusing to update without filters".into()));
        }
        let url = self.table_url(table, filters, None, false)?;
        log::debug!("PATCH {url}");
        let response = self
            .request(reqwest::Method::PATCH, url)
            .await
            .json(&patch)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()> {
        if filters.is_empty() {
            return Err(StoreError::InvalidRequest("refusing to delete without filters".into()));
        }
        let url = self.table_url(table, filters, None, false)?;
        log::debug!("DELETE {url}");
        check(self.request(reqwest::Method::DELETE, url).await.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Principal, PrincipalId, Session};
    use crate::repository::session_hub::SessionHub;

    fn store() -> SupabaseStore {
        SupabaseStore::new(
            SupabaseEndpoint::new("https://abc.supabase.co", "anon"),
            Rc::new(SessionHub::default()),
        )
    }

    #[test]
    fn test_list_url_encodes_filters_and_order() {
        let url = store()
            .table_url(
                "todos",
                &Filters::new().eq("user_id", "u-1"),
                Some(&OrderBy::desc("created_at")),
                true,
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/todos?select=*&user_id=eq.u-1&order=created_at.desc"
        );
    }

    #[test]
    fn test_mutation_url_has_only_filters() {
        let url = store()
            .table_url("todos", &Filters::new().eq("id", 5).eq("user_id", "u"), None, false)
            .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("id".to_string(), "eq.5".to_string()),
                ("user_id".to_string(), "eq.u".to_string()),
            ]
        );
    }

    fn todos_url() -> Url {
        Url::parse("https://abc.supabase.co/rest/v1/todos").unwrap()
    }

    #[tokio::test]
    async fn test_empty_hub_sends_anon_key_as_bearer() {
        let request = store().request(reqwest::Method::GET, todos_url()).await.build().unwrap();
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["Authorization"], "Bearer anon");
    }

    #[tokio::test]
    async fn test_session_token_is_used_as_bearer() {
        let hub = SessionHub::new(Some(Session {
            access_token: "user-token".into(),
            refresh_token: None,
            principal: Principal { id: PrincipalId::new("u-1"), email: None },
            expires_at: None,
        }));
        let store = SupabaseStore::new(SupabaseEndpoint::new("https://abc.supabase.co", "anon"), Rc::new(hub));
        let request = store.request(reqwest::Method::GET, todos_url()).await.build().unwrap();
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["Authorization"], "Bearer user-token");
    }

    #[tokio::test]
    async fn test_unfiltered_delete_is_refused_locally() {
        let err = store().delete("todos", &Filters::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRequest(_)));
    }
}
