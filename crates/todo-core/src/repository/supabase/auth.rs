//! GoTrue Auth Client
//!
//! Email/password sign-in, sign-up and sign-out. The session is mirrored
//! into a `SessionHub` for subscribers and into `SessionPersistence` so a
//! reload restores it. An expired access token is exchanged through the
//! refresh-token grant before it is handed out; when that is not possible
//! the session is dropped.

use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error_message, AccessTokenSource, SupabaseEndpoint};
use crate::domain::{Credentials, Principal, PrincipalId, Session, SignUpOutcome};
use crate::error::{AuthError, AuthResult};
use crate::repository::persistence::SessionPersistence;
use crate::repository::session_hub::SessionHub;
use crate::repository::traits::{AuthProvider, SessionCallback, Subscription};

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds; preferred over `expires_in` when present
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserBody,
}

impl TokenBody {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            principal: Principal {
                id: PrincipalId::new(self.user.id),
                email: self.user.email,
            },
            expires_at,
        }
    }
}

fn parse_token(body: Value, now: DateTime<Utc>) -> AuthResult<Session> {
    let token: TokenBody =
        serde_json::from_value(body).map_err(|e| AuthError::Decode(e.to_string()))?;
    Ok(token.into_session(now))
}

/// Interpret a `/signup` response body.
///
/// With email confirmation enabled GoTrue answers with the bare user and
/// no token; otherwise it answers like `/token`.
fn parse_sign_up(body: Value, now: DateTime<Utc>) -> AuthResult<Option<Session>> {
    if body.get("access_token").is_some() {
        return parse_token(body, now).map(Some);
    }
    Ok(None)
}

fn credentials_body(credentials: &Credentials) -> AuthResult<Value> {
    serde_json::to_value(credentials).map_err(|e| AuthError::Decode(e.to_string()))
}

pub struct SupabaseAuth {
    http: Client,
    endpoint: SupabaseEndpoint,
    hub: SessionHub,
    persistence: Rc<dyn SessionPersistence>,
}

impl SupabaseAuth {
    /// Restores any persisted session before returning
    pub fn new(endpoint: SupabaseEndpoint, persistence: Rc<dyn SessionPersistence>) -> Self {
        let restored = persistence.load();
        if let Some(session) = &restored {
            log::info!("restored session for {}", session.principal.display_name());
        }
        Self {
            http: Client::new(),
            endpoint,
            hub: SessionHub::new(restored),
            persistence,
        }
    }

    fn store_session(&self, session: Option<Session>) {
        match &session {
            Some(s) => self.persistence.save(s),
            None => self.persistence.clear(),
        }
        self.hub.set(session);
    }

    async fn post(&self, path: &str, body: Option<Value>, token: Option<&str>) -> AuthResult<Value> {
        let mut request = self.http.post(self.endpoint.auth_url(path));
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = self.endpoint.authorize(request, token).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Backend {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()))
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<Session> {
        let body = json!({ "refresh_token": refresh_token });
        let body = self.post("token?grant_type=refresh_token", Some(body), None).await?;
        parse_token(body, Utc::now())
    }

    /// The current session with a usable access token, if any.
    ///
    /// An expired session is refreshed once; without a refresh token, or
    /// when the refresh fails, it is cleared and subscribers see `None`.
    async fn live_session(&self) -> Option<Session> {
        let session = self.hub.current()?;
        if !session.is_expired(Utc::now()) {
            return Some(session);
        }
        let Some(refresh_token) = session.refresh_token.clone() else {
            log::info!("session for {} expired", session.principal.display_name());
            self.store_session(None);
            return None;
        };
        let refreshed = self.refresh(&refresh_token).await;

        // Signed out or replaced while the refresh was in flight
        let unchanged = self
            .hub
            .current()
            .is_some_and(|s| s.refresh_token.as_deref() == Some(refresh_token.as_str()));
        if !unchanged {
            return self.hub.current();
        }

        match refreshed {
            Ok(fresh) => {
                log::debug!("refreshed session for {}", fresh.principal.display_name());
                self.store_session(Some(fresh.clone()));
                Some(fresh)
            }
            Err(e) => {
                log::warn!("session refresh failed, signing out: {e}");
                self.store_session(None);
                None
            }
        }
    }
}

#[async_trait(?Send)]
impl AccessTokenSource for SupabaseAuth {
    async fn access_token(&self) -> Option<String> {
        self.live_session().await.map(|s| s.access_token)
    }
}

#[async_trait(?Send)]
impl AuthProvider for SupabaseAuth {
    async fn current_session(&self) -> Option<Session> {
        self.live_session().await
    }

    fn subscribe(&self, callback: SessionCallback) -> Subscription {
        self.hub.subscribe(callback)
    }

    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Principal> {
        let body = self.post("token?grant_type=password", Some(credentials_body(credentials)?), None).await?;
        let session = parse_token(body, Utc::now())?;
        let principal = session.principal.clone();
        log::info!("signed in as {}", principal.display_name());
        self.store_session(Some(session));
        Ok(principal)
    }

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUpOutcome> {
        let body = self.post("signup", Some(credentials_body(credentials)?), None).await?;
        match parse_sign_up(body, Utc::now())? {
            Some(session) => {
                let principal = session.principal.clone();
                self.store_session(Some(session));
                Ok(SignUpOutcome::SignedIn(principal))
            }
            None => {
                log::info!("sign-up for {} awaits email confirmation", credentials.email);
                Ok(SignUpOutcome::PendingConfirmation)
            }
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let token = self.hub.access_token();
        let result = match token.as_deref() {
            Some(token) => self.post("logout", None, Some(token)).await.map(|_| ()),
            None => Ok(()),
        };
        // The local session goes away even if the backend call failed
        self.store_session(None);
        if let Err(e) = &result {
            log::warn!("sign-out request failed: {e}");
        }
        result
    }
}
