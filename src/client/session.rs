//! Session management
//!
//! The scanner hands out an opaque token from `POST /session`; every
//! authenticated request carries it as `X-Cookie: token=<token>`. When the
//! scanner answers `Invalid Credentials`, the session manager logs in again
//! once and replays the call.

use std::future::Future;

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use super::executor::RequestExecutor;
use super::reply::Reply;
use super::request::RequestDescriptor;

/// Header carrying the session token.
pub const AUTH_HEADER: &str = "X-Cookie";

/// Login endpoint.
pub const SESSION_PATH: &str = "/session";

/// Credentials and the current token.
#[derive(Clone, Default)]
pub struct Session {
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
}

impl Session {
    /// Value for the [`AUTH_HEADER`] header, present iff a token is held.
    pub fn header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("token={token}"))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn credentials(&self) -> Option<(String, String)> {
        Some((self.username.clone()?, self.password.clone()?))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Owns the session and routes every authenticated call through the
/// re-authentication policy.
///
/// Session reads take a shared lock; `authenticate` is the only writer
/// besides the explicit token setters, and logins are serialised so two
/// tasks hitting an expired token do not interleave their exchanges.
pub struct SessionManager {
    executor: RequestExecutor,
    session: RwLock<Session>,
    login: Mutex<()>,
}

impl SessionManager {
    pub fn new(executor: RequestExecutor) -> Self {
        Self {
            executor,
            session: RwLock::new(Session::default()),
            login: Mutex::new(()),
        }
    }

    /// Remember credentials without logging in.
    pub async fn set_credentials(&self, username: impl Into<String>, password: impl Into<String>) {
        let mut session = self.session.write().await;
        session.username = Some(username.into());
        session.password = Some(password.into());
    }

    /// Adopt a token obtained elsewhere (e.g. a cached one).
    pub async fn set_token(&self, token: impl Into<String>) {
        self.session.write().await.token = Some(token.into());
    }

    /// Forget the current token.
    pub async fn clear_token(&self) {
        self.session.write().await.token = None;
    }

    /// Snapshot of the current session.
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    pub async fn token(&self) -> Option<String> {
        self.session.read().await.token.clone()
    }

    async fn header(&self) -> Option<String> {
        self.session.read().await.header()
    }

    /// Log in and store the returned token.
    ///
    /// Returns whether a token was obtained. A failed login leaves the
    /// session unauthenticated.
    pub async fn authenticate(&self, username: &str, password: &str) -> bool {
        let _login = self.login.lock().await;
        self.set_credentials(username, password).await;

        let descriptor = RequestDescriptor::new(SESSION_PATH)
            .field("username", username)
            .field("password", password)
            .field("json", "1")
            .authenticating();
        let reply = self.executor.execute(Method::POST, &descriptor, None).await;

        let token = reply
            .json()
            .and_then(|body| body.get("token"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut session = self.session.write().await;
        session.token = token;
        if session.is_authenticated() {
            info!("Authenticated to scanner as {}", username);
            true
        } else {
            warn!("Login as {} did not return a token: {:?}", username, reply);
            false
        }
    }

    /// Run `operation` with the current session header, re-authenticating
    /// once if the scanner rejects the token.
    ///
    /// The second result is returned as-is, whatever it is.
    pub async fn ensure_fresh_then<F, Fut>(&self, mut operation: F) -> Reply
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Reply>,
    {
        let reply = operation(self.header().await).await;
        if !reply.is_invalid_credentials() {
            return reply;
        }

        let credentials = self.session.read().await.credentials();
        let Some((username, password)) = credentials else {
            warn!("Session token rejected and no credentials stored; not retrying");
            return reply;
        };

        info!("Session token rejected; re-authenticating as {}", username);
        if !self.authenticate(&username, &password).await {
            debug!("Re-authentication failed; replaying without a token");
        }

        operation(self.header().await).await
    }

    /// Issue `descriptor` with `method`.
    ///
    /// The login exchange itself bypasses the re-authentication wrapper.
    pub async fn request(&self, method: Method, descriptor: &RequestDescriptor) -> Reply {
        if descriptor.is_authenticating() {
            return self.executor.execute(method, descriptor, None).await;
        }

        let executor = &self.executor;
        self.ensure_fresh_then(|header| {
            let method = method.clone();
            async move {
                let auth = header.as_deref().map(|value| (AUTH_HEADER, value));
                executor.execute(method, descriptor, auth).await
            }
        })
        .await
    }

    /// End the session on the scanner and drop the token.
    pub async fn logout(&self) -> Reply {
        let reply = self
            .request(Method::DELETE, &RequestDescriptor::new(SESSION_PATH))
            .await;
        self.clear_token().await;
        reply
    }
}
