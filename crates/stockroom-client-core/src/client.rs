use anyhow::Context;
use closure_traits::{ChannelCallBack, ChannelCallBackOutput};
use futures::channel::oneshot;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use stockroom_shared::{
    const_config::path::PATH_LOGIN,
    req_args::LoginReqArgs,
    uac::{parse_login_response, AuthError, Capability, LoginSession},
};
use tracing::{debug, info};

use crate::{
    access::{check_access, AccessDecision},
    KvStore, PermissionEngine, SessionStore,
};

mod api;

/// Talks to the inventory API and keeps the session and role up to date
#[derive(Debug, Clone)]
pub struct Client {
    api_client: reqwest::Client,
    server_address: Arc<str>,
    session: SessionStore,
    permissions: PermissionEngine,
}

#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// Logged in but the server sent a role that is not recognized so no
    /// capabilities are granted
    SuccessWithoutRole,
}

impl LoginOutcome {
    /// Returns `true` if the login outcome is
    /// [`Success`] or [`SuccessWithoutRole`]
    ///
    /// [`Success`]: LoginOutcome::Success
    /// [`SuccessWithoutRole`]: LoginOutcome::SuccessWithoutRole
    #[must_use]
    pub fn is_any_success(&self) -> bool {
        matches!(self, Self::Success) || matches!(self, Self::SuccessWithoutRole)
    }
}

/// Response of the API reduced to what callers look at
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Parsed body. `Null` if empty and a JSON string if the body was not JSON
    pub data: serde_json::Value,
    /// The `message` field of the body if there is one
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl Client {
    /// Creates a client with its own permission engine over `store`
    #[tracing::instrument(name = "NEW CLIENT-CORE", skip(store))]
    pub fn new(server_address: String, store: Arc<dyn KvStore>) -> Self {
        let permissions = PermissionEngine::new(Arc::clone(&store));
        Self::with_engine(server_address, store, permissions)
    }

    /// Used to share an engine (usually [`crate::permissions::global`]). The
    /// engine must use the same store.
    pub fn with_engine(
        server_address: String,
        store: Arc<dyn KvStore>,
        permissions: PermissionEngine,
    ) -> Self {
        let api_client = reqwest::Client::builder()
            .build()
            .expect("Unable to create reqwest client");
        Self {
            api_client,
            server_address: server_address.into(),
            session: SessionStore::new(store),
            permissions,
        }
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.session
    }

    pub fn permissions(&self) -> &PermissionEngine {
        &self.permissions
    }

    pub async fn has_valid_session(&self) -> bool {
        self.session.has_valid_session().await
    }

    pub async fn check_access(&self, capability: Capability) -> AccessDecision {
        check_access(&self.session, &self.permissions, capability).await
    }

    /// On failure neither the session nor the role are changed
    #[tracing::instrument(skip(ui_notify))]
    pub fn login<F: UiCallBack>(
        &self,
        args: LoginReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<LoginOutcome>> {
        let (tx, rx) = oneshot::channel();
        let body = args.to_request_body();
        let client = self.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_login(resp, client).await;
            if tx.send(msg).is_err() {
                debug!("login finished after the receiver was dropped");
            }
            ui_notify();
        };
        self.initiate_request(PATH_LOGIN.method, PATH_LOGIN.path, Some(&body), None, on_done);
        rx
    }

    /// Sends a request with the bearer token of the current session (if any)
    ///
    /// For GET `body` is sent as the query string otherwise as JSON. Only
    /// transport failures are errors, check the status of the response.
    #[tracing::instrument(skip(self, body))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<ApiResponse> {
        let token = self.session.token().await;
        let (tx, rx) = oneshot::channel();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_api_response(resp).await;
            if tx.send(msg).is_err() {
                debug!("request finished after the receiver was dropped");
            }
        };
        self.initiate_request(method, path, body.as_ref(), token.as_deref(), on_done);
        rx.await.context("request dropped before completing")?
    }

    #[tracing::instrument(skip(self, body, token, on_done))]
    // WARNING: Must skip body and token as they contain sensitive info
    fn initiate_request<F, O>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
        on_done: F,
    ) where
        F: ChannelCallBack<O>,
        O: ChannelCallBackOutput,
    {
        let is_get_method = method == Method::GET;
        let mut request = self.api_client.request(method, self.path_to_url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = if is_get_method {
                request.query(body)
            } else {
                request.json(body)
            };
        }
        reqwest_cross::fetch(request, on_done)
    }

    #[tracing::instrument(ret, skip(self))]
    fn path_to_url(&self, path: &str) -> String {
        format!("{}{path}", self.server_address)
    }
}

#[tracing::instrument(ret, err(Debug), skip(client))]
async fn process_login(
    response: reqwest::Result<reqwest::Response>,
    client: Client,
) -> anyhow::Result<LoginOutcome> {
    let response = process_api_response(response).await?;
    let LoginSession { session, role } = login_from_response(response)?;
    client
        .session
        .save_session(&session)
        .await
        .map_err(AuthError::from)?;
    client.permissions.set_role(role).await;
    info!(?role, "login succeeded");
    Ok(if role.is_some() {
        LoginOutcome::Success
    } else {
        LoginOutcome::SuccessWithoutRole
    })
}

/// Anything other than 2xx is a rejection and a 2xx must have the expected
/// shape
fn login_from_response(response: ApiResponse) -> Result<LoginSession, AuthError> {
    if !response.is_success() {
        return Err(AuthError::Rejected {
            status: response.status,
            message: response.message,
        });
    }
    Ok(parse_login_response(response.data)?)
}

#[tracing::instrument(err(Debug))]
async fn process_api_response(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<ApiResponse> {
    let (response, status) = extract_response(response)?;
    let body = response
        .text()
        .await
        .context("failed to get response body")?;
    let data = if body.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
    };
    let message = data
        .get("message")
        .and_then(|x| x.as_str())
        .map(ToString::to_string);
    Ok(ApiResponse {
        status,
        data,
        message,
    })
}

/// Provides a way to standardize the error message
#[tracing::instrument(err(Debug))]
fn extract_response(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<(reqwest::Response, StatusCode)> {
    if response.is_err() {
        info!("Response is err: {:#?}", response);
    }
    let response = response.context("failed to send request")?;
    let status = response.status();
    Ok((response, status))
}

pub trait UiCallBack: 'static + Send + FnOnce() {}
impl<T> UiCallBack for T where T: 'static + Send + FnOnce() {}

pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> + Send {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> + Send {}
}
