//! This module stores the expected format of the arguments for the requests

use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;

#[derive(Clone)]
pub struct LoginReqArgs {
    /// Username, email or phone as accepted by the server
    pub username: String,
    pub password: SecretString,
}

impl LoginReqArgs {
    pub fn new<S: Into<String>>(username: S, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Body sent to the login endpoint
    ///
    /// WARNING: Contains the password in plain text, do not log
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "usuario": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

impl Debug for LoginReqArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginReqArgs")
            .field("username", &self.username)
            .field("has_password", &!self.password.expose_secret().is_empty())
            .finish()
    }
}
