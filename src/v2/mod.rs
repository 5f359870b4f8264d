//! Client for the Docker Registry v2 token-auth flow.
//!
//! This module provides a `Client` which, given the URL of a protected
//! registry resource, runs the three-step authentication sequence:
//! fetch the `WWW-Authenticate` challenge, exchange credentials for a
//! bearer token at the challenge realm, and retry the original request
//! with the token attached.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn run() -> dktoken::errors::Result<()> {
//! use dktoken::v2::Client;
//!
//! let client = Client::configure().build()?;
//! let body = client
//!     .authenticate_and_fetch("https://registry.example.com/v2/ns/repo/tags/list")
//!     .await?;
//! # Ok(())
//! # }
//! ```

use log::debug;

use crate::errors::Result;

mod config;
pub use self::config::Config;

mod challenge;
pub use self::challenge::BearerChallenge;

mod auth;
pub use self::auth::TokenResponse;

mod tags;
pub use self::tags::Tags;

/// A Client to authenticate against a registry and fetch resources from it.
#[derive(Clone, Debug)]
pub struct Client {
    hclient: reqwest::Client,
    credentials: Option<(String, String)>,
    user_agent: Option<String>,
}

impl Client {
    /// Return a `Config` builder with default options.
    pub fn configure() -> Config {
        Config::default()
    }

    /// Run the full authentication sequence for `url` and return the
    /// raw response body.
    ///
    /// The sequence is strictly linear: challenge fetch, challenge
    /// parse, token exchange, authenticated retry. The first failing
    /// step aborts the remainder.
    pub async fn authenticate_and_fetch(&self, url: &str) -> Result<String> {
        let challenge = self.fetch_challenge(url).await?;
        debug!("challenge parameters: {}", serde_json::to_string(&challenge)?);

        let token = self.exchange_token(&challenge).await?;
        self.authenticated_fetch(url, &token).await
    }

    /// Inject optional identity headers into an outgoing request.
    fn build_reqwest(&self, req_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut builder = req_builder;

        if let Some(ua) = &self.user_agent {
            builder = builder.header(reqwest::header::USER_AGENT, ua.as_str());
        };

        builder
    }
}
