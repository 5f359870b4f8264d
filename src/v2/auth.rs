use log::{trace, warn};
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, Step};
use crate::v2::{BearerChallenge, Client};

/// Token response from the authorization server.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TokenResponse {
    token: Option<String>,
    expires_in: Option<u32>,
    issued_at: Option<String>,
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// The bearer token, if a non-empty one was returned.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

impl Client {
    /// Request `url` unauthenticated and parse the bearer challenge the
    /// registry answers with.
    ///
    /// All `WWW-Authenticate` values are collected; the header may
    /// legitimately appear multiple times. A response carrying none
    /// fails with `MissingChallenge`.
    pub async fn fetch_challenge(&self, url: &str) -> Result<BearerChallenge> {
        let url = reqwest::Url::parse(url)?;
        trace!("GET {}", url);

        let resp = self
            .build_reqwest(self.hclient.get(url))
            .send()
            .await
            .map_err(|e| Error::Network(Step::ChallengeFetch, e))?;
        trace!("Got status {}", resp.status());

        let header_values: Vec<String> = resp
            .headers()
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| match value.to_str() {
                Ok(s) => Some(s.to_string()),
                Err(_) => {
                    warn!("Skipping undecodable WWW-Authenticate value");
                    None
                }
            })
            .collect();

        BearerChallenge::parse(&header_values)
    }

    /// Exchange credentials for a bearer token at the challenge realm.
    ///
    /// The challenge attributes are passed as distinct named query
    /// parameters; configured credentials go into an HTTP Basic header.
    pub async fn exchange_token(&self, challenge: &BearerChallenge) -> Result<String> {
        let mut url = reqwest::Url::parse(challenge.realm())?;
        url.query_pairs_mut()
            .append_pair("service", challenge.service())
            .append_pair("scope", challenge.scope());
        for (key, value) in challenge.extra() {
            url.query_pairs_mut().append_pair(key, value);
        }
        trace!("GET {}", url);

        let mut req = self.build_reqwest(self.hclient.get(url));
        if let Some((user, password)) = &self.credentials {
            req = req.basic_auth(user, Some(password));
        };

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Network(Step::TokenExchange, e))?;
        let status = resp.status();
        trace!("Got status {}", status);
        if !status.is_success() {
            return Err(Error::UnexpectedHttpStatus(Step::TokenExchange, status));
        };

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Network(Step::TokenExchange, e))?;
        let token_resp: TokenResponse = serde_json::from_str(&body).map_err(Error::Decode)?;

        match token_resp.token() {
            Some(token) => {
                trace!("Got token");
                Ok(token.to_string())
            }
            None => Err(Error::MissingToken),
        }
    }

    /// Re-issue the request for `url` with the bearer token attached and
    /// return the raw response body.
    pub async fn authenticated_fetch(&self, url: &str, token: &str) -> Result<String> {
        let url = reqwest::Url::parse(url)?;
        trace!("GET {}", url);

        let resp = self
            .build_reqwest(self.hclient.get(url))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| Error::Network(Step::AuthenticatedRetry, e))?;
        let status = resp.status();
        trace!("Got status {}", status);
        if !status.is_success() {
            return Err(Error::UnexpectedHttpStatus(Step::AuthenticatedRetry, status));
        };

        resp.text()
            .await
            .map_err(|e| Error::Network(Step::AuthenticatedRetry, e))
    }
}
