//! Error chains, types and traits.

use std::fmt;
use thiserror::Error;

/// Library result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The network call within the authentication sequence that an error
/// originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Initial unauthenticated request to the registry resource.
    ChallengeFetch,
    /// Credentials-for-token request to the authorization server.
    TokenExchange,
    /// Final request to the resource with the bearer token attached.
    AuthenticatedRetry,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Step::ChallengeFetch => "challenge fetch",
            Step::TokenExchange => "token exchange",
            Step::AuthenticatedRetry => "authenticated retry",
        };
        f.write_str(label)
    }
}

/// Errors produced by the library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} request failed")]
    Network(Step, #[source] reqwest::Error),
    #[error("{0} returned unexpected HTTP status {1}")]
    UnexpectedHttpStatus(Step, reqwest::StatusCode),
    #[error("response body is not valid JSON")]
    Decode(#[source] serde_json::Error),
    #[error("registry returned no WWW-Authenticate challenge")]
    MissingChallenge,
    #[error("malformed challenge segment '{0}'")]
    MalformedChallengeSegment(String),
    #[error("challenge is missing required attribute '{0}'")]
    MissingChallengeAttribute(&'static str),
    #[error("authorization server returned no usable token")]
    MissingToken,
    #[error("failed to build the HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("invalid URL")]
    UrlParse(#[from] url::ParseError),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    #[error("base64 decode error")]
    Base64Decode(#[from] base64::DecodeError),
    #[error("UTF-8 error")]
    Utf8Parse(#[from] std::string::FromUtf8Error),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("no credentials recorded for registry '{0}'")]
    CredentialsNotFound(String),
}
