//! A pure-Rust asynchronous client for Docker Registry v2 token authentication.
//!
//! This library implements the client side of the registry token-auth
//! protocol: it discovers the `WWW-Authenticate` challenge issued by a
//! registry for a protected resource, exchanges credentials with the
//! authorization server named in the challenge for a bearer token, and
//! re-issues the original request with the token attached.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn run() -> dktoken::errors::Result<()> {
//! let client = dktoken::v2::Client::configure()
//!     .username(Some("myuser".to_string()))
//!     .password(Some("mypassword".to_string()))
//!     .build()?;
//!
//! let body = client
//!     .authenticate_and_fetch("https://registry.example.com/v2/ns/repo/tags/list")
//!     .await?;
//! println!("{}", body);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::io::Read;

use log::trace;
use serde::Deserialize;

pub mod errors;
pub mod v2;

use crate::errors::{Error, Result};

/// Default User-Agent client identity.
pub static USER_AGENT: &str = "camallo-dktoken/0.1";

#[derive(Debug, Deserialize)]
struct DockerConfig {
    auths: Option<HashMap<String, AuthEntry>>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    auth: Option<String>,
}

/// Get credentials for a registry from a docker-style JSON config.
///
/// Looks up `index` in the `auths` section and base64-decodes the
/// `user:password` pair stored in its `auth` field.
pub fn get_credentials<T: Read>(reader: T, index: &str) -> Result<(Option<String>, Option<String>)> {
    let config: DockerConfig = serde_json::from_reader(reader)?;
    let entry = config
        .auths
        .as_ref()
        .and_then(|auths| auths.get(index))
        .ok_or_else(|| Error::CredentialsNotFound(index.to_string()))?;

    let creds = match &entry.auth {
        Some(encoded) => {
            let decoded = String::from_utf8(base64::decode(encoded)?)?;
            let mut pair = decoded.splitn(2, ':');
            let user = pair.next().map(str::to_string);
            let password = pair.next().map(str::to_string);
            (user, password)
        }
        None => (None, None),
    };
    trace!("Found credentials for user={:?} on registry {}", creds.0, index);
    Ok(creds)
}
