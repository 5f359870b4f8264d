//! Parser for `WWW-Authenticate` bearer challenges.
//!
//! A registry guarding a resource answers unauthenticated requests with
//! one or more `WWW-Authenticate` header values of the form:
//!
//! ```text
//! Bearer realm="https://auth.example/token",service="registry.example",scope="repository:ns/repo:pull"
//! ```
//!
//! The grammar accepted here is an optional `Bearer` scheme token
//! followed by a comma-separated list of `key="value"` (or bare
//! `key=value`) attributes. Commas inside quoted values do not split
//! attributes, so scopes like `repository:ns/repo:pull,push` survive
//! parsing intact.

use std::collections::HashMap;

use log::trace;
use serde::Serialize;

use crate::errors::{Error, Result};

/// A parsed bearer authentication challenge.
///
/// Carries the three attributes the token protocol requires (`realm`,
/// `service`, `scope`) plus any further attributes the registry sent.
#[derive(Clone, Debug, Serialize)]
pub struct BearerChallenge {
    realm: String,
    service: String,
    scope: String,
    #[serde(flatten)]
    extra: HashMap<String, String>,
}

impl BearerChallenge {
    /// Parse the collected `WWW-Authenticate` header values into a
    /// challenge.
    ///
    /// All values are merged into one attribute set; on duplicate keys
    /// the last occurrence wins, across values in list order and within
    /// a value left-to-right. Values with no scheme token still have
    /// their attributes extracted. Fails with `MissingChallenge` on an
    /// empty list, `MalformedChallengeSegment` on an attribute that does
    /// not fit the grammar, and `MissingChallengeAttribute` when
    /// `realm`, `service` or `scope` is absent.
    pub fn parse(header_values: &[String]) -> Result<Self> {
        if header_values.is_empty() {
            return Err(Error::MissingChallenge);
        }

        let mut params = HashMap::new();
        for value in header_values {
            parse_value(value, &mut params)?;
        }

        let realm = params
            .remove("realm")
            .ok_or(Error::MissingChallengeAttribute("realm"))?;
        let service = params
            .remove("service")
            .ok_or(Error::MissingChallengeAttribute("service"))?;
        let scope = params
            .remove("scope")
            .ok_or(Error::MissingChallengeAttribute("scope"))?;

        trace!(
            "Parsed challenge: realm={}, service={}, scope={}",
            realm,
            service,
            scope
        );
        Ok(Self {
            realm,
            service,
            scope,
            extra: params,
        })
    }

    /// URL of the authorization server issuing tokens for this registry.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Identifier of the service the token will be scoped to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Resource scope the token is requested for.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Challenge attributes beyond the three required ones.
    pub fn extra(&self) -> &HashMap<String, String> {
        &self.extra
    }
}

/// Merge the attributes of a single header value into `params`.
fn parse_value(value: &str, params: &mut HashMap<String, String>) -> Result<()> {
    let trimmed = value.trim();
    if trimmed == "Bearer" {
        return Ok(());
    }
    let attributes = trimmed.strip_prefix("Bearer ").unwrap_or(trimmed);

    for segment in split_attributes(attributes) {
        let segment = segment.trim();
        if segment.is_empty() {
            // Stray comma, nothing to record.
            continue;
        }
        let (key, raw_value) = segment
            .split_once('=')
            .ok_or_else(|| Error::MalformedChallengeSegment(segment.to_string()))?;
        let key = key.trim();
        if key.is_empty() || !key.chars().all(is_key_char) {
            return Err(Error::MalformedChallengeSegment(segment.to_string()));
        }
        let value = unquote(raw_value.trim())
            .ok_or_else(|| Error::MalformedChallengeSegment(segment.to_string()))?;
        params.insert(key.to_string(), value);
    }
    Ok(())
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Split an attribute list on commas, ignoring commas inside quotes.
fn split_attributes(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&s[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&s[start..]);
    segments
}

/// Strip the surrounding quotes from an attribute value.
///
/// Accepts a fully quoted string or a bare token; anything with stray
/// quotes is rejected.
fn unquote(raw: &str) -> Option<String> {
    if let Some(inner) = raw.strip_prefix('"') {
        inner
            .strip_suffix('"')
            .filter(|v| !v.contains('"'))
            .map(str::to_string)
    } else if raw.contains('"') {
        None
    } else {
        Some(raw.to_string())
    }
}
