use std::time::Duration;

use log::trace;

use crate::errors::{Error, Result};
use crate::v2::Client;

/// Configuration for a `Client`.
#[derive(Debug)]
pub struct Config {
    user_agent: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: Some(crate::USER_AGENT.to_owned()),
            username: None,
            password: None,
            timeout: None,
        }
    }
}

impl Config {
    /// Set the user-agent to be used for all outgoing requests.
    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Set the username to be used for registry authentication.
    pub fn username(mut self, user: Option<String>) -> Self {
        self.username = user;
        self
    }

    /// Set the password to be used for registry authentication.
    pub fn password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    /// Set a deadline applied to each network call in the sequence.
    ///
    /// A call exceeding the deadline fails with a `Network` error for
    /// the step in flight, which aborts the remaining steps.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read credentials for `index` from a docker-style JSON config.
    pub fn read_credentials<T: std::io::Read>(mut self, reader: T, index: &str) -> Self {
        if let Ok(creds) = crate::get_credentials(reader, index) {
            self.username = creds.0;
            self.password = creds.1;
        };
        self
    }

    /// Return a `Client` ready to authenticate against a registry.
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::ClientBuilder::new();
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        };
        let hclient = builder.build().map_err(Error::Client)?;

        trace!("Built client for user {:?}", self.username);
        let credentials = match (self.username, self.password) {
            (None, None) => None,
            (u, p) => Some((u.unwrap_or_default(), p.unwrap_or_default())),
        };

        Ok(Client {
            hclient,
            credentials,
            user_agent: self.user_agent,
        })
    }
}
