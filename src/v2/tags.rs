use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::v2::Client;

/// Response payload of a registry `tags/list` endpoint.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Tags {
    name: String,
    tags: Vec<String>,
}

impl Tags {
    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Existing tags for the repository.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Client {
    /// Authenticate against the registry and list existing tags.
    ///
    /// `url` is a full `tags/list` endpoint, e.g.
    /// `https://registry.example.com/v2/ns/repo/tags/list`.
    pub async fn get_tags(&self, url: &str) -> Result<Tags> {
        let body = self.authenticate_and_fetch(url).await?;
        serde_json::from_str(&body).map_err(Error::Decode)
    }
}
