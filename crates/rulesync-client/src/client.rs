//! Blocking client for the Cortex ruler configuration API

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use rulesync_core::{FetchOutcome, RuleSet, RuleStore, StoreError};
use rulesync_model::RuleGroup;
use tracing::debug;

use crate::config::ClientConfig;
use crate::{Error, Result};

const RULES_PATH: [&str; 3] = ["api", "prom", "rules"];
const TENANT_HEADER: &str = "X-Scope-OrgID";
const YAML: &str = "application/yaml";

/// [`RuleStore`] backed by a Cortex ruler
#[derive(Debug, Clone)]
pub struct CortexClient {
    http: Client,
    base: Url,
    tenant_id: String,
    api_key: Option<String>,
}

impl CortexClient {
    /// Build a client from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is not an http(s)
    /// URL, or [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.address).map_err(|e| Error::InvalidAddress {
            address: config.address.clone(),
            message: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(Error::InvalidAddress {
                address: config.address.clone(),
                message: "expected an http or https URL".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("rulesync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            tenant_id: config.tenant_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// `{address}/api/prom/rules/{segments...}`, each segment escaped.
    pub fn rules_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(RULES_PATH).extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(TENANT_HEADER, &self.tenant_id);
        match &self.api_key {
            Some(key) => request.basic_auth(&self.tenant_id, Some(key)),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> std::result::Result<Response, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        check_status(response)
    }

    fn body(response: Response) -> std::result::Result<String, StoreError> {
        response
            .text()
            .map_err(|e| StoreError::Transport(e.to_string()))
    }
}

fn check_status(response: Response) -> std::result::Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound);
    }
    let body = response.text().unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

impl RuleStore for CortexClient {
    fn get_rule_group(
        &self,
        namespace: &str,
        group: &str,
    ) -> std::result::Result<FetchOutcome, StoreError> {
        let url = self.rules_url(&[namespace, group]);
        debug!(%url, "fetching rule group");

        let response = match self.send(self.http.get(url)) {
            Ok(response) => response,
            Err(StoreError::NotFound) => return Ok(FetchOutcome::NotFound),
            Err(err) => return Err(err),
        };
        let body = Self::body(response)?;
        let group = serde_yaml::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(FetchOutcome::Found(group))
    }

    fn create_rule_group(
        &self,
        namespace: &str,
        group: &RuleGroup,
    ) -> std::result::Result<(), StoreError> {
        let url = self.rules_url(&[namespace]);
        let payload = serde_yaml::to_string(group).map_err(|e| StoreError::Encode(e.to_string()))?;
        debug!(%url, group = %group.name, "writing rule group");

        self.send(
            self.http
                .post(url)
                .header(CONTENT_TYPE, YAML)
                .body(payload),
        )?;
        Ok(())
    }

    fn delete_rule_group(&self, namespace: &str, group: &str) -> std::result::Result<(), StoreError> {
        let url = self.rules_url(&[namespace, group]);
        debug!(%url, "deleting rule group");

        self.send(self.http.delete(url))?;
        Ok(())
    }

    fn list_rules(&self) -> std::result::Result<RuleSet, StoreError> {
        let url = self.rules_url(&[]);
        debug!(%url, "listing rules");

        let body = Self::body(self.send(self.http.get(url))?)?;
        if body.trim().is_empty() {
            return Ok(RuleSet::new());
        }
        serde_yaml::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    fn client(address: &str) -> CortexClient {
        CortexClient::new(&ClientConfig {
            address: address.to_string(),
            tenant_id: "team-a".to_string(),
            api_key: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[rstest]
    #[case("http://cortex:9009", &[], "http://cortex:9009/api/prom/rules")]
    #[case("http://cortex:9009/", &["team-a"], "http://cortex:9009/api/prom/rules/team-a")]
    #[case(
        "https://cortex.example.com/prefix",
        &["team-a", "cpu-alerts"],
        "https://cortex.example.com/prefix/api/prom/rules/team-a/cpu-alerts"
    )]
    #[case(
        "http://cortex:9009",
        &["team a", "cpu/alerts"],
        "http://cortex:9009/api/prom/rules/team%20a/cpu%2Falerts"
    )]
    fn test_rules_url(#[case] address: &str, #[case] segments: &[&str], #[case] expected: &str) {
        assert_eq!(client(address).rules_url(segments).as_str(), expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://cortex:9009")]
    #[case("mailto:ops@example.com")]
    fn test_invalid_address(#[case] address: &str) {
        let err = CortexClient::new(&ClientConfig {
            address: address.to_string(),
            tenant_id: "team-a".to_string(),
            api_key: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }
}
