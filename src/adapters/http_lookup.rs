//! Fund name lookup over HTTP against a fund valuation endpoint.
//!
//! The endpoint serves `{base_url}/{code}.js` as a JSONP body:
//! `jsonpgz({"fundcode":"...","name":"...",...});`. Unknown codes come back
//! as an empty `jsonpgz();` call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::domain::error::{FundMirrorError, LookupError};
use crate::domain::fund_info::FundInfo;
use crate::domain::settings::LookupSettings;
use crate::ports::lookup_port::FundLookup;

const CALLBACK: &str = "jsonpgz";

#[derive(Debug, Deserialize)]
struct ValuationResponse {
    #[serde(default)]
    fundcode: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

pub struct HttpFundLookup {
    client: Client,
    base_url: String,
}

impl HttpFundLookup {
    pub fn new(settings: &LookupSettings) -> Result<Self, FundMirrorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LookupError::Transport {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, code: &str) -> String {
        format!("{}/{}.js", self.base_url, code)
    }
}

fn transport(e: reqwest::Error) -> LookupError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    LookupError::Transport { reason }
}

#[async_trait]
impl FundLookup for HttpFundLookup {
    async fn lookup(&self, code: &str) -> Result<FundInfo, LookupError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(LookupError::EmptyCode);
        }

        let url = self.url(code);
        debug!("fund lookup request: {url}");
        // rt is a cache-buster
        let response = self
            .client
            .get(&url)
            .query(&[("rt", Utc::now().timestamp_millis().to_string())])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound {
                code: code.to_string(),
            });
        }
        if !status.is_success() {
            return Err(LookupError::Transport {
                reason: format!("HTTP {status}"),
            });
        }

        let body = response.text().await.map_err(transport)?;
        parse_valuation_body(code, &body)
    }
}

/// Extracts name and code from a `jsonpgz(...)` body.
pub fn parse_valuation_body(code: &str, body: &str) -> Result<FundInfo, LookupError> {
    let malformed = |reason: &str| LookupError::Malformed {
        code: code.to_string(),
        reason: reason.to_string(),
    };

    let inner = body
        .trim()
        .strip_prefix(CALLBACK)
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .map(|rest| rest.trim_end().trim_end_matches(';').trim_end())
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| malformed("response is not a jsonpgz(...) call"))?
        .trim();

    if inner.is_empty() {
        return Err(LookupError::NotFound {
            code: code.to_string(),
        });
    }

    let parsed: ValuationResponse =
        serde_json::from_str(inner).map_err(|e| malformed(&e.to_string()))?;

    let name = parsed
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| malformed("missing name"))?;
    let fund_code = parsed
        .fundcode
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| malformed("missing fundcode"))?;

    Ok(FundInfo {
        name,
        code: fund_code,
    })
}
