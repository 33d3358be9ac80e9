// querygate-policy/src/client.rs
// ============================================================================
// Module: PDP Client
// Description: Blocking HTTP client for the policy decision point.
// Purpose: Evaluate per-call allow/deny decisions with a bounded timeout.
// Dependencies: querygate-config, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The client issues one POST per decision with the input document
//! `{"input": {"principal", "tenant", "tool", "args"}}` and expects
//! `{"result": <bool>}`. Any transport error, timeout, or malformed response
//! resolves per the configured fail posture; callers never observe a distinct
//! "policy unreachable" outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use querygate_config::FailMode;
use querygate_config::PolicyConfig;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Normalized decision request for one tool call.
#[derive(Debug, Clone, Copy)]
pub struct PolicyQuery<'a> {
    /// Caller principal when provided.
    pub principal: Option<&'a str>,
    /// Tenant identifier when provided.
    pub tenant: Option<&'a str>,
    /// Resolved tool name.
    pub tool: &'a str,
    /// Tool arguments.
    pub args: &'a Value,
}

/// Decision document returned by the PDP.
#[derive(Debug, Deserialize)]
struct DecisionResponse {
    /// Boolean decision outcome; absence is a malformed response.
    result: Option<bool>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Policy gate construction errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// PDP configuration is unusable.
    #[error("policy config error: {0}")]
    Config(String),
    /// HTTP client construction failed.
    #[error("policy client build failed: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Per-call authorization decision seam.
///
/// Implementations must be stateless per call and safe to share across
/// in-flight requests.
pub trait PolicyGate: Send + Sync {
    /// Returns true when the described tool call may execute.
    fn is_allowed(&self, query: &PolicyQuery<'_>) -> bool;
}

/// Gate that approves every call.
///
/// Used when `policy.require_auth = false`; the bypass is a documented
/// configuration effect, not a fallback.
pub struct AllowAllGate;

impl PolicyGate for AllowAllGate {
    fn is_allowed(&self, _query: &PolicyQuery<'_>) -> bool {
        true
    }
}

// ============================================================================
// SECTION: PDP Client
// ============================================================================

/// Blocking HTTP client for the external policy decision point.
pub struct PdpClient {
    /// HTTP client with the configured timeout.
    client: Client,
    /// Full decision URL (base + decision path).
    decision_url: String,
    /// Posture applied when the PDP cannot produce a decision.
    fail_mode: FailMode,
}

impl PdpClient {
    /// Builds a PDP client from policy configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the base URL is missing or the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, PolicyError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| PolicyError::Config("policy.base_url is not set".to_string()))?;
        let decision_url = format!("{}{}", base_url.trim_end_matches('/'), config.decision_path);
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| PolicyError::Client(err.to_string()))?;
        Ok(Self {
            client,
            decision_url,
            fail_mode: config.fail_mode,
        })
    }

    /// Returns the decision applied when no usable PDP response exists.
    const fn fail_default(&self) -> bool {
        matches!(self.fail_mode, FailMode::Open)
    }
}

impl PolicyGate for PdpClient {
    fn is_allowed(&self, query: &PolicyQuery<'_>) -> bool {
        let body = json!({
            "input": {
                "principal": query.principal,
                "tenant": query.tenant,
                "tool": query.tool,
                "args": query.args,
            }
        });
        let response = match self.client.post(&self.decision_url).json(&body).send() {
            Ok(response) => response,
            Err(_) => return self.fail_default(),
        };
        if !response.status().is_success() {
            return self.fail_default();
        }
        match response.json::<DecisionResponse>() {
            Ok(DecisionResponse {
                result: Some(decision),
            }) => decision,
            _ => self.fail_default(),
        }
    }
}
