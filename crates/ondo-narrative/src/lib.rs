//! ondo-narrative: external text-generation collaborator client.
//!
//! The numeric analysis is elaborated into prose by an external
//! generative-language service. This crate owns that boundary: the
//! deterministic prompt template, the wire structs, a bounded-timeout
//! HTTP client, and the policy for what a failure means to the caller.
//!
//! The collaborator sits on the request's critical path only when the
//! caller chooses [`FailurePolicy::Propagate`]; the default is to
//! degrade gracefully, because the numeric report is independently
//! valid without the narrative.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default request-scoped timeout for one collaborator call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a collaborator failure means for the request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the numeric report without the narrative and record a
    /// warning. Timeouts are recoverable under this policy.
    #[default]
    Degrade,
    /// Fail the whole request when the collaborator fails.
    Propagate,
}

/// Configuration for the collaborator client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// Endpoint URL of the generation API.
    pub endpoint: String,
    /// Per-call timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Failure handling policy.
    pub policy: FailurePolicy,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent".to_owned(),
            timeout: DEFAULT_TIMEOUT,
            policy: FailurePolicy::default(),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Errors from the collaborator boundary.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    /// Failed to construct the HTTP client.
    #[error("failed to build narrative client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed, timed out, or returned a non-success status.
    #[error("narrative request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response parsed but contained no candidate text.
    #[error("narrative response contained no text")]
    EmptyResponse,
}

impl NarrativeError {
    /// Whether the failure was the bounded timeout expiring.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// Build the deterministic prompt for one analysis result.
///
/// Same inputs always produce the same prompt; the only
/// non-determinism in the narrative path is the collaborator itself.
#[must_use]
pub fn build_prompt(body_part: &str, condition: &str, implications: &str) -> String {
    format!(
        "You are assisting with preliminary thermal imaging triage.\n\
         A thermal image of the following body part was analyzed.\n\
         \n\
         Body part: {body_part}\n\
         Finding: {condition}\n\
         Advisory notes:\n{implications}\n\
         \n\
         In two or three sentences of plain language, explain what this \
         finding may mean for the patient and what a sensible next step \
         would be. Do not present this as a diagnosis."
    )
}

// Wire structs for the generative-language API.

#[derive(Debug, Serialize, Deserialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GenerateResponse {
    /// First candidate text, if the response carried any.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
    }
}

/// Bounded-timeout client for the narrative collaborator.
#[derive(Debug, Clone)]
pub struct NarrativeClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl NarrativeClient {
    /// Build a client with the config's endpoint and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NarrativeError::Client`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: &NarrativeConfig, api_key: String) -> Result<Self, NarrativeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NarrativeError::Client)?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    /// Ask the collaborator to elaborate a prompt into prose.
    ///
    /// Single shot: no retries. The call is bounded by the configured
    /// timeout, and a timeout surfaces as a recoverable
    /// [`NarrativeError::Http`].
    ///
    /// # Errors
    ///
    /// Returns [`NarrativeError::Http`] on transport failure, timeout,
    /// or a non-success status, and [`NarrativeError::EmptyResponse`]
    /// if the reply carried no candidate text.
    pub async fn elaborate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        response.into_text().ok_or(NarrativeError::EmptyResponse)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn prompt_is_deterministic() {
        let a = build_prompt("head", "Normal temperature - No abnormalities detected.", "text");
        let b = build_prompt("head", "Normal temperature - No abnormalities detected.", "text");
        assert_eq!(a, b);
    }

    #[test]
    fn prompt_embeds_all_inputs() {
        let prompt = build_prompt("chest", "finding text", "advisory line");
        assert!(prompt.contains("Body part: chest"));
        assert!(prompt.contains("Finding: finding text"));
        assert!(prompt.contains("advisory line"));
    }

    #[test]
    fn default_policy_degrades() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Degrade);
    }

    #[test]
    fn response_text_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"elaborated"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("elaborated"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn request_wire_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "prompt".to_owned(),
                }],
            }],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"contents":[{"parts":[{"text":"prompt"}]}]}"#);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = NarrativeConfig {
            endpoint: "http://localhost:9/generate".to_owned(),
            timeout: Duration::from_secs(3),
            policy: FailurePolicy::Propagate,
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: NarrativeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    /// Spawn a one-shot HTTP server that answers any request with the
    /// given body, returning its address.
    async fn canned_server(body: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len(),
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn elaborate_returns_candidate_text() {
        let addr =
            canned_server(r#"{"candidates":[{"content":{"parts":[{"text":"prose"}]}}]}"#).await;
        let config = NarrativeConfig {
            endpoint: format!("http://{addr}/generate"),
            ..NarrativeConfig::default()
        };
        let client = NarrativeClient::new(&config, "test-key".to_owned()).unwrap();
        let text = client.elaborate("prompt").await.unwrap();
        assert_eq!(text, "prose");
    }

    #[tokio::test]
    async fn elaborate_rejects_empty_reply() {
        let addr = canned_server(r#"{"candidates":[]}"#).await;
        let config = NarrativeConfig {
            endpoint: format!("http://{addr}/generate"),
            ..NarrativeConfig::default()
        };
        let client = NarrativeClient::new(&config, "test-key".to_owned()).unwrap();
        let result = client.elaborate("prompt").await;
        assert!(matches!(result, Err(NarrativeError::EmptyResponse)));
    }

    #[tokio::test]
    async fn elaborate_times_out_against_silent_server() {
        // Listener accepts but never responds; the bounded timeout
        // must fire and surface as a recoverable error.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            }
        });

        let config = NarrativeConfig {
            endpoint: format!("http://{addr}/generate"),
            timeout: Duration::from_millis(200),
            ..NarrativeConfig::default()
        };
        let client = NarrativeClient::new(&config, "test-key".to_owned()).unwrap();
        let result = client.elaborate("prompt").await;
        assert!(
            matches!(&result, Err(error) if error.is_timeout()),
            "expected timeout, got {result:?}",
        );
    }
}
