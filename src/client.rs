//! Client for the simulation training backend, plus error types.

use async_trait::async_trait;
use futures::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::http::{add_extra_headers, authorize, build_http_client};
use crate::model::{
    ChatRequest, NewScenario, Scenario, TrainingEvaluation, TrainingReply, TrainingSession,
};
use crate::options::TransportOptions;
use crate::session;

/// Errors that can occur during client operations.
///
/// Note that the streaming path never surfaces these to the consumer:
/// every failure there resolves into a fallback replay or a silent
/// zero-fragment completion.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// The non-streaming send exchange.
///
/// Kept behind a trait so the fallback path can be exercised against a
/// test double; [`TrainingClient`] is the production implementation.
#[async_trait]
pub trait ChatExchange: Send + Sync {
    /// Send one prompt with its ordered history, returning the complete
    /// labeled reply.
    async fn send(&self, request: &ChatRequest) -> Result<TrainingReply, ClientError>;
}

/// Uniform response envelope used by every non-streaming endpoint.
/// `code == 1` is success.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct Envelope<T> {
    code: i32,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, ClientError> {
        if self.code == 1 {
            self.data
                .ok_or_else(|| ClientError::Api("envelope missing data".to_string()))
        } else {
            Err(ClientError::Api(self.msg.unwrap_or_else(|| {
                format!("backend returned code {}", self.code)
            })))
        }
    }
}

/// Client for the training backend.
///
/// One instance can serve any number of concurrent sessions; each
/// streaming exchange owns its own line buffer and shares nothing but
/// this client's read-only configuration.
pub struct TrainingClient {
    options: TransportOptions,
    http: reqwest::Client,
}

impl TrainingClient {
    /// Create a client from transport options.
    pub fn new(options: TransportOptions) -> Result<Self, ClientError> {
        if options.base_url.is_empty() {
            return Err(ClientError::Config("base_url is required".to_string()));
        }
        let http = build_http_client(&options)?;
        Ok(Self { options, http })
    }

    fn apply_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = authorize(request, &self.options.credential);
        add_extra_headers(request, &self.options.extra_headers)
    }

    /// Send one chat turn and consume the reply as a stream.
    ///
    /// `on_fragment` is invoked once per incremental content slice, in
    /// arrival order; `on_complete` is invoked exactly once, always last,
    /// on every path. If the stream cannot be opened or fails mid-flight,
    /// the same request is replayed once through the non-streaming
    /// endpoint and its reply delivered as a single synthesized fragment;
    /// if that also fails, `on_complete` fires with no prior fragments.
    pub async fn send_stream<F, C>(&self, request: ChatRequest, mut on_fragment: F, on_complete: C)
    where
        F: FnMut(&str),
        C: FnOnce(),
    {
        match self.open_stream(&request).await {
            Ok(response) => {
                let byte_stream = response.bytes_stream().map_err(ClientError::from);
                match session::pump(byte_stream, &mut on_fragment).await {
                    Ok(end) => debug!(?end, "stream finished"),
                    Err(err) => {
                        warn!(error = %err, "stream failed mid-flight, replaying via non-streaming send");
                        fallback_replay(self, &request, &mut on_fragment).await;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "could not open stream, replaying via non-streaming send");
                fallback_replay(self, &request, &mut on_fragment).await;
            }
        }
        on_complete();
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}/send/stream", self.options.base_url);
        let response = self
            .apply_headers(self.http.post(&url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(format!("HTTP {}: {}", status, body)));
        }
        Ok(response)
    }

    /// List the available training scenarios.
    pub async fn scenarios(&self) -> Result<Vec<Scenario>, ClientError> {
        let url = format!("{}/scenarios", self.options.base_url);
        let response = self.apply_headers(self.http.get(&url)).send().await?;
        let envelope: Envelope<Vec<Scenario>> = response.json().await?;
        envelope.into_data()
    }

    /// Create a custom training scenario.
    pub async fn create_scenario(&self, scenario: &NewScenario) -> Result<Scenario, ClientError> {
        let url = format!("{}/scenarios", self.options.base_url);
        let response = self
            .apply_headers(self.http.post(&url))
            .json(scenario)
            .send()
            .await?;
        let envelope: Envelope<Scenario> = response.json().await?;
        envelope.into_data()
    }

    /// Start a new training session for a scenario.
    pub async fn start_session(&self, scenario_id: i64) -> Result<TrainingSession, ClientError> {
        let url = format!("{}/start", self.options.base_url);
        let response = self
            .apply_headers(self.http.post(&url))
            .json(&json!({ "scenarioId": scenario_id }))
            .send()
            .await?;
        let envelope: Envelope<TrainingSession> = response.json().await?;
        envelope.into_data()
    }

    /// End a training session and fetch its evaluation.
    pub async fn end_session(&self, session_id: i64) -> Result<TrainingEvaluation, ClientError> {
        let url = format!("{}/end/{}", self.options.base_url, session_id);
        let response = self
            .apply_headers(self.http.post(&url))
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await?;
        let envelope: Envelope<TrainingEvaluation> = response.json().await?;
        envelope.into_data()
    }
}

#[async_trait]
impl ChatExchange for TrainingClient {
    async fn send(&self, request: &ChatRequest) -> Result<TrainingReply, ClientError> {
        let url = format!("{}/send", self.options.base_url);
        let response = self
            .apply_headers(self.http.post(&url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(format!("HTTP {}: {}", status, body)));
        }

        let envelope: Envelope<TrainingReply> = response.json().await?;
        envelope.into_data()
    }
}

/// Replay a failed stream through the non-streaming exchange, delivering
/// the reply as one synthesized labeled fragment. A failure here is
/// logged and swallowed; the session then completes with zero fragments.
async fn fallback_replay<E, F>(exchange: &E, request: &ChatRequest, on_fragment: &mut F)
where
    E: ChatExchange + ?Sized,
    F: FnMut(&str),
{
    match exchange.send(request).await {
        Ok(reply) => on_fragment(&reply.to_labeled_text()),
        Err(err) => {
            warn!(error = %err, "fallback send failed, completing with no fragments");
        }
    }
}
