use std::collections::VecDeque;
use std::time::Duration;

use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::sse::SseDecoder;
use crate::wire::{StartResponse, StatsReport};
use crate::{StartReply, StartRequest, TransportError};

/// Decoded log events, one item per server-sent event.
pub type LogStream = BoxStream<'static, Result<String, TransportError>>;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to start, stop and stats requests; never to the log stream.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

/// The job backend as seen by the console.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn start(&self, request: &StartRequest) -> Result<StartReply, TransportError>;

    async fn stop(&self) -> Result<(), TransportError>;

    async fn stats(&self) -> Result<StatsReport, TransportError>;

    async fn open_logs(&self) -> Result<LogStream, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base_url: String,
    client: reqwest::Client,
    stream_client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, TransportError> {
        reqwest::Url::parse(&settings.base_url)
            .map_err(|err| TransportError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::from_reqwest)?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(TransportError::from_reqwest)?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
            stream_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&url).map_err(|err| TransportError::InvalidUrl(format!("{url}: {err}")))
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn start(&self, request: &StartRequest) -> Result<StartReply, TransportError> {
        let body =
            serde_json::to_vec(request).map_err(|err| TransportError::Decode(err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint("/api/start")?)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;

        // The backend answers rejections with 400 and an `error` body; the body decides.
        match serde_json::from_slice::<StartResponse>(&bytes) {
            Ok(StartResponse {
                error: Some(reason),
            }) => Ok(StartReply::Rejected(reason)),
            Ok(_) if status.is_success() => Ok(StartReply::Accepted),
            Err(err) if status.is_success() => Err(TransportError::Decode(err.to_string())),
            _ => Err(TransportError::HttpStatus(status.as_u16())),
        }
    }

    async fn stop(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.endpoint("/api/stop")?)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }

    async fn stats(&self) -> Result<StatsReport, TransportError> {
        let response = self
            .client
            .get(self.endpoint("/api/stats")?)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;
        serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode(err.to_string()))
    }

    async fn open_logs(&self) -> Result<LogStream, TransportError> {
        let response = self
            .stream_client
            .get(self.endpoint("/api/logs")?)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let events = stream::unfold(
            (response.bytes_stream(), SseDecoder::new(), VecDeque::new()),
            |(mut bytes, mut decoder, mut pending)| async move {
                loop {
                    if let Some(event) = pending.pop_front() {
                        return Some((Ok(event), (bytes, decoder, pending)));
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => pending.extend(decoder.push(&chunk)),
                        Some(Err(err)) => {
                            return Some((
                                Err(TransportError::from_reqwest(err)),
                                (bytes, decoder, pending),
                            ));
                        }
                        None => return None,
                    }
                }
            },
        );
        Ok(events.boxed())
    }
}
