//! Gateway Client (§4.1): stateless requests against the local content
//! gateway, plus the log-tail stream built on the stacked-JSON decoder.

mod stacked_json;

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use stacked_json::StackedJsonDecoder;

/// One child of a directory object, as returned by `ls`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirLink {
    #[serde(rename = "Hash")]
    pub hash: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct LsObject {
    #[serde(rename = "Links")]
    links: Vec<DirLink>,
}

#[derive(Debug, Deserialize)]
struct LsResponse {
    #[serde(rename = "Objects")]
    objects: Vec<LsObject>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    #[serde(rename = "Message")]
    message: String,
}

const DIRECTORY_SENTINEL: &str = "this dag node is a directory";

/// Wraps one lazily-built, cloneable `reqwest::Client` reused for every
/// request, the way the teacher's `SidecarManager` builds its health-check
/// client once in `new` (`src/sidecar/manager.rs`).
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(GatewayError::Transport)?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            timeout,
        })
    }

    /// `GET ls?arg={cid}` -> the CID's direct children.
    pub async fn ls(&self, cid: &str) -> Result<Vec<DirLink>, GatewayError> {
        let resp = self
            .http
            .get(format!("{}ls", self.base_url))
            .query(&[("arg", cid)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        if !resp.status().is_success() {
            return Err(self.decode_error(resp).await);
        }

        let body: LsResponse = resp.json().await.map_err(GatewayError::from_reqwest)?;
        Ok(body
            .objects
            .into_iter()
            .next()
            .map(|o| o.links)
            .unwrap_or_default())
    }

    /// `GET cat?arg={cid}[&offset=][&length=]` -> raw bytes, or
    /// `GatewayError::IsDirectory` if `cid` names a directory.
    pub async fn cat(&self, cid: &str, offset: u64, length: Option<u64>) -> Result<Bytes, GatewayError> {
        let mut query = vec![("arg".to_string(), cid.to_string())];
        if offset != 0 {
            query.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(length) = length {
            query.push(("length".to_string(), length.to_string()));
        }

        let resp = self
            .http
            .get(format!("{}cat", self.base_url))
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        if !resp.status().is_success() {
            return Err(self.decode_error(resp).await);
        }

        resp.bytes().await.map_err(GatewayError::from_reqwest)
    }

    /// An unbounded, auto-reconnecting tail of the gateway's provider log.
    pub fn log_tail(&self) -> LogTail {
        LogTail::new(self.http.clone(), self.base_url.clone())
    }

    async fn decode_error(&self, resp: reqwest::Response) -> GatewayError {
        match resp.json::<GatewayErrorBody>().await {
            Ok(body) if body.message == DIRECTORY_SENTINEL => {
                GatewayError::IsDirectory(body.message)
            }
            Ok(body) => GatewayError::Gateway(body.message),
            Err(err) => GatewayError::Transport(err),
        }
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// The `log/tail` stream: reconnects transparently on EOF or transport
/// error, per §4.1 ("surface no error to callers until cancelled").
pub struct LogTail {
    http: reqwest::Client,
    url: String,
    decoder: StackedJsonDecoder,
    pending: VecDeque<Value>,
    stream: Option<ByteStream>,
}

impl LogTail {
    fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            url: format!("{base_url}log/tail"),
            decoder: StackedJsonDecoder::new(),
            pending: VecDeque::new(),
            stream: None,
        }
    }

    /// The next decoded log value, or `None` once `cancel` fires. This
    /// request has no per-call timeout — the stream is expected to run
    /// forever (§4.1).
    pub async fn next_value(&mut self, cancel: &CancellationToken) -> Option<Value> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                return Some(value);
            }

            if self.stream.is_none() {
                let connected = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    result = self.connect() => result,
                };
                match connected {
                    Ok(stream) => {
                        self.stream = Some(stream);
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(%err, "log/tail connect failed, retrying");
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return None,
                            _ = tokio::time::sleep(Duration::from_secs(1)) => continue,
                        }
                    }
                }
            }

            let next = {
                let stream = self.stream.as_mut().expect("stream present");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    next = stream.next() => next,
                }
            };
            match next {
                Some(Ok(chunk)) => {
                    self.decoder.push(&chunk);
                    self.pending.extend(self.decoder.drain());
                }
                Some(Err(err)) => {
                    tracing::warn!(%err, "log/tail transport error, reconnecting");
                    self.stream = None;
                    self.decoder = StackedJsonDecoder::new();
                }
                None => {
                    tracing::warn!("log/tail stream ended, reconnecting");
                    self.stream = None;
                    self.decoder = StackedJsonDecoder::new();
                }
            }
        }
    }

    async fn connect(&self) -> reqwest::Result<ByteStream> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        Ok(Box::pin(resp.bytes_stream()))
    }
}

/// Recognize an add-provider event and extract its CID (§3, Open Question 1).
///
/// Both observed gateway shapes are recognized: the flat
/// `{"event": "handleAddProvider", "key": "..."}` and the nested
/// `{"Operation": "handleAddProvider", "Tags": {"key": "..."}}`. Anything
/// else is ignored (the overwhelming majority of log traffic).
pub fn extract_provider_cid(event: &Value) -> Option<String> {
    if let Some(obj) = event.as_object() {
        if obj.get("event").and_then(Value::as_str) == Some("handleAddProvider") {
            if let Some(key) = obj.get("key").and_then(Value::as_str) {
                return Some(key.to_string());
            }
        }
        if obj.get("Operation").and_then(Value::as_str) == Some("handleAddProvider") {
            if let Some(key) = obj
                .get("Tags")
                .and_then(Value::as_object)
                .and_then(|tags| tags.get("key"))
                .and_then(Value::as_str)
            {
                return Some(key.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_flat_shape() {
        let event = json!({"event": "handleAddProvider", "key": "Qm1"});
        assert_eq!(extract_provider_cid(&event).as_deref(), Some("Qm1"));
    }

    #[test]
    fn recognizes_nested_shape() {
        let event = json!({"Operation": "handleAddProvider", "Tags": {"key": "Qm1"}});
        assert_eq!(extract_provider_cid(&event).as_deref(), Some("Qm1"));
    }

    #[test]
    fn ignores_unrelated_events() {
        let event = json!({"event": "handleProvideFinished", "key": "Qm1"});
        assert_eq!(extract_provider_cid(&event), None);

        let event = json!({"nothing": "here"});
        assert_eq!(extract_provider_cid(&event), None);
    }
}
