//! Key-value store backed by a Synap server over StreamableHTTP

use super::KeyValueStore;
use crate::error::{CacheError, Result};
use crate::value::{Value, format_float};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Synap HTTP store configuration
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the Synap server
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional authentication token
    pub auth_token: Option<String>,
}

impl HttpStoreConfig {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }

    /// Set the timeout for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the authentication token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Key-value store backed by a Synap server
///
/// Every operation is a StreamableHTTP command posted to `api/v1/command`.
#[derive(Clone)]
pub struct HttpStore {
    config: Arc<HttpStoreConfig>,
    http_client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Create a new store handle; no request is made until first use
    pub fn new(config: HttpStoreConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut http_client_builder = Client::builder().timeout(config.timeout);

        if let Some(ref token) = config.auth_token {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = format!("Bearer {}", token).parse().map_err(|_| {
                CacheError::Config("auth token is not a valid header value".to_string())
            })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            http_client_builder = http_client_builder.default_headers(headers);
        }

        let http_client = http_client_builder.build()?;

        info!("Synap store at {}", base_url);

        Ok(Self {
            config: Arc::new(config),
            http_client,
            base_url,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the configuration this store was built from
    pub fn config(&self) -> &HttpStoreConfig {
        &self.config
    }

    /// Send a StreamableHTTP command and return the reply payload
    ///
    /// ```json
    /// {
    ///   "command": "kv.get",
    ///   "request_id": "uuid",
    ///   "payload": { ... }
    /// }
    /// ```
    async fn send_command(&self, command: &str, payload: JsonValue) -> Result<JsonValue> {
        let request_id = uuid::Uuid::new_v4().to_string();

        let body = json!({
            "command": command,
            "request_id": request_id,
            "payload": payload,
        });

        let url = self.base_url.join("api/v1/command")?;

        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CacheError::Server(error_text));
        }

        let result: JsonValue = response.json().await?;

        if !result["success"].as_bool().unwrap_or(false) {
            let error_msg = result["error"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string();
            return Err(CacheError::Server(error_msg));
        }

        Ok(result["payload"].clone())
    }
}

fn classify_transport_error(err: reqwest::Error) -> CacheError {
    if err.is_connect() {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::Http(err)
    }
}

/// JSON form of a value as written with `kv.set`
///
/// The server persists the JSON encoding of whatever it receives, so each
/// variant is sent in the shape that [`decode_stored`] can map back.
fn encode_value(value: &Value) -> Result<JsonValue> {
    match value {
        Value::Text(s) => Ok(json!(s)),
        Value::Bytes(b) => Ok(json!(b)),
        Value::Int(i) => Ok(json!(i)),
        Value::Float(f) if f.is_finite() => Ok(json!(f)),
        Value::Float(f) => Err(CacheError::UnsupportedValue(format!(
            "non-finite float {} cannot be sent to Synap",
            f
        ))),
    }
}

/// Map bytes held by the server back to the canonical byte encoding
///
/// Values written with `kv.set` are JSON documents; counters written by
/// `kv.incr` are bare decimal text, which also parses as a JSON number.
/// JSON floats are re-rendered with [`format_float`] so they match what the
/// other stores hold.
fn decode_stored(raw: Vec<u8>) -> Vec<u8> {
    match serde_json::from_slice::<JsonValue>(&raw) {
        Ok(JsonValue::String(s)) => s.into_bytes(),
        Ok(JsonValue::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => format_float(f).into_bytes(),
            _ => n.to_string().into_bytes(),
        },
        Ok(array @ JsonValue::Array(_)) => {
            serde_json::from_value::<Vec<u8>>(array).unwrap_or(raw)
        }
        _ => raw,
    }
}

#[async_trait]
impl KeyValueStore for HttpStore {
    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        debug!("kv.set key={}, kind={}", key, value.kind());
        let payload = json!({
            "key": key,
            "value": encode_value(value)?,
            "ttl": null,
        });

        self.send_command("kv.set", payload).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!("kv.get key={}", key);
        let payload = json!({"key": key, "type": "bytes"});
        let response = self.send_command("kv.get", payload).await?;

        // StreamableHTTP returns null for not found
        if response.is_null() {
            return Ok(None);
        }

        let raw: Vec<u8> = serde_json::from_value(response)?;
        Ok(Some(decode_stored(raw)))
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let payload = json!({"key": key, "amount": 1});
        let response = self.send_command("kv.incr", payload).await?;

        response["value"].as_i64().ok_or_else(|| {
            CacheError::Server(format!("kv.incr returned no integer value: {}", response))
        })
    }

    async fn flush_all(&self) -> Result<()> {
        let response = self.send_command("kv.flushdb", json!({})).await?;
        info!(
            "Flushed {} keys from Synap store",
            response["flushed"].as_u64().unwrap_or(0)
        );
        Ok(())
    }
}
