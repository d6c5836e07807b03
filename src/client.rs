//! The store client: per-key operations and multi-key orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use hyper::{StatusCode, Uri};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::debug;
use url::form_urlencoded;

use crate::codec::{self, StoredValue};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::HttpTransport;

/// Options for a single `get`.
///
/// The one recognized option is `raw`: when set, the stored text is
/// returned verbatim instead of being decoded as JSON.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Bypass structured decoding and return the literal wire text
    pub raw: bool,
}

/// Async client for a remote HTTP key-value store.
///
/// A stateless façade over the store's REST surface: every entry lives
/// remotely, and the client holds nothing but the base endpoint and a
/// shared HTTP client. Cloning is cheap and clones may drive any number
/// of concurrent requests.
///
/// Multi-key operations are best-effort compositions of independent
/// per-key requests: there are no transactions, no atomicity across keys
/// and no rollback. A failure partway through leaves already-committed
/// writes or deletes in place.
///
/// # Example
/// ```rust,no_run
/// use kv_store_client::StoreClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), kv_store_client::Error> {
///     let client = StoreClient::new("http://localhost:3000")?;
///
///     client.set("greeting", "hello").await?;
///     let value = client.get("greeting").await?;
///     println!("stored: {:?}", value.as_json());
///
///     client.delete("greeting").await?;
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct StoreClient {
    config: Arc<ClientConfig>,
    transport: HttpTransport,
}

impl StoreClient {
    /// Create a client for an explicitly given base endpoint.
    ///
    /// # Errors
    /// Returns an error if the endpoint is empty or not a valid URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(endpoint))
    }

    /// Create a client from the `KV_STORE_URL` environment variable.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the variable is unset.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(Error::Config("endpoint is empty".to_string()));
        }
        // Validate the endpoint URL early; requests reuse it as-is
        let _: Uri = config
            .endpoint
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("invalid endpoint URL: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            transport: HttpTransport::new(),
        })
    }

    /// The configured base endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.endpoint, codec::encode_component(key))
    }

    fn list_url(&self, prefix: &str) -> String {
        format!(
            "{}/?encode=true&prefix={}",
            self.config.endpoint,
            codec::encode_component(prefix)
        )
    }

    /// Fetch the stored wire text for a key.
    ///
    /// The store reports an absent key with an empty body; 404 is folded
    /// into that same signal. Any other non-success status is surfaced.
    async fn fetch_stored_text(&self, key: &str) -> Result<String> {
        let (status, body) = self.transport.fetch_text(&self.key_url(key)).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(String::new());
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("get `{}`", key),
            });
        }
        Ok(body)
    }

    /// Retrieve and decode the value stored under `key`.
    ///
    /// Returns [`StoredValue::Absent`] when the key has no value. The
    /// store cannot distinguish an absent key from a key whose stored
    /// text is empty, so both read as `Absent`; use
    /// [`get_raw`](Self::get_raw) if the distinction from decoding
    /// matters.
    ///
    /// # Errors
    /// [`Error::Decode`] if the stored text is non-empty and not valid
    /// JSON; transport errors pass through unmodified.
    pub async fn get(&self, key: &str) -> Result<StoredValue> {
        self.get_with(key, &GetOptions::default()).await
    }

    /// Retrieve the value stored under `key` with explicit options.
    ///
    /// With `raw` set this returns [`StoredValue::Raw`] carrying the
    /// wire text verbatim, empty string included.
    pub async fn get_with(&self, key: &str, options: &GetOptions) -> Result<StoredValue> {
        let text = self.fetch_stored_text(key).await?;
        codec::decode(key, &text, options.raw)
    }

    /// Retrieve the literal wire text stored under `key`.
    ///
    /// Convenience over [`get_with`](Self::get_with) in raw mode; an
    /// absent key reads as an empty string.
    pub async fn get_raw(&self, key: &str) -> Result<String> {
        self.fetch_stored_text(key).await
    }

    /// Store `value` under `key`.
    ///
    /// The value is serialized to JSON and submitted as a
    /// `key=value` form body. Success is assumed from the status code;
    /// there is no read-after-write confirmation. Returns `&Self` so
    /// writes can be chained:
    ///
    /// ```rust,no_run
    /// # use kv_store_client::StoreClient;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), kv_store_client::Error> {
    /// # let client = StoreClient::new("http://localhost:3000")?;
    /// client.set("a", &1).await?.set("b", &2).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<&Self>
    where
        T: Serialize + ?Sized,
    {
        let encoded = codec::encode(value)?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair(key, &encoded)
            .finish();

        let status = self.transport.post_form(&self.config.endpoint, body).await?;
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("set `{}`", key),
            });
        }
        Ok(self)
    }

    /// Delete the entry stored under `key`.
    ///
    /// Idempotent from the caller's perspective: deleting an absent key
    /// is not distinguished from deleting a present one.
    pub async fn delete(&self, key: &str) -> Result<&Self> {
        let status = self.transport.delete_resource(&self.key_url(key)).await?;
        if status != StatusCode::NOT_FOUND && !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("delete `{}`", key),
            });
        }
        Ok(self)
    }

    /// List keys beginning with `prefix`, in store-provided order.
    ///
    /// An empty prefix lists every key. Keys come back percent-decoded.
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let (status, body) = self.transport.fetch_text(&self.list_url(prefix)).await?;
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("list prefix `{}`", prefix),
            });
        }
        if body.is_empty() {
            return Ok(Vec::new());
        }
        body.split('\n').map(codec::decode_component).collect()
    }

    /// Delete every key in the store.
    ///
    /// Lists all keys, then issues the deletes as a parallel fan-out and
    /// waits for every one to settle. On failure the first error is
    /// surfaced after settlement and the store is left partially emptied;
    /// nothing is rolled back.
    pub async fn empty(&self) -> Result<&Self> {
        let keys = self.list("").await?;
        debug!("emptying store: {} keys", keys.len());
        self.delete_fan_out(keys).await?;
        Ok(self)
    }

    /// Fetch every entry in the store.
    ///
    /// Lists all keys, then gets each one sequentially in list order.
    /// Sequential on purpose: this is the hot read path and may run over
    /// large datasets, so it must not burst the store with a request per
    /// key the way [`empty`](Self::empty) fans out its deletes.
    pub async fn get_all(&self) -> Result<HashMap<String, StoredValue>> {
        let keys = self.list("").await?;
        let mut entries = HashMap::with_capacity(keys.len());
        for key in keys {
            let value = self.get(&key).await?;
            entries.insert(key, value);
        }
        Ok(entries)
    }

    /// Store every entry of `entries`, sequentially in iteration order.
    ///
    /// Each write completes before the next starts. The first failure
    /// aborts the remaining entries; entries already written stay
    /// written.
    pub async fn set_all<I, K, V>(&self, entries: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        for (key, value) in entries {
            self.set(key.as_ref(), &value).await?;
        }
        Ok(self)
    }

    /// Delete every given key as a parallel fan-out.
    ///
    /// No ordering among the deletes; all requests settle before the
    /// first failure (if any) is surfaced. A prefix of the keys may
    /// already be deleted when the operation fails.
    pub async fn delete_multiple<I, S>(&self, keys: I) -> Result<&Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.delete_fan_out(keys).await?;
        Ok(self)
    }

    /// Structured concurrent join over per-key deletes: spawn one task
    /// per key, drain them all, then report the first observed error.
    async fn delete_fan_out(&self, keys: Vec<String>) -> Result<()> {
        let mut tasks = JoinSet::new();
        for key in keys {
            let client = self.clone();
            tasks.spawn(async move { client.delete(&key).await.map(|_| ()) });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::Internal(format!("delete task failed: {}", e))),
            };
            if let Err(e) = outcome {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_url_encodes_key() {
        let client = StoreClient::new("http://localhost:3000").unwrap();
        assert_eq!(client.key_url("plain"), "http://localhost:3000/plain");
        assert_eq!(client.key_url("a/b"), "http://localhost:3000/a%2Fb");
        assert_eq!(client.key_url("a c"), "http://localhost:3000/a%20c");
    }

    #[test]
    fn test_list_url_encodes_prefix() {
        let client = StoreClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            client.list_url(""),
            "http://localhost:3000/?encode=true&prefix="
        );
        assert_eq!(
            client.list_url("a b&c"),
            "http://localhost:3000/?encode=true&prefix=a%20b%26c"
        );
    }

    #[test]
    fn test_trailing_slash_endpoint_joins_cleanly() {
        let client = StoreClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.key_url("k"), "http://localhost:3000/k");
    }

    #[test]
    fn test_empty_endpoint_is_a_config_error() {
        let err = StoreClient::new("").unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {:?}", err);
    }

    #[test]
    fn test_invalid_endpoint_url() {
        let err = StoreClient::new("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)), "got: {:?}", err);
    }
}
