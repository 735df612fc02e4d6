use super::{Backend, BackendError};
use crate::config::RemoteConfig;
use crate::counters::remote_path;
use async_trait::async_trait;
use reqwest::{
    header::{ETAG, IF_MATCH},
    Client, Response, StatusCode, Url,
};
use serde_json::Value;
use std::{
    sync::{Mutex, OnceLock, PoisonError},
    time::Duration,
};
use tracing::{debug, error, info};

pub const NAME: &str = "Firebase";

/// Conditional writes attempted before an increment gives up.
pub const MAX_TRANSACTION_ATTEMPTS: u32 = 25;

const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    FailedInit,
}

struct Connection {
    client: Client,
    base_url: String,
}

/// Counters stored in a realtime database, reached over its REST interface.
pub struct RemoteBackend {
    config: RemoteConfig,
    request_timeout: Duration,
    state: Mutex<InitState>,
    connection: OnceLock<Connection>,
}

impl RemoteBackend {
    pub fn new(config: RemoteConfig, request_timeout: Duration) -> Self {
        Self {
            config,
            request_timeout,
            state: Mutex::new(InitState::Uninitialized),
            connection: OnceLock::new(),
        }
    }

    pub fn state(&self) -> InitState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates the configuration and prepares the HTTP client. No network
    /// I/O happens here. A failed initialization is permanent.
    pub fn initialize(&self) -> Result<(), BackendError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                InitState::Ready => return Ok(()),
                InitState::Initializing | InitState::FailedInit => {
                    return Err(BackendError::NotInitialized);
                }
                InitState::Uninitialized => *state = InitState::Initializing,
            }
        }

        let result = self.connect();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(connection) => {
                let _ = self.connection.set(connection);
                *state = InitState::Ready;
                info!(
                    project_id = %self.config.project_id,
                    auth_domain = %self.config.auth_domain,
                    "remote store initialized"
                );
                Ok(())
            }
            Err(err) => {
                *state = InitState::FailedInit;
                error!("failed to initialize remote store: {err}");
                Err(err)
            }
        }
    }

    fn connect(&self) -> Result<Connection, BackendError> {
        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            return Err(BackendError::ConfigIncomplete { missing });
        }

        let url = Url::parse(self.config.database_url.trim())
            .map_err(|err| BackendError::RemoteIo(format!("invalid database url: {err}")))?;
        let client = Client::builder().timeout(self.request_timeout).build()?;

        Ok(Connection {
            client,
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn connection(&self) -> Result<&Connection, BackendError> {
        self.connection.get().ok_or(BackendError::NotInitialized)
    }

    fn counter_url(connection: &Connection, key: &str) -> String {
        format!("{}/{}.json", connection.base_url, remote_path(key))
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get(&self, key: &str) -> Result<u64, BackendError> {
        let connection = self.connection()?;
        let response = connection
            .client
            .get(Self::counter_url(connection, key))
            .send()
            .await?
            .error_for_status()?;
        parse_counter(&response.json::<Value>().await?)
    }

    /// Compare-and-set loop on the store's ETag, so concurrent sessions
    /// never lose each other's increments.
    async fn increment(&self, key: &str, amount: u64) -> Result<u64, BackendError> {
        let connection = self.connection()?;
        let url = Self::counter_url(connection, key);

        let response = connection
            .client
            .get(&url)
            .header(ETAG_REQUEST_HEADER, "true")
            .send()
            .await?
            .error_for_status()?;
        let (mut etag, mut current) = read_versioned(response).await?;

        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let next = current.saturating_add(amount);
            let response = connection
                .client
                .put(&url)
                .header(IF_MATCH, etag.as_str())
                .json(&next)
                .send()
                .await?;

            if response.status() == StatusCode::PRECONDITION_FAILED {
                debug!(key, attempt, "counter changed underneath us, retrying");
                (etag, current) = read_versioned(response).await?;
                continue;
            }

            response.error_for_status()?;
            return self.get(key).await;
        }

        Err(BackendError::Conflict {
            attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }
}

async fn read_versioned(response: Response) -> Result<(String, u64), BackendError> {
    let etag = response
        .headers()
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| BackendError::RemoteIo("response carried no ETag".into()))?;
    let value = parse_counter(&response.json::<Value>().await?)?;
    Ok((etag, value))
}

fn parse_counter(value: &Value) -> Result<u64, BackendError> {
    match value {
        Value::Null => Ok(0),
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                return Ok(n);
            }
            match number.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err(BackendError::InvalidValue(number.to_string())),
            }
        }
        other => Err(BackendError::InvalidValue(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> RemoteConfig {
        RemoteConfig {
            api_key: "key".into(),
            auth_domain: "lobby.firebaseapp.com".into(),
            database_url: "https://lobby.firebaseio.com/".into(),
            project_id: "lobby".into(),
            storage_bucket: "lobby.appspot.com".into(),
            messaging_sender_id: "1234".into(),
            app_id: "1:1234:web:abcd".into(),
        }
    }

    #[test]
    fn parses_counter_values() {
        assert_eq!(parse_counter(&json!(null)).unwrap(), 0);
        assert_eq!(parse_counter(&json!(42)).unwrap(), 42);
        assert_eq!(parse_counter(&json!(7.0)).unwrap(), 7);
        assert!(parse_counter(&json!(-1)).is_err());
        assert!(parse_counter(&json!(1.5)).is_err());
        assert!(parse_counter(&json!("12")).is_err());
    }

    #[test]
    fn complete_config_initializes() {
        let backend = RemoteBackend::new(config(), Duration::from_secs(1));
        assert_eq!(backend.state(), InitState::Uninitialized);
        backend.initialize().unwrap();
        assert_eq!(backend.state(), InitState::Ready);
        let connection = backend.connection().unwrap();
        assert_eq!(
            RemoteBackend::counter_url(connection, "langTr"),
            "https://lobby.firebaseio.com/stats/langTr.json"
        );
    }

    #[tokio::test]
    async fn incomplete_config_fails_fast() {
        let backend = RemoteBackend::new(
            RemoteConfig {
                database_url: String::new(),
                ..config()
            },
            Duration::from_secs(1),
        );

        let err = backend.initialize().unwrap_err();
        assert!(matches!(
            err,
            BackendError::ConfigIncomplete { ref missing } if missing == &["database_url"]
        ));
        assert_eq!(backend.state(), InitState::FailedInit);

        assert!(matches!(backend.get("totalVisits").await, Err(BackendError::NotInitialized)));
        assert!(matches!(
            backend.increment("totalVisits", 1).await,
            Err(BackendError::NotInitialized)
        ));
        assert!(matches!(backend.initialize(), Err(BackendError::NotInitialized)));
    }

    #[tokio::test]
    async fn calls_before_initialize_are_rejected() {
        let backend = RemoteBackend::new(config(), Duration::from_secs(1));
        assert!(matches!(backend.get("langPt").await, Err(BackendError::NotInitialized)));
    }
}
