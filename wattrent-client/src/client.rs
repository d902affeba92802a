//! JSON-over-HTTP implementation of the repository.
//!
//! Every route answers with an [`ApiEnvelope`]. A non-2xx status or
//! `success: false` is a failure carrying the server's own text. Settings
//! calls are bounded by a deadline; dropping the `reqwest` future on expiry
//! aborts the request. Bill calls wait as long as the server takes.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use wattrent_core::db::repository::{RepositoryError, WattRentRepository};
use wattrent_core::models::{Bill, BillPatch, NewBill, UserSettings};

use crate::envelope::ApiEnvelope;

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpRepository {
    base_url: Url,
    http: Client,
    settings_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpRepository {
    pub const SETTINGS_TIMEOUT: Duration = Duration::from_secs(10);
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

    /// `base_url` includes the API prefix, e.g. `http://localhost:8080/api/v1`.
    ///
    /// # Errors
    /// [`RepositoryError::Configuration`] when the URL is not http(s) or
    /// the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RepositoryError> {
        let raw = base_url.into();
        let raw = raw.trim().trim_end_matches('/');
        let base_url = Url::parse(raw)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "API base URL must start with http:// or https://, got '{raw}'"
                ))
            })?;

        let http = Client::builder()
            .build()
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;

        Ok(Self {
            base_url,
            http,
            settings_timeout: Self::SETTINGS_TIMEOUT,
            probe_timeout: Self::PROBE_TIMEOUT,
        })
    }

    pub fn with_timeouts(
        mut self,
        settings: Duration,
        probe: Duration,
    ) -> Self {
        self.settings_timeout = settings;
        self.probe_timeout = probe;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base path, percent-encoding each one so
    /// ids cannot escape their segment.
    fn endpoint(
        &self,
        segments: &[&str],
    ) -> Result<Url, RepositoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RepositoryError::Configuration(format!("'{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, RepositoryError> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    /// Sends the request and unwraps the envelope's `data`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, RepositoryError> {
        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        let status = response.status();
        let url = response.url().path().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        debug!(%status, path = %url, bytes = text.len(), "API response");

        let parsed = serde_json::from_str::<ApiEnvelope<Value>>(&text);

        if status == StatusCode::NOT_FOUND {
            // A server-stated reason beats the bare status.
            return Err(match parsed.as_ref().ok().and_then(ApiEnvelope::reason) {
                Some(reason) => {
                    warn!(path = %url, reason, "API call failed");
                    RepositoryError::Remote(reason.to_string())
                }
                None => RepositoryError::NotFound,
            });
        }

        let envelope = match parsed {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                warn!(%status, path = %url, "non-JSON error body");
                return Err(RepositoryError::Remote(format!("HTTP {status}")));
            }
            Err(e) => {
                return Err(RepositoryError::InvalidResponse(format!("{e}; body={text}")));
            }
        };

        if !status.is_success() || !envelope.success {
            let reason = envelope.failure_text();
            warn!(%status, path = %url, reason = %reason, "API call failed");
            return Err(RepositoryError::Remote(reason));
        }

        match envelope.data {
            None | Some(Value::Null) => Ok(None),
            Some(data) => serde_json::from_value(data)
                .map(Some)
                .map_err(|e| RepositoryError::InvalidResponse(e.to_string())),
        }
    }

    async fn send_required<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RepositoryError> {
        self.send(request)
            .await?
            .ok_or_else(|| RepositoryError::InvalidResponse("response carried no data".to_string()))
    }

    async fn send_unit(
        &self,
        request: RequestBuilder,
    ) -> Result<(), RepositoryError> {
        self.send::<Value>(request).await.map(|_| ())
    }
}

/// Races `call` against `limit`; the loser is dropped.
async fn within<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = Result<T, RepositoryError>>,
) -> Result<T, RepositoryError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_secs = limit.as_secs_f64(), "request aborted");
            Err(RepositoryError::Timeout {
                operation,
                after: limit,
            })
        }
    }
}

#[async_trait]
impl WattRentRepository for HttpRepository {
    async fn create_bill(
        &self,
        bill: NewBill,
    ) -> Result<Bill, RepositoryError> {
        self.send_required(self.request(Method::POST, &["bills"])?.json(&bill))
            .await
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, RepositoryError> {
        let bills: Option<Vec<Bill>> = self.send(self.request(Method::GET, &["bills"])?).await?;
        Ok(bills.unwrap_or_default())
    }

    async fn get_bill(
        &self,
        id: &str,
    ) -> Result<Bill, RepositoryError> {
        self.send_required(self.request(Method::GET, &["bills", id])?)
            .await
    }

    async fn update_bill(
        &self,
        id: &str,
        patch: &BillPatch,
    ) -> Result<Bill, RepositoryError> {
        self.send_required(
            self.request(Method::PUT, &["bills", id])?
                .json(patch),
        )
        .await
    }

    async fn delete_bill(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError> {
        self.send_unit(self.request(Method::DELETE, &["bills", id])?)
            .await
    }

    async fn get_settings(
        &self,
        user_id: &str,
    ) -> Result<UserSettings, RepositoryError> {
        let request = self
            .request(Method::GET, &["settings"])?
            .query(&[("userId", user_id)]);
        let settings: Option<UserSettings> =
            within("get settings", self.settings_timeout, self.send(request)).await?;
        // An empty payload means nothing stored yet.
        Ok(settings.unwrap_or_else(|| UserSettings::system_defaults(user_id)))
    }

    async fn save_settings(
        &self,
        settings: &UserSettings,
    ) -> Result<(), RepositoryError> {
        let request = self.request(Method::POST, &["settings"])?.json(settings);
        within("save settings", self.settings_timeout, self.send_unit(request)).await
    }

    async fn update_previous_reading(
        &self,
        user_id: &str,
        reading: f64,
    ) -> Result<(), RepositoryError> {
        let request = self
            .request(Method::PATCH, &["settings", user_id, "meter-reading"])?
            .json(&json!({ "reading": reading }));
        within(
            "update previous reading",
            self.settings_timeout,
            self.send_unit(request),
        )
        .await
    }

    async fn clear_settings(
        &self,
        user_id: &str,
    ) -> Result<(), RepositoryError> {
        let request = self.request(Method::DELETE, &["settings", user_id])?;
        within("clear settings", self.settings_timeout, self.send_unit(request)).await
    }

    async fn health(&self) -> Result<String, RepositoryError> {
        let probe = async {
            let response = self
                .request(Method::GET, &["health"])?
                .send()
                .await
                .map_err(|e| RepositoryError::Connection(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(RepositoryError::Remote(format!("HTTP {status}")));
            }
            let body: HealthResponse = response
                .json()
                .await
                .map_err(|e| RepositoryError::InvalidResponse(e.to_string()))?;
            Ok(body.message.unwrap_or_default())
        };
        within("health check", self.probe_timeout, probe).await
    }
}
