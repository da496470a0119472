// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pi-hole configuration API client.
//!
//! [`PiHoleClient`] owns the HTTP client and the Pi-hole session. All record
//! calls go through one authenticated-request path that:
//!
//! 1. Authenticates lazily when no session id is held
//! 2. Sends the session id in the `sid` header
//! 3. On HTTP 401, drops the session, authenticates again and retries once
//!
//! Nothing else is retried. Transport errors surface immediately.
//!
//! # Example
//!
//! ```rust,no_run
//! use pihole_operator::pihole::PiHoleClient;
//! use pihole_operator::record::Record;
//!
//! # async fn example() -> Result<(), pihole_operator::errors::PiHoleError> {
//! let client = PiHoleClient::new("http://pi.hole/api", "app-password")?;
//! client.create_record(&Record::a("nas.home.lab", "192.168.178.10")).await?;
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod types;

pub use types::DnsSection;

use crate::backend::DnsBackend;
use crate::constants::{PIHOLE_AUTH_PATH, PIHOLE_CONFIG_SECTION, PIHOLE_SID_HEADER};
use crate::errors::PiHoleError;
use crate::metrics;
use crate::record::Record;
use codec::{encode_key, CnameCodec, HostsCodec, RecordCodec};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use types::{AuthRequest, AuthResponse, ConfigResponse};
use url::Url;

/// Authenticated client for one Pi-hole instance.
///
/// The session id is created on first use and shared by every caller. The
/// mutex is held while authenticating, so concurrent reconcile passes wait for
/// a single login instead of racing.
pub struct PiHoleClient {
    base_url: Url,
    password: String,
    http: HttpClient,
    session: Mutex<Option<String>>,
}

impl std::fmt::Debug for PiHoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiHoleClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PiHoleClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://pi.hole/api`).
    ///
    /// # Errors
    ///
    /// Returns [`PiHoleError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// URL that paths can be appended to.
    pub fn new(base_url: &str, password: impl Into<String>) -> Result<Self, PiHoleError> {
        Self::with_http_client(HttpClient::new(), base_url, password)
    }

    /// Same as [`PiHoleClient::new`] with a preconfigured HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`PiHoleError::InvalidBaseUrl`] if `base_url` cannot be used.
    pub fn with_http_client(
        http: HttpClient,
        base_url: &str,
        password: impl Into<String>,
    ) -> Result<Self, PiHoleError> {
        let parsed = Url::parse(base_url).map_err(|e| PiHoleError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() {
            return Err(PiHoleError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            base_url: parsed,
            password: password.into(),
            http,
            session: Mutex::new(None),
        })
    }

    /// Whether a session id is currently held.
    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Build a URL by appending percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PiHoleError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PiHoleError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a local DNS collection, or of one entry in it.
    fn collection_url(&self, collection: &str, key: Option<&str>) -> Result<Url, PiHoleError> {
        let [config, dns] = PIHOLE_CONFIG_SECTION;
        match key {
            Some(key) => self.endpoint(&[config, dns, collection, key]),
            None => self.endpoint(&[config, dns, collection]),
        }
    }

    /// Log in with the configured password and return the new session id.
    async fn authenticate(&self) -> Result<String, PiHoleError> {
        let url = self.endpoint(&[PIHOLE_AUTH_PATH])?;
        info!(url = %url, "Authenticating against Pi-hole");

        let response = self
            .http
            .post(url)
            .json(&AuthRequest {
                password: &self.password,
            })
            .send()
            .await?;

        let status = response.status();
        metrics::record_backend_request("authenticate", status.as_u16());

        if !status.is_success() {
            return Err(PiHoleError::Authentication {
                reason: format!("unexpected HTTP status {status}"),
            });
        }

        let body: AuthResponse =
            response
                .json()
                .await
                .map_err(|e| PiHoleError::Authentication {
                    reason: format!("malformed session response: {e}"),
                })?;

        if !body.session.valid {
            return Err(PiHoleError::Authentication {
                reason: "Pi-hole reported the session as not valid".to_string(),
            });
        }

        let sid = body
            .session
            .sid
            .filter(|sid| !sid.is_empty())
            .ok_or_else(|| PiHoleError::Authentication {
                reason: "session response carried no session id".to_string(),
            })?;

        debug!("Pi-hole session established");
        Ok(sid)
    }

    /// Current session id, authenticating first if none is held.
    async fn session_id(&self) -> Result<String, PiHoleError> {
        let mut session = self.session.lock().await;
        if let Some(sid) = session.as_ref() {
            return Ok(sid.clone());
        }

        let sid = self.authenticate().await?;
        *session = Some(sid.clone());
        Ok(sid)
    }

    /// Drop the session if it is still the one that was rejected.
    async fn invalidate_session(&self, rejected: &str) {
        let mut session = self.session.lock().await;
        if session.as_deref() == Some(rejected) {
            *session = None;
        }
    }

    async fn send(&self, method: Method, url: Url, sid: &str) -> Result<Response, PiHoleError> {
        debug!(method = %method, path = %url.path(), "HTTP request to Pi-hole");

        let response = self
            .http
            .request(method, url)
            .header(PIHOLE_SID_HEADER, sid)
            .send()
            .await?;

        Ok(response)
    }

    /// Send a request carrying the session id, re-authenticating once on 401.
    async fn authenticated_request(&self, method: Method, url: Url) -> Result<Response, PiHoleError> {
        let sid = self.session_id().await?;
        let response = self.send(method.clone(), url.clone(), &sid).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!(
            path = %url.path(),
            "Pi-hole rejected the session, authenticating again"
        );
        self.invalidate_session(&sid).await;

        let sid = self.session_id().await?;
        self.send(method, url, &sid).await
    }

    /// Fetch and decode one local DNS collection.
    async fn list_collection<C: RecordCodec>(&self) -> Result<Vec<Record>, PiHoleError> {
        let url = self.collection_url(C::COLLECTION, None)?;
        let response = self.authenticated_request(Method::GET, url).await?;

        let status = response.status();
        metrics::record_backend_request("list", status.as_u16());

        if !status.is_success() {
            error!(
                collection = C::COLLECTION,
                status = %status,
                "Failed to list Pi-hole records"
            );
            return Err(PiHoleError::backend(
                &format!("list {}", C::COLLECTION),
                status,
            ));
        }

        let body: ConfigResponse = response.json().await.map_err(|e| {
            PiHoleError::decode(format!("{} response body: {e}", C::COLLECTION))
        })?;

        C::decode_all(body.config.dns)
    }

    /// List every local DNS record, address records first, then CNAMEs.
    ///
    /// # Errors
    ///
    /// Fails as a whole if either collection cannot be fetched or decoded.
    pub async fn list_records(&self) -> Result<Vec<Record>, PiHoleError> {
        let mut records = self.list_collection::<HostsCodec>().await?;
        records.extend(self.list_collection::<CnameCodec>().await?);

        debug!(count = records.len(), "Listed Pi-hole records");
        Ok(records)
    }

    /// Create a record. Pi-hole answers `201 Created` on success.
    ///
    /// # Errors
    ///
    /// Returns [`PiHoleError::Backend`] for any other status.
    pub async fn create_record(&self, record: &Record) -> Result<(), PiHoleError> {
        let (collection, key) = encode_key(record);
        let url = self.collection_url(collection, Some(&key))?;

        info!(record = %record, "Creating record in Pi-hole");
        let response = self.authenticated_request(Method::PUT, url).await?;

        let status = response.status();
        metrics::record_backend_request("create", status.as_u16());

        if status != StatusCode::CREATED {
            error!(
                collection = collection,
                key = %key,
                status = %status,
                "Failed to create Pi-hole record"
            );
            return Err(PiHoleError::backend("create record", status));
        }

        metrics::record_backend_record_created(collection);
        Ok(())
    }

    /// Delete a record, keyed by the same encoding used to create it.
    /// Pi-hole answers `204 No Content` on success.
    ///
    /// # Errors
    ///
    /// Returns [`PiHoleError::Backend`] for any other status.
    pub async fn delete_record(&self, record: &Record) -> Result<(), PiHoleError> {
        let (collection, key) = encode_key(record);
        let url = self.collection_url(collection, Some(&key))?;

        info!(record = %record, "Deleting record from Pi-hole");
        let response = self.authenticated_request(Method::DELETE, url).await?;

        let status = response.status();
        metrics::record_backend_request("delete", status.as_u16());

        if status != StatusCode::NO_CONTENT {
            error!(
                collection = collection,
                key = %key,
                status = %status,
                "Failed to delete Pi-hole record"
            );
            return Err(PiHoleError::backend("delete record", status));
        }

        metrics::record_backend_record_deleted(collection);
        Ok(())
    }

    /// Log out, invalidating the session on the Pi-hole side.
    ///
    /// Does nothing if no session is held. The local session id is only cleared
    /// when Pi-hole confirms the logout.
    ///
    /// # Errors
    ///
    /// Returns [`PiHoleError::Backend`] if Pi-hole does not answer with success.
    pub async fn close(&self) -> Result<(), PiHoleError> {
        let mut session = self.session.lock().await;
        let Some(sid) = session.clone() else {
            debug!("No Pi-hole session to close");
            return Ok(());
        };

        let url = self.endpoint(&[PIHOLE_AUTH_PATH])?;
        let response = self.send(Method::DELETE, url, &sid).await?;

        let status = response.status();
        metrics::record_backend_request("close", status.as_u16());

        if !status.is_success() {
            return Err(PiHoleError::backend("close session", status));
        }

        *session = None;
        info!("Pi-hole session closed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsBackend for PiHoleClient {
    async fn list_records(&self) -> Result<Vec<Record>, PiHoleError> {
        PiHoleClient::list_records(self).await
    }

    async fn create_record(&self, record: &Record) -> Result<(), PiHoleError> {
        PiHoleClient::create_record(self, record).await
    }

    async fn delete_record(&self, record: &Record) -> Result<(), PiHoleError> {
        PiHoleClient::delete_record(self, record).await
    }
}
