//! Main client implementation.

use std::sync::{Arc, OnceLock};

use opentok_auth::{JwtTokenGenerator, TokenGenerator};
use parking_lot::RwLock;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::api::{ArchivesApi, SessionsApi};
use crate::error::{Error, Result};
use crate::operation::{Operation, OperationKind, RequestBody, classify};
use crate::params::FormEncoding;

/// Default base URL of the OpenTok REST API.
pub const DEFAULT_API_URL: &str = "https://api.opentok.com";

/// Header carrying the per-request authentication token.
pub const AUTH_HEADER: &str = "X-OPENTOK-AUTH";

/// Product token of the client identification string.
const PRODUCT: &str = "OpenTok-Rust-SDK";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "OPENTOK_API_KEY";

/// Environment variable holding the API secret.
pub const ENV_API_SECRET: &str = "OPENTOK_API_SECRET";

/// Environment variable overriding the API URL.
pub const ENV_API_URL: &str = "OPENTOK_API_URL";

/// OpenTok REST API client.
///
/// Clones share the same transport. No request timeout is applied: an
/// operation completes when the transport delivers a response or fails.
///
/// # Example
///
/// ```no_run
/// use opentok_client::{ArchiveProperties, OpenTokClient};
///
/// # async fn example() -> opentok_client::Result<()> {
/// let client = OpenTokClient::builder(123456, "secret").build()?;
///
/// let archive = client
///     .archives()
///     .start("session-id", &ArchiveProperties::default())
///     .await?;
/// println!("{}", archive);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenTokClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// Project API key.
    pub(crate) api_key: u32,
    /// Project API secret.
    api_secret: String,
    /// Base URL as configured, without a trailing slash.
    api_url: String,
    /// Parsed base URL that operation paths are appended to.
    base_url: Url,
    /// HTTP transport, `None` once closed.
    http: RwLock<Option<reqwest::Client>>,
    /// Source of per-request tokens.
    token_generator: Arc<dyn TokenGenerator>,
    /// Rendering of form bodies.
    pub(crate) form_encoding: FormEncoding,
    /// Client identification, computed on first use.
    user_agent: OnceLock<String>,
}

impl OpenTokClient {
    /// Create a new client builder.
    pub fn builder(api_key: u32, api_secret: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key, api_secret)
    }

    /// Get access to the inner client state (for API implementations).
    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }

    /// Project API key.
    pub fn api_key(&self) -> u32 {
        self.inner.api_key
    }

    /// Base API URL.
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Client identification sent as `User-Agent`.
    pub fn user_agent(&self) -> &str {
        self.inner.user_agent.get_or_init(|| {
            format!(
                "{}/{} Rust/{}-{}",
                PRODUCT,
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            )
        })
    }

    /// Release the transport.
    ///
    /// Operations dispatched afterwards fail with [`Error::Closed`].
    /// Requests already in flight keep their own handle to the connection
    /// pool and finish as the transport allows.
    pub fn close(&self) {
        if self.inner.http.write().take().is_some() {
            tracing::debug!("OpenTok client closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.http.read().is_none()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the sessions API.
    pub fn sessions(&self) -> SessionsApi {
        SessionsApi::new(self.clone())
    }

    /// Access the archives API.
    pub fn archives(&self) -> ArchivesApi {
        ArchivesApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    fn transport(&self) -> Result<reqwest::Client> {
        self.inner.http.read().clone().ok_or(Error::Closed)
    }

    /// Attach the authentication token and client identification.
    ///
    /// Fails without touching the network when no token can be generated.
    fn authenticate(
        &self,
        request: reqwest::RequestBuilder,
        operation: OperationKind,
    ) -> Result<reqwest::RequestBuilder> {
        let token = self
            .inner
            .token_generator
            .generate(self.inner.api_key, &self.inner.api_secret)
            .map_err(|source| Error::Auth { operation, source })?;

        Ok(request
            .header(USER_AGENT, self.user_agent())
            .header(AUTH_HEADER, token))
    }

    /// Send an operation and classify its outcome.
    ///
    /// On success the response body is returned verbatim.
    pub(crate) async fn dispatch(&self, operation: Operation) -> Result<String> {
        let kind = operation.kind;
        let classified = !kind.status_table().is_empty();
        let http = self.transport()?;
        let url = operation.url(&self.inner.base_url)?;

        tracing::debug!(operation = ?kind, method = %kind.method(), %url, "Dispatching request");

        let mut request = self.authenticate(http.request(kind.method(), url), kind)?;
        if kind.accepts_json() {
            request = request.header(ACCEPT, "application/json");
        }
        request = match operation.body {
            RequestBody::Empty => request,
            RequestBody::Form { body, content_type } => {
                let request = match content_type {
                    Some(content_type) => request.header(CONTENT_TYPE, content_type),
                    None => request,
                };
                request.body(body)
            }
            RequestBody::Json(body) => request.header(CONTENT_TYPE, "application/json").body(body),
        };

        let response = request.send().await.map_err(|source| {
            tracing::warn!(operation = ?kind, error = %source, "Request could not complete");
            Error::Transport {
                operation: kind,
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            if classified {
                tracing::warn!(operation = ?kind, status = status.as_u16(), "Request failed");
                return Err(classify(kind, status, &operation.target, None));
            }
            tracing::warn!(
                operation = ?kind,
                status = status.as_u16(),
                "Forwarding unsuccessful response payload"
            );
        }

        match response.text().await {
            Ok(body) => Ok(body),
            Err(source) if !classified => Err(Error::Transport {
                operation: kind,
                source,
            }),
            Err(source) => {
                tracing::warn!(operation = ?kind, error = %source, "Response body could not be read");
                Err(classify(kind, status, &operation.target, Some(source)))
            }
        }
    }
}

impl std::fmt::Debug for OpenTokClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenTokClient")
            .field("api_key", &self.inner.api_key)
            .field("api_url", &self.inner.api_url)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Connection settings applied to the default transport.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: Option<usize>,
    /// Disable Nagle's algorithm.
    pub tcp_nodelay: bool,
    /// Refuse plain-HTTP URLs.
    pub https_only: bool,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
    /// Ignore proxy settings from the environment.
    pub no_proxy: bool,
}

impl TransportOptions {
    fn into_client(self) -> Result<reqwest::Client> {
        // Redirects are never followed: a 3xx is classified like any other
        // status, and the auth header must not reach another host.
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .tcp_nodelay(self.tcp_nodelay)
            .https_only(self.https_only);

        if self.no_proxy {
            builder = builder.no_proxy();
        }

        if let Some(max) = self.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max);
        }
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| Error::Config(format!("Could not build HTTP transport: {}", e)))
    }
}

/// Builder for creating an OpenTokClient.
pub struct ClientBuilder {
    api_key: u32,
    api_secret: String,
    api_url: Option<String>,
    transport_options: Option<TransportOptions>,
    http_client: Option<reqwest::Client>,
    token_generator: Option<Arc<dyn TokenGenerator>>,
    form_encoding: FormEncoding,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key)
            .field("api_url", &self.api_url)
            .field("transport_options", &self.transport_options)
            .field("form_encoding", &self.form_encoding)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Create a new builder for the given project credentials.
    ///
    /// Credentials are not validated here; invalid values surface as
    /// [`Error::Auth`] when a request is made.
    pub fn new(api_key: u32, api_secret: impl Into<String>) -> Self {
        Self {
            api_key,
            api_secret: api_secret.into(),
            api_url: None,
            transport_options: None,
            http_client: None,
            token_generator: None,
            form_encoding: FormEncoding::default(),
        }
    }

    /// Create a builder from `OPENTOK_API_KEY`, `OPENTOK_API_SECRET` and the
    /// optional `OPENTOK_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create a builder from variables resolved by `lookup`.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| Error::Config(format!("{} is not set", ENV_API_KEY)))?;
        let api_key = api_key
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::Config(format!("{} is not a valid API key", ENV_API_KEY)))?;
        let api_secret = lookup(ENV_API_SECRET)
            .ok_or_else(|| Error::Config(format!("{} is not set", ENV_API_SECRET)))?;

        let mut builder = Self::new(api_key, api_secret);
        if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.is_empty()) {
            builder = builder.api_url(url);
        }
        Ok(builder)
    }

    /// Set the base API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set options for the default transport.
    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.transport_options = Some(options);
        self
    }

    /// Use a preconfigured HTTP client as the transport.
    ///
    /// Takes precedence over [`transport_options`](Self::transport_options).
    /// The client should be built with
    /// `.redirect(reqwest::redirect::Policy::none())`; otherwise redirects
    /// are followed and 3xx statuses never reach classification.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the token generator.
    pub fn token_generator(mut self, generator: impl TokenGenerator + 'static) -> Self {
        self.token_generator = Some(Arc::new(generator));
        self
    }

    /// Set how session creation parameters are rendered.
    pub fn form_encoding(mut self, encoding: FormEncoding) -> Self {
        self.form_encoding = encoding;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<OpenTokClient> {
        let api_url = self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim_end_matches('/').to_string();
        let base_url = Url::parse(&api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("API URL cannot be a base: {}", api_url)));
        }

        let http = match self.http_client {
            Some(client) => client,
            None => self.transport_options.unwrap_or_default().into_client()?,
        };

        let token_generator = self
            .token_generator
            .unwrap_or_else(|| Arc::new(JwtTokenGenerator::new()));

        Ok(OpenTokClient {
            inner: Arc::new(ClientInner {
                api_key: self.api_key,
                api_secret: self.api_secret,
                api_url,
                base_url,
                http: RwLock::new(Some(http)),
                token_generator,
                form_encoding: self.form_encoding,
                user_agent: OnceLock::new(),
            }),
        })
    }
}
