//! Async client for the Abstract API services.
//!
//! [`AbstractClient`] is the only place that talks to the upstream. Every
//! operation follows the same steps:
//!
//! 1. Look up the key for the operation's [`ServiceKey`]; a missing key fails
//!    with [`ApiError::MissingCredential`] before anything is sent.
//! 2. Build an [`ApiRequest`] from the caller's arguments, dropping absent ones.
//! 3. Send one GET request with the key as the `api_key` query parameter.
//! 4. Decode a 2xx body into the operation's model, or turn the failure into an
//!    [`ApiError`].
//!
//! Nothing is retried and nothing is cached. The client is cheap to clone and
//! safe to share between concurrent tool calls: it only holds the read-only
//! [`Credentials`] table and a pooled reqwest client.
//!
//! ```rust,no_run
//! use abstract_api_mcp::client::{AbstractClient, Credentials, ServiceKey};
//! use abstract_api_mcp::config::HttpConfig;
//!
//! # async fn example() -> Result<(), abstract_api_mcp::client::ApiError> {
//! let credentials = Credentials::new().with(ServiceKey::Ip, "your-key");
//! let client = AbstractClient::new(credentials, &HttpConfig::default())?;
//! let location = client.geolocate_ip(Some("8.8.8.8"), None).await?;
//! println!("{:?}", location.country);
//! # Ok(())
//! # }
//! ```

mod diagnostics;
mod error;
mod request;
mod service;

pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use error::{ApiError, ErrorClass};
pub use request::ApiRequest;
pub use service::{Credentials, ServiceKey};

use base64::Engine;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, HttpConfig};
use crate::models::{
    CompanyInfo, CurrencyConversion, CurrentTime, EmailValidation, ExchangeRates, Holidays,
    IpGeolocation, PhoneValidation, ScrapeResult, Screenshot, TimezoneConversion, TimezoneQuery,
    VatValidation,
};
use crate::utils::HttpClient;
use request::Payload;

/// Query parameter carrying the service key
const API_KEY_PARAM: &str = "api_key";

/// Default screenshot viewport
pub const DEFAULT_SCREENSHOT_WIDTH: u32 = 1920;
pub const DEFAULT_SCREENSHOT_HEIGHT: u32 = 1080;

/// Client for every Abstract API service
#[derive(Debug, Clone)]
pub struct AbstractClient {
    http: HttpClient,
    credentials: Arc<Credentials>,
    base_url: Option<String>,
    timeout: Duration,
    long_timeout: Duration,
    diagnostics: Arc<dyn Diagnostics>,
}

impl AbstractClient {
    /// Create a client with the given keys and HTTP settings
    pub fn new(credentials: Credentials, http: &HttpConfig) -> Result<Self, ApiError> {
        let base_url = match http.base_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                url::Url::parse(raw)
                    .map_err(|e| ApiError::Config(format!("Invalid base URL '{}': {}", raw, e)))?;
                Some(raw.trim_end_matches('/').to_string())
            }
            _ => None,
        };

        let client = HttpClient::from_config(http)
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http: client,
            credentials: Arc::new(credentials),
            base_url,
            timeout: http.timeout(),
            long_timeout: http.long_timeout(),
            diagnostics: Arc::new(TracingDiagnostics),
        })
    }

    /// Create a client from the full application configuration
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(Credentials::from_api_keys(&config.api_keys), &config.http)
    }

    /// Replace the diagnostics sink
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The key table this client was built with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Full URL for a path on a service
    pub fn endpoint_url(&self, service: ServiceKey, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}{}", base, service.id(), path),
            None => format!("https://{}{}", service.host(), path),
        }
    }

    // ========== VALIDATION ==========

    /// Validate an email address and check deliverability
    pub async fn validate_email(&self, email: &str) -> Result<EmailValidation, ApiError> {
        let request =
            ApiRequest::new("validate_email", ServiceKey::Email, "/v1/").param("email", email);
        self.fetch(request).await
    }

    /// Validate a phone number; `country_code` is an ISO 3166-1 alpha-2 hint
    pub async fn validate_phone(
        &self,
        phone: &str,
        country_code: Option<&str>,
    ) -> Result<PhoneValidation, ApiError> {
        let request = ApiRequest::new("validate_phone", ServiceKey::Phone, "/v1/")
            .param("phone", phone)
            .optional("country_code", country_code);
        self.fetch(request).await
    }

    /// Validate an EU VAT number, e.g. `SE556656688001`
    pub async fn validate_vat(&self, vat_number: &str) -> Result<VatValidation, ApiError> {
        let request = ApiRequest::new("validate_vat", ServiceKey::Vat, "/v1/")
            .param("vat_number", vat_number);
        self.fetch(request).await
    }

    // ========== IP ==========

    /// Geolocate an address. Without `ip_address` the upstream uses the caller's IP.
    /// `fields` is a comma-separated filter on the returned sections.
    pub async fn geolocate_ip(
        &self,
        ip_address: Option<&str>,
        fields: Option<&str>,
    ) -> Result<IpGeolocation, ApiError> {
        self.ip_lookup("geolocate_ip", ip_address, fields).await
    }

    /// Full IP record, including ISP and ASN details
    pub async fn get_ip_info(&self, ip_address: Option<&str>) -> Result<IpGeolocation, ApiError> {
        self.ip_lookup("get_ip_info", ip_address, None).await
    }

    /// IP geolocation with VPN/proxy/tor/hosting analysis
    pub async fn geolocate_ip_security(
        &self,
        ip_address: Option<&str>,
    ) -> Result<IpGeolocation, ApiError> {
        self.ip_lookup("geolocate_ip_security", ip_address, Some("security"))
            .await
    }

    async fn ip_lookup(
        &self,
        operation: &'static str,
        ip_address: Option<&str>,
        fields: Option<&str>,
    ) -> Result<IpGeolocation, ApiError> {
        let request = ApiRequest::new(operation, ServiceKey::Ip, "/v1/")
            .optional("ip_address", ip_address)
            .optional("fields", fields);
        self.fetch(request).await
    }

    // ========== TIME ==========

    /// Current time at a location or coordinate pair
    pub async fn get_timezone(&self, query: &TimezoneQuery) -> Result<CurrentTime, ApiError> {
        let request = ApiRequest::new("get_timezone", ServiceKey::Timezone, "/v1/current_time/");
        let request = match query {
            TimezoneQuery::Location(location) => {
                if location.trim().is_empty() {
                    return Err(ApiError::InvalidRequest(
                        "location must not be empty".to_string(),
                    ));
                }
                request.param("location", location)
            }
            TimezoneQuery::Coordinates {
                latitude,
                longitude,
            } => request
                .param("latitude", latitude)
                .param("longitude", longitude),
        };
        self.fetch(request).await
    }

    /// Convert a datetime (`YYYY-MM-DD HH:MM:SS`) from one location's timezone to another's
    pub async fn convert_timezone(
        &self,
        base_location: &str,
        base_datetime: &str,
        target_location: &str,
    ) -> Result<TimezoneConversion, ApiError> {
        let request =
            ApiRequest::new("convert_timezone", ServiceKey::Timezone, "/v1/convert_time/")
                .param("base_location", base_location)
                .param("base_datetime", base_datetime)
                .param("target_location", target_location);
        self.fetch(request).await
    }

    /// Public holidays for a country and year, optionally narrowed to a month and day
    pub async fn get_holidays(
        &self,
        country: &str,
        year: i32,
        month: Option<u32>,
        day: Option<u32>,
    ) -> Result<Holidays, ApiError> {
        let request = ApiRequest::new("get_holidays", ServiceKey::Holidays, "/v1/")
            .param("country", country)
            .param("year", year)
            .optional("month", month)
            .optional("day", day);
        self.fetch(request).await
    }

    // ========== CURRENCY ==========

    /// Live exchange rates for `base`, all targets unless one is given
    pub async fn get_exchange_rates(
        &self,
        base: &str,
        target: Option<&str>,
    ) -> Result<ExchangeRates, ApiError> {
        let request = ApiRequest::new("get_exchange_rates", ServiceKey::Exchange, "/v1/live/")
            .param("base", base)
            .optional("target", target);
        self.fetch(request).await
    }

    /// Convert `amount` from `base` to `target`, at historical rates when `date`
    /// (`YYYY-MM-DD`) is given
    pub async fn convert_currency(
        &self,
        base: &str,
        target: &str,
        amount: f64,
        date: Option<&str>,
    ) -> Result<CurrencyConversion, ApiError> {
        let historical = date.is_some_and(|d| !d.trim().is_empty());
        let path = if historical {
            "/v1/historical/"
        } else {
            "/v1/live/"
        };

        let request = ApiRequest::new("convert_currency", ServiceKey::Exchange, path)
            .param("base", base)
            .param("target", target)
            .optional("date", date);

        let conversion: CurrencyConversion = self.fetch(request).await?;
        Ok(conversion.apply_amount(target, amount))
    }

    // ========== WEB ==========

    /// Company details for a domain, e.g. `google.com`
    pub async fn get_company_info(&self, domain: &str) -> Result<CompanyInfo, ApiError> {
        let request = ApiRequest::new("get_company_info", ServiceKey::Company, "/v1/")
            .param("domain", domain);
        self.fetch(request).await
    }

    /// Scrape a page, optionally rendering JavaScript first
    pub async fn scrape_url(&self, url: &str, render_js: bool) -> Result<ScrapeResult, ApiError> {
        let request = ApiRequest::new("scrape_url", ServiceKey::Scrape, "/v1/")
            .param("url", url)
            .param("render_js", render_js)
            .long_running();

        let (status, payload) = self.send(&request).await?;
        match payload {
            Payload::Text(html) => Ok(ScrapeResult::from_html(url, html)),
            other => decode(&request, status, other.with_url(url)),
        }
    }

    /// Capture a screenshot of a page
    pub async fn generate_screenshot(
        &self,
        url: &str,
        width: u32,
        height: u32,
        full_page: bool,
    ) -> Result<Screenshot, ApiError> {
        let request = ApiRequest::new("generate_screenshot", ServiceKey::Screenshot, "/v1/")
            .param("url", url)
            .param("width", width)
            .param("height", height)
            .param("full_page", full_page)
            .long_running();

        let (status, payload) = self.send(&request).await?;
        match payload {
            Payload::Binary {
                bytes,
                content_type,
            } => Ok(Screenshot {
                success: Some(true),
                url: url.to_string(),
                image_data: Some(base64::engine::general_purpose::STANDARD.encode(&bytes)),
                content_type: Some(content_type),
                note: Some(format!("{} bytes, base64-encoded", bytes.len())),
            }),
            other => decode(&request, status, other.with_url(url)),
        }
    }

    // ========== TRANSPORT ==========

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let (status, payload) = self.send(&request).await?;
        decode(&request, status, payload)
    }

    /// Resolve the key, send the request and classify the response
    async fn send(&self, request: &ApiRequest) -> Result<(u16, Payload), ApiError> {
        let started = Instant::now();

        let key = match self.credentials.get(request.service) {
            Some(key) => key,
            None => {
                let err = ApiError::MissingCredential {
                    service: request.service,
                };
                self.diagnostics
                    .request_failed(request, &err, started.elapsed());
                return Err(err);
            }
        };

        self.diagnostics.request_started(request);
        let result = self.execute(request, key).await;

        match &result {
            Ok((status, _)) => {
                self.diagnostics
                    .request_succeeded(request, *status, started.elapsed())
            }
            Err(err) => self
                .diagnostics
                .request_failed(request, err, started.elapsed()),
        }

        result
    }

    async fn execute(&self, request: &ApiRequest, key: &str) -> Result<(u16, Payload), ApiError> {
        let timeout = if request.long_running {
            self.long_timeout
        } else {
            self.timeout
        };
        let url = self.endpoint_url(request.service, request.path);

        let response = self
            .http
            .client()
            .get(&url)
            .query(&[(API_KEY_PARAM, key)])
            .query(&request.params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ApiError::transport(e, timeout))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(e, timeout))?;
        let payload = Payload::classify(&content_type, bytes.to_vec());

        if !status.is_success() {
            return Err(upstream_error(status, payload));
        }

        Ok((status.as_u16(), payload))
    }
}

impl TimezoneQuery {
    /// Pick a location when one is given, otherwise a complete coordinate pair
    pub fn from_parts(
        location: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Self, ApiError> {
        match (location, latitude, longitude) {
            (Some(location), _, _) if !location.trim().is_empty() => {
                Ok(TimezoneQuery::Location(location.to_string()))
            }
            (_, Some(latitude), Some(longitude)) => Ok(TimezoneQuery::Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(ApiError::InvalidRequest(
                "Either location or latitude/longitude must be provided".to_string(),
            )),
        }
    }
}

fn upstream_error(status: reqwest::StatusCode, payload: Payload) -> ApiError {
    match payload {
        Payload::Json(body) => ApiError::from_error_body(status.as_u16(), body),
        other => ApiError::Upstream {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
            details: other.into_json(),
        },
    }
}

fn decode<T: DeserializeOwned>(
    request: &ApiRequest,
    status: u16,
    payload: Payload,
) -> Result<T, ApiError> {
    let body = payload.into_json().ok_or_else(|| ApiError::Decode {
        service: request.service,
        status,
        message: "unexpected binary response".to_string(),
        details: None,
    })?;

    serde_json::from_value::<T>(body.clone()).map_err(|e| ApiError::Decode {
        service: request.service,
        status,
        message: e.to_string(),
        details: Some(body),
    })
}
