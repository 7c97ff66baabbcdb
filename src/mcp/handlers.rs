//! Tool handlers, one per client operation.
//!
//! Handlers pull their arguments out of the raw JSON object, call the client
//! and serialize the typed result back to JSON.

use serde::Serialize;
use serde_json::Value;

use crate::client::{
    AbstractClient, ApiError, DEFAULT_SCREENSHOT_HEIGHT, DEFAULT_SCREENSHOT_WIDTH,
};
use crate::models::TimezoneQuery;

use super::tools::{ToolError, ToolHandler};

/// Blank values count as missing; anything else is forwarded untouched
fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name).and_then(|v| v.as_str()) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ToolError::InvalidArguments(format!(
            "Missing '{}' parameter",
            name
        ))),
    }
}

fn optional_str<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

fn optional_f64(args: &Value, name: &str) -> Result<Option<f64>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidArguments(format!("'{}' must be a number", name))),
    }
}

fn optional_u32(args: &Value, name: &str) -> Result<Option<u32>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                ToolError::InvalidArguments(format!("'{}' must be a positive integer", name))
            }),
    }
}

fn optional_bool(args: &Value, name: &str) -> Result<Option<bool>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidArguments(format!("'{}' must be a boolean", name))),
    }
}

fn in_range(
    value: Option<u32>,
    name: &str,
    range: std::ops::RangeInclusive<u32>,
) -> Result<Option<u32>, ToolError> {
    match value {
        Some(v) if !range.contains(&v) => Err(ToolError::InvalidArguments(format!(
            "'{}' must be between {} and {}",
            name,
            range.start(),
            range.end()
        ))),
        other => Ok(other),
    }
}

/// Serialize a successful result, or log the failure and pass it on
fn respond<T: Serialize>(label: &str, result: Result<T, ApiError>) -> Result<Value, ToolError> {
    match result {
        Ok(value) => Ok(serde_json::to_value(value)?),
        Err(e) => {
            tracing::error!(status = e.status(), "{} error: {}", label, e.message());
            Err(e.into())
        }
    }
}

// ========== VALIDATION ==========

#[derive(Debug)]
pub(crate) struct ValidateEmailHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for ValidateEmailHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let email = required_str(&args, "email")?;
        respond("Email validation", self.client.validate_email(email).await)
    }
}

#[derive(Debug)]
pub(crate) struct ValidatePhoneHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for ValidatePhoneHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let phone = required_str(&args, "phone")?;
        let country_code = optional_str(&args, "country_code");
        respond(
            "Phone validation",
            self.client.validate_phone(phone, country_code).await,
        )
    }
}

#[derive(Debug)]
pub(crate) struct ValidateVatHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for ValidateVatHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let vat_number = required_str(&args, "vat_number")?;
        respond("VAT validation", self.client.validate_vat(vat_number).await)
    }
}

// ========== IP ==========

#[derive(Debug)]
pub(crate) struct GeolocateIpHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GeolocateIpHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let ip_address = optional_str(&args, "ip_address");
        let fields = optional_str(&args, "fields");
        respond(
            "IP geolocation",
            self.client.geolocate_ip(ip_address, fields).await,
        )
    }
}

#[derive(Debug)]
pub(crate) struct GetIpInfoHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GetIpInfoHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let ip_address = optional_str(&args, "ip_address");
        respond("IP info", self.client.get_ip_info(ip_address).await)
    }
}

#[derive(Debug)]
pub(crate) struct GeolocateIpSecurityHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GeolocateIpSecurityHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let ip_address = optional_str(&args, "ip_address");
        respond(
            "IP security",
            self.client.geolocate_ip_security(ip_address).await,
        )
    }
}

// ========== TIME ==========

#[derive(Debug)]
pub(crate) struct GetTimezoneHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GetTimezoneHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let query = TimezoneQuery::from_parts(
            optional_str(&args, "location"),
            optional_f64(&args, "latitude")?,
            optional_f64(&args, "longitude")?,
        )?;
        respond("Timezone", self.client.get_timezone(&query).await)
    }
}

#[derive(Debug)]
pub(crate) struct ConvertTimezoneHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for ConvertTimezoneHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let base_location = required_str(&args, "base_location")?;
        let base_datetime = required_str(&args, "base_datetime")?;
        let target_location = required_str(&args, "target_location")?;
        respond(
            "Timezone conversion",
            self.client
                .convert_timezone(base_location, base_datetime, target_location)
                .await,
        )
    }
}

#[derive(Debug)]
pub(crate) struct GetHolidaysHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GetHolidaysHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let country = required_str(&args, "country")?;
        let year = args
            .get("year")
            .and_then(|v| v.as_i64())
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'year' parameter".to_string()))?;
        let month = in_range(optional_u32(&args, "month")?, "month", 1..=12)?;
        let day = in_range(optional_u32(&args, "day")?, "day", 1..=31)?;

        respond(
            "Holidays",
            self.client.get_holidays(country, year, month, day).await,
        )
    }
}

// ========== CURRENCY ==========

#[derive(Debug)]
pub(crate) struct GetExchangeRatesHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GetExchangeRatesHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let base = optional_str(&args, "base").unwrap_or("USD");
        let target = optional_str(&args, "target");
        respond(
            "Exchange rates",
            self.client.get_exchange_rates(base, target).await,
        )
    }
}

#[derive(Debug)]
pub(crate) struct ConvertCurrencyHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for ConvertCurrencyHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let base = required_str(&args, "base")?;
        let target = required_str(&args, "target")?;
        let amount = optional_f64(&args, "amount")?
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'amount' parameter".to_string()))?;
        let date = optional_str(&args, "date");

        respond(
            "Currency conversion",
            self.client.convert_currency(base, target, amount, date).await,
        )
    }
}

// ========== WEB ==========

#[derive(Debug)]
pub(crate) struct GetCompanyInfoHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GetCompanyInfoHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let domain = required_str(&args, "domain")?;
        respond("Company enrichment", self.client.get_company_info(domain).await)
    }
}

#[derive(Debug)]
pub(crate) struct ScrapeUrlHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for ScrapeUrlHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let url = required_str(&args, "url")?;
        let render_js = optional_bool(&args, "render_js")?.unwrap_or(false);
        respond("Web scraping", self.client.scrape_url(url, render_js).await)
    }
}

#[derive(Debug)]
pub(crate) struct GenerateScreenshotHandler {
    pub client: AbstractClient,
}

#[async_trait::async_trait]
impl ToolHandler for GenerateScreenshotHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let url = required_str(&args, "url")?;
        let width = optional_u32(&args, "width")?.unwrap_or(DEFAULT_SCREENSHOT_WIDTH);
        let height = optional_u32(&args, "height")?.unwrap_or(DEFAULT_SCREENSHOT_HEIGHT);
        let full_page = optional_bool(&args, "full_page")?.unwrap_or(false);

        if width == 0 || height == 0 {
            return Err(ToolError::InvalidArguments(
                "'width' and 'height' must be greater than zero".to_string(),
            ));
        }

        respond(
            "Screenshot",
            self.client
                .generate_screenshot(url, width, height, full_page)
                .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str() {
        let args = json!({"email": "  a@b.co ", "blank": "   ", "number": 3});
        assert_eq!(required_str(&args, "email").unwrap(), "  a@b.co ");
        assert!(required_str(&args, "blank").is_err());
        assert!(required_str(&args, "number").is_err());
        assert!(required_str(&args, "missing").is_err());
    }

    #[test]
    fn test_optional_str_keeps_value() {
        let args = json!({"country_code": " us", "fields": ""});
        assert_eq!(optional_str(&args, "country_code"), Some(" us"));
        assert_eq!(optional_str(&args, "fields"), None);
    }

    #[test]
    fn test_optional_numbers() {
        let args = json!({"lat": 40.7, "month": 3, "neg": -1, "text": "x", "none": null});
        assert_eq!(optional_f64(&args, "lat").unwrap(), Some(40.7));
        assert_eq!(optional_f64(&args, "none").unwrap(), None);
        assert!(optional_f64(&args, "text").is_err());
        assert_eq!(optional_u32(&args, "month").unwrap(), Some(3));
        assert!(optional_u32(&args, "neg").is_err());
        assert_eq!(optional_u32(&args, "absent").unwrap(), None);
    }

    #[test]
    fn test_in_range() {
        assert_eq!(in_range(Some(12), "month", 1..=12).unwrap(), Some(12));
        assert_eq!(in_range(None, "month", 1..=12).unwrap(), None);
        assert!(in_range(Some(13), "month", 1..=12).is_err());
        assert!(in_range(Some(0), "day", 1..=31).is_err());
    }

    #[test]
    fn test_optional_bool() {
        let args = json!({"render_js": true, "full_page": "yes"});
        assert_eq!(optional_bool(&args, "render_js").unwrap(), Some(true));
        assert!(optional_bool(&args, "full_page").is_err());
    }
}
