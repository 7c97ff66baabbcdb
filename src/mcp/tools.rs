//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::client::{AbstractClient, ApiError, DEFAULT_SCREENSHOT_HEIGHT, DEFAULT_SCREENSHOT_WIDTH};

use super::handlers::{
    ConvertCurrencyHandler, ConvertTimezoneHandler, GenerateScreenshotHandler,
    GeolocateIpHandler, GeolocateIpSecurityHandler, GetCompanyInfoHandler,
    GetExchangeRatesHandler, GetHolidaysHandler, GetIpInfoHandler, GetTimezoneHandler,
    ScrapeUrlHandler, ValidateEmailHandler, ValidatePhoneHandler, ValidateVatHandler,
};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "validate_email")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Errors a tool call can end with
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Missing or malformed arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The client call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ToolError {
    /// Whether the caller sent something unusable, as opposed to a failed call
    pub fn is_invalid_params(&self) -> bool {
        match self {
            ToolError::InvalidArguments(_) => true,
            ToolError::Api(err) => err.class() == crate::client::ErrorClass::InvalidRequest,
            ToolError::Serialize(_) => false,
        }
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry with one tool per client operation
    pub fn new(client: AbstractClient) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };
        registry.register_validation_tools(&client);
        registry.register_ip_tools(&client);
        registry.register_time_tools(&client);
        registry.register_currency_tools(&client);
        registry.register_web_tools(&client);
        registry
    }

    fn register_validation_tools(&mut self, client: &AbstractClient) {
        self.register(Tool {
            name: "validate_email".to_string(),
            description: "Validate email address and check deliverability. Checks format, domain validity, MX records, SMTP validation, and detects disposable/role-based emails.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "email": {
                        "type": "string",
                        "description": "Email address to validate"
                    }
                },
                "required": ["email"]
            }),
            handler: Arc::new(ValidateEmailHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "validate_phone".to_string(),
            description: "Validate phone number and get carrier info. Identifies carrier, phone type (mobile/landline) and location.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "phone": {
                        "type": "string",
                        "description": "Phone number to validate"
                    },
                    "country_code": {
                        "type": "string",
                        "description": "ISO 3166-1 alpha-2 country code (optional)"
                    }
                },
                "required": ["phone"]
            }),
            handler: Arc::new(ValidatePhoneHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "validate_vat".to_string(),
            description: "Validate EU VAT numbers and return the registered company.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "vat_number": {
                        "type": "string",
                        "description": "VAT number to validate (e.g., 'SE556656688001')"
                    }
                },
                "required": ["vat_number"]
            }),
            handler: Arc::new(ValidateVatHandler {
                client: client.clone(),
            }),
        });
    }

    fn register_ip_tools(&mut self, client: &AbstractClient) {
        let ip_property = json!({
            "type": "string",
            "description": "IP address to query. Defaults to the caller's IP when omitted."
        });

        self.register(Tool {
            name: "geolocate_ip".to_string(),
            description: "Get location data from an IP address: city, region, country, coordinates, timezone, currency and ISP.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ip_address": ip_property.clone(),
                    "fields": {
                        "type": "string",
                        "description": "Comma-separated fields to return (e.g., 'city,country,timezone')"
                    }
                }
            }),
            handler: Arc::new(GeolocateIpHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "get_ip_info".to_string(),
            description: "Get detailed IP information: ISP, autonomous system number, connection type and network details.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ip_address": ip_property.clone()
                }
            }),
            handler: Arc::new(GetIpInfoHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "geolocate_ip_security".to_string(),
            description: "Get IP geolocation with security analysis: detects VPNs, proxies, tor exit nodes and datacenter addresses.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ip_address": ip_property
                }
            }),
            handler: Arc::new(GeolocateIpSecurityHandler {
                client: client.clone(),
            }),
        });
    }

    fn register_time_tools(&mut self, client: &AbstractClient) {
        self.register(Tool {
            name: "get_timezone".to_string(),
            description: "Get current time and timezone for a location or coordinate pair. Either location OR latitude/longitude must be provided.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Location name (e.g., 'New York')"
                    },
                    "latitude": {
                        "type": "number",
                        "description": "Latitude coordinate"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "Longitude coordinate"
                    }
                }
            }),
            handler: Arc::new(GetTimezoneHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "convert_timezone".to_string(),
            description: "Convert a datetime from one location's timezone to another, handling daylight saving time.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base_location": {
                        "type": "string",
                        "description": "Source location/timezone"
                    },
                    "base_datetime": {
                        "type": "string",
                        "description": "Datetime to convert (e.g., '2025-01-01 10:00:00')"
                    },
                    "target_location": {
                        "type": "string",
                        "description": "Target location/timezone"
                    }
                },
                "required": ["base_location", "base_datetime", "target_location"]
            }),
            handler: Arc::new(ConvertTimezoneHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "get_holidays".to_string(),
            description: "Get public holidays for a country and year, optionally filtered by month and day.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "country": {
                        "type": "string",
                        "description": "ISO 3166-1 alpha-2 country code (e.g., 'US')"
                    },
                    "year": {
                        "type": "integer",
                        "description": "Year (e.g., 2025)"
                    },
                    "month": {
                        "type": "integer",
                        "description": "Month (1-12, optional)",
                        "minimum": 1,
                        "maximum": 12
                    },
                    "day": {
                        "type": "integer",
                        "description": "Day (1-31, optional)",
                        "minimum": 1,
                        "maximum": 31
                    }
                },
                "required": ["country", "year"]
            }),
            handler: Arc::new(GetHolidaysHandler {
                client: client.clone(),
            }),
        });
    }

    fn register_currency_tools(&mut self, client: &AbstractClient) {
        self.register(Tool {
            name: "get_exchange_rates".to_string(),
            description: "Get live exchange rates for a base currency. Returns every rate unless a target is given.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base": {
                        "type": "string",
                        "description": "Base currency code",
                        "default": "USD"
                    },
                    "target": {
                        "type": "string",
                        "description": "Target currency code (optional, returns all if not specified)"
                    }
                }
            }),
            handler: Arc::new(GetExchangeRatesHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "convert_currency".to_string(),
            description: "Convert an amount between currencies using live or historical rates.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base": {
                        "type": "string",
                        "description": "Base currency code (e.g., 'USD')"
                    },
                    "target": {
                        "type": "string",
                        "description": "Target currency code (e.g., 'EUR')"
                    },
                    "amount": {
                        "type": "number",
                        "description": "Amount to convert"
                    },
                    "date": {
                        "type": "string",
                        "description": "Historical date in YYYY-MM-DD format (optional)"
                    }
                },
                "required": ["base", "target", "amount"]
            }),
            handler: Arc::new(ConvertCurrencyHandler {
                client: client.clone(),
            }),
        });
    }

    fn register_web_tools(&mut self, client: &AbstractClient) {
        self.register(Tool {
            name: "get_company_info".to_string(),
            description: "Get company data from a domain name: name, industry, employee count, founding year and social profiles.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "domain": {
                        "type": "string",
                        "description": "Company domain (e.g., 'google.com')"
                    }
                },
                "required": ["domain"]
            }),
            handler: Arc::new(GetCompanyInfoHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "scrape_url".to_string(),
            description: "Extract content from a web page, optionally rendering JavaScript for dynamic sites.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL to scrape"
                    },
                    "render_js": {
                        "type": "boolean",
                        "description": "Render JavaScript before extracting",
                        "default": false
                    }
                },
                "required": ["url"]
            }),
            handler: Arc::new(ScrapeUrlHandler {
                client: client.clone(),
            }),
        });

        self.register(Tool {
            name: "generate_screenshot".to_string(),
            description: "Capture a screenshot of a website, viewport only or the full page.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL to capture"
                    },
                    "width": {
                        "type": "integer",
                        "description": "Screenshot width in pixels",
                        "default": DEFAULT_SCREENSHOT_WIDTH
                    },
                    "height": {
                        "type": "integer",
                        "description": "Screenshot height in pixels",
                        "default": DEFAULT_SCREENSHOT_HEIGHT
                    },
                    "full_page": {
                        "type": "boolean",
                        "description": "Capture the full page",
                        "default": false
                    }
                },
                "required": ["url"]
            }),
            handler: Arc::new(GenerateScreenshotHandler {
                client: client.clone(),
            }),
        });
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::InvalidArguments(format!("Tool '{}' not found", name)))?;

        tool.handler.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Credentials, ServiceKey};
    use crate::config::HttpConfig;

    fn registry() -> ToolRegistry {
        let client = AbstractClient::new(Credentials::new(), &HttpConfig::default()).unwrap();
        ToolRegistry::new(client)
    }

    #[test]
    fn test_all_tools_registered() {
        let registry = registry();
        assert_eq!(
            registry.names(),
            vec![
                "convert_currency",
                "convert_timezone",
                "generate_screenshot",
                "geolocate_ip",
                "geolocate_ip_security",
                "get_company_info",
                "get_exchange_rates",
                "get_holidays",
                "get_ip_info",
                "get_timezone",
                "scrape_url",
                "validate_email",
                "validate_phone",
                "validate_vat",
            ]
        );
    }

    #[test]
    fn test_schemas_are_objects() {
        for tool in registry().all() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry()
            .execute("send_fax", json!({}))
            .await
            .unwrap_err();
        assert!(err.is_invalid_params());
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let err = registry()
            .execute("validate_email", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_missing_key_surfaces_as_api_error() {
        let err = registry()
            .execute("validate_email", json!({"email": "test@example.com"}))
            .await
            .unwrap_err();
        match err {
            ToolError::Api(api) => assert!(matches!(
                api,
                ApiError::MissingCredential {
                    service: ServiceKey::Email
                }
            )),
            other => panic!("unexpected error: {other}"),
        }
    }
}
