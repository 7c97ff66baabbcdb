//! Upstream services and their credentials.

use serde::{Deserialize, Serialize};

use crate::config::ApiKeys;

const SERVICE_COUNT: usize = 10;

/// One of the independently keyed Abstract API products.
///
/// Abstract API issues a separate key for every product, so each variant carries
/// its own credential, environment variable and upstream host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKey {
    Email,
    Phone,
    Vat,
    Ip,
    Timezone,
    Holidays,
    Exchange,
    Company,
    Scrape,
    Screenshot,
}

impl ServiceKey {
    /// Every service, in declaration order.
    pub const ALL: [ServiceKey; SERVICE_COUNT] = [
        ServiceKey::Email,
        ServiceKey::Phone,
        ServiceKey::Vat,
        ServiceKey::Ip,
        ServiceKey::Timezone,
        ServiceKey::Holidays,
        ServiceKey::Exchange,
        ServiceKey::Company,
        ServiceKey::Scrape,
        ServiceKey::Screenshot,
    ];

    /// Short identifier, also used as the path prefix when a base URL override is set
    pub fn id(&self) -> &'static str {
        match self {
            ServiceKey::Email => "email",
            ServiceKey::Phone => "phone",
            ServiceKey::Vat => "vat",
            ServiceKey::Ip => "ip",
            ServiceKey::Timezone => "timezone",
            ServiceKey::Holidays => "holidays",
            ServiceKey::Exchange => "exchange",
            ServiceKey::Company => "company",
            ServiceKey::Scrape => "scrape",
            ServiceKey::Screenshot => "screenshot",
        }
    }

    /// Human-readable product name
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKey::Email => "Email Validation",
            ServiceKey::Phone => "Phone Validation",
            ServiceKey::Vat => "VAT Validation",
            ServiceKey::Ip => "IP Geolocation",
            ServiceKey::Timezone => "Timezone",
            ServiceKey::Holidays => "Public Holidays",
            ServiceKey::Exchange => "Exchange Rates",
            ServiceKey::Company => "Company Enrichment",
            ServiceKey::Scrape => "Web Scraping",
            ServiceKey::Screenshot => "Website Screenshot",
        }
    }

    /// Environment variable holding this service's key
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceKey::Email => "ABSTRACT_EMAIL_API_KEY",
            ServiceKey::Phone => "ABSTRACT_PHONE_API_KEY",
            ServiceKey::Vat => "ABSTRACT_VAT_API_KEY",
            ServiceKey::Ip => "ABSTRACT_IP_API_KEY",
            ServiceKey::Timezone => "ABSTRACT_TIMEZONE_API_KEY",
            ServiceKey::Holidays => "ABSTRACT_HOLIDAYS_API_KEY",
            ServiceKey::Exchange => "ABSTRACT_EXCHANGE_API_KEY",
            ServiceKey::Company => "ABSTRACT_COMPANY_API_KEY",
            ServiceKey::Scrape => "ABSTRACT_SCRAPE_API_KEY",
            ServiceKey::Screenshot => "ABSTRACT_SCREENSHOT_API_KEY",
        }
    }

    /// Production host of this service
    pub fn host(&self) -> &'static str {
        match self {
            ServiceKey::Email => "emailvalidation.abstractapi.com",
            ServiceKey::Phone => "phonevalidation.abstractapi.com",
            ServiceKey::Vat => "vatapi.abstractapi.com",
            ServiceKey::Ip => "ipgeolocation.abstractapi.com",
            ServiceKey::Timezone => "timezone.abstractapi.com",
            ServiceKey::Holidays => "holidays.abstractapi.com",
            ServiceKey::Exchange => "exchange-rates.abstractapi.com",
            ServiceKey::Company => "companyenrichment.abstractapi.com",
            ServiceKey::Scrape => "scrape.abstractapi.com",
            ServiceKey::Screenshot => "screenshot.abstractapi.com",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for ServiceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKey::ALL
            .iter()
            .copied()
            .find(|service| service.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown service '{}'", s))
    }
}

/// Read-only table of per-service API keys.
///
/// Built once at startup and never mutated afterwards. Blank keys are stored as
/// absent so they fail the same way a missing key does.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    keys: [Option<String>; SERVICE_COUNT],
}

impl Credentials {
    /// An empty table with no service configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly useful in tests
    pub fn with(mut self, service: ServiceKey, key: impl Into<String>) -> Self {
        let key = key.into();
        let trimmed = key.trim();
        self.keys[service.index()] = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Build from the configured API keys
    pub fn from_api_keys(keys: &ApiKeys) -> Self {
        ServiceKey::ALL
            .iter()
            .fold(Self::new(), |creds, &service| match keys.get(service) {
                Some(key) => creds.with(service, key),
                None => creds,
            })
    }

    /// Key for a service, if one is configured
    pub fn get(&self, service: ServiceKey) -> Option<&str> {
        self.keys[service.index()].as_deref()
    }

    pub fn is_configured(&self, service: ServiceKey) -> bool {
        self.get(service).is_some()
    }

    /// Services that have a key
    pub fn configured(&self) -> Vec<ServiceKey> {
        ServiceKey::ALL
            .iter()
            .copied()
            .filter(|s| self.is_configured(*s))
            .collect()
    }
}

// Keys must never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("configured", &self.configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_ids_are_unique() {
        let mut ids: Vec<&str> = ServiceKey::ALL.iter().map(|s| s.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), ServiceKey::ALL.len());
    }

    #[test]
    fn test_service_from_str() {
        assert_eq!("email".parse::<ServiceKey>().unwrap(), ServiceKey::Email);
        assert_eq!("IP".parse::<ServiceKey>().unwrap(), ServiceKey::Ip);
        assert!("fax".parse::<ServiceKey>().is_err());
    }

    #[test]
    fn test_credentials_are_independent() {
        let creds = Credentials::new().with(ServiceKey::Ip, "KEY1");
        assert_eq!(creds.get(ServiceKey::Ip), Some("KEY1"));
        for service in ServiceKey::ALL.iter().filter(|s| **s != ServiceKey::Ip) {
            assert!(creds.get(*service).is_none());
        }
    }

    #[test]
    fn test_blank_key_is_absent() {
        let creds = Credentials::new()
            .with(ServiceKey::Email, "")
            .with(ServiceKey::Phone, "   ");
        assert!(!creds.is_configured(ServiceKey::Email));
        assert!(!creds.is_configured(ServiceKey::Phone));
    }

    #[test]
    fn test_from_api_keys() {
        let keys = ApiKeys {
            email: Some("e".to_string()),
            exchange: Some("x".to_string()),
            ..ApiKeys::empty()
        };
        let creds = Credentials::from_api_keys(&keys);
        assert_eq!(
            creds.configured(),
            vec![ServiceKey::Email, ServiceKey::Exchange]
        );
    }

    #[test]
    fn test_debug_hides_keys() {
        let creds = Credentials::new().with(ServiceKey::Vat, "super-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("Vat"));
    }
}
