//! IP geolocation, timezone and public holiday results.

use serde::{Deserialize, Serialize};

/// Threat analysis, only present when `fields=security` was requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpSecurity {
    #[serde(default)]
    pub is_vpn: Option<bool>,
    #[serde(default)]
    pub is_proxy: Option<bool>,
    #[serde(default)]
    pub is_tor: Option<bool>,
    #[serde(default)]
    pub is_hosting: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpTimezone {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub gmt_offset: Option<f64>,
    #[serde(default)]
    pub current_time: Option<String>,
    #[serde(default)]
    pub is_dst: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpFlag {
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub unicode: Option<String>,
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpCurrency {
    #[serde(default)]
    pub currency_name: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// Network the address belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpConnection {
    #[serde(default)]
    pub autonomous_system_number: Option<u64>,
    #[serde(default)]
    pub autonomous_system_organization: Option<String>,
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub isp_name: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
}

/// Result of the IP geolocation endpoint.
///
/// Shared by plain geolocation, IP info and the security-enabled lookup; the
/// sections the request did not ask for are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpGeolocation {
    /// Queried address (some responses call it `ip`). Absent when a `fields`
    /// filter leaves it out.
    #[serde(default, alias = "ip")]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub city_geoname_id: Option<u64>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_iso_code: Option<String>,
    #[serde(default)]
    pub region_geoname_id: Option<u64>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_geoname_id: Option<u64>,
    #[serde(default)]
    pub country_is_eu: Option<bool>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub continent_code: Option<String>,
    #[serde(default)]
    pub continent_geoname_id: Option<u64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub security: Option<IpSecurity>,
    #[serde(default)]
    pub timezone: Option<IpTimezone>,
    #[serde(default)]
    pub flag: Option<IpFlag>,
    #[serde(default)]
    pub currency: Option<IpCurrency>,
    #[serde(default)]
    pub connection: Option<IpConnection>,
}

/// Where a timezone lookup points at
#[derive(Debug, Clone, PartialEq)]
pub enum TimezoneQuery {
    /// Free-form place name, e.g. "Oxford, United Kingdom"
    Location(String),
    Coordinates { latitude: f64, longitude: f64 },
}

/// Current time at a location.
///
/// Returned by the current-time endpoint and used for both sides of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTime {
    #[serde(default)]
    pub requested_location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub datetime: Option<String>,
    /// IANA name, e.g. `America/New_York`
    #[serde(default)]
    pub timezone_name: Option<String>,
    #[serde(default)]
    pub timezone_location: Option<String>,
    #[serde(default)]
    pub timezone_abbreviation: Option<String>,
    /// Offset from GMT in hours (fractional for zones like Asia/Kolkata)
    #[serde(default)]
    pub gmt_offset: Option<f64>,
    #[serde(default)]
    pub is_dst: Option<bool>,
}

/// Result of the time conversion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneConversion {
    #[serde(default)]
    pub base_location: Option<CurrentTime>,
    #[serde(default)]
    pub target_location: Option<CurrentTime>,
}

/// A single public holiday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub name: String,

    #[serde(default)]
    pub name_local: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub location: Option<String>,

    /// National, Local, Religious, ...
    #[serde(default, rename = "type")]
    pub holiday_type: Option<String>,

    /// `MM/DD/YYYY`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_year: Option<String>,
    #[serde(default)]
    pub date_month: Option<String>,
    #[serde(default)]
    pub date_day: Option<String>,
    #[serde(default)]
    pub week_day: Option<String>,
}

/// Holidays matching a query.
///
/// The endpoint answers with a bare array; a `{"holidays": [...]}` object is
/// accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Holidays {
    pub holidays: Vec<Holiday>,
}

impl<'de> Deserialize<'de> for Holidays {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Body {
            List(Vec<Holiday>),
            Wrapped {
                #[serde(default)]
                holidays: Vec<Holiday>,
            },
        }

        Ok(match Body::deserialize(deserializer)? {
            Body::List(holidays) | Body::Wrapped { holidays } => Holidays { holidays },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ip_geolocation_parse() {
        let body = json!({
            "ip_address": "8.8.8.8",
            "city": "Mountain View",
            "country": "United States",
            "country_code": "US",
            "latitude": 37.386,
            "longitude": -122.0838,
            "connection": {"autonomous_system_number": 15169, "isp_name": "Google LLC"}
        });

        let result: IpGeolocation = serde_json::from_value(body).unwrap();
        assert_eq!(result.ip_address.as_deref(), Some("8.8.8.8"));
        assert_eq!(result.city.as_deref(), Some("Mountain View"));
        assert_eq!(result.latitude, Some(37.386));
        assert_eq!(
            result.connection.unwrap().autonomous_system_number,
            Some(15169)
        );
        assert!(result.security.is_none());
    }

    #[test]
    fn test_ip_geolocation_accepts_ip_alias() {
        let result: IpGeolocation =
            serde_json::from_value(json!({"ip": "8.8.8.8", "country": "United States"})).unwrap();
        assert_eq!(result.ip_address.as_deref(), Some("8.8.8.8"));
        assert_eq!(result.country.as_deref(), Some("United States"));
    }

    #[test]
    fn test_ip_security_section() {
        let result: IpGeolocation = serde_json::from_value(json!({
            "ip_address": "1.2.3.4",
            "security": {"is_vpn": true}
        }))
        .unwrap();
        let security = result.security.unwrap();
        assert_eq!(security.is_vpn, Some(true));
        assert!(security.is_tor.is_none());
    }

    #[test]
    fn test_timezone_conversion_parse() {
        let body = json!({
            "base_location": {
                "datetime": "2025-01-01 10:00:00",
                "timezone_name": "Eastern Standard Time",
                "timezone_location": "America/New_York",
                "timezone_abbreviation": "EST",
                "gmt_offset": -5,
                "is_dst": false,
                "requested_location": "New York"
            },
            "target_location": {
                "datetime": "2025-01-01 15:00:00",
                "timezone_location": "Europe/London",
                "gmt_offset": 0
            }
        });

        let result: TimezoneConversion = serde_json::from_value(body).unwrap();
        assert_eq!(result.base_location.unwrap().gmt_offset, Some(-5.0));
        assert_eq!(
            result.target_location.unwrap().timezone_location.as_deref(),
            Some("Europe/London")
        );
    }

    #[test]
    fn test_holidays_from_array_and_object() {
        let holiday = json!({
            "name": "New Year's Day",
            "country": "US",
            "type": "National",
            "date": "01/01/2025",
            "week_day": "Wednesday"
        });

        let from_list: Holidays = serde_json::from_value(json!([holiday.clone()])).unwrap();
        let from_object: Holidays =
            serde_json::from_value(json!({"holidays": [holiday]})).unwrap();

        assert_eq!(from_list, from_object);
        assert_eq!(from_list.holidays.len(), 1);
        assert_eq!(
            from_list.holidays[0].holiday_type.as_deref(),
            Some("National")
        );
    }

    #[test]
    fn test_holidays_empty_array() {
        let result: Holidays = serde_json::from_value(json!([])).unwrap();
        assert!(result.holidays.is_empty());
    }
}
