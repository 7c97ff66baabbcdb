//! Email, phone and VAT validation results.

use serde::{Deserialize, Serialize};

/// A boolean check as Abstract reports it: `{"value": true, "text": "TRUE"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub value: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Flag {
    /// Whether the check passed; an unknown result counts as false
    pub fn is_true(&self) -> bool {
        self.value.unwrap_or(false)
    }
}

/// Result of the email validation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailValidation {
    /// Email address that was validated
    pub email: String,

    /// Suggested correction if a typo was detected
    #[serde(default)]
    pub autocorrect: Option<String>,

    /// `DELIVERABLE`, `UNDELIVERABLE` or `UNKNOWN`
    #[serde(default)]
    pub deliverability: Option<String>,

    /// Quality score between 0 and 1 (sent as a string by some API versions)
    #[serde(default, deserialize_with = "number_or_string")]
    pub quality_score: Option<f64>,

    #[serde(default)]
    pub is_valid_format: Option<Flag>,
    #[serde(default)]
    pub is_free_email: Option<Flag>,
    #[serde(default)]
    pub is_disposable_email: Option<Flag>,
    #[serde(default)]
    pub is_role_email: Option<Flag>,
    #[serde(default)]
    pub is_catchall_email: Option<Flag>,
    #[serde(default)]
    pub is_mx_found: Option<Flag>,
    #[serde(default)]
    pub is_smtp_valid: Option<Flag>,
}

/// Number formats returned for a phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneFormat {
    #[serde(default)]
    pub international: Option<String>,
    #[serde(default)]
    pub local: Option<String>,
}

/// Country a phone number belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneCountry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Result of the phone validation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneValidation {
    pub phone: String,
    pub valid: bool,

    #[serde(default)]
    pub format: Option<PhoneFormat>,
    #[serde(default)]
    pub country: Option<PhoneCountry>,
    #[serde(default)]
    pub location: Option<String>,

    /// mobile, landline, ...
    #[serde(default, rename = "type")]
    pub phone_type: Option<String>,

    #[serde(default)]
    pub carrier: Option<String>,
}

/// Company registered under a VAT number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatCompany {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatCountry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of the VAT validation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatValidation {
    pub vat_number: String,
    pub valid: bool,

    #[serde(default)]
    pub company: Option<VatCompany>,
    #[serde(default)]
    pub country: Option<VatCountry>,
}

/// Accept `0.95` as well as `"0.95"`
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_validation_parse() {
        let body = json!({
            "email": "test@example.com",
            "autocorrect": "",
            "deliverability": "DELIVERABLE",
            "quality_score": 0.95,
            "is_valid_format": {"value": true, "text": "TRUE"},
            "is_free_email": {"value": false},
            "is_disposable_email": {"value": false},
            "is_role_email": {"value": false},
            "is_catchall_email": {"value": false},
            "is_mx_found": {"value": true},
            "is_smtp_valid": {"value": true},
            "some_future_field": 12
        });

        let result: EmailValidation = serde_json::from_value(body).unwrap();
        assert_eq!(result.email, "test@example.com");
        assert_eq!(result.deliverability.as_deref(), Some("DELIVERABLE"));
        assert_eq!(result.quality_score, Some(0.95));
        assert!(result.is_valid_format.unwrap().is_true());
        assert!(!result.is_free_email.unwrap().is_true());
    }

    #[test]
    fn test_email_quality_score_as_string() {
        let result: EmailValidation =
            serde_json::from_value(json!({"email": "a@b.co", "quality_score": "0.70"})).unwrap();
        assert_eq!(result.quality_score, Some(0.70));
    }

    #[test]
    fn test_email_missing_fields_stay_absent() {
        let result: EmailValidation =
            serde_json::from_value(json!({"email": "a@b.co"})).unwrap();
        assert!(result.deliverability.is_none());
        assert!(result.quality_score.is_none());
        assert!(result.is_smtp_valid.is_none());
    }

    #[test]
    fn test_phone_validation_parse() {
        let body = json!({
            "phone": "+1234567890",
            "valid": true,
            "format": {"international": "+1 234-567-890"},
            "country": {"code": "US", "name": "United States"},
            "type": "mobile"
        });

        let result: PhoneValidation = serde_json::from_value(body).unwrap();
        assert_eq!(result.phone, "+1234567890");
        assert!(result.valid);
        assert_eq!(result.phone_type.as_deref(), Some("mobile"));
        assert_eq!(
            result.country.unwrap().name.as_deref(),
            Some("United States")
        );
        assert!(result.carrier.is_none());
    }

    #[test]
    fn test_vat_validation_parse() {
        let body = json!({
            "vat_number": "SE556656688001",
            "valid": true,
            "company": {"name": "GOOGLE SWEDEN AB", "address": null},
            "country": {"code": "SE", "name": "Sweden"}
        });

        let result: VatValidation = serde_json::from_value(body).unwrap();
        assert!(result.valid);
        let company = result.company.unwrap();
        assert_eq!(company.name.as_deref(), Some("GOOGLE SWEDEN AB"));
        assert!(company.address.is_none());
    }
}
