//! Company enrichment, scraping and screenshot results.

use serde::{Deserialize, Serialize};

/// Result of the company enrichment endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub domain: String,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year_founded: Option<i32>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employees_count: Option<u64>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Result of the scrape endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,

    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub links: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ScrapeResult {
    /// Wrap a raw page body returned as-is by the upstream
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: None,
            html: Some(html.into()),
            links: None,
            images: None,
            metadata: None,
        }
    }
}

/// Result of the screenshot endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    #[serde(default)]
    pub success: Option<bool>,
    pub url: String,

    /// Base64-encoded image, or whatever reference the upstream returned
    #[serde(default)]
    pub image_data: Option<String>,

    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_info_parse() {
        let result: CompanyInfo = serde_json::from_value(json!({
            "name": "Example Corp",
            "domain": "example.com",
            "year_founded": 2020,
            "industry": "Technology",
            "employees_count": 100,
            "linkedin_url": null
        }))
        .unwrap();

        assert_eq!(result.name.as_deref(), Some("Example Corp"));
        assert_eq!(result.year_founded, Some(2020));
        assert_eq!(result.employees_count, Some(100));
        assert!(result.linkedin_url.is_none());
        assert!(result.locality.is_none());
    }

    #[test]
    fn test_scrape_from_html() {
        let result = ScrapeResult::from_html("https://example.com", "<html></html>");
        assert_eq!(result.url, "https://example.com");
        assert_eq!(result.html.as_deref(), Some("<html></html>"));
        assert!(result.content.is_none());
    }

    #[test]
    fn test_screenshot_parse() {
        let result: Screenshot = serde_json::from_value(json!({
            "success": true,
            "url": "https://example.com",
            "image_data": "aGVsbG8="
        }))
        .unwrap();
        assert_eq!(result.success, Some(true));
        assert_eq!(result.image_data.as_deref(), Some("aGVsbG8="));
        assert!(result.content_type.is_none());
    }

    #[test]
    fn test_screenshot_omitted_fields_stay_absent() {
        let result: Screenshot =
            serde_json::from_value(json!({"url": "https://example.com"})).unwrap();
        assert_eq!(result.success, None);
        assert_eq!(result.image_data, None);
    }
}
