// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! AJAX meta object
//!
//! Pages embed the default request target in a meta tag whose content is
//! a JSON object. Extraction is a regex scan, not a DOM parse; the tag
//! grammar is rigid enough and this avoids dragging in an HTML parser.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Meta tag name carrying the AJAX configuration
pub const AJAX_META_NAME: &str = "lcs_ajax_object";

lazy_static! {
    // name before content and content before name
    static ref META_NAME_FIRST: Regex = Regex::new(
        r#"<meta[^>]*\bname\s*=\s*["']lcs_ajax_object["'][^>]*\bcontent\s*=\s*["']([^"']*)["']"#
    )
    .expect("valid meta regex");
    static ref META_CONTENT_FIRST: Regex = Regex::new(
        r#"<meta[^>]*\bcontent\s*=\s*["']([^"']*)["'][^>]*\bname\s*=\s*["']lcs_ajax_object["']"#
    )
    .expect("valid meta regex");
}

/// Default request configuration published by the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxMeta {
    /// Default request target
    pub ajaxurl: String,
    /// Nonce endpoint override
    #[serde(default)]
    pub nonce_endpoint: Option<String>,
    /// Nonce field name override
    #[serde(default)]
    pub nonce_name: Option<String>,
}

impl AjaxMeta {
    /// Parse from a meta tag's content attribute
    pub fn from_content(content: &str) -> Result<Self> {
        let decoded = decode_entities(content);
        let meta: AjaxMeta = serde_json::from_str(&decoded)
            .map_err(|e| Error::config(format!("invalid {} content: {}", AJAX_META_NAME, e)))?;
        if meta.ajaxurl.trim().is_empty() {
            return Err(Error::config(format!(
                "{} is missing ajaxurl",
                AJAX_META_NAME
            )));
        }
        Ok(meta)
    }

    /// Extract from an HTML document, `None` when the tag is absent
    pub fn from_html(html: &str) -> Result<Option<Self>> {
        let content = META_NAME_FIRST
            .captures(html)
            .or_else(|| META_CONTENT_FIRST.captures(html))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());

        match content {
            Some(content) => Self::from_content(content).map(Some),
            None => Ok(None),
        }
    }

    /// The default target as a parsed URL
    pub fn ajax_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.ajaxurl)?)
    }
}

/// Minimal entity decoding for JSON stuffed into an HTML attribute
fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content() {
        let meta =
            AjaxMeta::from_content(r#"{"ajaxurl": "https://example.com/ajax"}"#).unwrap();
        assert_eq!(meta.ajaxurl, "https://example.com/ajax");
        assert_eq!(meta.nonce_endpoint, None);
    }

    #[test]
    fn test_from_html_with_entities() {
        let html = r#"<head>
            <meta name='lcs_ajax_object' content='{&quot;ajaxurl&quot;: &quot;https://example.com/ajax&quot;, &quot;nonce_name&quot;: &quot;form_nonce&quot;}'>
        </head>"#;

        let meta = AjaxMeta::from_html(html).unwrap().unwrap();
        assert_eq!(meta.ajaxurl, "https://example.com/ajax");
        assert_eq!(meta.nonce_name.as_deref(), Some("form_nonce"));
    }

    #[test]
    fn test_from_html_attribute_order_reversed() {
        let html = r#"<meta content='{"ajaxurl": "https://example.com/x"}' name="lcs_ajax_object">"#;
        let meta = AjaxMeta::from_html(html).unwrap().unwrap();
        assert_eq!(meta.ajaxurl, "https://example.com/x");
    }

    #[test]
    fn test_absent_tag_is_none() {
        assert!(AjaxMeta::from_html("<html><head></head></html>")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_ajaxurl_rejected() {
        assert!(AjaxMeta::from_content(r#"{"nonce_name": "x"}"#).is_err());
        assert!(AjaxMeta::from_content(r#"{"ajaxurl": "  "}"#).is_err());
    }
}
