//! Advanced rule modifiers
//!
//! Modifiers that change what a matched rule does beyond allow/block. Each
//! one validates its value once at construction; converters only ever read
//! the normalized result.

use crate::error::RuleError;

// =============================================================================
// $removeheader
// =============================================================================

/// Headers that rules may never strip, in either direction.
pub const FORBIDDEN_HEADERS: [&str; 48] = [
    "access-control-allow-origin",
    "access-control-allow-credentials",
    "access-control-allow-headers",
    "access-control-allow-methods",
    "access-control-expose-headers",
    "access-control-max-age",
    "access-control-request-headers",
    "access-control-request-method",
    "origin",
    "timing-allow-origin",
    "allow",
    "cross-origin-embedder-policy",
    "cross-origin-opener-policy",
    "cross-origin-resource-policy",
    "content-security-policy",
    "content-security-policy-report-only",
    "expect-ct",
    "feature-policy",
    "origin-isolation",
    "strict-transport-security",
    "upgrade-insecure-requests",
    "x-content-type-options",
    "x-download-options",
    "x-frame-options",
    "x-permitted-cross-domain-policies",
    "x-powered-by",
    "x-xss-protection",
    "public-key-pins",
    "public-key-pins-report-only",
    "sec-websocket-key",
    "sec-websocket-extensions",
    "sec-websocket-accept",
    "sec-websocket-protocol",
    "sec-websocket-version",
    "p3p",
    "sec-fetch-mode",
    "sec-fetch-dest",
    "sec-fetch-site",
    "sec-fetch-user",
    "referrer-policy",
    "content-type",
    "content-length",
    "accept",
    "accept-encoding",
    "host",
    "connection",
    "transfer-encoding",
    "upgrade",
];

/// Values starting with this prefix target request headers.
const REQUEST_PREFIX: &str = "request:";

/// Returns true if rules are allowed to remove `name` (lowercase).
pub fn is_allowed_header(name: &str) -> bool {
    !FORBIDDEN_HEADERS.contains(&name)
}

/// `$removeheader` modifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoveHeaderModifier {
    value: String,
    is_request: bool,
    valid: bool,
}

impl RemoveHeaderModifier {
    pub fn new(value: &str, is_allowlist: bool) -> Result<Self, RuleError> {
        let value = value.to_lowercase();
        if !is_allowlist && value.is_empty() {
            return Err(RuleError::EmptyModifierValue { modifier: "removeheader" });
        }

        let is_request = value.starts_with(REQUEST_PREFIX);
        let header_name = if is_request { &value[REQUEST_PREFIX.len()..] } else { value.as_str() };

        // Values like "dnt:1" can not be expressed as a header removal.
        let valid = is_allowed_header(header_name) && !header_name.contains(':');

        Ok(Self { value, is_request, valid })
    }

    /// Lowercased value, including the `request:` prefix if present.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_request_modifier(&self) -> bool {
        self.is_request
    }

    /// Header name to remove, only when the modifier is valid and targets
    /// the requested direction.
    pub fn applicable_name(&self, for_request_headers: bool) -> Option<&str> {
        if !self.valid || for_request_headers != self.is_request {
            return None;
        }

        let name = if self.is_request { &self.value[REQUEST_PREFIX.len()..] } else { self.value.as_str() };
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

// =============================================================================
// $csp
// =============================================================================

/// `$csp` modifier: a policy to inject into matching documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CspModifier {
    value: String,
}

impl CspModifier {
    pub fn new(value: &str, is_allowlist: bool) -> Result<Self, RuleError> {
        let value = value.trim();
        if !is_allowlist && value.is_empty() {
            return Err(RuleError::EmptyModifierValue { modifier: "csp" });
        }

        if !is_allowlist {
            let lower = value.to_ascii_lowercase();
            for directive in ["report-uri", "report-to"] {
                if lower.contains(directive) {
                    return Err(RuleError::ForbiddenCspDirective(directive.to_string()));
                }
            }
        }

        Ok(Self { value: value.to_string() })
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

// =============================================================================
// $removeparam
// =============================================================================

/// How a `$removeparam` value selects query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveParamKind<'a> {
    /// Empty value: drop the whole query string
    All,
    /// Plain parameter name
    Name(&'a str),
    /// `~name`: drop everything except this parameter
    Inverted(&'a str),
    /// `/regex/`: drop parameters matching a regular expression
    Regex(&'a str),
}

/// `$removeparam` modifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoveParamModifier {
    value: String,
}

impl RemoveParamModifier {
    pub fn new(value: &str) -> Self {
        Self { value: value.trim().to_string() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> RemoveParamKind<'_> {
        let value = self.value.as_str();
        if value.is_empty() {
            RemoveParamKind::All
        } else if let Some(name) = value.strip_prefix('~') {
            RemoveParamKind::Inverted(name)
        } else if value.len() > 2 && value.starts_with('/') && value.ends_with('/') {
            RemoveParamKind::Regex(&value[1..value.len() - 1])
        } else {
            RemoveParamKind::Name(value)
        }
    }
}

// =============================================================================
// $redirect
// =============================================================================

/// `$redirect` modifier: serve a bundled resource instead of the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedirectModifier {
    resource: String,
}

impl RedirectModifier {
    pub fn new(value: &str, is_allowlist: bool) -> Result<Self, RuleError> {
        let resource = value.trim();
        if !is_allowlist && resource.is_empty() {
            return Err(RuleError::EmptyModifierValue { modifier: "redirect" });
        }
        Ok(Self { resource: resource.to_string() })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

// =============================================================================
// Advanced modifier
// =============================================================================

/// The advanced modifier carried by a network rule, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdvancedModifier {
    Csp(CspModifier),
    RemoveParam(RemoveParamModifier),
    RemoveHeader(RemoveHeaderModifier),
    Redirect(RedirectModifier),
}

impl AdvancedModifier {
    /// Option name as written in filter lists.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Csp(_) => "csp",
            Self::RemoveParam(_) => "removeparam",
            Self::RemoveHeader(_) => "removeheader",
            Self::Redirect(_) => "redirect",
        }
    }

    /// Build a modifier from its option name and value.
    ///
    /// Returns `Ok(None)` if `name` is not an advanced modifier.
    pub fn parse(name: &str, value: &str, is_allowlist: bool) -> Result<Option<Self>, RuleError> {
        let modifier = match name {
            "csp" => Self::Csp(CspModifier::new(value, is_allowlist)?),
            "removeparam" => Self::RemoveParam(RemoveParamModifier::new(value)),
            "removeheader" => Self::RemoveHeader(RemoveHeaderModifier::new(value, is_allowlist)?),
            "redirect" => Self::Redirect(RedirectModifier::new(value, is_allowlist)?),
            _ => return Ok(None),
        };
        Ok(Some(modifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removeheader_empty_value() {
        assert_eq!(
            RemoveHeaderModifier::new("", false),
            Err(RuleError::EmptyModifierValue { modifier: "removeheader" })
        );

        let modifier = RemoveHeaderModifier::new("", true).expect("allowlist may be empty");
        assert!(modifier.is_valid());
        assert_eq!(modifier.value(), "");
        assert_eq!(modifier.applicable_name(false), None);
        assert_eq!(modifier.applicable_name(true), None);
    }

    #[test]
    fn test_removeheader_request_prefix() {
        let modifier = RemoveHeaderModifier::new("request:X-Custom", false).unwrap();
        assert!(modifier.is_valid());
        assert!(modifier.is_request_modifier());
        assert_eq!(modifier.value(), "request:x-custom");
        assert_eq!(modifier.applicable_name(true), Some("x-custom"));
        assert_eq!(modifier.applicable_name(false), None);
    }

    #[test]
    fn test_removeheader_response_header() {
        let modifier = RemoveHeaderModifier::new("Refresh", false).unwrap();
        assert!(!modifier.is_request_modifier());
        assert_eq!(modifier.applicable_name(false), Some("refresh"));
        assert_eq!(modifier.applicable_name(true), None);
    }

    #[test]
    fn test_removeheader_forbidden_and_colon() {
        let forbidden = RemoveHeaderModifier::new("content-type", false).unwrap();
        assert!(!forbidden.is_valid());
        assert_eq!(forbidden.applicable_name(false), None);

        let prefixed = RemoveHeaderModifier::new("request:Origin", false).unwrap();
        assert!(!prefixed.is_valid());
        assert_eq!(prefixed.applicable_name(true), None);

        let colon = RemoveHeaderModifier::new("dnt:1", false).unwrap();
        assert!(!colon.is_valid());
    }

    #[test]
    fn test_forbidden_list_is_lowercase_and_unique() {
        for (i, name) in FORBIDDEN_HEADERS.iter().enumerate() {
            assert_eq!(*name, name.to_lowercase());
            assert!(!FORBIDDEN_HEADERS[i + 1..].contains(name), "duplicate {name}");
        }
    }

    #[test]
    fn test_csp_validation() {
        assert!(CspModifier::new("", false).is_err());
        assert!(CspModifier::new("", true).is_ok());
        assert_eq!(
            CspModifier::new("script-src 'self'; report-uri /x", false),
            Err(RuleError::ForbiddenCspDirective("report-uri".to_string()))
        );
        assert_eq!(CspModifier::new(" frame-src 'none' ", false).unwrap().value(), "frame-src 'none'");
    }

    #[test]
    fn test_removeparam_kinds() {
        assert_eq!(RemoveParamModifier::new("").kind(), RemoveParamKind::All);
        assert_eq!(RemoveParamModifier::new("utm_source").kind(), RemoveParamKind::Name("utm_source"));
        assert_eq!(RemoveParamModifier::new("~id").kind(), RemoveParamKind::Inverted("id"));
        assert_eq!(RemoveParamModifier::new("/^utm_/").kind(), RemoveParamKind::Regex("^utm_"));
    }

    #[test]
    fn test_parse_advanced_modifier() {
        let parsed = AdvancedModifier::parse("redirect", "noopjs", false).unwrap();
        assert!(matches!(parsed, Some(AdvancedModifier::Redirect(ref r)) if r.resource() == "noopjs"));
        assert_eq!(AdvancedModifier::parse("script", "", false), Ok(None));
        assert!(AdvancedModifier::parse("redirect", "", false).is_err());
        // Conditional redirects only apply to already blocked requests.
        assert_eq!(AdvancedModifier::parse("redirect-rule", "noopjs", false), Ok(None));
    }
}
