//! Core type definitions for filtering rules
//!
//! Bit masks for rule options and request types. Both are compared by value
//! when resolving `$badfilter`, so every field that changes a rule's meaning
//! has to live in one of these masks.

use crate::declarative::ResourceType;

// =============================================================================
// Network Rule Options
// =============================================================================

bitflags::bitflags! {
    /// Options enabled on a network rule.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NetworkRuleOption: u16 {
        /// $important - ignores exception filters
        const IMPORTANT = 1 << 0;
        /// Case-sensitive matching ($match-case)
        const MATCH_CASE = 1 << 1;
        /// $third-party
        const THIRD_PARTY = 1 << 2;
        /// $first-party (or ~third-party)
        const FIRST_PARTY = 1 << 3;
        /// $badfilter - negates an identical rule
        const BADFILTER = 1 << 4;
    }
}

impl NetworkRuleOption {
    /// Parse a single option name as it appears after `$`.
    pub fn from_option_name(name: &str) -> Option<Self> {
        match name {
            "important" => Some(Self::IMPORTANT),
            "match-case" | "match_case" => Some(Self::MATCH_CASE),
            "third-party" | "3p" => Some(Self::THIRD_PARTY),
            "first-party" | "1p" | "~third-party" => Some(Self::FIRST_PARTY),
            "badfilter" => Some(Self::BADFILTER),
            _ => None,
        }
    }
}

// =============================================================================
// Request Types (bit mask for type filtering)
// =============================================================================

bitflags::bitflags! {
    /// Request type bit mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RequestType: u32 {
        const OTHER = 1 << 0;
        const SCRIPT = 1 << 1;
        const IMAGE = 1 << 2;
        const STYLESHEET = 1 << 3;
        const OBJECT = 1 << 4;
        const SUBDOCUMENT = 1 << 5;  // iframe/frame
        const MAIN_FRAME = 1 << 6;   // main document
        const XMLHTTPREQUEST = 1 << 7;
        const WEBSOCKET = 1 << 8;
        const FONT = 1 << 9;
        const MEDIA = 1 << 10;
        const PING = 1 << 11;
        const CSP_REPORT = 1 << 12;
    }
}

/// Pairs of request type bits and their declarative resource type, in the
/// order they are emitted.
const RESOURCE_TYPES: [(RequestType, ResourceType); 13] = [
    (RequestType::MAIN_FRAME, ResourceType::MainFrame),
    (RequestType::SUBDOCUMENT, ResourceType::SubFrame),
    (RequestType::STYLESHEET, ResourceType::Stylesheet),
    (RequestType::SCRIPT, ResourceType::Script),
    (RequestType::IMAGE, ResourceType::Image),
    (RequestType::FONT, ResourceType::Font),
    (RequestType::OBJECT, ResourceType::Object),
    (RequestType::XMLHTTPREQUEST, ResourceType::XmlHttpRequest),
    (RequestType::PING, ResourceType::Ping),
    (RequestType::CSP_REPORT, ResourceType::CspReport),
    (RequestType::MEDIA, ResourceType::Media),
    (RequestType::WEBSOCKET, ResourceType::WebSocket),
    (RequestType::OTHER, ResourceType::Other),
];

impl RequestType {
    /// Parse from a filter option name.
    pub fn from_option_name(name: &str) -> Option<Self> {
        match name {
            "script" => Some(Self::SCRIPT),
            "image" => Some(Self::IMAGE),
            "stylesheet" => Some(Self::STYLESHEET),
            "object" => Some(Self::OBJECT),
            "subdocument" => Some(Self::SUBDOCUMENT),
            "document" | "main_frame" => Some(Self::MAIN_FRAME),
            "xmlhttprequest" | "xhr" => Some(Self::XMLHTTPREQUEST),
            "media" => Some(Self::MEDIA),
            "font" => Some(Self::FONT),
            "ping" => Some(Self::PING),
            "websocket" => Some(Self::WEBSOCKET),
            "csp_report" => Some(Self::CSP_REPORT),
            "other" => Some(Self::OTHER),
            _ => None,
        }
    }

    /// Declarative resource types covered by this mask.
    pub fn resource_types(self) -> Vec<ResourceType> {
        RESOURCE_TYPES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, resource_type)| *resource_type)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_names() {
        assert_eq!(NetworkRuleOption::from_option_name("badfilter"), Some(NetworkRuleOption::BADFILTER));
        assert_eq!(NetworkRuleOption::from_option_name("1p"), Some(NetworkRuleOption::FIRST_PARTY));
        assert_eq!(NetworkRuleOption::from_option_name("removeheader"), None);
    }

    #[test]
    fn test_option_names_are_filter_syntax() {
        assert_eq!(RequestType::from_option_name("xhr"), Some(RequestType::XMLHTTPREQUEST));
        assert_eq!(RequestType::from_option_name("document"), Some(RequestType::MAIN_FRAME));
        assert_eq!(RequestType::from_option_name("SCRIPT"), None);
        // Flag identifiers still resolve through bitflags.
        assert_eq!(RequestType::from_name("SCRIPT"), Some(RequestType::SCRIPT));
        assert_eq!(NetworkRuleOption::from_name("BADFILTER"), Some(NetworkRuleOption::BADFILTER));
    }

    #[test]
    fn test_resource_types_follow_emission_order() {
        let mask = RequestType::SCRIPT | RequestType::MAIN_FRAME | RequestType::OTHER;
        assert_eq!(
            mask.resource_types(),
            vec![ResourceType::MainFrame, ResourceType::Script, ResourceType::Other]
        );
        assert!(RequestType::empty().resource_types().is_empty());
    }
}
