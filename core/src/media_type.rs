//! Media types understood by the renderers and parsers.

use std::fmt;
use std::str::FromStr;

use crate::renderer::Format;

/// A recognised OCCI media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// `text/plain`: one directive per line.
    TextPlain,
    /// `text/occi`: directives carried as HTTP headers.
    TextOcci,
    /// `headers`: alias of `text/occi`.
    Headers,
    /// `application/occi+json`.
    OcciJson,
    /// `application/json`.
    Json,
    /// `text/uri-list`: bare locations, one per line.
    UriList,
}

impl MediaType {
    /// Parses a media type, ignoring parameters after `;` and ASCII case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/plain" => Some(MediaType::TextPlain),
            "text/occi" => Some(MediaType::TextOcci),
            "headers" => Some(MediaType::Headers),
            "application/occi+json" => Some(MediaType::OcciJson),
            "application/json" => Some(MediaType::Json),
            "text/uri-list" => Some(MediaType::UriList),
            _ => None,
        }
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::TextPlain => "text/plain",
            MediaType::TextOcci => "text/occi",
            MediaType::Headers => "headers",
            MediaType::OcciJson => "application/occi+json",
            MediaType::Json => "application/json",
            MediaType::UriList => "text/uri-list",
        }
    }

    /// Rendering format used for this media type.
    #[must_use]
    pub fn format(self) -> Format {
        match self {
            MediaType::TextPlain => Format::Text,
            MediaType::TextOcci | MediaType::Headers => Format::Headers,
            MediaType::OcciJson | MediaType::Json => Format::Json,
            MediaType::UriList => Format::UriList,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s).ok_or_else(|| format!("unsupported media type {s:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_and_case_are_ignored() {
        assert_eq!(
            MediaType::parse("Application/OCCI+JSON; charset=utf-8"),
            Some(MediaType::OcciJson)
        );
        assert_eq!(MediaType::parse("text/html"), None);
    }

    #[test]
    fn header_media_types_share_a_format() {
        assert_eq!(MediaType::TextOcci.format(), Format::Headers);
        assert_eq!(MediaType::Headers.format(), Format::Headers);
        assert_eq!(MediaType::TextPlain.format(), Format::Text);
    }
}
