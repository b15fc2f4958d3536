use crate::error::ParseFailure;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tfagent_protocol::ModificationResult;

static FENCED_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("fence pattern is valid"));

static FILE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"---\s*File:\s*([\w./\\-]+)\s*---").expect("file marker pattern is valid")
});

static SECTION_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"---\s*File:").expect("boundary pattern is valid"));

/// Reconciliation tier, in the order tiers are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTier {
    FencedJson,
    WholeText,
    FileMarkers,
}

impl fmt::Display for ParseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FencedJson => "fenced JSON block",
            Self::WholeText => "whole-text JSON",
            Self::FileMarkers => "file marker sections",
        })
    }
}

/// One way of extracting files from a raw reply
pub trait ParseStrategy: Send + Sync {
    fn tier(&self) -> ParseTier;

    fn parse(&self, raw: &str) -> Result<ModificationResult, ParseFailure>;
}

/// JSON object inside a ```` ```json ```` fence
pub struct FencedJson;

impl ParseStrategy for FencedJson {
    fn tier(&self) -> ParseTier {
        ParseTier::FencedJson
    }

    fn parse(&self, raw: &str) -> Result<ModificationResult, ParseFailure> {
        let inner = FENCED_JSON_RE
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .ok_or(ParseFailure::NoFencedBlock)?;
        parse_file_object(inner.as_str())
    }
}

/// The whole reply is the JSON object.
///
/// A reply containing a fence never parses as JSON, so this tier only
/// succeeds when there was no fenced block.
pub struct WholeText;

impl ParseStrategy for WholeText {
    fn tier(&self) -> ParseTier {
        ParseTier::WholeText
    }

    fn parse(&self, raw: &str) -> Result<ModificationResult, ParseFailure> {
        parse_file_object(raw.trim())
    }
}

/// `--- File: <path> ---` headed sections, each running to the next header
/// or the end of the reply
pub struct FileMarkers;

impl ParseStrategy for FileMarkers {
    fn tier(&self) -> ParseTier {
        ParseTier::FileMarkers
    }

    fn parse(&self, raw: &str) -> Result<ModificationResult, ParseFailure> {
        let mut files = ModificationResult::new();
        let mut pos = 0;

        while let Some(caps) = FILE_MARKER_RE.captures_at(raw, pos) {
            let (Some(header), Some(path)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let body_start = header.end();
            let body_end = SECTION_BOUNDARY_RE
                .find_at(raw, body_start)
                .map_or(raw.len(), |m| m.start());

            files.insert(
                path.as_str().trim().to_string(),
                raw[body_start..body_end].trim().to_string(),
            );
            pos = body_end;
        }

        if files.is_empty() {
            return Err(ParseFailure::NoFileSections);
        }
        Ok(files)
    }
}

fn parse_file_object(text: &str) -> Result<ModificationResult, ParseFailure> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(ParseFailure::NotAnObject);
    };

    let mut files = ModificationResult::new();
    for (path, content) in map {
        match content {
            serde_json::Value::String(content) => {
                files.insert(path, content);
            }
            _ => return Err(ParseFailure::NonStringValue(path)),
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, &str)]) -> ModificationResult {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fenced_block_is_extracted_from_prose() {
        let raw = "Here you go:\n```json\n{\"a.tf\": \"content-A\"}\n```\nDone.";
        assert_eq!(FencedJson.parse(raw).unwrap(), map(&[("a.tf", "content-A")]));
    }

    #[test]
    fn fence_without_json_tag_is_not_a_match() {
        let raw = "```\n{\"a.tf\": \"x\"}\n```";
        assert_eq!(FencedJson.parse(raw), Err(ParseFailure::NoFencedBlock));
    }

    #[test]
    fn json_values_must_be_strings() {
        assert_eq!(
            WholeText.parse("{\"a.tf\": 1}"),
            Err(ParseFailure::NonStringValue("a.tf".to_string()))
        );
        assert_eq!(WholeText.parse("[\"a.tf\"]"), Err(ParseFailure::NotAnObject));
        assert!(matches!(
            WholeText.parse("not json"),
            Err(ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn markers_tolerate_spacing_and_nested_paths() {
        let raw = "intro\n---File:modules/vpc/main.tf---\n\nresource {}\n\n--- File: outputs.tf ---\noutput {}\n";
        assert_eq!(
            FileMarkers.parse(raw).unwrap(),
            map(&[("modules/vpc/main.tf", "resource {}"), ("outputs.tf", "output {}")])
        );
    }

    #[test]
    fn malformed_marker_ends_previous_section() {
        let raw = "--- File: a.tf ---\nA\n--- File: not a path ---\njunk";
        assert_eq!(FileMarkers.parse(raw).unwrap(), map(&[("a.tf", "A")]));
    }

    #[test]
    fn no_markers_is_a_failure() {
        assert_eq!(
            FileMarkers.parse("I could not help with that."),
            Err(ParseFailure::NoFileSections)
        );
    }
}
