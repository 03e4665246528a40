use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Narration script and Manim source extracted from one model response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedContent {
    /// Narration script, one sentence per line
    pub narration: String,
    /// Manim scene source, code fences stripped
    pub animation_source: String,
}

/// Errors for a model response that violates the expected section layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("could not find narration section in model response")]
    MissingNarration,

    #[error("could not find Manim code section in model response")]
    MissingAnimationCode,
}

impl ParseError {
    /// Stable numeric code, kept from the original app so callers can tell
    /// which half of the response contract the model violated
    pub fn code(&self) -> u8 {
        match self {
            ParseError::MissingNarration => 1,
            ParseError::MissingAnimationCode => 2,
        }
    }
}

/// Split a raw model response into narration and animation source.
///
/// The narration is the text strictly between the `-NARRATION-` marker and
/// the first following `-MANIM-` marker; the animation source is everything
/// after `-MANIM-`, with surrounding code fences removed.
pub fn extract_content(response: &str) -> Result<ParsedContent, ParseError> {
    let manim_re = Regex::new(r"(?s)-MANIM-(.*)").unwrap();
    let narration_re = Regex::new(r"(?s)-NARRATION-(.*?)-MANIM-").unwrap();

    let animation_source = manim_re
        .captures(response)
        .map(|caps| caps[1].trim().to_string())
        .ok_or(ParseError::MissingAnimationCode)?;

    let narration = narration_re
        .captures(response)
        .map(|caps| caps[1].trim().to_string())
        .ok_or(ParseError::MissingNarration)?;

    Ok(ParsedContent {
        narration,
        animation_source: strip_code_fences(&animation_source),
    })
}

/// Remove markdown code fences around a block of generated code.
///
/// Drops a leading fence opener line (with or without a language tag) and the
/// last closing fence in the remainder, then re-trims. Applied until the text
/// stops changing, so stripping an already-stripped block is a no-op.
pub fn strip_code_fences(code: &str) -> String {
    let mut current = code.trim().to_string();
    loop {
        let next = strip_fences_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_fences_once(code: &str) -> String {
    let trimmed = code.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    // Drop the opener line; "```python" and plain "```" both end at the newline.
    let body = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => "",
    };

    let body = match body.rfind("```") {
        Some(pos) => format!("{}{}", &body[..pos], &body[pos + 3..]),
        None => body.to_string(),
    };

    body.trim().to_string()
}

/// Split narration into ordered sentences, one per non-empty line.
///
/// Line order is significant: sentence `i` narrates the animation step whose
/// wait time is the `#DURATION_i#` placeholder.
pub fn segment_narration(narration: &str) -> Vec<String> {
    narration
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "-NARRATION-\nFirst sentence.\nSecond sentence.\n\n-MANIM-\n```python\nfrom manim import *\n\nclass NarratedScene(Scene):\n    pass\n```";

    #[test]
    fn test_extract_content_well_formed() {
        let parsed = extract_content(RESPONSE).unwrap();

        assert_eq!(parsed.narration, "First sentence.\nSecond sentence.");
        assert!(parsed.animation_source.starts_with("from manim import *"));
        assert!(parsed.animation_source.ends_with("pass"));
        assert!(!parsed.animation_source.contains("```"));
    }

    #[test]
    fn test_extract_content_missing_manim_marker() {
        let err = extract_content("-NARRATION-\nJust narration, no code.").unwrap_err();
        assert_eq!(err, ParseError::MissingAnimationCode);
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn test_extract_content_missing_narration_marker() {
        let err = extract_content("-MANIM-\nprint('no narration')").unwrap_err();
        assert_eq!(err, ParseError::MissingNarration);
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn test_extract_content_narration_after_manim_is_rejected() {
        // Markers out of order: no narration/manim boundary exists.
        let err = extract_content("-MANIM-\ncode\n-NARRATION-\ntext").unwrap_err();
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn test_narration_stops_at_first_manim_marker() {
        let response = "-NARRATION-\nline one\n-MANIM-\ncode\n-MANIM-\nmore";
        let parsed = extract_content(response).unwrap();
        assert_eq!(parsed.narration, "line one");
    }

    #[test]
    fn test_strip_code_fences_language_tagged() {
        let stripped = strip_code_fences("```python\nx = 1\n```");
        assert_eq!(stripped, "x = 1");
    }

    #[test]
    fn test_strip_code_fences_plain() {
        let stripped = strip_code_fences("```\nx = 1\n```");
        assert_eq!(stripped, "x = 1");
    }

    #[test]
    fn test_strip_code_fences_unfenced_input_untouched() {
        assert_eq!(strip_code_fences("  x = 1  "), "x = 1");
    }

    #[test]
    fn test_strip_code_fences_idempotent() {
        for input in [
            "```python\nx = 1\n```",
            "```\nx = 1\n```",
            "x = 1",
            "```python\nprint('```nested')\n```",
            "",
        ] {
            let once = strip_code_fences(input);
            assert_eq!(strip_code_fences(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_segment_narration_drops_blank_lines() {
        let segments = segment_narration("a\n\nb \n \nc");
        assert_eq!(segments, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_segment_narration_empty_input() {
        assert!(segment_narration("").is_empty());
        assert!(segment_narration("  \n \n").is_empty());
    }
}
