//! Script parsing: speaker-tagged text into ordered segments
//!
//! A script is a sequence of blocks separated by blank lines. A block opens
//! with `Name:` (optionally followed by dialogue on the same line) and
//! continues with dialogue lines until the next block header.
//!
//! ```text
//! Host: Welcome back to the show.
//! Today we talk about parsers.
//!
//! Guest:
//! Thanks for having me.
//! ```
//!
//! A line is only treated as a header when it sits at the start of the
//! script or right after a blank line, contains a colon, and the text before
//! the first colon names a registered speaker. Anything else is dialogue,
//! which keeps `He said: hello` inside the current block.
//!
//! Known limitation: a paragraph inside a monologue that starts with a
//! registered speaker's name and a colon (e.g. quoting them after a blank
//! line) is read as a speaker change.

use crate::speakers::SpeakerRegistry;
use serde::{Deserialize, Serialize};

/// One speaker's contiguous dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Speaker name as it appears in the registry
    pub speaker: String,
    /// Dialogue lines joined with single spaces
    pub text: String,
}

impl Segment {
    /// Create a new segment
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Accumulates dialogue lines for the speaker currently holding the floor
struct Block<'a> {
    speaker: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> Block<'a> {
    fn flush(self, segments: &mut Vec<Segment>) {
        if !self.lines.is_empty() {
            segments.push(Segment::new(self.speaker, self.lines.join(" ")));
        }
    }
}

/// Split a script into segments, in source order.
///
/// Only names present in `speakers` open a block. Text before the first
/// recognized header has no speaker and is dropped, as are blocks that end
/// up with no dialogue.
pub fn parse_script(script: &str, speakers: &SpeakerRegistry) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<Block<'_>> = None;
    let mut after_blank = true;

    for line in script.lines().map(str::trim) {
        if line.is_empty() {
            after_blank = true;
            continue;
        }

        let header = if after_blank {
            speaker_header(line, speakers)
        } else {
            None
        };
        after_blank = false;

        match header {
            Some((speaker, rest)) => {
                if let Some(block) = current.take() {
                    block.flush(&mut segments);
                }
                let mut block = Block {
                    speaker,
                    lines: Vec::new(),
                };
                if !rest.is_empty() {
                    block.lines.push(rest);
                }
                current = Some(block);
            }
            None => match current.as_mut() {
                Some(block) => block.lines.push(line),
                None => tracing::debug!("Dropping text before first speaker: {}", line),
            },
        }
    }

    if let Some(block) = current {
        block.flush(&mut segments);
    }

    segments
}

/// `Name: rest` where `Name` is registered
fn speaker_header<'a>(line: &'a str, speakers: &SpeakerRegistry) -> Option<(&'a str, &'a str)> {
    let (name, rest) = line.split_once(':')?;
    let name = name.trim();
    if speakers.contains(name) {
        Some((name, rest.trim()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speakers::SpeakerConfig;

    fn registry() -> SpeakerRegistry {
        SpeakerRegistry::podcast_defaults()
    }

    #[test]
    fn test_two_blocks() {
        let segments = parse_script("Host:\nHi\n\nGuest:\nHello", &registry());
        assert_eq!(
            segments,
            vec![Segment::new("Host", "Hi"), Segment::new("Guest", "Hello")]
        );
    }

    #[test]
    fn test_lines_are_joined() {
        let segments = parse_script("Host:\nLine1\nLine2", &registry());
        assert_eq!(segments, vec![Segment::new("Host", "Line1 Line2")]);
    }

    #[test]
    fn test_inline_dialogue_after_colon() {
        let segments = parse_script("Host: Welcome back.\nToday: parsers.", &registry());
        assert_eq!(
            segments,
            vec![Segment::new("Host", "Welcome back. Today: parsers.")]
        );
    }

    #[test]
    fn test_empty_and_blank_scripts() {
        assert!(parse_script("", &registry()).is_empty());
        assert!(parse_script("\n   \n\t\n", &registry()).is_empty());
    }

    #[test]
    fn test_unknown_speaker_produces_nothing() {
        assert!(parse_script("Unknown:\nText", &registry()).is_empty());
    }

    #[test]
    fn test_unregistered_colon_does_not_split() {
        let script = "Host:\nHe said: hello\n\nNote: this stays with the host\n\nGuest:\nRight.";
        let segments = parse_script(script, &registry());
        assert_eq!(
            segments,
            vec![
                Segment::new(
                    "Host",
                    "He said: hello Note: this stays with the host"
                ),
                Segment::new("Guest", "Right."),
            ]
        );
    }

    #[test]
    fn test_registered_name_mid_block_does_not_split() {
        // no blank line before "Guest:"
        let segments = parse_script("Host:\nHi\nGuest: should stay here", &registry());
        assert_eq!(
            segments,
            vec![Segment::new("Host", "Hi Guest: should stay here")]
        );
    }

    #[test]
    fn test_registered_name_after_blank_splits() {
        // quoting a registered speaker after a blank line starts their block
        let segments = parse_script("Host:\nAs my guest put it\n\nGuest: never again", &registry());
        assert_eq!(
            segments,
            vec![
                Segment::new("Host", "As my guest put it"),
                Segment::new("Guest", "never again"),
            ]
        );
    }

    #[test]
    fn test_preamble_is_discarded() {
        let segments = parse_script("Episode 12\nrecorded live\n\nHost:\nHi", &registry());
        assert_eq!(segments, vec![Segment::new("Host", "Hi")]);
    }

    #[test]
    fn test_lines_are_trimmed_and_header_whitespace_ignored() {
        let segments = parse_script("   Host  :   Hi  \n    there   ", &registry());
        assert_eq!(segments, vec![Segment::new("Host", "Hi there")]);
    }

    #[test]
    fn test_empty_block_is_skipped() {
        let segments = parse_script("Host:\n\nGuest:\nHello", &registry());
        assert_eq!(segments, vec![Segment::new("Guest", "Hello")]);
    }

    #[test]
    fn test_same_speaker_blocks_stay_separate() {
        let segments = parse_script("Host:\nOne\n\nHost:\nTwo", &registry());
        assert_eq!(
            segments,
            vec![Segment::new("Host", "One"), Segment::new("Host", "Two")]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let segments = parse_script("Host:\r\nHi\r\n\r\nGuest:\r\nHello\r\n", &registry());
        assert_eq!(
            segments,
            vec![Segment::new("Host", "Hi"), Segment::new("Guest", "Hello")]
        );
    }

    #[test]
    fn test_n_blocks_in_order_reconstruct_dialogue() {
        let speakers = SpeakerRegistry::new()
            .with_speaker("A", SpeakerConfig::new("v1", "a"))
            .with_speaker("B", SpeakerConfig::new("v2", "a"))
            .with_speaker("C", SpeakerConfig::new("v3", "b"));

        let dialogue = [
            ("A", vec!["first line", "second line"]),
            ("B", vec!["reply"]),
            ("C", vec!["one", "two", "three"]),
            ("A", vec!["closing"]),
        ];

        let script = dialogue
            .iter()
            .map(|(name, lines)| format!("{}:\n{}", name, lines.join("\n")))
            .collect::<Vec<_>>()
            .join("\n\n");

        let segments = parse_script(&script, &speakers);
        assert_eq!(segments.len(), dialogue.len());
        for (segment, (name, lines)) in segments.iter().zip(dialogue.iter()) {
            assert_eq!(segment.speaker, *name);
            assert_eq!(segment.text, lines.join(" "));
        }
    }
}
