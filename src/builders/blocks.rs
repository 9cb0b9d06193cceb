use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

/// The marker that opens an import-failure annotation in a generated test file.
pub const DEFAULT_START_MARKER: &str = "TEST.IMPORT_FAILURES:";
/// The marker that closes an import-failure annotation.
pub const DEFAULT_END_MARKER: &str = "TEST.END_IMPORT_FAILURES:";

/// Matches a whitespace run that starts and ends with a line break and holds
/// at least three line breaks in total.
static LINE_BREAK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n\s*\n").expect("Invalid line break run regex")
});

/// Errors raised when a marker pair cannot be used for matching.
///
/// An empty marker would match at every offset, and identical markers would
/// make every block end where the next one starts, so both are rejected
/// before any text is scanned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("Start marker cannot be empty")]
    EmptyStart,
    #[error("End marker cannot be empty")]
    EmptyEnd,
    #[error("Start and end markers must differ (both are '{0}')")]
    IdenticalMarkers(String),
}

/// The two literal strings delimiting a removable block.
///
/// Markers are matched as exact, case-sensitive substrings. They carry no
/// wildcard or word-boundary semantics, so a marker embedded in a longer
/// token still matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPair {
    /// The literal that opens a block.
    pub start: String,
    /// The literal that closes a block.
    pub end: String,
}

impl Default for MarkerPair {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

impl MarkerPair {
    /// Creates a validated marker pair.
    ///
    /// # Errors
    /// Returns a [`MarkerError`] if either marker is empty or both are equal.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, MarkerError> {
        let pair = Self {
            start: start.into(),
            end: end.into(),
        };
        pair.validate()?;
        Ok(pair)
    }

    /// Checks that the pair can be used for matching.
    ///
    /// Pairs built through deserialization skip [`MarkerPair::new`], so the
    /// configuration layer calls this explicitly.
    pub fn validate(&self) -> Result<(), MarkerError> {
        if self.start.is_empty() {
            return Err(MarkerError::EmptyStart);
        }
        if self.end.is_empty() {
            return Err(MarkerError::EmptyEnd);
        }
        if self.start == self.end {
            return Err(MarkerError::IdenticalMarkers(self.start.clone()));
        }
        Ok(())
    }
}

/// The outcome of cleaning one text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningResult {
    /// The cleaned text, after block removal and line-break normalization.
    pub content: String,
    /// How many blocks were removed.
    pub blocks_removed: usize,
}

impl CleaningResult {
    /// Returns `true` if at least one block was removed.
    pub fn changed(&self) -> bool {
        self.blocks_removed > 0
    }
}

/// Removes marker-delimited blocks from text.
///
/// The remover is a pure value: it holds a validated [`MarkerPair`] and every
/// call maps an input buffer to a fresh output buffer. It performs no I/O and
/// keeps no state between calls, so one instance can be shared freely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockRemover {
    markers: MarkerPair,
}

impl BlockRemover {
    /// Creates a remover for the given markers.
    ///
    /// # Errors
    /// Returns a [`MarkerError`] if the pair is invalid.
    pub fn new(markers: MarkerPair) -> Result<Self, MarkerError> {
        markers.validate()?;
        Ok(Self { markers })
    }

    /// Counts the blocks in `content` without modifying it.
    pub fn count(&self, content: &str) -> usize {
        scan_blocks(content, &self.markers.start, &self.markers.end).len()
    }

    /// Removes every block from `content` and normalizes line breaks.
    ///
    /// Blocks are paired lazily: each start marker closes at the nearest end
    /// marker after it. A start marker with no end marker after it is left in
    /// place together with the rest of the text. If splicing the text around
    /// a removed block brings a new start/end pair together, that pair is
    /// removed too, so the result never holds a matched pair.
    ///
    /// The normalization pass always runs, even when nothing was removed.
    /// When a marker contains a line break, normalization can form a new pair,
    /// so removal and normalization alternate until neither changes the text.
    pub fn clean(&self, content: &str) -> CleaningResult {
        let (mut text, mut blocks_removed) = self.sweep(content);

        loop {
            let normalized = normalize_line_breaks(&text);
            let Cow::Owned(normalized) = normalized else {
                break;
            };
            text = normalized;

            // Runs of line breaks can only join into a marker that holds one.
            if !self.markers.start.contains('\n') && !self.markers.end.contains('\n') {
                break;
            }
            let (swept, removed) = self.sweep(&text);
            if removed == 0 {
                break;
            }
            text = swept;
            blocks_removed += removed;
        }

        CleaningResult {
            content: text,
            blocks_removed,
        }
    }

    /// One left-to-right pass that removes blocks as it finds them.
    ///
    /// Text before each block is copied to `out` and the scan resumes right
    /// after the removed span, so every byte is searched a bounded number of
    /// times. After a removal, a start marker may straddle the end of `out`
    /// and the remaining input; that is checked before searching further.
    fn sweep(&self, content: &str) -> (String, usize) {
        let start = self.markers.start.as_str();
        let end = self.markers.end.as_str();
        let mut out = String::with_capacity(content.len());
        let mut rest_at = 0;
        let mut removed = 0;

        loop {
            let rest = &content[rest_at..];
            let straddling = if removed > 0 {
                straddling_start(&out, rest, start)
            } else {
                None
            };

            // Where the block begins in `out`, whether it opens a line, and
            // where its start marker ends in `content`.
            let (block_at, starts_line, after_start) = match straddling {
                Some(q) => (
                    q,
                    q == 0 || out[..q].ends_with('\n'),
                    rest_at + start.len() - (out.len() - q),
                ),
                None => {
                    let Some(offset) = rest.find(start) else {
                        break;
                    };
                    let abs = rest_at + offset;
                    out.push_str(&rest[..offset]);
                    rest_at = abs;
                    (
                        out.len(),
                        abs == 0 || content[..abs].ends_with('\n'),
                        abs + start.len(),
                    )
                }
            };

            // No end marker anywhere after this start, so no later start can pair either.
            let Some(end_offset) = content[after_start..].find(end) else {
                break;
            };

            let block_end = after_start + end_offset + end.len();
            rest_at = if starts_line {
                block_end + line_break_len(&content[block_end..])
            } else {
                block_end
            };
            out.truncate(block_at);
            removed += 1;
        }

        out.push_str(&content[rest_at..]);
        (out, removed)
    }
}

/// Removes every block delimited by `start` and `end` from `content`.
///
/// # Errors
/// Returns a [`MarkerError`] if the markers are empty or identical. Nothing is
/// scanned in that case.
///
/// # Example
/// ```
/// use import_failure_cleaner::builders::blocks::remove_blocks;
///
/// let cleaned = remove_blocks("p X: q X: r Y: s", "X:", "Y:").unwrap();
/// assert_eq!(cleaned, "p  s");
/// ```
pub fn remove_blocks(content: &str, start: &str, end: &str) -> Result<String, MarkerError> {
    let remover = BlockRemover::new(MarkerPair::new(start, end)?)?;
    Ok(remover.clean(content).content)
}

/// Counts the blocks delimited by `start` and `end` in `content`.
///
/// Uses the same nearest-end pairing as [`remove_blocks`]. Start markers that
/// never meet an end marker are not counted.
///
/// # Errors
/// Returns a [`MarkerError`] if the markers are empty or identical.
pub fn count_blocks(content: &str, start: &str, end: &str) -> Result<usize, MarkerError> {
    MarkerPair::new(start, end)?;
    Ok(scan_blocks(content, start, end).len())
}

/// Returns the byte spans of all blocks in `content`, markers included.
///
/// # Errors
/// Returns a [`MarkerError`] if the pair is invalid.
pub fn find_blocks(content: &str, markers: &MarkerPair) -> Result<Vec<Range<usize>>, MarkerError> {
    markers.validate()?;
    Ok(scan_blocks(content, &markers.start, &markers.end))
}

/// Collapses every whitespace run holding three or more line breaks down to
/// exactly two line breaks.
///
/// The pass is global: blank-line runs that have nothing to do with a removed
/// block are collapsed as well. Applying it twice gives the same result as
/// applying it once.
pub fn normalize_line_breaks(content: &str) -> Cow<'_, str> {
    LINE_BREAK_RUN.replace_all(content, "\n\n")
}

/// Left-to-right scan pairing each start marker with the nearest end marker
/// after it. Both markers must be non-empty.
fn scan_blocks(content: &str, start: &str, end: &str) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = content[cursor..].find(start) {
        let block_start = cursor + offset;
        let search_from = block_start + start.len();

        // No end marker anywhere after this start, so no later start can pair either.
        let Some(end_offset) = content[search_from..].find(end) else {
            break;
        };

        let block_end = search_from + end_offset + end.len();
        blocks.push(block_start..block_end);
        cursor = block_end;
    }

    blocks
}

/// Leftmost position in `out` where a start marker begins that runs on
/// into `rest`.
fn straddling_start(out: &str, rest: &str, start: &str) -> Option<usize> {
    let from = out.len().saturating_sub(start.len() - 1);
    (from..out.len())
        .filter(|&q| out.is_char_boundary(q))
        .find(|&q| {
            let head = &out[q..];
            start.starts_with(head) && rest.starts_with(&start[head.len()..])
        })
}

/// Length of the line break at the beginning of `text`, if any.
///
/// A block that occupies whole lines also takes the line break closing its
/// last line, so the lines around it end up joined by the break that preceded
/// the start marker. Inline blocks are removed exactly.
fn line_break_len(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with('\n') {
        1
    } else {
        0
    }
}
