//! Code fence tracking for line-by-line processing.
//!
//! Headings inside fenced code blocks must not start a section, and the
//! section renderer needs to know which fence a body line belongs to.

/// What a single line did to the fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FenceEvent<'a> {
    /// Line opened a fence; carries the trimmed info string.
    Open(&'a str),
    /// Line closed the current fence.
    Close,
    /// Line is ordinary content (inside or outside a fence).
    Content,
}

/// Tracks code fence state during line-by-line processing.
///
/// Code fences can use backticks or tildes (three or more). The closing
/// fence must use the same character and be at least as long as the opening
/// fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    pub(crate) fn update<'a>(&mut self, line: &'a str) -> FenceEvent<'a> {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_fence_line(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return FenceEvent::Close;
            }
            FenceEvent::Content
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            FenceEvent::Open(trimmed[len..].trim())
        } else {
            FenceEvent::Content
        }
    }
}

/// Detect if a line starts a code fence.
///
/// Returns the fence character and its byte length.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Check if a line is a valid closing fence.
fn is_fence_line(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    if count < min_len {
        return false;
    }

    trimmed[count..].chars().all(char::is_whitespace)
}
