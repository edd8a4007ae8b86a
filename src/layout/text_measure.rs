//! Text Measurement
//!
//! Utilities for measuring text dimensions in terminal cells.
//!
//! Terminal text width depends on Unicode character widths:
//! - ASCII characters: 1 cell
//! - CJK characters: 2 cells (fullwidth)
//! - Emoji: 2 cells (most)
//! - Zero-width and control characters: 0 cells

use unicode_width::UnicodeWidthChar;

#[inline]
fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0) as u16
}

/// Measure the display width of a string in terminal cells.
pub fn string_width(s: &str) -> u16 {
    s.chars().fold(0u16, |width, c| width.saturating_add(char_width(c)))
}

/// Width of the widest line.
pub fn max_line_width(text: &str) -> u16 {
    text.split('\n').map(string_width).max().unwrap_or(0)
}

/// Number of lines `text` occupies when wrapped at `available_width`.
///
/// 0 for empty text, at least 1 otherwise.
pub fn measure_text_height(text: &str, available_width: u16) -> u16 {
    if text.is_empty() {
        return 0;
    }
    (wrap_text(text, available_width).len() as u16).max(1)
}

/// Hard-wrap text to a given width, honouring explicit newlines.
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0u16;

    for c in text.chars() {
        if c == '\n' {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
            continue;
        }

        let w = char_width(c);
        if current_width + w > width && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }

        current_line.push(c);
        current_width += w;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Cut text so it fits in `width` cells. No ellipsis; the terminal host uses
/// this to clip at the right edge.
pub fn clip_text(text: &str, width: u16) -> &str {
    let mut used = 0u16;
    for (i, c) in text.char_indices() {
        let w = char_width(c);
        if used + w > width {
            return &text[..i];
        }
        used += w;
    }
    text
}
