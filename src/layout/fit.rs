//! Fitting variable-length text into fixed card bounds.

use crate::metrics::{Font, TextMeasure};

/// Texts longer than this many characters are truncated instead of wrapped.
pub const TRUNCATE_THRESHOLD: usize = 50;
/// Truncation never shortens a text below this many characters.
pub const MIN_TRUNCATED_CHARS: usize = 10;
pub const ELLIPSIS: &str = "...";

/// Font face and size used to measure a block of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32) -> Self {
        Self { font, size }
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Long texts become a single ellipsized line; shorter ones are greedily
/// word-wrapped.
pub fn fit_text<M: TextMeasure>(
    measure: &M,
    text: &str,
    style: TextStyle,
    max_width: f32,
) -> Vec<String> {
    if text.chars().count() > TRUNCATE_THRESHOLD {
        vec![truncate_with_ellipsis(measure, text, style, max_width)]
    } else {
        wrap_words(measure, text, style, max_width)
    }
}

/// Drop trailing characters until `text + "..."` fits, keeping at least
/// [`MIN_TRUNCATED_CHARS`] characters.
pub fn truncate_with_ellipsis<M: TextMeasure>(
    measure: &M,
    text: &str,
    style: TextStyle,
    max_width: f32,
) -> String {
    let mut kept: Vec<char> = text.chars().collect();
    loop {
        let mut candidate: String = kept.iter().collect();
        candidate.push_str(ELLIPSIS);
        let fits = measure.text_width(&candidate, style.font, style.size) <= max_width;
        if fits || kept.len() <= MIN_TRUNCATED_CHARS {
            return candidate;
        }
        kept.pop();
    }
}

/// Greedy whitespace word wrap. A word wider than `max_width` gets a line of
/// its own rather than being split.
pub fn wrap_words<M: TextMeasure>(
    measure: &M,
    text: &str,
    style: TextStyle,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.text_width(&candidate, style.font, style.size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(text.to_string());
    }
    lines
}

/// Keep at most `max_lines` lines. When lines are dropped the last kept line
/// is shortened until it fits with a trailing ellipsis.
pub fn limit_lines<M: TextMeasure>(
    measure: &M,
    mut lines: Vec<String>,
    style: TextStyle,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    if max_lines == 0 || lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let mut kept: Vec<char> = last.chars().collect();
        loop {
            let mut candidate: String = kept.iter().collect::<String>().trim_end().to_string();
            candidate.push_str(ELLIPSIS);
            if kept.is_empty() || measure.text_width(&candidate, style.font, style.size) <= max_width {
                *last = candidate;
                break;
            }
            kept.pop();
        }
    }
    lines
}

/// Where a block of lines sits relative to its anchor `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    /// First baseline on the anchor, lines stacked downward.
    Top,
    /// Block of baselines centered on the anchor.
    Center,
    /// Last baseline on the anchor.
    Bottom,
}

/// Baseline of the first line for `line_count` lines spaced by `line_height`.
pub fn block_start_y(
    line_count: usize,
    line_height: f32,
    anchor_y: f32,
    anchor: VerticalAnchor,
) -> f32 {
    let span = line_count.saturating_sub(1) as f32 * line_height;
    match anchor {
        VerticalAnchor::Top => anchor_y,
        VerticalAnchor::Center => anchor_y + span / 2.0,
        VerticalAnchor::Bottom => anchor_y + span,
    }
}

/// A single line positioned by its left baseline point.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Center each line horizontally on `center_x`, first baseline at `start_y`.
pub fn center_lines<M: TextMeasure>(
    measure: &M,
    lines: &[String],
    style: TextStyle,
    center_x: f32,
    start_y: f32,
    line_height: f32,
) -> Vec<PlacedLine> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let width = measure.text_width(line, style.font, style.size);
            PlacedLine {
                text: line.clone(),
                x: center_x - width / 2.0,
                y: start_y - i as f32 * line_height,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Helvetica;
    use pretty_assertions::assert_eq;

    /// Every character is exactly one unit wide at size 1.
    struct Mono;

    impl TextMeasure for Mono {
        fn text_width(&self, text: &str, _font: Font, size: f32) -> f32 {
            text.chars().count() as f32 * size
        }
    }

    const MONO: TextStyle = TextStyle::new(Font::Regular, 1.0);
    const TITLE: TextStyle = TextStyle::new(Font::Bold, 20.0);

    #[test]
    fn wraps_greedily() {
        let lines = wrap_words(&Mono, "the quick brown fox jumps", MONO, 10.0);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrapped_lines_respect_width_and_keep_words() {
        let text = "Somebody That I Used To Know (feat. Kimbra)";
        for max_width in [120.0, 160.0, 272.0] {
            let lines = fit_text(&Helvetica, text, TITLE, max_width);
            for line in &lines {
                assert!(Helvetica.text_width(line, TITLE.font, TITLE.size) <= max_width, "{line}");
            }
            let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
            let original: Vec<&str> = text.split_whitespace().collect();
            assert_eq!(rejoined, original);
        }
    }

    /// Deterministic word lists: `count` words whose lengths cycle through `pattern`.
    fn word_list(count: usize, pattern: &[usize], seed: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let len = pattern[(i + seed) % pattern.len()];
                let letter = (b'a' + ((i * 7 + seed) % 26) as u8) as char;
                letter.to_string().repeat(len)
            })
            .collect()
    }

    #[test]
    fn wrap_sweep_respects_width_and_word_order() {
        let patterns: [&[usize]; 4] = [&[1], &[3, 1, 4], &[2, 7, 1, 8, 2], &[5, 5, 9]];
        for pattern in patterns {
            for count in 1..=12 {
                for seed in 0..3 {
                    let words = word_list(count, pattern, seed);
                    let text = words.join(" ");
                    let widest = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);
                    for max_width in widest..=widest + 20 {
                        let max_width = max_width as f32;
                        let lines = wrap_words(&Mono, &text, MONO, max_width);
                        for line in &lines {
                            assert!(
                                Mono.text_width(line, MONO.font, MONO.size) <= max_width,
                                "{line:?} wider than {max_width} for {text:?}"
                            );
                        }
                        let rejoined: Vec<&str> =
                            lines.iter().flat_map(|l| l.split_whitespace()).collect();
                        assert_eq!(rejoined, words.iter().map(String::as_str).collect::<Vec<_>>());
                        assert!(lines.iter().all(|l| !l.is_empty()));
                    }
                }
            }
        }
    }

    #[test]
    fn wrap_sweep_with_real_metrics() {
        let words = word_list(9, &[2, 6, 4, 9, 3], 1);
        let text = words.join(" ");
        for font in [Font::Regular, Font::Bold] {
            let style = TextStyle::new(font, 16.0);
            let widest = words
                .iter()
                .map(|w| Helvetica.text_width(w, font, 16.0))
                .fold(0.0f32, f32::max);
            for step in 0..40 {
                let max_width = widest + step as f32 * 7.5;
                let lines = wrap_words(&Helvetica, &text, style, max_width);
                for line in &lines {
                    assert!(Helvetica.text_width(line, font, 16.0) <= max_width, "{line}");
                }
                assert_eq!(lines.join(" "), text);
            }
        }
    }

    #[test]
    fn limit_lines_keeps_short_blocks() {
        let lines = vec!["ab".to_string(), "cd".to_string()];
        assert_eq!(limit_lines(&Mono, lines.clone(), MONO, 5.0, 3), lines);
    }

    #[test]
    fn limit_lines_ellipsizes_last_kept_line() {
        let lines: Vec<String> = ["abcde", "fghij", "klmno", "pqrst"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let limited = limit_lines(&Mono, lines, MONO, 6.0, 3);
        assert_eq!(limited, vec!["abcde", "fghij", "klm..."]);
        assert!(limited.iter().all(|l| Mono.text_width(l, MONO.font, MONO.size) <= 6.0));
    }

    #[test]
    fn oversized_word_gets_own_line() {
        let lines = wrap_words(&Mono, "a Supercalifragilistic b", MONO, 5.0);
        assert_eq!(lines, vec!["a", "Supercalifragilistic", "b"]);
    }

    #[test]
    fn blank_text_is_returned_verbatim() {
        assert_eq!(wrap_words(&Mono, "", MONO, 5.0), vec![""]);
        assert_eq!(wrap_words(&Mono, "   ", MONO, 5.0), vec!["   "]);
    }

    #[test]
    fn long_text_becomes_one_ellipsized_line() {
        let text = "x".repeat(TRUNCATE_THRESHOLD + 1);
        let lines = fit_text(&Mono, &text, MONO, 20.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(ELLIPSIS));
        assert_eq!(lines[0].chars().count(), 20);
    }

    #[test]
    fn fifty_one_chars_always_truncate_even_when_they_fit() {
        let text = "y".repeat(51);
        let lines = fit_text(&Mono, &text, MONO, 1000.0);
        assert_eq!(lines, vec![format!("{text}{ELLIPSIS}")]);
    }

    #[test]
    fn short_text_wraps_without_ellipsis() {
        let text = "word ".repeat(10);
        let text = text.trim_end();
        assert_eq!(text.chars().count(), 49);
        let lines = fit_text(&Mono, text, MONO, 14.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| !l.ends_with(ELLIPSIS)));
    }

    #[test]
    fn truncation_stops_at_minimum_length() {
        let text = "z".repeat(60);
        let line = truncate_with_ellipsis(&Mono, &text, MONO, 1.0);
        assert_eq!(line, format!("{}{ELLIPSIS}", "z".repeat(MIN_TRUNCATED_CHARS)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(60);
        let line = truncate_with_ellipsis(&Mono, &text, MONO, 15.0);
        assert_eq!(line, format!("{}{ELLIPSIS}", "é".repeat(12)));
    }

    #[test]
    fn block_anchors() {
        assert_eq!(block_start_y(3, 24.0, 100.0, VerticalAnchor::Top), 100.0);
        assert_eq!(block_start_y(3, 24.0, 100.0, VerticalAnchor::Center), 124.0);
        assert_eq!(block_start_y(3, 24.0, 100.0, VerticalAnchor::Bottom), 148.0);
        assert_eq!(block_start_y(1, 24.0, 100.0, VerticalAnchor::Center), 100.0);
        assert_eq!(block_start_y(0, 24.0, 100.0, VerticalAnchor::Bottom), 100.0);
    }

    #[test]
    fn centers_each_line() {
        let lines = vec!["abcd".to_string(), "ab".to_string()];
        let placed = center_lines(&Mono, &lines, MONO, 50.0, 10.0, 2.0);
        assert_eq!(
            placed,
            vec![
                PlacedLine { text: "abcd".to_string(), x: 48.0, y: 10.0 },
                PlacedLine { text: "ab".to_string(), x: 49.0, y: 8.0 },
            ]
        );
    }
}
