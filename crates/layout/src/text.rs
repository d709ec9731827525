//! Text measurement used by inline layout and shrink-to-fit sizing.

/// Measures glyph advances. Implementations must be deterministic: the same
/// string always measures the same, so that shrink-to-fit widths and line
/// filling agree.
pub trait TextMeasure: Send + Sync {
    fn advance(&self, ch: char, font_size: f32) -> f32;

    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|ch| self.advance(ch, font_size)).sum()
    }

    /// Width of `text` laid out on one line with whitespace collapsed.
    fn measure_collapsed(&self, text: &str, font_size: f32) -> f32 {
        let space = self.advance(' ', font_size);
        let mut width = 0.0;
        for (i, word) in text.split_whitespace().enumerate() {
            if i > 0 {
                width += space;
            }
            width += self.measure(word, font_size);
        }
        width
    }
}

/// Every glyph advances by a fixed fraction of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    pub em_fraction: f32,
}

impl FixedAdvance {
    pub fn new(em_fraction: f32) -> Self {
        Self { em_fraction }
    }
}

impl TextMeasure for FixedAdvance {
    fn advance(&self, _ch: char, font_size: f32) -> f32 {
        font_size * self.em_fraction
    }
}

/// Byte ranges of the whitespace-separated words in `text`.
pub fn word_ranges(text: &str) -> Vec<std::ops::Range<usize>> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push(s..text.len());
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_width_counts_single_spaces() {
        let measure = FixedAdvance::new(0.5);
        assert_eq!(measure.measure("abcd", 10.0), 20.0);
        assert_eq!(measure.measure_collapsed("  ab   cd ", 10.0), 25.0);
        assert_eq!(measure.measure_collapsed("   ", 10.0), 0.0);
    }

    #[test]
    fn word_ranges_skip_whitespace() {
        let text = " héllo  world\n";
        let words: Vec<&str> = word_ranges(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(words, vec!["héllo", "world"]);
    }
}
