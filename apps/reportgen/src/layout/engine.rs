//! Greedy word-wrap and pagination.
//!
//! # Algorithm
//! - Tokens are whitespace-delimited; runs of whitespace collapse.
//! - A line grows one token at a time while its measured width stays within
//!   `usable_width`. A token that does not fit starts the next line.
//! - An empty line always accepts a token, so a single token wider than the page
//!   sits alone on its own line instead of being split or dropped. The token is
//!   still measured, so a failing measurer fails the whole layout.
//! - Lines are stacked from `margin_top` in steps of `line_spacing`. A page break
//!   happens before a line whose bottom would pass `page_height - margin_bottom`
//!   (strictly greater; touching the bottom margin is allowed).

use tracing::debug;

use crate::layout::config::LayoutConfig;
use crate::layout::document::{Document, Line, Metadata, Page};
use crate::layout::measure::TextMeasure;
use crate::layout::LayoutError;

const CAPACITY_EPSILON: f64 = 1e-5;

/// Lays out `text` into pages. Validates `config` first.
pub fn layout<M: TextMeasure>(
    text: &str,
    metadata: Metadata,
    config: &LayoutConfig,
    measure: M,
) -> Result<Document, LayoutError> {
    LayoutEngine::new(config.clone(), measure)?.layout(text, metadata)
}

/// A validated layout configuration paired with a width measurer.
pub struct LayoutEngine<M> {
    config: LayoutConfig,
    measure: M,
}

impl<M: TextMeasure> LayoutEngine<M> {
    pub fn new(config: LayoutConfig, measure: M) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config, measure })
    }

    pub fn layout(&self, text: &str, metadata: Metadata) -> Result<Document, LayoutError> {
        let lines = self.wrap_lines(text)?;
        let pages = self.paginate(lines);
        debug!(
            pages = pages.len(),
            title = %metadata.title,
            "laid out document"
        );
        Ok(Document { metadata, pages })
    }

    /// Breaks `text` into lines no wider than the usable width.
    pub fn wrap_lines(&self, text: &str) -> Result<Vec<String>, LayoutError> {
        let max_width = self.config.usable_width();
        let mut lines = Vec::new();
        let mut current = String::new();

        for token in text.split_whitespace() {
            if current.is_empty() {
                // An empty line takes the token whatever its width.
                self.width_of(token)?;
                current.push_str(token);
                continue;
            }

            let candidate = format!("{current} {token}");
            if self.width_of(&candidate)? <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, token.to_string()));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        Ok(lines)
    }

    /// Stacks wrapped lines onto numbered pages.
    ///
    /// Always returns at least one page; with no lines it is the single empty page.
    /// Line `i` of a page sits at `margin_top + i * line_spacing`.
    pub fn paginate(&self, lines: Vec<String>) -> Vec<Page> {
        let capacity = self.lines_per_page();
        let spacing = self.config.line_spacing;

        let mut pages = Vec::new();
        let mut page = Page::new(1);

        for text in lines {
            if page.lines.len() == capacity {
                let next = Page::new(page.number + 1);
                pages.push(std::mem::replace(&mut page, next));
            }
            let y = self.config.margin_top + spacing * page.lines.len() as f32;
            page.lines.push(Line { text, y });
        }
        pages.push(page);
        pages
    }

    /// Lines that fit between the margins, counting a line that ends exactly on
    /// the bottom margin. Computed in f64 with a small tolerance so fractional
    /// spacings that divide the usable height do not lose their last line.
    fn lines_per_page(&self) -> usize {
        let usable = f64::from(self.config.content_bottom()) - f64::from(self.config.margin_top);
        let ratio = usable / f64::from(self.config.line_spacing);
        ((ratio + CAPACITY_EPSILON).floor() as usize).max(1)
    }

    fn width_of(&self, text: &str) -> Result<f32, LayoutError> {
        let width = self.measure.measure(text)?;
        if !width.is_finite() {
            return Err(LayoutError::Measurement(format!(
                "non-finite width {width} for {text:?}"
            )));
        }
        Ok(width)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::research_text;
    use crate::layout::measure::MeasureError;

    /// Every character, spaces included, has the same advance.
    struct PerChar(f32);

    impl TextMeasure for PerChar {
        fn measure(&self, text: &str) -> Result<f32, MeasureError> {
            Ok(text.chars().count() as f32 * self.0)
        }
    }

    const FIXED: PerChar = PerChar(10.0);

    struct Failing;

    impl TextMeasure for Failing {
        fn measure(&self, text: &str) -> Result<f32, MeasureError> {
            Err(MeasureError {
                text: text.to_string(),
                reason: "face unavailable".to_string(),
            })
        }
    }

    struct NotANumber;

    impl TextMeasure for NotANumber {
        fn measure(&self, _text: &str) -> Result<f32, MeasureError> {
            Ok(f32::NAN)
        }
    }

    fn make_metadata() -> Metadata {
        Metadata {
            university: "جامعة __________".to_string(),
            college: "كلية __________".to_string(),
            department: "قسم __________".to_string(),
            title: "الذكاء الاصطناعي".to_string(),
        }
    }

    /// 100 units of usable width (10 characters), 800 units of usable height (8 lines).
    fn make_small_config() -> LayoutConfig {
        LayoutConfig {
            page_width: 300.0,
            page_height: 1000.0,
            margin_right: 100.0,
            margin_left: 100.0,
            margin_top: 100.0,
            margin_bottom: 100.0,
            line_spacing: 100.0,
            ..LayoutConfig::default()
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    // ── wrap_lines ──────────────────────────────────────────────────────────

    #[test]
    fn test_wrap_fills_lines_greedily() {
        let engine = LayoutEngine::new(make_small_config(), FIXED).unwrap();
        // "aaa bbb" is 7 chars = 70 ≤ 100; "aaa bbb ccc" is 110 > 100.
        let lines = engine.wrap_lines("aaa bbb ccc").unwrap();
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_exact_fit_is_accepted() {
        let engine = LayoutEngine::new(make_small_config(), FIXED).unwrap();
        // "abcd efghi" is exactly 10 chars = 100.
        let lines = engine.wrap_lines("abcd efghi j").unwrap();
        assert_eq!(lines, vec!["abcd efghi", "j"]);
    }

    #[test]
    fn test_wrap_collapses_whitespace_runs() {
        let engine = LayoutEngine::new(make_small_config(), FIXED).unwrap();
        let lines = engine.wrap_lines("  a \n\n b\t\tc  ").unwrap();
        assert_eq!(lines, vec!["a b c"]);
    }

    #[test]
    fn test_oversized_token_in_middle_gets_own_line() {
        let engine = LayoutEngine::new(make_small_config(), FIXED).unwrap();
        let lines = engine.wrap_lines("ab abcdefghijklmnop cd").unwrap();
        assert_eq!(lines, vec!["ab", "abcdefghijklmnop", "cd"]);
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_empty_text_yields_one_empty_page() {
        let doc = layout("", make_metadata(), &make_small_config(), FIXED).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].number, 1);
        assert!(doc.pages[0].lines.is_empty());

        let blank = layout(" \n\t ", make_metadata(), &make_small_config(), FIXED).unwrap();
        assert_eq!(blank, doc);
    }

    #[test]
    fn test_single_oversized_token_alone_on_one_line() {
        let token = "x".repeat(50);
        let doc = layout(&token, make_metadata(), &make_small_config(), FIXED).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].lines.len(), 1);
        assert_eq!(doc.pages[0].lines[0].text, token);
    }

    #[test]
    fn test_exactly_full_page_does_not_break() {
        // 8 lines × 100 == usable height 800: the eighth line touches the bottom margin.
        let config = make_small_config();
        let engine = LayoutEngine::new(config.clone(), FIXED).unwrap();
        let lines: Vec<String> = (0..8).map(|i| format!("line{i}")).collect();
        let pages = engine.paginate(lines);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines.len(), 8);
        let last = pages[0].lines.last().unwrap();
        assert_eq!(last.y + config.line_spacing, config.content_bottom());
    }

    #[test]
    fn test_one_line_past_full_page_breaks() {
        let engine = LayoutEngine::new(make_small_config(), FIXED).unwrap();
        let lines: Vec<String> = (0..9).map(|i| format!("line{i}")).collect();
        let pages = engine.paginate(lines);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.len(), 8);
        assert_eq!(pages[1].lines.len(), 1);
        assert_eq!(pages[1].lines[0].text, "line8");
        assert_eq!(pages[1].lines[0].y, 100.0);
    }

    #[test]
    fn test_fractional_spacing_exactly_full_page_does_not_break() {
        // 10 × 0.1 == usable height 1.0; repeated f32 addition would drift past it.
        let config = LayoutConfig {
            page_width: 10.0,
            page_height: 1.3,
            margin_right: 1.0,
            margin_left: 1.0,
            margin_top: 0.3,
            margin_bottom: 0.0,
            line_spacing: 0.1,
            ..LayoutConfig::default()
        };
        let engine = LayoutEngine::new(config.clone(), FIXED).unwrap();
        let lines: Vec<String> = (0..10).map(|i| format!("l{i}")).collect();
        let pages = engine.paginate(lines);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines.len(), 10);
        for (i, line) in pages[0].lines.iter().enumerate() {
            assert_eq!(line.y, config.margin_top + config.line_spacing * i as f32);
        }

        let eleven: Vec<String> = (0..11).map(|i| format!("l{i}")).collect();
        let pages = engine.paginate(eleven);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.len(), 10);
        assert_eq!(pages[1].lines[0].y, config.margin_top);
    }

    // ── properties ──────────────────────────────────────────────────────────

    #[test]
    fn test_coverage_preserves_token_sequence() {
        let text = research_text("نظم التشغيل الموزعة", 3);
        let doc = layout(&text, make_metadata(), &make_small_config(), FIXED).unwrap();
        let expected: Vec<&str> = text.split_whitespace().collect();
        let actual: Vec<&str> = doc.tokens().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_width_bound_holds_except_single_tokens() {
        let config = make_small_config();
        let text = format!("{} {} {}", words(40), "z".repeat(30), words(15));
        let doc = layout(&text, make_metadata(), &config, FIXED).unwrap();
        for line in doc.lines() {
            let width = FIXED.measure(&line.text).unwrap();
            if width > config.usable_width() {
                assert_eq!(line.tokens().count(), 1, "overflowing line {:?}", line.text);
            }
        }
    }

    #[test]
    fn test_height_bound_and_numbering() {
        let config = make_small_config();
        let doc = layout(&words(200), make_metadata(), &config, FIXED).unwrap();
        assert!(doc.page_count() > 1);
        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.number as usize, i + 1);
            assert!(!page.lines.is_empty());
            let used = config.margin_top + config.line_spacing * page.lines.len() as f32;
            assert!(used <= config.content_bottom());
        }
    }

    #[test]
    fn test_lines_are_placed_at_spacing_cadence() {
        let config = make_small_config();
        let doc = layout(&words(30), make_metadata(), &config, FIXED).unwrap();
        for page in &doc.pages {
            for (i, line) in page.lines.iter().enumerate() {
                assert_eq!(line.y, config.margin_top + config.line_spacing * i as f32);
            }
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let config = LayoutConfig::default();
        let text = research_text("الطاقة المتجددة", 5);
        let a = layout(&text, make_metadata(), &config, FIXED).unwrap();
        let b = layout(&text, make_metadata(), &config, FIXED).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_canned_report_spans_multiple_pages() {
        let text = research_text("الطاقة المتجددة", 5);
        // 40 units per character leaves ~48 characters per line on A4.
        let doc = layout(&text, make_metadata(), &LayoutConfig::default(), PerChar(40.0)).unwrap();
        assert!(doc.page_count() > 1, "got {} page(s)", doc.page_count());
    }

    // ── errors ──────────────────────────────────────────────────────────────

    #[test]
    fn test_invalid_config_fails_before_measuring() {
        let config = LayoutConfig {
            margin_left: 200.0,
            margin_right: 200.0,
            page_width: 300.0,
            ..LayoutConfig::default()
        };
        let result = layout("a b c", make_metadata(), &config, Failing);
        assert!(matches!(result, Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_measure_failure_is_fatal() {
        let result = layout("a b", make_metadata(), &make_small_config(), Failing);
        assert!(matches!(result, Err(LayoutError::Measurement(_))));
    }

    #[test]
    fn test_non_finite_width_is_fatal() {
        let result = layout("a b", make_metadata(), &make_small_config(), NotANumber);
        assert!(matches!(result, Err(LayoutError::Measurement(msg)) if msg.contains("non-finite")));
    }

    #[test]
    fn test_single_token_is_still_measured() {
        let failing = layout("وحيد", make_metadata(), &LayoutConfig::default(), Failing);
        assert!(matches!(failing, Err(LayoutError::Measurement(_))));

        let nan = layout("وحيد", make_metadata(), &LayoutConfig::default(), NotANumber);
        assert!(matches!(nan, Err(LayoutError::Measurement(msg)) if msg.contains("non-finite")));
    }
}
