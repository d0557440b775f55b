//! Response sanitizer - turns model markup into speakable plain text
//!
//! The transform is an ordered list of [`SanitizeStep`]s. Each step can only
//! remove characters, and the whole chain is repeated until the text stops
//! changing, so `sanitize(sanitize(x)) == sanitize(x)` holds for any input.
//! Markers without a matching partner are left in place.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

/// One stage of the transform, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeStep {
    /// Drop `<think>…</think>` spans entirely
    HiddenReasoning,
    /// `*x*`, `**x**`, `__x__` and friends become `x`
    Emphasis,
    /// `` `x` `` and fenced spans become `x`
    InlineCode,
    /// `# Title` becomes `Title`
    Headings,
    /// `> quote` becomes `quote`
    Blockquotes,
    /// `- item` becomes `・item`, `1. item` becomes `item`
    ListMarkers,
    /// `[label](target)` becomes `label`
    Links,
    /// Surrounding whitespace
    Trim,
}

impl SanitizeStep {
    /// Every step, in the order they run
    pub const ALL: [Self; 8] = [
        Self::HiddenReasoning,
        Self::Emphasis,
        Self::InlineCode,
        Self::Headings,
        Self::Blockquotes,
        Self::ListMarkers,
        Self::Links,
        Self::Trim,
    ];

    /// Apply this step once
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::HiddenReasoning => THINK.replace_all(text, "").into_owned(),
            Self::Emphasis => {
                let starred = STAR_EMPHASIS.replace_all(text, first_group);
                UNDERSCORE_EMPHASIS
                    .replace_all(&starred, underscore_group)
                    .into_owned()
            },
            Self::InlineCode => INLINE_CODE.replace_all(text, first_group).into_owned(),
            Self::Headings => HEADING.replace_all(text, "").into_owned(),
            Self::Blockquotes => BLOCKQUOTE.replace_all(text, "").into_owned(),
            Self::ListMarkers => {
                let bulleted = BULLET_MARKER.replace_all(text, BULLET_REPLACEMENT);
                NUMBERED_MARKER.replace_all(&bulleted, "${1}").into_owned()
            },
            Self::Links => LINK.replace_all(text, "${1}").into_owned(),
            Self::Trim => text.trim().to_string(),
        }
    }
}

const BULLET_REPLACEMENT: &str = "${1}・";

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::expect_used)] // Infallible with valid static patterns
            Regex::new($pattern).expect("Invalid sanitizer pattern")
        });
    };
}

static_regex!(THINK, r"(?s)<think>.*?</think>");

// Inner text must start and end with a non-space, non-marker character.
static_regex!(
    STAR_EMPHASIS,
    concat!(
        r"\*\*\*([^\s*]|[^\s*][^\n]*?[^\s*])\*\*\*",
        r"|\*\*([^\s*]|[^\s*][^\n]*?[^\s*])\*\*",
        r"|\*([^\s*]|[^\s*][^\n]*?[^\s*])\*",
    )
);

// Underscores inside words (snake_case) are not emphasis.
static_regex!(
    UNDERSCORE_EMPHASIS,
    concat!(
        r"(^|[^\w])(?:",
        r"___([^\s_]|[^\s_][^\n]*?[^\s_])___",
        r"|__([^\s_]|[^\s_][^\n]*?[^\s_])__",
        r"|_([^\s_]|[^\s_][^\n]*?[^\s_])_",
        r")(?:$|([^\w]))",
    )
);

static_regex!(
    INLINE_CODE,
    concat!(
        r"(?s:```([^`]+?)```)",
        r"|``([^`\n]+?)``",
        r"|`([^`\n]+)`",
    )
);

static_regex!(HEADING, r"(?m)^[ \t]*#{1,6}[ \t]+");

static_regex!(BLOCKQUOTE, r"(?m)^[ \t]*>[ \t]?");

static_regex!(BULLET_MARKER, r"(?m)^([ \t]*)[-*+][ \t]+");

static_regex!(NUMBERED_MARKER, r"(?m)^([ \t]*)\d{1,3}[.)][ \t]+");

static_regex!(LINK, r"!?\[([^\]\n]*)\]\([^)\n]*\)");

fn first_group(caps: &Captures<'_>) -> String {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map_or_else(String::new, |m| m.as_str().to_string())
}

fn underscore_group(caps: &Captures<'_>) -> String {
    let before = caps.get(1).map_or("", |m| m.as_str());
    let inner = (2..=4).find_map(|i| caps.get(i)).map_or("", |m| m.as_str());
    let after = caps.get(5).map_or("", |m| m.as_str());
    format!("{before}{inner}{after}")
}

/// Stateless markup remover applied to every model reply
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    /// Create a sanitizer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run every step once, in order
    #[must_use]
    pub fn sanitize_once(&self, text: &str) -> String {
        SanitizeStep::ALL
            .iter()
            .fold(text.to_string(), |acc, step| step.apply(&acc))
    }

    /// Strip markup until the text reaches a fixed point
    #[must_use]
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut current = text.to_string();
        let mut rounds = 0_u32;
        loop {
            let next = self.sanitize_once(&current);
            rounds += 1;
            if next == current {
                trace!(rounds, "Sanitized response");
                return next;
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn clean(text: &str) -> String {
        ResponseSanitizer::new().sanitize(text)
    }

    #[test]
    fn empty_input_is_unchanged() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(clean("こんにちは。元気ですか？"), "こんにちは。元気ですか？");
    }

    #[test]
    fn hidden_reasoning_is_removed() {
        assert_eq!(clean("a<think>secret\nmore</think>b"), "ab");
        assert_eq!(
            clean("<think>one</think>keep<think>two</think> this"),
            "keep this"
        );
    }

    #[test]
    fn unclosed_think_tag_is_left() {
        assert_eq!(clean("a<think>b"), "a<think>b");
    }

    #[test]
    fn emphasis_keeps_inner_text() {
        assert_eq!(clean("**bold** and *it* and ***both***"), "bold and it and both");
        assert_eq!(clean("__strong__ _em_"), "strong em");
    }

    #[test]
    fn unbalanced_emphasis_is_left() {
        assert_eq!(clean("2 * 3 = 6"), "2 * 3 = 6");
        assert_eq!(clean("**bold"), "**bold");
    }

    #[test]
    fn snake_case_is_not_emphasis() {
        assert_eq!(clean("use snake_case_name here"), "use snake_case_name here");
    }

    #[test]
    fn inline_code_keeps_inner_text() {
        assert_eq!(clean("run `cargo` now"), "run cargo now");
        assert_eq!(clean("``a`` and ```b```"), "a and b");
    }

    #[test]
    fn headings_become_plain() {
        assert_eq!(clean("# Title\n### Sub\n#hashtag"), "Title\nSub\n#hashtag");
    }

    #[test]
    fn blockquotes_become_plain() {
        assert_eq!(clean("> quoted\n>> nested"), "quoted\nnested");
    }

    #[test]
    fn bullets_become_glyph() {
        assert_eq!(clean("- item1\n* item2"), "・item1\n・item2");
        assert_eq!(clean("+ a\n  - b"), "・a\n  ・b");
    }

    #[test]
    fn numbered_markers_are_removed() {
        assert_eq!(clean("1. first\n2) second"), "first\nsecond");
    }

    #[test]
    fn links_keep_label() {
        assert_eq!(clean("[docs](http://x)"), "docs");
        assert_eq!(clean("see [here](https://a.b/c) now"), "see here now");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(clean("  \n hi \n\n"), "hi");
    }

    #[test]
    fn steps_run_in_order() {
        let text = "<think>plan</think>\n## **Correction**\n- `食べる` → [食べます](x)";
        assert_eq!(clean(text), "Correction\n・食べる → 食べます");
    }

    #[test]
    fn each_step_never_lengthens() {
        let text = "# h\n- **b** `c` [d](e) > f <think>g</think>";
        for step in SanitizeStep::ALL {
            assert!(step.apply(text).chars().count() <= text.chars().count());
        }
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(text in r"[a-z #*_`>\[\]()\-+.1<>/think\n]{0,60}") {
            let once = clean(&text);
            prop_assert_eq!(clean(&once), once);
        }

        #[test]
        fn sanitize_never_lengthens(text in r"[a-z #*_`\[\]()\-\n]{0,60}") {
            prop_assert!(clean(&text).chars().count() <= text.chars().count());
        }
    }
}
