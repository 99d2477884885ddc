//! Cleanup passes for Reddit-flavoured Markdown.
//!
//! Each pass is a function `&str -> String`. Source passes run in sequence on
//! the post body before parsing; the inline pass runs on individual text
//! nodes while rendering.

use std::sync::LazyLock;

use regex::Regex;

/// Run the source passes on a raw post body.
pub(crate) fn run_source_pipeline(md: &str) -> String {
    let mut result = normalize_line_endings(md);

    result = strip_zero_width(&result);
    result = unwrap_spoilers(&result);
    result = clean_blank_lines(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Line endings
// ---------------------------------------------------------------------------

fn normalize_line_endings(md: &str) -> String {
    md.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Zero-width placeholders
// ---------------------------------------------------------------------------

/// Remove `&#x200B;` placeholders the Reddit editor inserts for empty lines.
fn strip_zero_width(md: &str) -> String {
    static ZWSP_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)&#x200b;|&#8203;|\u{200B}").expect("valid regex")
    });

    ZWSP_RE.replace_all(md, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Spoilers
// ---------------------------------------------------------------------------

/// `>!hidden!<` has no e-reader equivalent; keep the text.
fn unwrap_spoilers(md: &str) -> String {
    static SPOILER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r">!(.+?)!<").expect("valid regex"));

    map_prose_lines(md, |line| SPOILER_RE.replace_all(line, "$1").to_string())
}

// ---------------------------------------------------------------------------
// Pass 4: Blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of 3+ blank lines into exactly 2.
fn clean_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Inline pass: Superscript
// ---------------------------------------------------------------------------

/// Escape one text run and render Reddit superscript (`^word`,
/// `^(several words)`) as `<sup>`.
///
/// Operates on a single text node, never on markup, so link targets, titles,
/// and alt text are out of reach. Callers skip code and image text.
pub(crate) fn superscript_text(text: &str) -> String {
    static GROUP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\^\(([^)]*)\)").expect("valid regex"));
    static WORD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\^([^\s<^]+)").expect("valid regex"));

    let escaped = html_escape::encode_text(text);
    let grouped = GROUP_RE.replace_all(&escaped, "<sup>$1</sup>");
    WORD_RE.replace_all(&grouped, "<sup>$1</sup>").to_string()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply `f` to every line outside fenced or indented code blocks.
fn map_prose_lines(md: &str, f: impl Fn(&str) -> String) -> String {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in md.split('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_code_block = !in_code_block;
            lines.push(line.to_string());
            continue;
        }

        if in_code_block || line.starts_with("    ") || line.starts_with('\t') {
            lines.push(line.to_string());
        } else {
            lines.push(f(line));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_placeholders_removed() {
        let md = "First.\n\n&#x200B;\n\nSecond.";
        assert_eq!(strip_zero_width(md), "First.\n\n\n\nSecond.");
        assert_eq!(strip_zero_width("a\u{200B}b"), "ab");
    }

    #[test]
    fn spoilers_unwrapped_outside_code() {
        let md = "She was >!the traitor!< all along.\n```\n>!keep!<\n```";
        let out = unwrap_spoilers(md);
        assert!(out.starts_with("She was the traitor all along."));
        assert!(out.contains(">!keep!<"));
    }

    #[test]
    fn blank_line_runs_collapsed() {
        assert_eq!(clean_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
        assert_eq!(clean_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn crlf_normalized() {
        assert_eq!(normalize_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn superscript_word_and_group() {
        assert_eq!(
            superscript_text("E = mc^2 and ^(small print)"),
            "E = mc<sup>2</sup> and <sup>small print</sup>"
        );
    }

    #[test]
    fn superscript_text_is_escaped() {
        assert_eq!(superscript_text("a < b ^c & d"), "a &lt; b <sup>c</sup> &amp; d");
        assert_eq!(superscript_text("no carets"), "no carets");
    }
}
