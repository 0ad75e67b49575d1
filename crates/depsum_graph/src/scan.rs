//! Import specifier extraction from JavaScript module text.
//!
//! This is a lexical scan, not a parse. It recognizes `require("x")`,
//! dynamic `import("x")`, `import ... from "x"`, bare `import "x"` and
//! `export ... from "x"`. The pattern runs over a masked copy of the source in
//! which comments and literal contents are blanked, so neither commented-out
//! imports nor import-like text inside strings are followed. Specifiers are
//! then read back from the original text at the same byte offsets.

use std::sync::OnceLock;

use regex::Regex;

fn specifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Groups 1/2: call form (single/double quoted). Groups 3/4: static form.
        Regex::new(concat!(
            r#"(?:\brequire|\bimport)\s*\(\s*(?:'([^'\n]+)'|"([^"\n]+)")\s*\)"#,
            r#"|\b(?:import|export)\s+(?:[\w*{}\s,$]+?\s+from\s+)?(?:'([^'\n]+)'|"([^"\n]+)")"#,
        ))
        .unwrap_or_else(|e| unreachable!("specifier pattern is valid: {e}"))
    })
}

/// Returns the import specifiers of `source` in order of first appearance.
///
/// Duplicates are removed; the first occurrence wins.
pub fn extract_specifiers(source: &str) -> Vec<String> {
    let masked = mask_source(source);
    let mut out: Vec<String> = Vec::new();
    for caps in specifier_pattern().captures_iter(&masked) {
        let Some(m) = (1..=4).find_map(|i| caps.get(i)) else {
            continue;
        };
        let Some(raw) = source.get(m.range()) else {
            continue;
        };
        let specifier = raw.trim();
        if !specifier.is_empty() && !out.iter().any(|s| s == specifier) {
            out.push(specifier.to_string());
        }
    }
    out
}

/// Blanks comments and the contents of string and template literals.
///
/// Quotes stay in place and every blanked character becomes as many spaces as
/// it has UTF-8 bytes, so byte offsets into the result are valid offsets into
/// `source`. Newlines are kept so line structure survives.
pub fn mask_source(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Str(char),
        LineComment,
        BlockComment,
    }

    fn blank(out: &mut String, c: char) {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '\'' | '"' | '`' => {
                    out.push(c);
                    state = State::Str(c);
                }
                _ => out.push(c),
            },
            State::Str(quote) => {
                if c == '\\' {
                    blank(&mut out, c);
                    if let Some(escaped) = chars.next() {
                        blank(&mut out, escaped);
                    }
                } else if c == quote {
                    out.push(c);
                    state = State::Code;
                } else if c == '\n' && quote != '`' {
                    // Unterminated literal; resume scanning on the next line.
                    out.push(c);
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_require_calls() {
        let src = "var a = require('./a');\nconst b = require(\"../lib/b.js\");";
        assert_eq!(extract_specifiers(src), vec!["./a", "../lib/b.js"]);
    }

    #[test]
    fn finds_static_imports_and_exports() {
        let src = r#"
import React, { useState } from "react";
import * as path from 'path';
import "./side-effect.css";
export { helper } from './helper';
export * from "./all";
"#;
        assert_eq!(
            extract_specifiers(src),
            vec!["react", "path", "./side-effect.css", "./helper", "./all"]
        );
    }

    #[test]
    fn finds_multiline_import_clause() {
        let src = "import {\n  a,\n  b,\n} from './ab';";
        assert_eq!(extract_specifiers(src), vec!["./ab"]);
    }

    #[test]
    fn finds_dynamic_import() {
        let src = "const m = await import('./lazy');";
        assert_eq!(extract_specifiers(src), vec!["./lazy"]);
    }

    #[test]
    fn ignores_commented_imports() {
        let src = "// require('./dead');\n/* import x from './gone'; */\nrequire('./live');";
        assert_eq!(extract_specifiers(src), vec!["./live"]);
    }

    #[test]
    fn keeps_comment_markers_inside_strings() {
        let src = "const url = 'http://example.com'; require('./after');";
        assert_eq!(extract_specifiers(src), vec!["./after"]);
    }

    #[test]
    fn deduplicates_in_first_seen_order() {
        let src = "require('./b'); require('./a'); require('./b');";
        assert_eq!(extract_specifiers(src), vec!["./b", "./a"]);
    }

    #[test]
    fn no_imports() {
        assert!(extract_specifiers("const a = 1;").is_empty());
    }

    #[test]
    fn mask_preserves_line_count() {
        let src = "a /* one\ntwo */ b // three\nc";
        let stripped = mask_source(src);
        assert_eq!(stripped.lines().count(), src.lines().count());
        assert!(stripped.contains('a'));
        assert!(stripped.contains('c'));
        assert!(!stripped.contains("three"));
    }

    #[test]
    fn ignores_import_text_inside_strings() {
        let src = r#"console.log("usage: require('./plugin')");"#;
        assert!(extract_specifiers(src).is_empty());

        let src = "const help = `import x from './x'`;\nconst y = 'export * from \"./y\"';";
        assert!(extract_specifiers(src).is_empty());
    }

    #[test]
    fn string_with_import_text_before_real_import() {
        let src = "const s = \"require('./fake')\";\nconst real = require('./real');";
        assert_eq!(extract_specifiers(src), vec!["./real"]);
    }

    #[test]
    fn mask_keeps_byte_offsets() {
        let src = "const s = 'héllo ✓'; // ünïcode\nrequire('./a');";
        let masked = mask_source(src);
        assert_eq!(masked.len(), src.len());
        assert_eq!(masked.find("require"), src.find("require"));
        assert_eq!(extract_specifiers(src), vec!["./a"]);
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let src = r#"const s = 'it\'s require("./no")'; require('./yes');"#;
        assert_eq!(extract_specifiers(src), vec!["./yes"]);
    }
}
