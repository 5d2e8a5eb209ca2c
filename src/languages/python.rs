//! Python indentation rules (PEP 8).
//!
//! - 4 spaces per indentation level
//! - Indent after a block-opening colon, a line continuation, or an open bracket
//! - Flag flow-control keywords (`return`, `break`, `continue`, `pass`, `raise`)
//!   as block enders

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{CustomIndentRule, DedentRule, IndentRule, LanguageIndentConfig, RuleContext};

const TAB_SIZE: usize = 4;

lazy_static! {
    // "if x > 0:", "def foo():  # comment"
    static ref COLON: Regex = Regex::new(r":\s*(#.*)?$").unwrap();
    // "result = some_function() \"
    static ref BACKSLASH: Regex = Regex::new(r"\\\s*(#.*)?$").unwrap();
    // "result = my_function("
    static ref OPEN_BRACKET: Regex = Regex::new(r"[\[({]\s*$").unwrap();
    static ref FLOW_CONTROL: Regex = Regex::new(r"^\s*(return|break|continue|pass)(\s|$)").unwrap();
    static ref RAISE: Regex = Regex::new(r"^\s*raise(\s|$)").unwrap();
    static ref CLOSE_BRACKET: Regex = Regex::new(r"^\s*[\])}]").unwrap();

    static ref COMMENT: Regex = Regex::new(r"^\s*#").unwrap();
    static ref TRIPLE_QUOTE: Regex = Regex::new(r#""""|'''"#).unwrap();
    static ref SINGLE_QUOTED: Regex = Regex::new(r"'[^']*'").unwrap();
    static ref DOUBLE_QUOTED: Regex = Regex::new(r#""[^"]*""#).unwrap();
}

/// Build the Python rule set.
pub fn python_indent_config() -> LanguageIndentConfig {
    LanguageIndentConfig {
        language: "python".to_string(),
        tab_size: TAB_SIZE,
        use_tabs: false,
        indent_triggers: vec![
            IndentRule::new("colon-indent", COLON.clone(), RuleContext::LineEnd, TAB_SIZE)
                .unless(is_colon_in_string_or_comment),
            IndentRule::new(
                "continuation-backslash",
                BACKSLASH.clone(),
                RuleContext::LineEnd,
                TAB_SIZE,
            ),
            IndentRule::new("open-bracket", OPEN_BRACKET.clone(), RuleContext::LineEnd, TAB_SIZE),
        ],
        dedent_triggers: vec![
            DedentRule::new(
                "flow-control-keywords",
                FLOW_CONTROL.clone(),
                RuleContext::LineStart,
                TAB_SIZE,
            ),
            DedentRule::new("raise-keyword", RAISE.clone(), RuleContext::LineStart, TAB_SIZE),
        ],
        custom_rules: vec![CustomIndentRule::dedent_on(
            "close-bracket-dedent",
            CLOSE_BRACKET.clone(),
            TAB_SIZE,
        )],
    }
}

/// Whether the line is a `#` comment.
pub fn is_python_comment(line: &str) -> bool {
    COMMENT.is_match(line)
}

/// Whether the line leaves a triple-quoted string open.
///
/// Counts `"""`/`'''` on this line only; an odd count means the line opens
/// or closes a multi-line string.
pub fn is_in_multiline_string(line: &str) -> bool {
    TRIPLE_QUOTE.find_iter(line).count() % 2 != 0
}

/// Whether the line's trailing colon sits inside a string literal or comment.
///
/// String literals and the `#` comment are stripped first; the line only
/// opens a block when the remaining code still ends in `:`. Returns `true`
/// for `print("Hello: World")`, `y = d[1:2]  # todo:` and lines without a
/// trailing colon.
pub fn is_colon_in_string_or_comment(line: &str) -> bool {
    let without_single = SINGLE_QUOTED.replace_all(line, "");
    let cleaned = DOUBLE_QUOTED.replace_all(&without_single, "");
    let cleaned: &str = &cleaned;

    let code = match cleaned.find('#') {
        Some(idx) => &cleaned[..idx],
        None => cleaned,
    };

    !code.trim_end().ends_with(':')
}
