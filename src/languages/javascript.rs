//! JavaScript and TypeScript indentation rules.
//!
//! Two spaces per level, indent after an opening brace, bracket, paren,
//! arrow or ternary `?`, and pull closing delimiters back one level.
//! TypeScript shares every rule with JavaScript.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{CustomIndentRule, DedentRule, IndentRule, LanguageIndentConfig, RuleContext};

const TAB_SIZE: usize = 2;

lazy_static! {
    // "function test() {", "const obj = {  // comment"
    static ref OPEN_BRACE: Regex = Regex::new(r"\{\s*(//.*)?$").unwrap();
    static ref OPEN_BRACKET: Regex = Regex::new(r"\[\s*(//.*)?$").unwrap();
    static ref OPEN_PAREN: Regex = Regex::new(r"\(\s*(//.*)?$").unwrap();
    // "const func = () =>"
    static ref ARROW: Regex = Regex::new(r"=>\s*(//.*)?$").unwrap();
    // "const result = condition ?"
    static ref TERNARY: Regex = Regex::new(r"\?\s*(//.*)?$").unwrap();

    static ref RETURN: Regex = Regex::new(r"^\s*return(\s|;)").unwrap();
    static ref BREAK_CONTINUE: Regex = Regex::new(r"^\s*(break|continue)(\s|;)").unwrap();
    static ref THROW: Regex = Regex::new(r"^\s*throw(\s|;)").unwrap();

    static ref CLOSE_BRACE: Regex = Regex::new(r"^\s*\}").unwrap();
    static ref CLOSE_BRACKET: Regex = Regex::new(r"^\s*\]").unwrap();
    static ref CLOSE_PAREN: Regex = Regex::new(r"^\s*\)").unwrap();
    static ref CASE_LABEL: Regex = Regex::new(r"^\s*(case\s+.*:|default:)").unwrap();

    static ref COMMENT: Regex = Regex::new(r"^\s*(//|/\*)").unwrap();
}

/// Build the JavaScript rule set.
pub fn javascript_indent_config() -> LanguageIndentConfig {
    let indent = |name: &str, pattern: &Regex| {
        IndentRule::new(name, pattern.clone(), RuleContext::LineEnd, TAB_SIZE)
    };
    let dedent = |name: &str, pattern: &Regex| {
        DedentRule::new(name, pattern.clone(), RuleContext::LineStart, TAB_SIZE)
    };

    LanguageIndentConfig {
        language: "javascript".to_string(),
        tab_size: TAB_SIZE,
        use_tabs: false,
        indent_triggers: vec![
            indent("open-brace", &OPEN_BRACE),
            indent("open-bracket", &OPEN_BRACKET),
            indent("open-paren", &OPEN_PAREN),
            indent("arrow-function", &ARROW),
            indent("ternary-operator", &TERNARY),
        ],
        dedent_triggers: vec![
            dedent("return-statement", &RETURN),
            dedent("break-continue", &BREAK_CONTINUE),
            dedent("throw-statement", &THROW),
        ],
        custom_rules: vec![
            CustomIndentRule::dedent_on("close-brace-dedent", CLOSE_BRACE.clone(), TAB_SIZE),
            CustomIndentRule::dedent_on("close-bracket-dedent", CLOSE_BRACKET.clone(), TAB_SIZE),
            CustomIndentRule::dedent_on("close-paren-dedent", CLOSE_PAREN.clone(), TAB_SIZE),
            // Switch labels stay where they are; this is not switch-aware.
            CustomIndentRule::new(
                "case-label",
                |line, _| CASE_LABEL.is_match(line),
                |indent, _| indent,
            ),
        ],
    }
}

/// Build the TypeScript rule set (JavaScript rules, TypeScript tag).
pub fn typescript_indent_config() -> LanguageIndentConfig {
    javascript_indent_config().with_language("typescript")
}

/// Whether the line starts with a `//` or `/*` comment.
pub fn is_javascript_comment(line: &str) -> bool {
    COMMENT.is_match(line)
}

/// Whether the line leaves a template literal open (odd backtick count).
pub fn is_in_template_literal(line: &str) -> bool {
    line.matches('`').count() % 2 != 0
}
