//! Turns raw stylesheet text into `CssRuleEntry` values.
//!
//! cssparser splits the sheet into its top-level rules and LightningCSS
//! decides which of them are valid. A kept rule's text is its source text;
//! only with `normalize` is it re-serialized by LightningCSS.

use crate::style::rule::CssRuleEntry;
use cssparser::{ParseError, Parser, ParserInput, Token};
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule, CssRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;
use log::{debug, warn};

/// Parse `css_text` and return one entry per valid top-level rule, in source
/// order.
///
/// `source_name` only labels log messages. Invalid rules are dropped the way
/// a browser drops them from `cssRules`. When `normalize` is set, each rule is
/// printed by LightningCSS in minified form, which also rewrites values
/// (`blue` becomes `#00f`).
pub fn parse_rules(css_text: &str, source_name: &str, normalize: bool) -> Vec<CssRuleEntry> {
    let mut entries = Vec::new();
    for rule_text in split_rules(css_text) {
        let parser_opts = ParserOptions {
            filename: source_name.to_string(),
            error_recovery: true,
            ..ParserOptions::default()
        };
        let sheet = match LightningStyleSheet::parse(rule_text, parser_opts) {
            Ok(sheet) => sheet,
            Err(e) => {
                debug!("Dropping invalid rule in {}: {}", source_name, e);
                continue;
            }
        };
        let Some(rule) = sheet
            .rules
            .0
            .iter()
            .find(|rule| !matches!(rule, CssRule::Ignored))
        else {
            debug!("Dropping invalid rule in {}: {}", source_name, rule_text);
            continue;
        };

        if normalize {
            entries.extend(print_rule(rule, source_name));
        } else {
            entries.push(CssRuleEntry::text(rule_text));
        }
    }
    entries
}

/// Split `css_text` into the source text of its top-level rules.
///
/// A rule ends after its first `{}` block; an at-rule without a block ends at
/// its `;`. Comments and `<!--`/`-->` between rules are skipped.
fn split_rules(css_text: &str) -> Vec<&str> {
    let mut input = ParserInput::new(css_text);
    let mut parser = Parser::new(&mut input);
    let mut rules = Vec::new();

    loop {
        parser.skip_whitespace();
        let start = parser.position();
        let first = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        if matches!(first, Token::CDO | Token::CDC) {
            continue;
        }

        let is_at_rule = matches!(first, Token::AtKeyword(_));
        let mut token = first;
        loop {
            match token {
                Token::CurlyBracketBlock => {
                    skip_block(&mut parser);
                    break;
                }
                Token::Semicolon if is_at_rule => break,
                _ => {}
            }
            token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
        }

        let text = parser.slice_from(start).trim();
        if !text.is_empty() {
            rules.push(text);
        }
    }
    rules
}

fn skip_block<'i>(parser: &mut Parser<'i, '_>) {
    let _ = parser.parse_nested_block(|_| Ok::<_, ParseError<'i, ()>>(()));
}

fn print_rule(rule: &CssRule<'_>, source_name: &str) -> Option<CssRuleEntry> {
    let printer_opts = PrinterOptions {
        minify: true,
        ..PrinterOptions::default()
    };
    match rule.to_css_string(printer_opts) {
        Ok(text) if text.is_empty() => None,
        Ok(text) => Some(CssRuleEntry::Text(text)),
        Err(e) => match rule {
            CssRule::Style(style_rule) => {
                debug!("Rebuilding style rule in {} from parts: {}", source_name, e);
                Some(convert_style_rule(style_rule))
            }
            _ => {
                warn!("Dropping unprintable rule in {}: {}", source_name, e);
                None
            }
        },
    }
}

/// Copy a StyleRule's selectors and declarations into a `Declared` entry.
fn convert_style_rule(style_rule: &StyleRule<'_>) -> CssRuleEntry {
    let selectors: Vec<String> = style_rule
        .selectors
        .0
        .iter()
        .filter_map(|selector| selector.to_css_string(PrinterOptions::default()).ok())
        .collect();

    let block = &style_rule.declarations;
    let normal = block.declarations.iter().map(|property| (property, false));
    let important = block
        .important_declarations
        .iter()
        .map(|property| (property, true));

    let mut declarations = String::new();
    for (property, is_important) in normal.chain(important) {
        let Ok(value) = property.value_to_css_string(PrinterOptions::default()) else {
            continue;
        };
        declarations.push_str(property.property_id().name());
        declarations.push(':');
        declarations.push_str(&value);
        if is_important {
            declarations.push_str("!important");
        }
        declarations.push(';');
    }

    CssRuleEntry::Declared {
        selector: selectors.join(","),
        declarations,
    }
}
