// Fully-owned rule entries, detached from whatever parsed them.
use std::borrow::Cow;
use std::fmt;

/// A single rule of a stylesheet, as the host exposes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssRuleEntry {
    /// The host serialized the rule itself, e.g. `a{color:red}` or a whole
    /// `@media` block.
    Text(String),
    /// Only the parts are known: e.g. selector `.c`, declarations `color:blue`.
    Declared {
        selector: String,
        declarations: String,
    },
}

impl CssRuleEntry {
    pub fn text(css_text: impl Into<String>) -> Self {
        CssRuleEntry::Text(css_text.into())
    }

    pub fn declared(selector: impl Into<String>, declarations: impl Into<String>) -> Self {
        CssRuleEntry::Declared {
            selector: selector.into(),
            declarations: declarations.into(),
        }
    }

    /// The rule's textual form: the direct text when present, otherwise
    /// `<selector> {<declarations>}`.
    pub fn css_text(&self) -> Cow<'_, str> {
        match self {
            CssRuleEntry::Text(text) => Cow::Borrowed(text),
            CssRuleEntry::Declared {
                selector,
                declarations,
            } => Cow::Owned(format!("{} {{{}}}", selector, declarations)),
        }
    }
}

impl fmt::Display for CssRuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css_text())
    }
}
