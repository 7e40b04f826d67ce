//! The host-facing view of a document's stylesheets.
//!
//! `StyleExtractor` only ever sees a document through these traits, so it can
//! run against the HTML host in `crate::source` or against any other object
//! model (a test double, a browser binding) that can list its sheets.

use crate::error::SheetAccessError;
use crate::style::rule::CssRuleEntry;

/// What a rule accessor hands back when access is not denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleList {
    /// The rules, in sheet order. May be empty.
    Rules(Vec<CssRuleEntry>),
    /// The accessor exists but yields no list (e.g. the sheet never loaded).
    Null,
    /// The sheet does not expose this accessor at all.
    Unsupported,
}

/// A single stylesheet attached to a document.
pub trait StyleSheet {
    /// The sheet's source URL, or `None` for inline styles.
    fn href(&self) -> Option<&str>;

    /// The CSSOM `cssRules` accessor.
    fn css_rules(&self) -> Result<RuleList, SheetAccessError>;

    /// The legacy `rules` alias, consulted only when `css_rules` is unsupported.
    fn rules(&self) -> Result<RuleList, SheetAccessError> {
        Ok(RuleList::Unsupported)
    }
}

/// An ordered, read-only collection of stylesheets (the document).
pub trait StyleSheetList {
    fn len(&self) -> usize;

    /// The sheet at `index` in document order.
    fn item(&self, index: usize) -> Option<&dyn StyleSheet>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> StyleSheetIter<'_, Self>
    where
        Self: Sized,
    {
        StyleSheetIter {
            list: self,
            index: 0,
        }
    }
}

/// Iterates a `StyleSheetList` in document order.
pub struct StyleSheetIter<'a, L: ?Sized> {
    list: &'a L,
    index: usize,
}

impl<'a, L: StyleSheetList + ?Sized> Iterator for StyleSheetIter<'a, L> {
    type Item = &'a dyn StyleSheet;

    fn next(&mut self) -> Option<Self::Item> {
        let sheet = self.list.item(self.index)?;
        self.index += 1;
        Some(sheet)
    }
}

/// Reads a sheet's rule list, preferring `cssRules` over the legacy alias.
pub fn resolve_rules(sheet: &dyn StyleSheet) -> Result<Option<Vec<CssRuleEntry>>, SheetAccessError> {
    let rules = match sheet.css_rules()? {
        RuleList::Unsupported => sheet.rules()?,
        supported => supported,
    };
    Ok(match rules {
        RuleList::Rules(rules) => Some(rules),
        RuleList::Null | RuleList::Unsupported => None,
    })
}

/// A plain, fully-owned stylesheet. Handy for hosts that snapshot their
/// object model up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedStyleSheet {
    pub href: Option<String>,
    pub rules: Result<RuleList, SheetAccessError>,
}

impl OwnedStyleSheet {
    pub fn inline(rules: Vec<CssRuleEntry>) -> Self {
        OwnedStyleSheet {
            href: None,
            rules: Ok(RuleList::Rules(rules)),
        }
    }

    pub fn linked(href: impl Into<String>, rules: Vec<CssRuleEntry>) -> Self {
        OwnedStyleSheet {
            href: Some(href.into()),
            rules: Ok(RuleList::Rules(rules)),
        }
    }

    pub fn denied(href: impl Into<String>, error: SheetAccessError) -> Self {
        OwnedStyleSheet {
            href: Some(href.into()),
            rules: Err(error),
        }
    }

    pub fn unloaded(href: impl Into<String>) -> Self {
        OwnedStyleSheet {
            href: Some(href.into()),
            rules: Ok(RuleList::Null),
        }
    }
}

impl StyleSheet for OwnedStyleSheet {
    fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    fn css_rules(&self) -> Result<RuleList, SheetAccessError> {
        self.rules.clone()
    }
}

impl StyleSheetList for Vec<OwnedStyleSheet> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn item(&self, index: usize) -> Option<&dyn StyleSheet> {
        self.get(index).map(|sheet| sheet as &dyn StyleSheet)
    }
}
