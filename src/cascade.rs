//! Structural queries and the selector fallback cascade.
//!
//! Sites drift: the container class that held the chapter list last month
//! may be renamed tomorrow. Instead of one fixed selector per layout
//! revision, every lookup in this crate runs an ordered list of candidate
//! selectors until one yields a plausible match count.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// A parsed page that can be queried repeatedly without re-parsing.
pub struct Page {
    doc: Html,
}

/// One matched element, detached from the document.
#[derive(Debug, Clone)]
pub struct MatchedNode {
    /// Trimmed text content of the element and its descendants.
    pub text: String,

    /// Attribute map of the element itself.
    pub attrs: HashMap<String, String>,

    /// Markup nested inside the element.
    pub inner_html: String,
}

impl MatchedNode {
    fn from_element(elem: ElementRef<'_>) -> Self {
        let text = elem.text().collect::<String>().trim().to_string();
        let attrs = elem
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            text,
            attrs,
            inner_html: elem.inner_html(),
        }
    }

    /// Returns the named attribute, if present and non-empty.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns the first non-empty attribute among `candidates`.
    ///
    /// Lazy-loading layouts shuffle the real target between `src`,
    /// `data-src` and friends; an ordered probe handles all of them.
    pub fn first_attr(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|name| self.attr(name))
    }
}

impl Page {
    /// Parses markup into a queryable page.
    pub fn parse(markup: &str) -> Self {
        Self {
            doc: Html::parse_document(markup),
        }
    }

    /// Runs one selector expression, returning matches in document order.
    ///
    /// An expression that fails to parse behaves like one that matches
    /// nothing, so a stale entry in a cascade degrades instead of failing.
    pub fn query(&self, expr: &str) -> Vec<MatchedNode> {
        let Ok(selector) = Selector::parse(expr) else {
            return Vec::new();
        };

        self.doc
            .select(&selector)
            .map(MatchedNode::from_element)
            .collect()
    }

    /// Returns the full text content of the page.
    pub fn text(&self) -> String {
        self.doc.root_element().text().collect()
    }
}

/// Evaluates selector expressions in order, returning the first result
/// whose match count is non-zero and, when `range` is given, within
/// `[lo, hi]` inclusive.
///
/// If no expression satisfies the range, the largest result seen is
/// returned instead: more candidates beats none.
pub fn cascade(page: &Page, exprs: &[String], range: Option<(usize, usize)>) -> Vec<MatchedNode> {
    let mut best: Vec<MatchedNode> = Vec::new();

    for expr in exprs {
        let nodes = page.query(expr);
        if nodes.is_empty() {
            continue;
        }

        match range {
            Some((lo, hi)) if nodes.len() < lo || nodes.len() > hi => {
                if nodes.len() > best.len() {
                    best = nodes;
                }
            }
            _ => return nodes,
        }
    }

    best
}
