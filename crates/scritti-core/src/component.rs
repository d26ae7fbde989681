//! Component assets: an indentation-based element tree.
//!
//! Each non-blank line is one element. Leading whitespace (tabs or spaces,
//! one column each) sets the depth; a line nested deeper than the line
//! above becomes its child. A line reads:
//!
//! ```text
//! style [tag] [| text]
//! ```
//!
//! `style` names the element's style asset and is what makes a component
//! depend on styles. `tag` defaults to `div` at render time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::key::AssetKey;

/// One node of a component tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Name of the style asset applied to this element.
    pub style: String,
    /// Optional HTML tag.
    pub tag: Option<String>,
    /// Optional literal text content.
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(style: impl Into<String>) -> Self {
        Element {
            style: style.into(),
            tag: None,
            text: None,
            children: Vec::new(),
        }
    }

    /// Appends a child and returns a mutable reference to it.
    pub fn append(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Visits this element and all descendants, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    fn parse_line(content: &str, line: usize) -> Result<Element, CoreError> {
        let (head, text) = match content.split_once('|') {
            Some((head, text)) => {
                let text = text.trim();
                (head, (!text.is_empty()).then(|| text.to_string()))
            }
            None => (content, None),
        };

        let mut tokens = head.split_whitespace();
        let style = tokens.next().ok_or(CoreError::MissingStyle { line })?;

        let tag = match tokens.next() {
            Some(tag) if tag.chars().all(|c| c.is_ascii_alphanumeric()) => Some(tag.to_string()),
            Some(tag) => {
                return Err(CoreError::InvalidTag {
                    line,
                    tag: tag.to_string(),
                })
            }
            None => None,
        };

        if let Some(token) = tokens.next() {
            return Err(CoreError::UnexpectedToken {
                line,
                token: token.to_string(),
            });
        }

        Ok(Element {
            style: style.to_string(),
            tag,
            text,
            children: Vec::new(),
        })
    }
}

/// A parsed component together with its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub source: String,
    pub root: Element,
}

impl Component {
    /// Parses component source into an element tree.
    pub fn parse(source: &str) -> Result<Component, CoreError> {
        // Open elements from the root down, each with its indent width.
        let mut stack: Vec<(usize, Element)> = Vec::new();
        let mut root: Option<Element> = None;

        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let content = raw.trim();
            if content.is_empty() {
                continue;
            }
            let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
            let element = Element::parse_line(content, line)?;

            while stack.last().is_some_and(|(depth, _)| *depth >= indent) {
                if let Some((_, done)) = stack.pop() {
                    match stack.last_mut() {
                        Some((_, parent)) => {
                            parent.append(done);
                        }
                        None => root = Some(done),
                    }
                }
            }

            if stack.is_empty() && root.is_some() {
                return Err(CoreError::MultipleRoots { line });
            }
            stack.push((indent, element));
        }

        while let Some((_, done)) = stack.pop() {
            match stack.last_mut() {
                Some((_, parent)) => {
                    parent.append(done);
                }
                None => root = Some(done),
            }
        }

        let root = root.ok_or(CoreError::EmptyComponent)?;
        Ok(Component {
            source: source.to_string(),
            root,
        })
    }

    /// Style keys referenced anywhere in the tree.
    pub fn dependencies(&self) -> BTreeSet<AssetKey> {
        let mut keys = BTreeSet::new();
        self.root.walk(&mut |element| {
            keys.insert(AssetKey::style(element.style.as_str()));
        });
        keys
    }
}
