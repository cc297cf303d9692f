// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover roles and the small selector language used to assign them.
//!
//! Selectors are deliberately minimal: a comma-separated list of tag names
//! (`h1`), classes (`.title`), and attribute tests (`[role="button"]` or
//! `[disabled]`). Each list renders back to valid CSS so browser hosts can
//! hand it to `querySelectorAll` unchanged.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::ParseError;
use crate::host::ElementInfo;

/// What kind of element the pointer is over.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// A link, control, or anything else marked as clickable.
    Generic,
    /// A heading or title.
    Heading,
}

/// One simple selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Matches by tag name, stored lowercase.
    Tag(String),
    /// Matches elements carrying a class.
    Class(String),
    /// Matches by attribute presence, or by exact value when `value` is set.
    Attribute {
        /// Attribute name.
        name: String,
        /// Required value, if any.
        value: Option<String>,
    },
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Selector {
    /// Whether `el` matches.
    pub fn matches(&self, el: &dyn ElementInfo) -> bool {
        match self {
            Self::Tag(tag) => el.is_tag(tag),
            Self::Class(class) => el.has_class(class),
            Self::Attribute { name, value } => el.attribute_is(name, value.as_deref()),
        }
    }

    fn parse_attribute(inner: &str) -> Option<Self> {
        let (name, value) = match inner.split_once('=') {
            None => (inner.trim(), None),
            Some((name, raw)) => {
                let raw = raw.trim();
                let unquoted = raw
                    .strip_prefix('"')
                    .and_then(|r| r.strip_suffix('"'))
                    .or_else(|| raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
                    .unwrap_or(raw);
                if unquoted.contains(['"', '\'', ']']) {
                    return None;
                }
                (name.trim(), Some(unquoted.to_string()))
            }
        };
        is_ident(name).then(|| Self::Attribute {
            name: name.to_ascii_lowercase(),
            value,
        })
    }
}

impl FromStr for Selector {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::EmptySelector);
        }
        let parsed = if let Some(class) = s.strip_prefix('.') {
            is_ident(class).then(|| Self::Class(class.to_string()))
        } else if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Self::parse_attribute(inner)
        } else {
            is_ident(s).then(|| Self::Tag(s.to_ascii_lowercase()))
        };
        parsed.ok_or_else(|| ParseError::UnsupportedSelector(s.to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Attribute { name, value: None } => write!(f, "[{name}]"),
            Self::Attribute {
                name,
                value: Some(v),
            } => write!(f, "[{name}=\"{v}\"]"),
        }
    }
}

/// A non-empty, comma-separated selector list; matches when any entry matches.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    /// Headings: `h1` through `h6`, `.heading`, and `.title`.
    pub fn headings() -> Self {
        let mut list: Vec<Selector> = (1..=6)
            .map(|n| Selector::Tag(alloc::format!("h{n}")))
            .collect();
        list.push(Selector::Class("heading".into()));
        list.push(Selector::Class("title".into()));
        Self(list)
    }

    /// Links, form controls, button roles, and `.cursor-pointer`.
    pub fn interactive() -> Self {
        let mut list: Vec<Selector> = ["a", "button", "input", "textarea", "select"]
            .into_iter()
            .map(|t| Selector::Tag(t.into()))
            .collect();
        list.push(Selector::Attribute {
            name: "role".into(),
            value: Some("button".into()),
        });
        list.push(Selector::Class("cursor-pointer".into()));
        Self(list)
    }

    /// The entries.
    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }

    /// Whether any entry matches `el`.
    pub fn matches(&self, el: &dyn ElementInfo) -> bool {
        self.0.iter().any(|s| s.matches(el))
    }

    /// Both lists' entries, without duplicates.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.0.clone();
        for s in &other.0 {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        Self(out)
    }
}

impl FromStr for SelectorList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let list = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<Selector>, _>>()?;
        Ok(Self(list))
    }
}

impl TryFrom<String> for SelectorList {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SelectorList> for String {
    fn from(list: SelectorList) -> Self {
        list.to_string()
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// Assigns a [`Role`] to hovered elements.
///
/// An element matching both lists is a heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleClassifier {
    headings: SelectorList,
    interactive: SelectorList,
    allowlist: SelectorList,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new(SelectorList::headings(), SelectorList::interactive())
    }
}

impl RoleClassifier {
    /// Classify with the given heading and interactive lists.
    pub fn new(headings: SelectorList, interactive: SelectorList) -> Self {
        let allowlist = interactive.union(&headings);
        Self {
            headings,
            interactive,
            allowlist,
        }
    }

    /// Every selector that yields a role; hosts deliver enter/leave for these.
    pub fn allowlist(&self) -> &SelectorList {
        &self.allowlist
    }

    /// The role for `el`, or `None` if it is not on the allowlist.
    pub fn classify(&self, el: &dyn ElementInfo) -> Option<Role> {
        if self.headings.matches(el) {
            Some(Role::Heading)
        } else if self.interactive.matches(el) {
            Some(Role::Generic)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct El {
        tag: &'static str,
        classes: &'static [&'static str],
        attrs: &'static [(&'static str, &'static str)],
    }

    impl ElementInfo for El {
        fn is_tag(&self, tag: &str) -> bool {
            self.tag.eq_ignore_ascii_case(tag)
        }
        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }
        fn attribute_is(&self, name: &str, value: Option<&str>) -> bool {
            self.attrs
                .iter()
                .any(|(n, v)| *n == name && value.is_none_or(|want| want == *v))
        }
    }

    const fn el(tag: &'static str) -> El {
        El {
            tag,
            classes: &[],
            attrs: &[],
        }
    }

    #[test]
    fn default_lists_round_trip_to_css() {
        assert_eq!(
            SelectorList::interactive().to_string(),
            "a, button, input, textarea, select, [role=\"button\"], .cursor-pointer"
        );
        assert_eq!(
            SelectorList::headings().to_string(),
            "h1, h2, h3, h4, h5, h6, .heading, .title"
        );
        let parsed: SelectorList = SelectorList::interactive().to_string().parse().unwrap();
        assert_eq!(parsed, SelectorList::interactive());
    }

    #[test]
    fn classification_prefers_heading() {
        let c = RoleClassifier::default();
        assert_eq!(c.classify(&el("H2")), Some(Role::Heading));
        assert_eq!(c.classify(&el("button")), Some(Role::Generic));
        assert_eq!(c.classify(&el("div")), None);
        let titled_link = El {
            tag: "a",
            classes: &["title"],
            attrs: &[],
        };
        assert_eq!(c.classify(&titled_link), Some(Role::Heading));
        let fake_button = El {
            tag: "div",
            classes: &[],
            attrs: &[("role", "button")],
        };
        assert_eq!(c.classify(&fake_button), Some(Role::Generic));
        let pointer = El {
            tag: "span",
            classes: &["cursor-pointer"],
            attrs: &[],
        };
        assert_eq!(c.classify(&pointer), Some(Role::Generic));
    }

    #[test]
    fn parse_accepts_attribute_forms() {
        let list: SelectorList = "[data-cursor], [role='link'], .x_y".parse().unwrap();
        assert_eq!(
            list.selectors(),
            [
                Selector::Attribute {
                    name: "data-cursor".into(),
                    value: None
                },
                Selector::Attribute {
                    name: "role".into(),
                    value: Some("link".into())
                },
                Selector::Class("x_y".into()),
            ]
        );
    }

    #[test]
    fn parse_rejects_complex_selectors() {
        assert_eq!("".parse::<SelectorList>(), Err(ParseError::EmptySelector));
        assert_eq!("a, ".parse::<SelectorList>(), Err(ParseError::EmptySelector));
        assert_eq!(
            "nav a".parse::<SelectorList>(),
            Err(ParseError::UnsupportedSelector("nav a".into()))
        );
        assert!("a:hover".parse::<Selector>().is_err());
        assert!("#id".parse::<Selector>().is_err());
        assert!("[x=\"a]\"]".parse::<Selector>().is_err());
    }

    #[test]
    fn allowlist_is_the_union() {
        let c = RoleClassifier::default();
        assert_eq!(c.allowlist().selectors().len(), 15);
        assert!(c.allowlist().matches(&el("h6")));
        assert!(c.allowlist().matches(&el("select")));
    }
}
