// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for the configuration surface.
//!
//! Runtime operations in this crate never fail: a missing binding or a target
//! that never becomes visible simply leaves work pending. The only fallible
//! entry points are the parsers used when loading configuration.

use alloc::string::String;

/// Failure to parse a configuration value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The easing name is not one of the supported curves.
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),
    /// A selector list contained an empty entry (for example `"a,,b"`).
    #[error("empty selector in list")]
    EmptySelector,
    /// A selector uses syntax outside the supported subset
    /// (`tag`, `.class`, `[attr]`, `[attr="value"]`).
    #[error("unsupported selector `{0}`")]
    UnsupportedSelector(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offending_input() {
        let e = ParseError::UnknownEasing("bounce.out".into());
        assert_eq!(e.to_string(), "unknown easing `bounce.out`");
        let e = ParseError::UnsupportedSelector("div > a".into());
        assert_eq!(e.to_string(), "unsupported selector `div > a`");
    }
}
