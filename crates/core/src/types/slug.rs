//! Project slug type and derivation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacter,
}

/// A URL-safe project handle, unique per owner.
///
/// Slugs are usually produced by [`Slug::derive`], which normalizes
/// arbitrary input: lowercase, non-alphanumeric runs collapsed to single
/// hyphens, truncated to 50 characters, with a fallback for input that
/// normalizes to nothing. Derivation is total and idempotent.
///
/// [`Slug::parse`] accepts already-canonical text, e.g. a URL path
/// segment.
///
/// ## Examples
///
/// ```
/// use siteulation_core::Slug;
///
/// assert_eq!(Slug::derive("My Site").as_str(), "my-site");
/// assert_eq!(Slug::derive("  Hello -- World!  ").as_str(), "hello-world");
/// assert_eq!(Slug::derive("!!!").as_str(), "untitled");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 50;

    /// Slug used when the input normalizes to nothing.
    pub const FALLBACK: &'static str = "untitled";

    /// Derive a slug from arbitrary input.
    ///
    /// Lowercases ASCII alphanumerics, collapses every other run of
    /// characters into a single hyphen, trims hyphens at both ends,
    /// truncates to [`Self::MAX_LENGTH`], and falls back to
    /// [`Self::FALLBACK`] when nothing survives. Applying `derive` to its
    /// own output is a no-op.
    #[must_use]
    pub fn derive(input: &str) -> Self {
        let mut out = String::with_capacity(input.len().min(Self::MAX_LENGTH));
        for c in input.chars() {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                out.push(c);
            } else if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }

        // Everything pushed is ASCII, so the byte cap is also a char cap.
        out.truncate(Self::MAX_LENGTH);
        while out.ends_with('-') {
            out.pop();
        }

        if out.is_empty() {
            out.push_str(Self::FALLBACK);
        }

        Self(out)
    }

    /// Append a numeric disambiguation suffix, staying within the length
    /// cap by truncating the base.
    #[must_use]
    pub fn with_suffix(&self, n: u32) -> Self {
        let suffix = format!("-{n}");
        let keep = Self::MAX_LENGTH.saturating_sub(suffix.len());
        let mut base = self.0.clone();
        base.truncate(keep);
        while base.ends_with('-') {
            base.pop();
        }
        Self(format!("{base}{suffix}"))
    }

    /// Parse a `Slug` from already-canonical text.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 50 characters,
    /// or contains anything outside `[a-z0-9-]`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(SlugError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_basic() {
        assert_eq!(Slug::derive("My Site").as_str(), "my-site");
        assert_eq!(Slug::derive("my-site").as_str(), "my-site");
        assert_eq!(Slug::derive("Hello, World!").as_str(), "hello-world");
    }

    #[test]
    fn test_derive_collapses_runs() {
        assert_eq!(Slug::derive("a -- b").as_str(), "a-b");
        assert_eq!(Slug::derive("a!!!b").as_str(), "a-b");
        assert_eq!(Slug::derive("--a--").as_str(), "a");
    }

    #[test]
    fn test_derive_fallback() {
        assert_eq!(Slug::derive("").as_str(), Slug::FALLBACK);
        assert_eq!(Slug::derive("!!!").as_str(), Slug::FALLBACK);
        assert_eq!(Slug::derive("   ").as_str(), Slug::FALLBACK);
    }

    #[test]
    fn test_derive_skips_non_ascii() {
        // Non-ASCII letters count as separators, not slug characters.
        assert_eq!(Slug::derive("café au lait").as_str(), "caf-au-lait");
    }

    #[test]
    fn test_derive_truncates() {
        let long = "a".repeat(80);
        let slug = Slug::derive(&long);
        assert_eq!(slug.as_str().len(), Slug::MAX_LENGTH);

        // A hyphen landing on the cut point is trimmed, not kept.
        let input = format!("{} tail", "a".repeat(Slug::MAX_LENGTH));
        let slug = Slug::derive(&input);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_derive_idempotent() {
        for input in [
            "",
            "!!!",
            "My Site",
            "  Hello -- World!  ",
            "ALL CAPS AND SPACES",
            "already-canonical-slug",
            &"x y ".repeat(40),
        ] {
            let once = Slug::derive(input);
            let twice = Slug::derive(once.as_str());
            assert_eq!(once, twice, "derive not idempotent for {input:?}");
            assert!(!once.as_str().is_empty());
        }
    }

    #[test]
    fn test_with_suffix() {
        let slug = Slug::derive("my-site");
        assert_eq!(slug.with_suffix(2).as_str(), "my-site-2");
        assert_eq!(slug.with_suffix(10).as_str(), "my-site-10");
    }

    #[test]
    fn test_with_suffix_respects_cap() {
        let slug = Slug::derive(&"a".repeat(60));
        let suffixed = slug.with_suffix(12);
        assert!(suffixed.as_str().len() <= Slug::MAX_LENGTH);
        assert!(suffixed.as_str().ends_with("-12"));
    }

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("my-site").is_ok());
        assert!(Slug::parse("a").is_ok());
        assert!(Slug::parse("123").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(Slug::parse(""), Err(SlugError::Empty)));
        assert!(matches!(
            Slug::parse(&"a".repeat(51)),
            Err(SlugError::TooLong { .. })
        ));
        assert!(matches!(
            Slug::parse("My-Site"),
            Err(SlugError::InvalidCharacter)
        ));
        assert!(matches!(
            Slug::parse("my site"),
            Err(SlugError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let slug = Slug::derive("My Site");
        let json = serde_json::to_string(&slug).unwrap();
        assert_eq!(json, "\"my-site\"");

        let parsed: Slug = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, slug);
    }
}
