use std::fmt;

use html5ever::LocalName;
use precomputed_hash::PrecomputedHash;

/// Attribute value as seen by the `selectors` crate.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CssString(pub String);

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for CssString {
    fn from(string: &'a str) -> Self {
        Self(string.to_owned())
    }
}

impl cssparser::ToCss for CssString {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// Identifier or local name as seen by the `selectors` crate.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CssLocalName(pub LocalName);

impl<'a> From<&'a str> for CssLocalName {
    fn from(string: &'a str) -> Self {
        Self(LocalName::from(string))
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(&self.0)
    }
}

impl PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}
