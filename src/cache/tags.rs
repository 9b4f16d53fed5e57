//! Cache tags used to flush groups of rendered widgets together.

use serde::Serialize;

/// Tag attached to every cached widget.
pub const BUILTIN_TAG: &str = "widgets";

/// Ordered, duplicate-free tag list.
///
/// The built-in tag always comes first; user tags follow in declaration
/// order, keeping the first occurrence of any repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CacheTags(Vec<String>);

impl CacheTags {
    pub fn from_user_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered = vec![BUILTIN_TAG.to_string()];
        for tag in tags {
            let tag = tag.as_ref();
            if !ordered.iter().any(|existing| existing == tag) {
                ordered.push(tag.to_string());
            }
        }
        Self(ordered)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: the built-in tag is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Default for CacheTags {
    fn default() -> Self {
        Self::from_user_tags(std::iter::empty::<&str>())
    }
}

impl<'a> IntoIterator for &'a CacheTags {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
