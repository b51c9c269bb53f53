//! Key Module
//!
//! Hierarchical, path-like keys used by every datastore.
//!
//! ## Format
//! ```text
//! /Comedy/MontyPython/Actor:JohnCleese
//! └──┬──┘└─────┬────┘└───────┬───────┘
//!  namespace namespace   type:instance
//! ```
//!
//! A key is always kept in its canonical form: rooted at `/`, no duplicate
//! separators, no trailing separator, `.` and `..` segments resolved.
//! Keys order lexicographically over that canonical string.

use std::fmt;

/// Separator between namespaces
pub const SEPARATOR: char = '/';

/// Separator between a namespace's type and instance
const TYPE_SEPARATOR: char = ':';

/// An immutable, canonical, path-like key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    inner: String,
}

impl Key {
    /// Create a key from a string, cleaning it into canonical form
    pub fn new(s: impl AsRef<str>) -> Self {
        Self {
            inner: clean_path(s.as_ref()),
        }
    }

    /// Create a key without cleaning
    ///
    /// The string must already be canonical: non-empty, starting with `/`
    /// and, unless it is the root, not ending with `/`.
    pub fn raw(s: impl Into<String>) -> Self {
        let inner = s.into();
        debug_assert!(
            inner.starts_with(SEPARATOR) && (inner.len() == 1 || !inner.ends_with(SEPARATOR)),
            "raw key is not canonical: {inner:?}"
        );
        Self { inner }
    }

    /// The root key `/`
    pub fn root() -> Self {
        Self {
            inner: SEPARATOR.to_string(),
        }
    }

    /// Re-canonicalise a key
    pub fn clean(key: &Key) -> Key {
        Key::new(&key.inner)
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// The canonical string form as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Consume the key, returning its string form
    pub fn into_string(self) -> String {
        self.inner
    }

    pub fn is_root(&self) -> bool {
        self.inner.len() == 1
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Append `child` beneath this key
    ///
    /// `/` joined with `k` is `k`, and `k` joined with `/` is `k`.
    pub fn child(&self, child: &Key) -> Key {
        if self.is_root() {
            child.clone()
        } else if child.is_root() {
            self.clone()
        } else {
            Key::raw(format!("{}{}", self.inner, child.inner))
        }
    }

    /// Append a single (possibly multi-segment) string beneath this key
    pub fn child_string(&self, s: &str) -> Key {
        Key::new(format!("{}{}{}", self.inner, SEPARATOR, s))
    }

    /// The parent key; the root's parent is the root
    pub fn parent(&self) -> Key {
        match self.inner.rfind(SEPARATOR) {
            Some(0) | None => Key::root(),
            Some(idx) => Key::raw(&self.inner[..idx]),
        }
    }

    /// The namespaces making up this key, outermost first
    pub fn namespaces(&self) -> Vec<&str> {
        if self.is_root() {
            return Vec::new();
        }
        self.inner[1..].split(SEPARATOR).collect()
    }

    /// The last namespace of the key (empty for the root)
    pub fn base_namespace(&self) -> &str {
        match self.inner.rfind(SEPARATOR) {
            Some(idx) => &self.inner[idx + 1..],
            None => "",
        }
    }

    /// The type of the base namespace: `/a/b:c` → `b`
    pub fn type_(&self) -> &str {
        namespace_type(self.base_namespace())
    }

    /// The value of the base namespace: `/a/b:c` → `c`
    pub fn name(&self) -> &str {
        namespace_value(self.base_namespace())
    }

    /// Attach an instance to the base namespace: `/a/b` + `c` → `/a/b:c`
    pub fn instance(&self, s: &str) -> Key {
        Key::new(format!("{}{}{}", self.inner, TYPE_SEPARATOR, s))
    }

    /// The key with its namespaces in reverse order
    pub fn reverse(&self) -> Key {
        let mut namespaces = self.namespaces();
        namespaces.reverse();
        Key::new(namespaces.join("/"))
    }

    pub fn is_top_level(&self) -> bool {
        self.namespaces().len() == 1
    }

    /// Whether `other` lives strictly beneath this key
    pub fn is_ancestor_of(&self, other: &Key) -> bool {
        if other.inner.len() <= self.inner.len() {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other.inner.starts_with(&self.inner)
            && other.inner.as_bytes()[self.inner.len()] == SEPARATOR as u8
    }

    /// Whether this key lives strictly beneath `other`
    pub fn is_descendant_of(&self, other: &Key) -> bool {
        other.is_ancestor_of(self)
    }

    /// Plain string-prefix test over the canonical form
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.inner.starts_with(prefix)
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::root()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Lexically clean a path into rooted canonical form
///
/// "" → "/", "a//b/" → "/a/b", "/a/./b/../c" → "/a/c", "/.." → "/"
fn clean_path(s: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in s.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(s.len() + 1);
    for segment in &segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push(SEPARATOR);
    }
    out
}

fn namespace_type(namespace: &str) -> &str {
    match namespace.rfind(TYPE_SEPARATOR) {
        Some(idx) => &namespace[..idx],
        None => "",
    }
}

fn namespace_value(namespace: &str) -> &str {
    match namespace.rfind(TYPE_SEPARATOR) {
        Some(idx) => &namespace[idx + 1..],
        None => namespace,
    }
}
