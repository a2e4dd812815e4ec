use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Display, Write};

use vc_graph::FieldKey;

use crate::error::ROOT_FIELD;

/// How many objects deep a walk may nest before it is cut off.
///
/// The root object sits at depth 0. Walks recurse once per level, so the
/// limit bounds the stack used by both encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// The chain of fields leading from the root to the value being visited.
///
/// Used to name the field in errors raised deep inside a walk.
#[derive(Default, Clone, Debug)]
pub(crate) struct FieldPath {
    segments: Vec<FieldKey>,
}

impl FieldPath {
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, key: FieldKey) {
        self.segments.push(key);
    }

    #[inline]
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Number of fields between the root and the current value.
    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Renders the current path, [`ROOT_FIELD`] when at the root.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = write!(out, "{self}");
        out
    }

    /// Renders the path of a child of the current value without entering it.
    pub fn child(&self, key: FieldKey) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let _ = write!(out, "{segment}.");
        }
        let _ = write!(out, "{key}");
        out
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.segments.iter();

        let Some(first) = iter.next() else {
            return f.write_str(ROOT_FIELD);
        };
        write!(f, "{first}")?;

        for segment in iter {
            write!(f, ".{segment}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FieldPath;
    use vc_graph::FieldKey;

    #[test]
    fn render() {
        let mut path = FieldPath::new();
        assert_eq!(path.render(), "$");
        assert_eq!(path.child(FieldKey::Name("a")), "a");

        path.push(FieldKey::Name("next"));
        path.push(FieldKey::Element("children", 2));
        assert_eq!(path.depth(), 2);
        assert_eq!(path.render(), "next.children[2]");
        assert_eq!(path.child(FieldKey::Name("name")), "next.children[2].name");

        path.pop();
        assert_eq!(path.render(), "next");
    }
}
