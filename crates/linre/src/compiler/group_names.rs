//! # Capture Group Names

use std::collections::HashMap;

use crate::errors::{LRResult, LinreError};

/// The name → index map of a compiled pattern's capture groups, and
/// how those groups nest.
///
/// Shared (via `Arc`) between a pattern and every match it produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupNames {
    /// `(name, index)`, in group order.
    ordered: Vec<(String, usize)>,

    index: HashMap<String, usize>,

    /// Index -> name, for `0..=group_count`.
    by_index: Vec<Option<String>>,

    /// Index -> index of the innermost enclosing group; `0` at top level.
    /// Empty when unknown.
    parents: Vec<usize>,
}

impl GroupNames {
    /// Build from per-group names, where item `i` names group `i`.
    ///
    /// Item 0 (the whole match) is always unnamed.
    ///
    /// ## Returns
    /// The map; or [`LinreError::PatternSyntax`] on a duplicate name.
    pub fn from_names<'a, I>(names: I) -> LRResult<Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut result = Self::default();
        for (idx, name) in names.into_iter().enumerate() {
            let name = if idx == 0 { None } else { name };
            if let Some(name) = name {
                if result.index.insert(name.to_string(), idx).is_some() {
                    return Err(LinreError::PatternSyntax {
                        message: format!("duplicate group name {name:?}"),
                        offset: None,
                    });
                }
                result.ordered.push((name.to_string(), idx));
            }
            result.by_index.push(name.map(str::to_string));
        }
        Ok(result)
    }

    /// Attach the group nesting; see [`scan_group_parents`].
    pub fn with_parents(
        self,
        parents: Vec<usize>,
    ) -> Self {
        Self { parents, ..self }
    }

    /// Does group `outer` enclose group `inner`?
    ///
    /// Group 0 encloses every group; with no known nesting, no other does.
    pub fn encloses(
        &self,
        outer: usize,
        inner: usize,
    ) -> bool {
        if outer == 0 {
            return inner != 0;
        }
        let mut idx = inner;
        while let Some(&parent) = self.parents.get(idx) {
            if parent == 0 || parent >= idx {
                return false;
            }
            if parent == outer {
                return true;
            }
            idx = parent;
        }
        false
    }

    /// Lookup the index of a named group.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The name of group `index`, if it has one.
    pub fn name_of(
        &self,
        index: usize,
    ) -> Option<&str> {
        self.by_index.get(index).and_then(|n| n.as_deref())
    }

    /// Iterate over `(name, index)` pairs, in group order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.ordered.iter().map(|(name, idx)| (name.as_str(), *idx))
    }

    /// The number of named groups.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Are there no named groups?
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Scan pattern text for its capture groups.
///
/// ## Arguments
/// * `pattern` - the pattern text.
/// * `verbose` - are `#` comments active? Inline `(?x)` flags in the
///   pattern turn them on and off from there.
///
/// ## Returns
/// Item `i` is the innermost capture group enclosing group `i`, or `0`;
/// item 0 is the whole match.
pub(crate) fn scan_group_parents(
    pattern: &str,
    mut verbose: bool,
) -> Vec<usize> {
    let bytes = pattern.as_bytes();
    let mut parents = vec![0];

    // Open groups; `Some(idx)` for a capture, with the `verbose` to restore
    // when the group closes.
    let mut open: Vec<(Option<usize>, bool)> = Vec::new();
    let mut class_depth = 0usize;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let rest = &bytes[i + 1..];
        i += 1;
        if b == b'\\' {
            i += 1;
            continue;
        }
        if class_depth > 0 {
            match b {
                b'[' => class_depth += 1,
                b']' => class_depth -= 1,
                _ => (),
            }
            continue;
        }
        if b == b'(' {
            if let Some((flags_verbose, len, scoped)) = inline_flags(rest, verbose) {
                i += len;
                if scoped {
                    open.push((None, verbose));
                }
                verbose = flags_verbose;
                continue;
            }
        }
        match b {
            b'[' => {
                class_depth = 1;
                // A leading `]` (after an optional `^`) is a literal.
                let skip = usize::from(rest.first() == Some(&b'^'));
                if rest.get(skip) == Some(&b']') {
                    i += skip + 1;
                }
            }
            b'#' if verbose => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'(' if rest.starts_with(b"?#") => {
                while i < bytes.len() && bytes[i] != b')' {
                    i += 1;
                }
                i += 1;
            }
            b'(' => {
                let capture = !rest.starts_with(b"?")
                    || rest.starts_with(b"?P<")
                    || rest.starts_with(b"?'")
                    || (rest.starts_with(b"?<")
                        && !rest.starts_with(b"?<=")
                        && !rest.starts_with(b"?<!"));
                if capture {
                    let parent = open.iter().rev().find_map(|g| g.0).unwrap_or(0);
                    open.push((Some(parents.len()), verbose));
                    parents.push(parent);
                } else {
                    open.push((None, verbose));
                }
            }
            b')' => {
                if let Some((_, saved)) = open.pop() {
                    verbose = saved;
                }
            }
            _ => (),
        }
    }
    parents
}

/// Parse an inline flag group, `?flags)` or `?flags:`, following a `(`.
///
/// ## Returns
/// `(verbose after the flags, length, opens a group?)`; `None` if `rest`
/// does not start with one.
fn inline_flags(
    rest: &[u8],
    verbose: bool,
) -> Option<(bool, usize, bool)> {
    let body = rest.strip_prefix(b"?")?;
    let len = body
        .iter()
        .position(|&b| !(b.is_ascii_alphabetic() || b == b'-'))?;
    if len == 0 || !matches!(body[len], b')' | b':') {
        return None;
    }

    let mut verbose = verbose;
    let mut on = true;
    for &b in &body[..len] {
        match b {
            b'-' => on = false,
            b'x' => verbose = on,
            _ => (),
        }
    }
    Some((verbose, len + 2, body[len] == b':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_names() {
        let names =
            GroupNames::from_names([None, Some("year"), None, Some("day")]).unwrap();

        assert_eq!(names.len(), 2);
        assert_eq!(names.get("year"), Some(1));
        assert_eq!(names.get("day"), Some(3));
        assert_eq!(names.get("month"), None);

        assert_eq!(names.name_of(0), None);
        assert_eq!(names.name_of(1), Some("year"));
        assert_eq!(names.name_of(2), None);
        assert_eq!(names.name_of(9), None);

        assert_eq!(
            names.iter().collect::<Vec<_>>(),
            vec![("year", 1), ("day", 3)]
        );
    }

    #[test]
    fn test_duplicate_names() {
        let err = GroupNames::from_names([None, Some("a"), Some("a")]).unwrap_err();
        assert!(matches!(err, LinreError::PatternSyntax { .. }));
        assert!(err.to_string().contains("duplicate group name"));
    }

    #[test]
    fn test_scan_group_parents() {
        assert_eq!(scan_group_parents("abc", false), vec![0]);
        assert_eq!(scan_group_parents("(a)(b*)", false), vec![0, 0, 0]);
        assert_eq!(scan_group_parents("((a)b)", false), vec![0, 0, 1]);
        assert_eq!(
            scan_group_parents(r"(?P<x>(?:a(b))|(?<y>c))(?=(d))", false),
            vec![0, 0, 1, 1, 0]
        );
        assert_eq!(scan_group_parents(r"\((a)[(]\)", false), vec![0, 0]);
        assert_eq!(scan_group_parents(r"[]()](a)[^]](b)", false), vec![0, 0, 0]);
        assert_eq!(scan_group_parents("(?#(x)(a)", false), vec![0, 0]);
        assert_eq!(scan_group_parents("(a # (x)\n)", true), vec![0, 0]);
        assert_eq!(scan_group_parents("(?<=(a))(?<!b)", false), vec![0, 0]);
    }

    #[test]
    fn test_scan_group_parents_inline_verbose() {
        assert_eq!(scan_group_parents("(?x)(a # (x)\n)", false), vec![0, 0]);
        assert_eq!(scan_group_parents("(?xi)(a) # (b)", false), vec![0, 0]);
        assert_eq!(scan_group_parents("(?x:#(b)\n)(c)", false), vec![0, 0]);

        // Scoped flags end with their group.
        assert_eq!(scan_group_parents("(?x:a)#(b)", false), vec![0, 0]);
        assert_eq!(scan_group_parents("(?-x)#(b)", true), vec![0, 0]);
        assert_eq!(scan_group_parents("(?-x:#(b))#(c)", true), vec![0, 0]);

        assert_eq!(scan_group_parents("(?i)#(b)", false), vec![0, 0]);
    }

    #[test]
    fn test_encloses() {
        let names = GroupNames::from_names([None, None, None, None])
            .unwrap()
            .with_parents(vec![0, 0, 1, 2]);
        assert!(names.encloses(1, 2));
        assert!(names.encloses(1, 3));
        assert!(names.encloses(0, 3));
        assert!(!names.encloses(2, 1));
        assert!(!names.encloses(3, 3));

        let flat = GroupNames::from_names([None, None, None]).unwrap();
        assert!(!flat.encloses(1, 2));
    }

    #[test]
    fn test_empty() {
        let names = GroupNames::from_names([None]).unwrap();
        assert!(names.is_empty());
    }
}
