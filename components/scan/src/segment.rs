use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

/// Textual identifier of a journal data file.
///
/// Identifiers are compared as strings, so `10` sorts before `2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SegmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of unique segment identifiers, i.e. a snapshot of the GC candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSet {
    ids: BTreeSet<SegmentId>,
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from the text between a pair of brackets, e.g. `1, 2,3 `.
    ///
    /// Tokens are trimmed and empty tokens are dropped, so an empty list yields an empty set.
    pub fn from_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(SegmentId::new)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(&SegmentId::new(id))
    }

    pub fn insert(&mut self, id: SegmentId) -> bool {
        self.ids.insert(id)
    }

    /// Identifiers present in `self` but absent from `other`.
    pub fn difference(&self, other: &SegmentSet) -> SegmentSet {
        self.ids.difference(&other.ids).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentId> {
        self.ids.iter()
    }
}

impl FromIterator<SegmentId> for SegmentSet {
    fn from_iter<T: IntoIterator<Item = SegmentId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Renders as `[a, b, c]`.
impl Display for SegmentSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, id) in self.ids.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", id)?;
        }
        f.write_str("]")
    }
}
