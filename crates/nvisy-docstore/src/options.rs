//! Update options.

use std::collections::{BTreeMap, BTreeSet};

use crate::field::Fieldset;

/// How an update combines new field values with stored ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Merge {
    /// Every field's stored values are replaced.
    #[default]
    Replace,
    /// Every field's new values are added to the stored ones.
    All,
    /// The named fields are merged, every other field is replaced.
    Fields(BTreeSet<String>),
}

impl Merge {
    /// Merges only the named fields.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(names.into_iter().map(Into::into).collect())
    }

    /// Returns true if `field` is merged rather than replaced.
    pub fn merges(&self, field: &str) -> bool {
        match self {
            Self::Replace => false,
            Self::All => true,
            Self::Fields(names) => names.contains(field),
        }
    }

    /// Names of the fields in `fieldset` whose stored values are replaced.
    pub(crate) fn replaced_fields(&self, fieldset: &Fieldset) -> BTreeSet<String> {
        fieldset
            .keys()
            .filter(|name| !self.merges(name))
            .cloned()
            .collect()
    }
}

impl From<bool> for Merge {
    fn from(merge: bool) -> Self {
        if merge { Self::All } else { Self::Replace }
    }
}

/// Per-field flags; fields flagged `true` are merged.
impl From<BTreeMap<String, bool>> for Merge {
    fn from(flags: BTreeMap<String, bool>) -> Self {
        Self::fields(
            flags
                .into_iter()
                .filter_map(|(name, merge)| merge.then_some(name)),
        )
    }
}

/// Options for [`DocumentStore::update_document`].
///
/// [`DocumentStore::update_document`]: crate::DocumentStore::update_document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub merge: Merge,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_merge(mut self, merge: impl Into<Merge>) -> Self {
        self.merge = merge.into();
        self
    }
}
