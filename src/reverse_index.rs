use std::collections::hash_map::{self, HashMap};

use crate::format_descriptor::FormatDescriptor;
use crate::id_table::{Id, IdTable};

/// `FormatDescriptor → [Id]`, the inverse of an [`IdTable`].
///
/// Several IDs may share one descriptor (the same log statement copied into
/// different places, or lists merged from several branches). The index groups
/// them so duplicates can be detected and an existing ID reused instead of
/// allocating a new one.
///
/// Keys are stored normalized (uppercased type tag). Since the table iterates
/// in ascending ID order, every ID sequence is ascending too.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    by_descriptor: HashMap<FormatDescriptor, Vec<Id>>,
}

impl ReverseIndex {
    pub fn build(table: &IdTable) -> Self {
        let mut index = Self::default();
        for (&id, descriptor) in table {
            index.add(descriptor, id);
        }
        index
    }

    /// Appends `id` under the normalized form of `descriptor`.
    pub fn add(&mut self, descriptor: &FormatDescriptor, id: Id) {
        self.by_descriptor
            .entry(descriptor.normalized())
            .or_default()
            .push(id);
    }

    /// IDs bound to a descriptor equivalent to `descriptor`.
    pub fn get(&self, descriptor: &FormatDescriptor) -> Option<&[Id]> {
        self.by_descriptor
            .get(&descriptor.normalized())
            .map(Vec::as_slice)
    }

    /// Lowest ID bound to an equivalent descriptor.
    pub fn first(&self, descriptor: &FormatDescriptor) -> Option<Id> {
        self.get(descriptor).and_then(|ids| ids.first().copied())
    }

    /// Descriptors bound to more than one ID, sorted by their lowest ID.
    pub fn duplicates(&self) -> Vec<(&FormatDescriptor, &[Id])> {
        let mut dups: Vec<_> = self
            .by_descriptor
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(d, ids)| (d, ids.as_slice()))
            .collect();
        dups.sort_by_key(|(_, ids)| ids[0]);
        dups
    }

    /// Number of distinct descriptors.
    pub fn len(&self) -> usize {
        self.by_descriptor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_descriptor.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, FormatDescriptor, Vec<Id>> {
        self.by_descriptor.iter()
    }
}

/// Shorthand for [`ReverseIndex::build`].
pub fn build_reverse_index(table: &IdTable) -> ReverseIndex {
    ReverseIndex::build(table)
}
