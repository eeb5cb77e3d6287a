// Inputbind Mapping Index
// Physical input -> priority-sorted candidate binds, rebuilt from the registry

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::bind::{Bind, InputVariant};
use crate::modifier::{matches_lenient, KeyMod};
use crate::registry::{BindRegistry, EntryId};

/// Reference from the index back to a registry entry.
///
/// Only valid for the index generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindRef {
    pub entry: EntryId,
    pub priority: u8,
    pub mods: KeyMod,
}

impl BindRef {
    pub fn new(entry: EntryId, priority: u8, mods: KeyMod) -> Self {
        Self {
            entry,
            priority,
            mods,
        }
    }

    fn from_bind(entry: EntryId, bind: &Bind) -> Self {
        match bind {
            Bind::Key(bind) => Self::new(entry, bind.priority, bind.mods),
            Bind::Mouse(bind) => Self::new(entry, bind.priority, bind.mods),
            Bind::Controller(_) => Self::new(entry, 0, KeyMod::empty()),
        }
    }
}

/// Candidate binds for one physical input, highest priority first
pub type Candidates = SmallVec<[BindRef; 2]>;

/// Derived lookup table from physical inputs to candidate binds
#[derive(Debug, Default)]
pub struct MappingIndex {
    mappings: HashMap<InputVariant, Candidates>,
    generation: u64,
}

impl MappingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index for a registry
    pub fn build(registry: &BindRegistry) -> Self {
        let mut index = Self::new();
        index.rebuild(registry);
        index
    }

    /// Discard the index and derive it again from every custom bind.
    ///
    /// Candidates are stable sorted by descending priority, so equal
    /// priorities keep registry discovery order.
    pub fn rebuild(&mut self, registry: &BindRegistry) {
        self.mappings.clear();
        self.generation += 1;

        for (id, entry) in registry.iter_entries() {
            for bind in entry.custom_binds() {
                self.mappings
                    .entry(bind.input())
                    .or_default()
                    .push(BindRef::from_bind(id, bind));
            }
        }

        for candidates in self.mappings.values_mut() {
            candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        }

        log::debug!(
            "Binds: rebuilt mapping index (generation {}) with {} inputs",
            self.generation,
            self.mappings.len()
        );
    }

    /// Candidates for a physical input; empty when nothing is bound
    pub fn candidates(&self, input: impl Into<InputVariant>) -> &[BindRef] {
        self.mappings
            .get(&input.into())
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Number of rebuilds so far. Bind refs from an older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of distinct physical inputs with at least one bind
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Pick the binds that activate for `mods`.
///
/// Walks the priority-sorted candidates and returns every lenient match at
/// the highest priority that has one. Once a match raises the tier, lower
/// priority candidates are no longer considered.
pub fn select_candidates(candidates: &[BindRef], mods: KeyMod) -> SmallVec<[EntryId; 4]> {
    let mut max_priority = 0;
    let mut selected = SmallVec::new();
    for candidate in candidates {
        if candidate.priority < max_priority {
            break;
        }
        if matches_lenient(mods, candidate.mods) {
            max_priority = candidate.priority;
            selected.push(candidate.entry);
        }
    }
    selected
}
