use serde::{Deserialize, Serialize};

use crate::error::StatblockError;
use crate::ingest::Statblock;
use crate::storage::Storage;

pub const STANDARD_KEY: &str = "standardStatblocks";
pub const CUSTOM_KEY: &str = "customStatBlocks";

/// Where a statblock came from: the public directory or the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Standard,
    Custom,
}

impl Provenance {
    pub fn storage_key(self) -> &'static str {
        match self {
            Provenance::Standard => STANDARD_KEY,
            Provenance::Custom => CUSTOM_KEY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    provenance: Provenance,
    statblock: Statblock,
}

/// Items of a persisted array. Current files hold YAML source strings;
/// older ones held the parsed objects themselves.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Persisted {
    Source(String),
    Legacy(serde_json::Value),
}

/// Ordered statblock collection backed by a [`Storage`].
///
/// Slots are always kept as all standard entries followed by all custom
/// entries, each group in insertion order, so a combined index is a plain
/// position and never needs translating.
pub struct StatblockStore<S: Storage> {
    storage: S,
    slots: Vec<Slot>,
}

impl<S: Storage> StatblockStore<S> {
    /// Rehydrate both partitions. A partition that is present but does not
    /// deserialize is logged and treated as empty; a storage read failure is
    /// returned so intact data is never overwritten by the next mutation.
    pub fn open(storage: S) -> Result<Self, StatblockError> {
        let mut slots = Vec::new();
        for provenance in [Provenance::Standard, Provenance::Custom] {
            let loaded = match load_partition(&storage, provenance.storage_key()) {
                Ok(loaded) => loaded,
                Err(e @ StatblockError::CorruptPersistedState { .. }) => {
                    tracing::warn!(error = %e, "starting with an empty partition");
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            slots.extend(loaded.into_iter().map(|statblock| Slot {
                provenance,
                statblock,
            }));
        }
        tracing::info!(count = slots.len(), "rehydrated statblocks");
        Ok(Self { storage, slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<(Provenance, &Statblock)> {
        self.slots.get(index).map(|s| (s.provenance, &s.statblock))
    }

    /// Standard entries then custom entries.
    pub fn combined(&self) -> impl Iterator<Item = (Provenance, &Statblock)> + '_ {
        self.slots.iter().map(|s| (s.provenance, &s.statblock))
    }

    pub fn partition(&self, provenance: Provenance) -> Vec<&Statblock> {
        self.slots
            .iter()
            .filter(|s| s.provenance == provenance)
            .map(|s| &s.statblock)
            .collect()
    }

    /// Append to the end of a partition; returns the new combined index.
    pub fn append(
        &mut self,
        provenance: Provenance,
        statblock: Statblock,
    ) -> Result<usize, StatblockError> {
        let index = match provenance {
            Provenance::Standard => self.partition_len(Provenance::Standard),
            Provenance::Custom => self.slots.len(),
        };
        tracing::info!(name = statblock.name(), ?provenance, index, "adding statblock");
        self.slots.insert(
            index,
            Slot {
                provenance,
                statblock,
            },
        );
        if let Err(e) = self.persist() {
            self.slots.remove(index);
            self.resync();
            return Err(e);
        }
        Ok(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Statblock, StatblockError> {
        self.check_index(index)?;
        let removed = self.slots.remove(index);
        if let Err(e) = self.persist() {
            self.slots.insert(index, removed);
            self.resync();
            return Err(e);
        }
        tracing::info!(name = removed.statblock.name(), index, "removed statblock");
        Ok(removed.statblock)
    }

    /// Swap in a new statblock at `index`, keeping its provenance. Returns the old one.
    pub fn replace_at(
        &mut self,
        index: usize,
        statblock: Statblock,
    ) -> Result<Statblock, StatblockError> {
        self.check_index(index)?;
        let old = std::mem::replace(&mut self.slots[index].statblock, statblock);
        if let Err(e) = self.persist() {
            self.slots[index].statblock = old;
            self.resync();
            return Err(e);
        }
        tracing::info!(old = old.name(), new = self.slots[index].statblock.name(), index, "replaced statblock");
        Ok(old)
    }

    /// Write both partitions.
    pub fn persist(&mut self) -> Result<(), StatblockError> {
        for provenance in [Provenance::Standard, Provenance::Custom] {
            let sources: Vec<&str> = self
                .slots
                .iter()
                .filter(|s| s.provenance == provenance)
                .map(|s| s.statblock.source())
                .collect();
            let json = serde_json::to_string_pretty(&sources)
                .map_err(|e| StatblockError::Storage(e.to_string()))?;
            self.storage.set(provenance.storage_key(), &json)?;
        }
        Ok(())
    }

    /// After a rolled-back mutation: rewrite the restored state, since the
    /// first key may already hold the rejected change.
    fn resync(&mut self) {
        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "storage may not match the collection until the next write");
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn partition_len(&self, provenance: Provenance) -> usize {
        self.slots.iter().filter(|s| s.provenance == provenance).count()
    }

    fn check_index(&self, index: usize) -> Result<(), StatblockError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(StatblockError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            })
        }
    }
}

fn load_partition(storage: &impl Storage, key: &str) -> Result<Vec<Statblock>, StatblockError> {
    let Some(text) = storage.get(key)? else {
        return Ok(Vec::new());
    };
    let items: Vec<Persisted> =
        serde_json::from_str(&text).map_err(|e| StatblockError::CorruptPersistedState {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

    let mut out = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let parsed = match item {
            Persisted::Source(source) => Statblock::parse(&source),
            Persisted::Legacy(tree) => serde_yaml::to_string(&tree)
                .map_err(StatblockError::from)
                .and_then(|yaml| Statblock::parse(&yaml)),
        };
        match parsed {
            Ok(statblock) => out.push(statblock),
            Err(e) => tracing::warn!(key, position, error = %e, "dropping unreadable statblock"),
        }
    }
    Ok(out)
}
