//! Slot-ordered catalog metadata shipped alongside the vector index.

use domain_catalog::CourseId;
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::{RecommenderError, RecommenderResult};

#[derive(Debug, Deserialize)]
struct RawMetadata {
    embedding_model: String,
    #[serde(default)]
    numeric_features: Vec<String>,
    entries: Vec<RawEntry>,
}

/// Display fields in the artifact are ignored; the relational store is the
/// source of truth for them.
#[derive(Debug, Deserialize)]
struct RawEntry {
    id: serde_json::Value,
}

/// Slot to course id table with its reverse map.
///
/// Built once at load; ids are canonical and unique.
#[derive(Debug, Clone)]
pub struct CatalogMetadata {
    embedding_model: String,
    numeric_features: Vec<String>,
    ids: Vec<CourseId>,
    slots: HashMap<CourseId, usize>,
}

impl CatalogMetadata {
    /// Fails when two slots canonicalize to the same id.
    pub fn new(
        embedding_model: impl Into<String>,
        numeric_features: Vec<String>,
        ids: Vec<CourseId>,
    ) -> RecommenderResult<Self> {
        let mut slots = HashMap::with_capacity(ids.len());
        for (slot, id) in ids.iter().enumerate() {
            match slots.entry(id.clone()) {
                Entry::Occupied(existing) => {
                    return Err(RecommenderError::Artifact(format!(
                        "duplicate course id {} at slots {} and {}",
                        id,
                        existing.get(),
                        slot
                    )));
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(slot);
                }
            }
        }

        Ok(Self {
            embedding_model: embedding_model.into(),
            numeric_features,
            ids,
            slots,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> RecommenderResult<Self> {
        let raw: RawMetadata = serde_json::from_slice(bytes)?;

        let ids = raw
            .entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| {
                CourseId::from_json(&entry.id).ok_or_else(|| {
                    RecommenderError::Artifact(format!("entry {} has no usable id: {}", slot, entry.id))
                })
            })
            .collect::<RecommenderResult<Vec<_>>>()?;

        Self::new(raw.embedding_model, raw.numeric_features, ids)
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn numeric_features(&self) -> &[String] {
        &self.numeric_features
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id_at(&self, slot: usize) -> Option<&CourseId> {
        self.ids.get(slot)
    }

    pub fn slot_of(&self, id: &CourseId) -> Option<usize> {
        self.slots.get(id).copied()
    }
}
