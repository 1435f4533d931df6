#![forbid(unsafe_code)]

//! Which ordering tracks each record takes part in.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::dataset::Edge;

/// Record id → track ids, derived from the per-track edge lists.
///
/// A record participates in a track if it is either endpoint of any edge
/// in that track. Track ids are reported in sorted order without repeats.
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    by_id: HashMap<String, BTreeSet<String>>,
}

impl TrackIndex {
    pub fn from_edges(edges_by_track: &BTreeMap<String, Vec<Edge>>) -> Self {
        let mut by_id: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (track, edges) in edges_by_track {
            for edge in edges {
                for id in [&edge.from, &edge.to] {
                    by_id.entry(id.clone()).or_default().insert(track.clone());
                }
            }
        }
        Self { by_id }
    }

    /// Tracks `id` takes part in (possibly none).
    pub fn tracks_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.by_id
            .get(id)
            .into_iter()
            .flat_map(|tracks| tracks.iter().map(String::as_str))
    }

    pub fn in_track(&self, id: &str, track: &str) -> bool {
        self.by_id.get(id).is_some_and(|tracks| tracks.contains(track))
    }

    /// Number of records in at least one track.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
