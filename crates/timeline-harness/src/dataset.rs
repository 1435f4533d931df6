#![forbid(unsafe_code)]

//! Timeline data file model.
//!
//! The web data builder emits one JSON document containing build metadata,
//! the lane catalogue, the ordered chapter (or research event) records and
//! the ordering edges grouped by track:
//!
//! ```json
//! {
//!   "meta": {"translation": "...", "mode": "all_verses", "totalChapters": 1189},
//!   "lanes": [{"id": "primeval_history", "label": "...", "order": 1}],
//!   "chapters": [{"chapter_id": "CHP0001", "lane_tag": "primeval_history",
//!                 "sequence_index": 1, "book": "...", "chapter": 1,
//!                 "event_title": "...", "event_summary": "...", "verse_count": 31}],
//!   "edgesByTrack": {"track_main": [{"from_chapter_id": "CHP0001",
//!                                    "to_chapter_id": "CHP0002",
//!                                    "relation_type": "before"}]}
//! }
//! ```
//!
//! [`Timeline`] normalizes either record flavour into one list ordered by
//! `sequence_index` and rejects duplicate identifiers.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Build metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub granularity: Option<String>,
    #[serde(default)]
    pub total_chapters: Option<u64>,
    #[serde(default)]
    pub total_verses: Option<u64>,
    #[serde(default)]
    pub total_events: Option<u64>,
}

/// A swim lane (historical period).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Lane {
    pub id: String,
    pub label: String,
    pub order: u32,
}

/// One chapter card (or research event).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChapterRecord {
    #[serde(alias = "chapter_id", alias = "event_id")]
    pub id: String,
    pub lane_tag: String,
    pub sequence_index: u32,
    pub book: String,
    #[serde(default)]
    pub chapter: Option<u32>,
    #[serde(default)]
    pub event_title: String,
    #[serde(default)]
    pub event_summary: String,
    #[serde(default)]
    pub verse_count: Option<u32>,
    #[serde(default)]
    pub certainty_level: Option<String>,
}

/// An ordering edge between two records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Edge {
    #[serde(alias = "from_chapter_id", alias = "from_event_id")]
    pub from: String,
    #[serde(alias = "to_chapter_id", alias = "to_event_id")]
    pub to: String,
    #[serde(default)]
    pub relation_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTimeline {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    lanes: Vec<Lane>,
    #[serde(default)]
    chapters: Vec<ChapterRecord>,
    #[serde(default)]
    events: Vec<ChapterRecord>,
    #[serde(default, rename = "edgesByTrack")]
    edges_by_track: BTreeMap<String, Vec<Edge>>,
}

/// Normalized timeline data.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub meta: Meta,
    /// Lanes sorted by `order`.
    pub lanes: Vec<Lane>,
    /// Records sorted by `sequence_index` (stable for ties).
    pub records: Vec<ChapterRecord>,
    /// Edges keyed by track id.
    pub edges_by_track: BTreeMap<String, Vec<Edge>>,
}

impl Timeline {
    /// Parse a timeline document.
    pub fn from_json_str(text: &str) -> Result<Self, DatasetError> {
        let raw: RawTimeline = serde_json::from_str(text).map_err(DatasetError::Json)?;
        Self::from_raw(raw)
    }

    /// Read and parse a timeline file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    fn from_raw(raw: RawTimeline) -> Result<Self, DatasetError> {
        let mut records = if raw.chapters.is_empty() {
            raw.events
        } else {
            raw.chapters
        };
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(DatasetError::DuplicateId(record.id.clone()));
            }
        }

        records.sort_by_key(|r| r.sequence_index);
        let mut lanes = raw.lanes;
        lanes.sort_by_key(|l| l.order);

        Ok(Self {
            meta: raw.meta,
            lanes,
            records,
            edges_by_track: raw.edges_by_track,
        })
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a successfully loaded timeline.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a lane by id.
    pub fn lane(&self, id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }
}

/// Failure to load a timeline file.
#[derive(Debug)]
pub enum DatasetError {
    /// The file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The document is not valid timeline JSON.
    Json(serde_json::Error),
    /// Neither `chapters` nor `events` holds any record.
    Empty,
    /// Two records share an identifier.
    DuplicateId(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Json(err) => write!(f, "invalid timeline json: {err}"),
            Self::Empty => write!(f, "timeline contains no chapters or events"),
            Self::DuplicateId(id) => write!(f, "duplicate record id {id}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Empty | Self::DuplicateId(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "meta": {"translation": "KRV", "mode": "all_verses", "granularity": "chapter",
                 "totalChapters": 3, "totalVerses": 90},
        "lanes": [
            {"id": "patriarchal_era", "label": "Patriarchs", "order": 2},
            {"id": "primeval_history", "label": "Primeval", "order": 1}
        ],
        "chapters": [
            {"chapter_id": "CHP0002", "lane_tag": "primeval_history", "sequence_index": 2,
             "book": "Genesis", "chapter": 2, "event_title": "Genesis 2",
             "event_summary": "Thus the heavens", "verse_count": 25, "certainty_level": "high"},
            {"chapter_id": "CHP0001", "lane_tag": "primeval_history", "sequence_index": 1,
             "book": "Genesis", "chapter": 1, "event_title": "Genesis 1",
             "event_summary": "In the beginning", "verse_count": 31, "certainty_level": "high"},
            {"chapter_id": "CHP0012", "lane_tag": "patriarchal_era", "sequence_index": 12,
             "book": "Genesis", "chapter": 12, "event_title": "Genesis 12",
             "event_summary": "Now the LORD had said unto Abram", "verse_count": 20}
        ],
        "versesByChapter": {},
        "edgesByTrack": {"track_main": [
            {"from_chapter_id": "CHP0001", "to_chapter_id": "CHP0002", "relation_type": "before"},
            {"from_chapter_id": "CHP0002", "to_chapter_id": "CHP0012", "relation_type": "before"}
        ]}
    }"#;

    #[test]
    fn parses_chapters_in_sequence_order() {
        let timeline = Timeline::from_json_str(SAMPLE).unwrap();
        let ids: Vec<&str> = timeline.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["CHP0001", "CHP0002", "CHP0012"]);
        assert_eq!(timeline.meta.total_chapters, Some(3));
        assert_eq!(timeline.meta.mode.as_deref(), Some("all_verses"));
        assert_eq!(timeline.records[2].certainty_level, None);
    }

    #[test]
    fn lanes_sorted_by_order() {
        let timeline = Timeline::from_json_str(SAMPLE).unwrap();
        assert_eq!(timeline.lanes[0].id, "primeval_history");
        assert_eq!(timeline.lane("patriarchal_era").unwrap().order, 2);
        assert!(timeline.lane("exile_return").is_none());
    }

    #[test]
    fn edges_use_chapter_aliases() {
        let timeline = Timeline::from_json_str(SAMPLE).unwrap();
        let edges = &timeline.edges_by_track["track_main"];
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].from, "CHP0001");
        assert_eq!(edges[0].to, "CHP0002");
    }

    #[test]
    fn research_events_are_accepted() {
        let text = r#"{"events": [
            {"event_id": "EV2", "lane_tag": "life_of_jesus", "sequence_index": 5, "book": "Mark"},
            {"event_id": "EV1", "lane_tag": "life_of_jesus", "sequence_index": 3, "book": "Luke"}
        ]}"#;
        let timeline = Timeline::from_json_str(text).unwrap();
        assert_eq!(timeline.records[0].id, "EV1");
        assert!(timeline.edges_by_track.is_empty());
    }

    #[test]
    fn empty_document_rejected() {
        let err = Timeline::from_json_str(r#"{"chapters": []}"#).unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let text = r#"{"chapters": [
            {"chapter_id": "A", "lane_tag": "x", "sequence_index": 1, "book": "B"},
            {"chapter_id": "A", "lane_tag": "x", "sequence_index": 2, "book": "B"}
        ]}"#;
        let err = Timeline::from_json_str(text).unwrap_err();
        assert_eq!(err.to_string(), "duplicate record id A");
    }

    #[test]
    fn malformed_json_reports_source() {
        let err = Timeline::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, DatasetError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let timeline = Timeline::load(file.path()).unwrap();
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Timeline::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }
}
