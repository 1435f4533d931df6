#![forbid(unsafe_code)]

//! Upstream filter producing the ordered id sequence for the list.

use crate::dataset::{ChapterRecord, Timeline};

/// Lane, book and free-text filter.
///
/// An empty (default) filter passes every record. The query matches
/// case-insensitively against the title, summary and book name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineFilter {
    pub lane: Option<String>,
    pub book: Option<String>,
    query: Option<String>,
}

impl TimelineFilter {
    /// Restrict to one lane id.
    #[must_use]
    pub fn with_lane(mut self, lane: impl Into<String>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    /// Restrict to one book name.
    #[must_use]
    pub fn with_book(mut self, book: impl Into<String>) -> Self {
        self.book = Some(book.into());
        self
    }

    /// Require a free-text match. Blank queries are ignored.
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim();
        self.query = (!query.is_empty()).then(|| query.to_lowercase());
        self
    }

    /// The normalized (lowercased) query.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Whether the filter passes everything.
    pub fn is_empty(&self) -> bool {
        self.lane.is_none() && self.book.is_none() && self.query.is_none()
    }

    pub fn matches(&self, record: &ChapterRecord) -> bool {
        if self.lane.as_ref().is_some_and(|lane| *lane != record.lane_tag) {
            return false;
        }
        if self.book.as_ref().is_some_and(|book| *book != record.book) {
            return false;
        }
        match &self.query {
            None => true,
            Some(query) => [&record.event_title, &record.event_summary, &record.book]
                .iter()
                .any(|field| field.to_lowercase().contains(query.as_str())),
        }
    }

    /// Ids of matching records, in timeline order.
    pub fn apply(&self, timeline: &Timeline) -> Vec<String> {
        timeline
            .records
            .iter()
            .filter(|record| self.matches(record))
            .map(|record| record.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline::from_json_str(
            r#"{"chapters": [
                {"chapter_id": "GEN1", "lane_tag": "primeval_history", "sequence_index": 1,
                 "book": "Genesis", "event_title": "Creation", "event_summary": "In the beginning"},
                {"chapter_id": "GEN12", "lane_tag": "patriarchal_era", "sequence_index": 12,
                 "book": "Genesis", "event_title": "Call of Abram", "event_summary": "Get thee out"},
                {"chapter_id": "EXO3", "lane_tag": "exodus_wilderness", "sequence_index": 53,
                 "book": "Exodus", "event_title": "Burning bush", "event_summary": "Moses at Horeb"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn default_passes_everything() {
        let filter = TimelineFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&timeline()), ["GEN1", "GEN12", "EXO3"]);
    }

    #[test]
    fn lane_filter() {
        let filter = TimelineFilter::default().with_lane("patriarchal_era");
        assert_eq!(filter.apply(&timeline()), ["GEN12"]);
    }

    #[test]
    fn book_filter() {
        let filter = TimelineFilter::default().with_book("Genesis");
        assert_eq!(filter.apply(&timeline()), ["GEN1", "GEN12"]);
    }

    #[test]
    fn query_is_case_insensitive() {
        let filter = TimelineFilter::default().with_query("  MOSES ");
        assert_eq!(filter.query(), Some("moses"));
        assert_eq!(filter.apply(&timeline()), ["EXO3"]);

        let by_book = TimelineFilter::default().with_query("genesis");
        assert_eq!(by_book.apply(&timeline()).len(), 2);
    }

    #[test]
    fn blank_query_ignored() {
        assert!(TimelineFilter::default().with_query("   ").is_empty());
    }

    #[test]
    fn criteria_combine() {
        let filter = TimelineFilter::default()
            .with_book("Genesis")
            .with_query("abram");
        assert_eq!(filter.apply(&timeline()), ["GEN12"]);

        let none = TimelineFilter::default()
            .with_lane("primeval_history")
            .with_query("abram");
        assert!(none.apply(&timeline()).is_empty());
    }
}
