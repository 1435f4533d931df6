//! End-to-end: data file on disk → filter → storm replay → JSONL.

use std::io::Write;

use serde_json::Value;
use timeline_core::config::LayoutConfig;
use timeline_harness::cli::Opts;
use timeline_harness::run;

/// 300 chapters over three lanes, written in reverse sequence order.
fn write_dataset() -> tempfile::NamedTempFile {
    let lanes = ["primeval_history", "patriarchal_era", "exodus_wilderness"];
    let chapters: Vec<Value> = (1..=300u32)
        .rev()
        .map(|n| {
            let book = if n <= 200 { "Genesis" } else { "Exodus" };
            let summary = if n == 150 { "Joseph in Egypt" } else { "..." };
            serde_json::json!({
                "chapter_id": format!("CHP{n:04}"),
                "lane_tag": lanes[(n as usize - 1) / 100],
                "sequence_index": n,
                "book": book,
                "chapter": n,
                "event_title": format!("Chapter {n}"),
                "event_summary": summary,
                "verse_count": 30,
            })
        })
        .collect();
    let document = serde_json::json!({
        "meta": {"translation": "KRV", "mode": "all_verses", "totalChapters": 300},
        "lanes": lanes
            .iter()
            .enumerate()
            .map(|(i, id)| serde_json::json!({"id": id, "label": id, "order": i + 1}))
            .collect::<Vec<_>>(),
        "chapters": chapters,
        "edgesByTrack": {"track_main": [
            {"from_chapter_id": "CHP0001", "to_chapter_id": "CHP0002", "relation_type": "before"}
        ]},
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, &document).unwrap();
    file.flush().unwrap();
    file
}

fn frames(out: &[u8]) -> Vec<Value> {
    std::str::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap())
        .filter(|line| line["event"] == "frame")
        .collect()
}

#[test]
fn full_run_reaches_bottom() {
    let file = write_dataset();
    let opts = Opts {
        data: file.path().to_path_buf(),
        steps: 20,
        ..Opts::default()
    };
    let mut out = Vec::new();
    let summary = run(&opts, LayoutConfig::default(), &mut out).unwrap();
    assert_eq!(summary.frames, 5);

    let frames = frames(&out);
    let total = 300 * 182 - 18 + 24;
    assert!(frames.iter().all(|f| f["total_height"] == total));
    assert_eq!(frames.last().unwrap()["end"], 299);
    assert_eq!(frames.last().unwrap()["scroll"], total - 800);
}

#[test]
fn frames_report_tracks_of_mounted_cards() {
    let file = write_dataset();
    let opts = Opts {
        data: file.path().to_path_buf(),
        steps: 20,
        ..Opts::default()
    };
    let mut out = Vec::new();
    run(&opts, LayoutConfig::default(), &mut out).unwrap();

    let frames = frames(&out);
    let first = &frames[0]["tracks"];
    assert_eq!(first["CHP0001"], serde_json::json!(["track_main"]));
    assert_eq!(first["CHP0002"], serde_json::json!(["track_main"]));
    assert!(first.get("CHP0003").is_none());
    assert_eq!(frames.last().unwrap()["tracks"], serde_json::json!({}));
}

#[test]
fn undeclared_lane_yields_empty_frames() {
    let file = write_dataset();
    let opts = Opts {
        data: file.path().to_path_buf(),
        lane: Some("exile_return".into()),
        steps: 4,
        ..Opts::default()
    };
    let mut out = Vec::new();
    let summary = run(&opts, LayoutConfig::default(), &mut out).unwrap();
    assert_eq!(summary.max_mounted, 0);
    assert_eq!(frames(&out)[0]["total_height"], 160);
}

#[test]
fn lane_filter_shrinks_sequence() {
    let file = write_dataset();
    let opts = Opts {
        data: file.path().to_path_buf(),
        lane: Some("exodus_wilderness".into()),
        steps: 4,
        ..Opts::default()
    };
    let mut out = Vec::new();
    run(&opts, LayoutConfig::default(), &mut out).unwrap();
    let frames = frames(&out);
    assert_eq!(frames[0]["total_height"], 100 * 182 - 18 + 24);
}

#[test]
fn query_with_no_match_yields_empty_frames() {
    let file = write_dataset();
    let opts = Opts {
        data: file.path().to_path_buf(),
        query: Some("babylon".into()),
        pattern: "jump".into(),
        steps: 8,
        ..Opts::default()
    };
    let mut out = Vec::new();
    let summary = run(&opts, LayoutConfig::default(), &mut out).unwrap();
    assert_eq!(summary.max_mounted, 0);
    let frames = frames(&out);
    assert!(frames.iter().all(|f| f["start"].is_null()));
    assert_eq!(frames[0]["total_height"], 160);
}

#[test]
fn single_match_query() {
    let file = write_dataset();
    let opts = Opts {
        data: file.path().to_path_buf(),
        query: Some("JOSEPH".into()),
        ..Opts::default()
    };
    let mut out = Vec::new();
    let summary = run(&opts, LayoutConfig::default(), &mut out).unwrap();
    assert_eq!(summary.max_mounted, 1);
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let opts = Opts {
        data: dir.path().join("absent.json"),
        ..Opts::default()
    };
    let err = run(&opts, LayoutConfig::default(), &mut std::io::sink()).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}
