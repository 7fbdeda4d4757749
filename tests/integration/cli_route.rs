//! Integration tests for the command route over a real library

use super::support::{start_time, Fixture};
use chrono::Duration;
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;
use tagtree::accessor::FsAccessor;
use tagtree::cli::{Commands, RunContext};
use tagtree::context::Context;
use tagtree::error::ApiError;
use tagtree::history::ManualClock;
use tagtree::observer::{Listener, Observable, Reference};
use tagtree::tree::walker::ScanConfig;

fn run_context(fx: &Fixture) -> RunContext {
    let clock = Arc::new(ManualClock::stepping(start_time(), Duration::seconds(1)));
    let ctx = Context::with_clock(FsAccessor::new(), clock);
    RunContext::with_context(ctx, ScanConfig::default(), vec![fx.root.clone()])
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<Reference>>,
}

impl Listener<Reference> for Recorder {
    fn notify(&self, changed: &Observable<Reference>) {
        self.seen.lock().push(*changed.value());
    }
}

#[test]
fn test_scan_reports_roots_as_json() {
    let fx = Fixture::new();
    fx.touch("A/x.jpg");
    fx.touch("y.png");
    let mut run = RunContext::with_context(
        Context::filesystem(),
        ScanConfig::default(),
        vec![fx.root.clone(), fx.path("A")],
    );

    let out = run.execute(&Commands::Scan { format: "json".to_string() }).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["images"], 2);
    assert_eq!(rows[0]["directories"], 2);
}

#[test]
fn test_tag_history_revert_round() {
    let fx = Fixture::new();
    fx.touch("photo.jpg");
    let mut run = run_context(&fx);
    let recorder = Arc::new(Recorder::default());
    run.register_reference_listener(recorder.clone());

    let out = run
        .execute(&Commands::Tag {
            path: fx.path("photo.jpg"),
            tags: vec!["sunset".to_string(), "beach".to_string()],
        })
        .unwrap();
    assert!(out.contains("photo - @beach @sunset.jpg"));
    assert!(fx.exists("photo - @beach @sunset.jpg"));
    assert!(run.reference().item.is_some());
    assert_eq!(recorder.seen.lock().len(), 1);

    let out = run
        .execute(&Commands::History {
            path: fx.path("photo - @beach @sunset.jpg"),
            format: "json".to_string(),
        })
        .unwrap();
    let entries: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 2);
    assert!(entries[0]["rank"].is_null());
    assert_eq!(entries[1]["rank"], 0);

    run.execute(&Commands::Revert {
        path: fx.path("photo - @beach @sunset.jpg"),
        rank: 0,
    })
    .unwrap();
    assert!(fx.exists("photo.jpg"));

    let err = run
        .execute(&Commands::Revert {
            path: fx.path("photo.jpg"),
            rank: 5,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Model(_)));

    let log = run.execute(&Commands::Log).unwrap();
    assert!(log.contains("create \"photo\""));
    assert!(log.contains("Add tags [\"beach\", \"sunset\"]"));

    let tags = run.execute(&Commands::Tags { format: "text".to_string() }).unwrap();
    assert!(tags.contains("@beach"));
    assert!(tags.contains("@sunset"));
}

#[test]
fn test_rename_adds_tags_to_vocabulary() {
    let fx = Fixture::new();
    fx.touch("photo.jpg");
    let mut run = run_context(&fx);

    run.execute(&Commands::Rename {
        path: fx.path("photo.jpg"),
        name: "photo - @trip".to_string(),
    })
    .unwrap();
    assert!(fx.exists("photo - @trip.jpg"));

    let tags = run.execute(&Commands::Tags { format: "text".to_string() }).unwrap();
    assert!(tags.contains("@trip"));
}

#[test]
fn test_untracked_path_is_reported() {
    let fx = Fixture::new();
    fx.touch("photo.jpg");
    let outside = fx.root.parent().unwrap().join("elsewhere.jpg");
    fs::write(&outside, "x").unwrap();
    let mut run = run_context(&fx);

    for path in [fx.path("missing.jpg"), outside] {
        let err = run
            .execute(&Commands::Tag {
                path: path.clone(),
                tags: vec!["x".to_string()],
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::PathNotTracked(ref p) if *p == path));
    }
}

#[test]
fn test_batch_runs_commands_in_one_session() {
    let fx = Fixture::new();
    fx.touch("photo.jpg");
    let root = fx.root.display().to_string();
    let script = fx.root.parent().unwrap().join("script.txt");
    fs::write(
        &script,
        format!(
            "# organize\n\
             tag \"{root}/photo.jpg\" beach\n\
             \n\
             mkdir \"{root}\" Trips\n\
             move \"{root}/photo - @beach.jpg\" \"{root}/Trips\"\n\
             untag \"{root}/Trips/photo - @beach.jpg\" beach\n\
             log\n",
            root = root
        ),
    )
    .unwrap();
    let mut run = run_context(&fx);

    let out = run.execute(&Commands::Batch { file: Some(script) }).unwrap();
    assert!(out.contains("Tagged"));
    assert!(out.contains("Created"));
    assert!(fx.exists("Trips/photo.jpg"));
    assert!(!fx.exists("photo.jpg"));
    assert_eq!(run.context().audit_log().len(), 4);
}

#[test]
fn test_batch_reports_bad_line() {
    let fx = Fixture::new();
    let script = fx.root.parent().unwrap().join("bad.txt");
    fs::write(&script, "# header\nfrobnicate x\n").unwrap();
    let mut run = run_context(&fx);

    let err = run.execute(&Commands::Batch { file: Some(script) }).unwrap_err();
    assert!(matches!(err, ApiError::InvalidCommand { line: 2, .. }));
}
