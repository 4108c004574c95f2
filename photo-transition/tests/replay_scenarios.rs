//! # 手势回放集成测试
//!
//! 用合成的拖拽样本驱动引擎，验证松手判定和上下文汇报。
//! 这些测试不依赖任何 UI 工具包。

use std::fs;
use std::path::PathBuf;

use photo_transition::replay::{GestureScript, ReplayReport, replay};
use photo_transition::{
    DragSample, PlatformContract, Rect, Size, TransitionConfig, TransitionOutcome, Vec2,
};

/// 缩略图 + 大图的标准场景：容器 320x500，锚点 (160, 400)
fn script(samples: Vec<DragSample>) -> GestureScript {
    GestureScript {
        name: None,
        container: Size::new(320.0, 500.0),
        contract: PlatformContract::Modern,
        thumbnail: Some(Rect::new(20.0, 300.0, 80.0, 80.0)),
        image: Some(Rect::new(0.0, 240.0, 320.0, 320.0)),
        anchor: Some(Vec2::new(160.0, 400.0)),
        force_non_interactive: false,
        samples,
        expected: None,
        config: None,
    }
}

fn run(script: &GestureScript) -> ReplayReport {
    replay(script, &TransitionConfig::default()).unwrap()
}

fn down(y: f32) -> Vec2 {
    Vec2::new(0.0, y)
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures")
        .join("gestures")
}

fn fixture(name: &str) -> GestureScript {
    let json = fs::read_to_string(fixtures_dir().join(name)).unwrap();
    GestureScript::from_json(&json).unwrap()
}

// -------------------------------------------------------------------------
// 三个基准场景
// -------------------------------------------------------------------------

#[test]
fn test_drag_past_half_completes() {
    let report = run(&script(vec![
        DragSample::began(),
        DragSample::changed(down(250.0)),
        DragSample::ended(down(260.0), down(50.0)),
    ]));

    insta::assert_snapshot!(report.summary(), @r"
    outcome: complete
    reports: 1
    phases: idle -> interactive_tracking -> completing -> idle
    progress: [0.00, 0.50, 0.52]
    ");
}

#[test]
fn test_short_drag_cancels() {
    let report = run(&script(vec![
        DragSample::began(),
        DragSample::changed(down(50.0)),
        DragSample::ended(down(50.0), down(10.0)),
    ]));

    insta::assert_snapshot!(report.summary(), @r"
    outcome: cancel
    reports: 1
    phases: idle -> interactive_tracking -> cancelling -> idle
    progress: [0.00, 0.10]
    ");
}

#[test]
fn test_fast_flick_completes() {
    let report = run(&script(vec![
        DragSample::began(),
        DragSample::ended(down(20.0), down(1500.0)),
    ]));

    insta::assert_snapshot!(report.summary(), @r"
    outcome: complete
    reports: 1
    phases: idle -> interactive_tracking -> completing -> idle
    progress: [0.00, 0.04]
    ");
}

// -------------------------------------------------------------------------
// 判定性质
// -------------------------------------------------------------------------

#[test]
fn test_outcome_follows_progress_below_velocity_threshold() {
    for step in 0..=20 {
        let y = step as f32 * 25.0;
        let report = run(&script(vec![
            DragSample::began(),
            DragSample::changed(down(y)),
            DragSample::ended(down(y), down(500.0)),
        ]));

        let expected = if y / 500.0 >= 0.5 {
            TransitionOutcome::Completed
        } else {
            TransitionOutcome::Cancelled
        };
        assert_eq!(report.outcome, Some(expected), "y = {y}");
        assert_eq!(report.completion_count, 1);
    }
}

#[test]
fn test_fast_release_completes_regardless_of_progress() {
    for velocity in [1000.0, 1200.0, 3000.0] {
        for y in [5.0, 50.0, 200.0] {
            let report = run(&script(vec![
                DragSample::began(),
                DragSample::changed(down(y)),
                DragSample::ended(down(y), down(velocity)),
            ]));
            assert_eq!(
                report.outcome,
                Some(TransitionOutcome::Completed),
                "y = {y}, velocity = {velocity}"
            );
        }
    }
}

#[test]
fn test_progress_monotonic_and_clamped() {
    let mut samples = vec![DragSample::began()];
    samples.extend((1..=30).map(|i| DragSample::changed(down(i as f32 * 25.0))));
    samples.push(DragSample::ended(down(750.0), Vec2::zero()));

    let report = run(&script(samples));
    assert!(report.progress_trace.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(report.progress_trace.last(), Some(&1.0));
    assert!(report.progress_trace.iter().all(|p| *p <= 1.0));
}

#[test]
fn test_custom_thresholds() {
    let config = TransitionConfig {
        completion_threshold: 0.3,
        velocity_threshold: 2000.0,
        ..TransitionConfig::default()
    };
    let samples = vec![
        DragSample::began(),
        DragSample::changed(down(160.0)),
        DragSample::ended(down(160.0), down(1500.0)),
    ];

    let report = replay(&script(samples.clone()), &config).unwrap();
    assert_eq!(report.outcome, Some(TransitionOutcome::Completed));

    let strict = TransitionConfig {
        completion_threshold: 0.8,
        ..config
    };
    let report = replay(&script(samples), &strict).unwrap();
    assert_eq!(report.outcome, Some(TransitionOutcome::Cancelled));
}

#[test]
fn test_force_non_interactive_ignores_drag() {
    let mut forced = script(vec![
        DragSample::began(),
        DragSample::changed(down(10.0)),
        DragSample::ended(down(10.0), down(-2000.0)),
    ]);
    forced.force_non_interactive = true;

    let report = run(&forced);
    insta::assert_snapshot!(report.summary(), @r"
    outcome: complete
    reports: 1
    phases: idle -> dismissing -> idle
    progress: []
    ");
}

#[test]
fn test_gesture_cancel_rolls_back() {
    let report = run(&script(vec![
        DragSample::began(),
        DragSample::changed(down(450.0)),
        DragSample::cancelled(down(450.0)),
    ]));
    assert_eq!(report.outcome, Some(TransitionOutcome::Cancelled));
}

#[test]
fn test_legacy_contract_same_decisions() {
    let mut legacy = script(vec![
        DragSample::began(),
        DragSample::changed(down(250.0)),
        DragSample::ended(down(260.0), down(50.0)),
    ]);
    legacy.contract = PlatformContract::Legacy;
    let modern = {
        let mut s = legacy.clone();
        s.contract = PlatformContract::Modern;
        s
    };

    let legacy_report = run(&legacy);
    let modern_report = run(&modern);
    assert_eq!(legacy_report.outcome, modern_report.outcome);
    assert_eq!(legacy_report.progress_trace, modern_report.progress_trace);
}

// -------------------------------------------------------------------------
// fixtures/gestures
// -------------------------------------------------------------------------

#[test]
fn test_fixture_scripts_match_expectations() {
    let mut count = 0;
    for entry in fs::read_dir(fixtures_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let json = fs::read_to_string(&path).unwrap();
        let script = GestureScript::from_json(&json).unwrap();
        let report = run(&script);

        assert!(script.expected.is_some(), "{} 缺少 expected", path.display());
        assert!(
            report.matches(script.expected),
            "{}: {:?} != {:?}",
            script.display_name(),
            report.outcome,
            script.expected
        );
        count += 1;
    }
    assert!(count >= 3);
}

#[test]
fn test_fixture_fast_flick_legacy() {
    let script = fixture("fast_flick.json");
    assert_eq!(script.contract, PlatformContract::Legacy);
    assert!(script.thumbnail.is_none());

    insta::assert_snapshot!(run(&script).summary(), @r"
    outcome: complete
    reports: 1
    phases: idle -> interactive_tracking -> completing -> idle
    progress: [0.00, 0.04]
    ");
}
