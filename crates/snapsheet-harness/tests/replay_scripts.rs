//! Replays of the bundled gesture scripts.

use std::path::Path;

use proptest::prelude::*;
use snapsheet_core::{
    CompletionPolicy, DragEvent, EngineState, Owner, PanelGeometry, PanelState, SheetConfig,
    TransitionOutcome,
};
use snapsheet_harness::cli::{load_config, replay_file, summary_line};
use snapsheet_harness::{GestureScript, HarnessError, Step, replay};

const TAP: &str = include_str!("../scripts/tap_expand_collapse.json");
const DRAG: &str = include_str!("../scripts/drag_reverse.json");
const NESTED: &str = include_str!("../scripts/nested_handoff.json");

fn scripts_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/scripts"))
}

#[test]
fn tap_script_expands_then_collapses() {
    let report = replay(&GestureScript::from_json_str(TAP).unwrap()).unwrap();
    assert_eq!(report.final_state, PanelState::Collapsed);
    assert_eq!(report.final_engine, EngineState::Inactive);
    assert_eq!(
        report.landings().collect::<Vec<_>>(),
        vec![
            TransitionOutcome::CompletedAtTarget,
            TransitionOutcome::CompletedAtTarget
        ]
    );
    // The tap during the collapse is ignored.
    assert_eq!(report.steps[4].accepted, Some(false));
    assert_eq!(report.extents.last().copied(), Some(200.0));
}

#[test]
fn drag_script_reverses_on_upward_release() {
    let report = replay(&GestureScript::from_json_str(DRAG).unwrap()).unwrap();
    assert!((report.steps[2].progress - 0.7).abs() < 1e-4);
    assert_eq!(report.steps[2].engine, EngineState::Paused);
    assert_eq!(
        report.landings().collect::<Vec<_>>(),
        vec![TransitionOutcome::AbortedToStart]
    );
    assert_eq!(report.final_state, PanelState::Collapsed);
    assert_eq!(report.extents.last().copied(), Some(120.0));
}

#[test]
fn nested_script_hands_off_and_collapses() {
    let report = replay(&GestureScript::from_json_str(NESTED).unwrap()).unwrap();
    let owners: Vec<_> = report.steps.iter().filter_map(|s| s.owner).collect();
    assert_eq!(
        owners,
        vec![
            Owner::NestedContent,
            Owner::NestedContent,
            Owner::Panel,
            Owner::Panel,
            Owner::Panel
        ]
    );
    assert!((report.steps[4].progress - 0.5).abs() < 1e-4);
    assert_eq!(report.final_state, PanelState::Collapsed);
    assert!(report.indicator_visible);
    assert_eq!(report.scroll_offset, 0.0);
}

#[test]
fn bundled_scripts_replay_deterministically() {
    for text in [TAP, DRAG, NESTED] {
        let script = GestureScript::from_json_str(text).unwrap();
        let first = replay(&script).unwrap();
        let second = replay(&script).unwrap();
        assert_eq!(first, second, "{}", script.name);

        let mut pinned = script.clone();
        pinned.expect_checksum = Some(first.checksum.clone());
        assert!(replay(&pinned).is_ok());
    }
}

#[test]
fn replay_file_applies_checksum_override() {
    let path = scripts_dir().join("drag_reverse.json");
    let report = replay_file(&path, None).unwrap();
    assert!(summary_line(&report).starts_with("drag-reverse state=collapsed"));
    assert!(replay_file(&path, Some(&report.checksum)).is_ok());
    assert!(matches!(
        replay_file(&path, Some("deadbeef")),
        Err(HarnessError::ChecksumMismatch { .. })
    ));
}

#[test]
fn bundled_config_loads() {
    let config = load_config(&scripts_dir().join("sheet.toml")).unwrap();
    assert_eq!(config.transition_ms, 280);
    assert_eq!(
        config.completion,
        CompletionPolicy::PositionFallback {
            min_velocity: 40.0,
            threshold: 0.5
        }
    );
}

#[test]
fn report_serializes_to_json() {
    let report = replay(&GestureScript::from_json_str(TAP).unwrap()).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["final_state"], "collapsed");
    assert_eq!(value["steps"][0]["op"], "tap");
    assert_eq!(value["checksum"].as_str().map(str::len), Some(64));
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Tap),
        Just(Step::Toggle),
        Just(Step::Panel(DragEvent::began())),
        (-800.0f32..800.0, -10.0f32..10.0)
            .prop_map(|(t, v)| Step::Panel(DragEvent::changed(t, v))),
        (-800.0f32..800.0).prop_map(|t| Step::Panel(DragEvent::ended(t, 0.0))),
        (-800.0f32..800.0, -10.0f32..10.0)
            .prop_map(|(t, v)| Step::Nested(DragEvent::changed(t, v))),
        Just(Step::Nested(DragEvent::cancelled())),
        (0u64..200).prop_map(|ms| Step::Tick { ms }),
        (0.0f32..300.0).prop_map(|y| Step::ScrollTo { y }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arbitrary_scripts_replay_identically(
        steps in prop::collection::vec(step_strategy(), 0..80),
    ) {
        let script = GestureScript {
            name: "arbitrary".into(),
            geometry: PanelGeometry::new(800.0, 200.0),
            config: SheetConfig::default(),
            initial_state: PanelState::Collapsed,
            initial_scroll_offset: 0.0,
            expect_checksum: None,
            steps,
        };
        let a = replay(&script).unwrap();
        let b = replay(&script).unwrap();
        prop_assert_eq!(&a.checksum, &b.checksum);
        for extent in &a.extents {
            prop_assert!((200.0 - 1e-3..=800.0 + 1e-3).contains(extent));
        }
    }
}
