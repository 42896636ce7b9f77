use std::io::Write;
use std::sync::Arc;

use quest_core::{ScriptStatus, TaskConfig};
use runtime::{Runtime, RuntimeConfig, Scenario, ScenarioError};
use tempfile::NamedTempFile;

const SCENARIO: &str = r#"
(
    player: (x: 2810, y: 3690, plane: 0),
    npcs: [
        (
            name: "My Arm",
            location: (x: 2831, y: 3696, plane: 0),
            reply_delay_ms: 900,
            accepts: [["Yes"]],
            effects: [(2792, 4)],
        ),
    ],
    counters: [(2792, 3)],
    tasks: [
        (
            npc: "My Arm",
            location: (x: 2831, y: 3696, plane: 0),
            choices: ["I'd like to help"],
            backup_choices: Some(["Yes"]),
        ),
    ],
    requirements: [
        (
            counter: 2792,
            goal: 7,
            item: (name: "Supercompost", item_id: 6034, quantity: 7, highlight_in_inventory: true),
            text: "Add {quantity} supercompost on My Arm's soil patch.",
        ),
    ],
)
"#;

fn write_scenario(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write scenario");
    file
}

#[tokio::test]
async fn scenario_file_drives_backup_dialogue_to_success() {
    let file = write_scenario(SCENARIO);
    let scenario = Scenario::load_from_file(file.path()).expect("scenario should load");

    let config = RuntimeConfig {
        seed: 42,
        ..RuntimeConfig::default()
    };
    let world = Arc::new(scenario.build_world());
    let runtime = Runtime::builder()
        .tasks(scenario.build_tasks(&config.task_config, config.seed))
        .narrators(scenario.build_narrators())
        .config(config)
        .build(Arc::clone(&world))
        .await
        .expect("runtime should build");
    let handle = runtime.handle();

    let status = handle
        .run_until_settled(30, || world.advance_ticks(1))
        .await
        .expect("script should succeed");
    assert_eq!(status, ScriptStatus::Succeeded);

    // Primary choices were rejected, the backup resolved the conversation.
    let log = world.log();
    assert_eq!(log.dialogues.len(), 2);
    assert_eq!(log.dialogues[1], vec!["Yes".to_string()]);
    assert_eq!(log.interactions.len(), 2);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let error = Scenario::load_from_file(&dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(error, ScenarioError::Io { .. }));
}

#[test]
fn malformed_file_reports_parse_error() {
    let file = write_scenario("(player: (x: 1))");
    let error = Scenario::load_from_file(file.path()).unwrap_err();
    assert!(matches!(error, ScenarioError::Parse(_)));
}

#[test]
fn tasks_share_config_but_not_timing() {
    let scenario = Scenario::from_ron_str(SCENARIO).expect("scenario");
    let config = TaskConfig {
        max_talk_attempts: 2,
        ..TaskConfig::default()
    };
    let tasks = scenario.build_tasks(&config, 9);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].location(), scenario.tasks[0].location);
}
