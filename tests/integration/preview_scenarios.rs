//! Preview compilation and console relay, end to end through a session

use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{advance, Instant};
use webpad::config::PreviewConfig;
use webpad::preview::assets::data_uri;
use webpad::preview::{compile, PreviewOptions};
use webpad::sandbox::{ConsoleChannel, MESSAGE_TYPE};
use webpad::session::Session;
use webpad::settings::Settings;
use webpad::store::MemoryGateway;
use webpad::tree::Project;

const INDEX: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Scenario</title>
</head>
<body>
  <script src="./app.js"></script>
</body>
</html>
"#;

fn scenario_project() -> Project {
    let mut project = Project::new("Scenario");
    let root = project.root_id.clone();
    let index = project.create_file(&root, "index.html").unwrap();
    project.update_file_content(&index, INDEX).unwrap();
    let app = project.create_file(&root, "app.js").unwrap();
    project.update_file_content(&app, "console.log(1)").unwrap();
    project
}

fn session_for(project: Project) -> Session {
    Session::new(
        Arc::new(MemoryGateway::new()),
        PreviewConfig::default(),
        project,
        Settings::default(),
    )
}

#[test]
fn script_reference_is_inlined_and_bridge_present() {
    let document = compile(&scenario_project(), &PreviewOptions::default());

    let uri = data_uri("text/javascript", "console.log(1)");
    assert!(document.contains(&format!("src=\"{}\"", uri)));
    assert!(!document.contains("./app.js"));

    let encoded = uri.rsplit(',').next().unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(decoded, b"console.log(1)");

    let bridge_at = document.find("data-webpad-bridge").unwrap();
    assert!(bridge_at < document.find("</head>").unwrap());
    assert!(document.contains(MESSAGE_TYPE));
}

#[tokio::test]
async fn bridged_log_reaches_host_console() {
    let mut session = session_for(scenario_project());
    let _document = session.preview();

    // What the injected bridge posts for `console.log(1)`
    let outlet = session.sandbox_outlet();
    outlet.post(json!({
        "type": MESSAGE_TYPE,
        "channel": "log",
        "timestamp": 1_700_000_000_000u64,
        "payload": [1]
    }));
    assert_eq!(session.pump_sandbox(), 1);

    let entries: Vec<_> = session.console().entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].channel, ConsoleChannel::Log);
    assert_eq!(entries[0].payload, vec![json!(1)]);
    assert!(session.take_notifications().is_empty());
}

#[tokio::test]
async fn unrecognized_channel_leaves_console_unchanged() {
    let mut session = session_for(scenario_project());
    let outlet = session.sandbox_outlet();
    outlet.post(json!({
        "type": MESSAGE_TYPE,
        "channel": "trace",
        "timestamp": 1,
        "payload": ["ignored"]
    }));
    assert_eq!(session.pump_sandbox(), 0);
    assert!(session.console().is_empty());
}

#[test]
fn missing_entry_is_a_rendered_state() {
    let mut project = Project::new("No entry");
    let root = project.root_id.clone();
    project.create_file(&root, "app.js").unwrap();
    let document = compile(&project, &PreviewOptions::default());
    assert!(!document.is_empty());
    assert!(document.contains("index.html"));
    assert!(document.contains("app.js"));
}

#[test]
fn compilation_is_idempotent() {
    let project = scenario_project();
    let options = PreviewOptions::default();
    assert_eq!(compile(&project, &options), compile(&project, &options));
}

#[tokio::test(start_paused = true)]
async fn edits_recompile_after_quiet_period() {
    let mut session = session_for(scenario_project());
    let before = session.preview();
    let app = session.resolve("app.js").unwrap();

    session.update_file_content(&app, "console.log(2)").unwrap();
    advance(Duration::from_millis(100)).await;
    assert!(session.poll_preview(Instant::now()).is_none());

    advance(Duration::from_millis(250)).await;
    let after = session.poll_preview(Instant::now()).unwrap();
    assert_ne!(before, after);
    assert!(after.contains(&data_uri("text/javascript", "console.log(2)")));
}

#[tokio::test]
async fn external_resources_setting_controls_policy() {
    let mut session = session_for(scenario_project());
    assert!(session.preview().contains("Content-Security-Policy"));
    session
        .set_setting("allowExternalResources", "true")
        .await
        .unwrap();
    assert!(!session.preview().contains("Content-Security-Policy"));
}
