//! Autosave debounce behavior driven by a paused tokio clock

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{advance, Instant};
use webpad::autosave::SaveState;
use webpad::config::PreviewConfig;
use webpad::session::Session;
use webpad::settings::Settings;
use webpad::store::MemoryGateway;
use webpad::tree::template::sample_project;

fn session_with(gateway: Arc<MemoryGateway>, autosave_interval: u64) -> Session {
    let settings = Settings {
        autosave_interval,
        ..Settings::default()
    };
    Session::new(
        gateway,
        PreviewConfig::default(),
        sample_project("Autosave").unwrap(),
        settings,
    )
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_produces_one_write() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = session_with(gateway.clone(), 5);
    let script = session.resolve("script.js").unwrap();
    let start = Instant::now();

    session.update_file_content(&script, "console.log(1)").unwrap();
    advance(Duration::from_secs(1)).await;
    session.update_file_content(&script, "console.log(2)").unwrap();
    advance(Duration::from_secs(1)).await;
    session.update_file_content(&script, "console.log(3)").unwrap();
    let last_edit = Instant::now();
    assert_eq!(last_edit - start, Duration::from_secs(2));

    assert!(!session.tick(Instant::now()).await.unwrap());
    assert_eq!(gateway.project_writes(), 0);

    assert!(session.run_pending_autosave().await.unwrap());
    assert_eq!(gateway.project_writes(), 1);
    let waited = Instant::now() - last_edit;
    assert!(waited >= Duration::from_secs(5) && waited < Duration::from_millis(5_010));
    assert_eq!(session.save_state(), SaveState::Saved);

    assert!(!session.run_pending_autosave().await.unwrap());
    assert_eq!(gateway.project_writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_requires_manual_save() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = session_with(gateway.clone(), 0);
    let root = session.project().root_id.clone();
    session.create_file(&root, "notes.txt").unwrap();

    assert!(session.autosave_deadline().is_none());
    advance(Duration::from_secs(3600)).await;
    assert!(!session.tick(Instant::now()).await.unwrap());
    assert_eq!(session.save_state(), SaveState::Unsaved);
    assert_eq!(gateway.project_writes(), 0);

    session.save().await.unwrap();
    assert_eq!(session.save_state(), SaveState::Saved);
    assert_eq!(gateway.project_writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_autosave_waits_for_next_edit() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = session_with(gateway.clone(), 5);
    let script = session.resolve("script.js").unwrap();
    session.update_file_content(&script, "broken").unwrap();

    gateway.set_failing(true);
    assert!(session.run_pending_autosave().await.is_err());
    assert_eq!(session.save_state(), SaveState::Unsaved);
    assert!(session.autosave_deadline().is_none());
    assert_eq!(session.take_notifications().len(), 1);

    gateway.set_failing(false);
    session.update_file_content(&script, "fixed").unwrap();
    assert!(session.run_pending_autosave().await.unwrap());
    assert_eq!(gateway.project_writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn enabling_autosave_arms_pending_changes() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = session_with(gateway.clone(), 0);
    let script = session.resolve("script.js").unwrap();
    session.update_file_content(&script, "x").unwrap();

    session.set_setting("autosaveInterval", "2").await.unwrap();
    let armed_at = Instant::now();
    assert!(session.run_pending_autosave().await.unwrap());
    let waited = Instant::now() - armed_at;
    assert!(waited >= Duration::from_secs(2) && waited < Duration::from_millis(2_010));
    assert_eq!(gateway.project_writes(), 1);
}
