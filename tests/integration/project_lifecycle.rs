//! Project management through a session over the sled store

use std::sync::Arc;
use webpad::autosave::SaveState;
use webpad::config::PreviewConfig;
use webpad::error::{ApiError, FormatError, TreeError};
use webpad::session::Session;
use webpad::store::{MemoryGateway, PersistenceGateway, SledProjectStore};

async fn sled_session(path: &std::path::Path) -> (Session, Arc<SledProjectStore>) {
    let store = Arc::new(SledProjectStore::new(path).unwrap());
    let gateway: Arc<dyn PersistenceGateway> = store.clone();
    let session = Session::start(gateway, PreviewConfig::default()).await.unwrap();
    (session, store)
}

#[tokio::test]
async fn projects_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("projects.db");

    let project_id = {
        let (mut session, _store) = sled_session(&db).await;
        let id = session.new_project("Portfolio", true).await.unwrap();
        let folder = session.create_folder_at("pages").unwrap();
        let about = session.create_file(&folder, "about.html").unwrap();
        session.update_file_content(&about, "<h1>About</h1>").unwrap();
        session.save().await.unwrap();
        id
    };

    let (session, store) = sled_session(&db).await;
    assert_eq!(session.project().id, project_id);
    assert_eq!(session.save_state(), SaveState::Saved);
    let about = session.resolve("pages/about.html").unwrap();
    assert_eq!(
        session.project().get(&about).unwrap().content(),
        Some("<h1>About</h1>")
    );

    let listed = store.list_projects().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].file_count, 4);
}

#[tokio::test]
async fn export_then_import_reproduces_the_tree() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = Session::start(gateway.clone(), PreviewConfig::default())
        .await
        .unwrap();
    session.new_project("Round trip", true).await.unwrap();
    session.create_folder_at("lib").unwrap();
    let util = session.create_file_at("lib/util.js").unwrap();
    session.update_file_content(&util, "export const x = 1;").unwrap();
    let original = session.project().clone();
    let json = session.export_json().unwrap();

    let mut other = Session::start(Arc::new(MemoryGateway::new()), PreviewConfig::default())
        .await
        .unwrap();
    other.import_json(&json).await.unwrap();
    assert_eq!(other.project(), &original);
    assert_eq!(other.save_state(), SaveState::Saved);
}

#[tokio::test]
async fn rejected_import_changes_nothing() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = Session::start(gateway.clone(), PreviewConfig::default())
        .await
        .unwrap();
    let before = session.project().clone();

    let missing_nodes = r#"{ "id": "p1", "name": "Broken" }"#;
    assert!(matches!(
        session.import_json(missing_nodes).await,
        Err(ApiError::Format(FormatError::MissingField("nodes")))
    ));
    assert!(matches!(
        session.import_json("not json").await,
        Err(ApiError::Format(FormatError::Json(_)))
    ));
    assert_eq!(session.project(), &before);
    assert_eq!(gateway.project_writes(), 0);
}

#[tokio::test]
async fn deleting_a_folder_removes_its_subtree() {
    let mut session = Session::start(Arc::new(MemoryGateway::new()), PreviewConfig::default())
        .await
        .unwrap();
    let src = session.create_folder_at("src").unwrap();
    let nested = session.create_folder_at("src/components").unwrap();
    let button = session.create_file_at("src/components/button.js").unwrap();
    let main = session.create_file_at("src/main.js").unwrap();
    let before = session.project().len();

    let mut removed = session.delete_node(&src).unwrap();
    removed.sort();
    let mut expected = vec![src.clone(), nested, button, main];
    expected.sort();
    assert_eq!(removed, expected);
    assert_eq!(session.project().len(), before - 4);
    assert!(!session.project().root().unwrap().children_ids().contains(&src));
    assert!(session.project().validate().is_ok());
}

#[tokio::test]
async fn duplicate_name_leaves_tree_unchanged() {
    let mut session = Session::start(Arc::new(MemoryGateway::new()), PreviewConfig::default())
        .await
        .unwrap();
    session.create_file_at("notes.txt").unwrap();
    let snapshot = session.project().clone();
    assert!(matches!(
        session.create_file_at("notes.txt"),
        Err(ApiError::Tree(TreeError::NameCollision { .. }))
    ));
    assert_eq!(session.project(), &snapshot);
}

#[tokio::test]
async fn deleting_the_open_project_switches_to_a_blank_one() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = Session::start(gateway.clone(), PreviewConfig::default())
        .await
        .unwrap();
    let first = session.new_project("First", false).await.unwrap();
    let second = session.new_project("Second", false).await.unwrap();
    assert_eq!(gateway.last_opened().await.unwrap(), Some(second.clone()));

    session.delete_project(&second).await.unwrap();
    assert_ne!(session.project().id, second);
    assert_eq!(session.save_state(), SaveState::Unsaved);
    assert!(gateway.last_opened().await.unwrap().is_none());

    session.open_project(&first).await.unwrap();
    assert_eq!(session.project().name, "First");
    assert!(matches!(
        session.open_project(&second).await,
        Err(ApiError::ProjectNotFound(_))
    ));
    let names: Vec<String> = session
        .list_projects()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["First".to_string()]);
}

#[tokio::test]
async fn settings_load_with_the_session() {
    let gateway = Arc::new(MemoryGateway::new());
    {
        let mut session = Session::start(gateway.clone(), PreviewConfig::default())
            .await
            .unwrap();
        session.set_setting("theme", "light").await.unwrap();
        session.set_setting("tab_width", "4").await.unwrap();
    }
    let mut session = Session::start(gateway, PreviewConfig::default()).await.unwrap();
    assert_eq!(session.settings().tab_width, 4);
    assert_eq!(session.settings().theme, webpad::settings::Theme::Light);
    assert!(!session.open_last_project().await.unwrap());
}
