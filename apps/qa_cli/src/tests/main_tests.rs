use super::*;
use client_core::UploadError;

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_dir(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("finqa_{label}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn parses_chat_commands_and_questions() {
    assert_eq!(parse_chat_input("/quit"), ChatInput::Quit);
    assert_eq!(parse_chat_input(" /exit "), ChatInput::Quit);
    assert_eq!(parse_chat_input("/docs"), ChatInput::Documents);
    assert_eq!(
        parse_chat_input("/upload  reports/q1.pdf "),
        ChatInput::Upload(PathBuf::from("reports/q1.pdf"))
    );
    assert_eq!(
        parse_chat_input("What was Q1 revenue?"),
        ChatInput::Question("What was Q1 revenue?".to_string())
    );
}

#[test]
fn bare_upload_asks_for_a_path_instead_of_chatting() {
    assert_eq!(parse_chat_input("/upload"), ChatInput::UploadUsage);
    assert_eq!(parse_chat_input("/upload   "), ChatInput::UploadUsage);
}

#[tokio::test]
async fn rejected_upload_is_reported_as_error() {
    let dir = temp_dir("upload_rejected");
    let path = dir.join("notes.txt");
    fs::write(&path, "not a pdf").expect("write file");

    let client = QaClient::new(Some("http://127.0.0.1:9".to_string()));
    let mut registry = DocumentRegistry::new();
    let err = upload_and_refresh(&client, &mut registry, &path)
        .await
        .expect_err("text file must be rejected");

    assert!(
        matches!(
            err.downcast_ref::<UploadError>(),
            Some(UploadError::InvalidType { .. })
        ),
        "unexpected error: {err:#}"
    );
    assert!(!registry.is_loaded());

    fs::remove_dir_all(dir).expect("cleanup");
}

#[tokio::test]
async fn unreadable_upload_path_is_reported_as_error() {
    let dir = temp_dir("upload_missing");
    let client = QaClient::new(Some("http://127.0.0.1:9".to_string()));
    let mut registry = DocumentRegistry::new();

    let result = upload_and_refresh(&client, &mut registry, &dir.join("missing.pdf")).await;
    assert!(result.is_err());

    fs::remove_dir_all(dir).expect("cleanup");
}

#[tokio::test]
async fn ask_without_answer_fails() {
    let client = QaClient::new(None);
    let err = run_ask(client, "What was Q1 revenue?")
        .await
        .expect_err("failed cycle must surface");
    assert!(err.to_string().contains("What was Q1 revenue?"));
}

#[tokio::test]
async fn blank_ask_is_not_sent() {
    let err = run_ask(QaClient::new(None), "   ")
        .await
        .expect_err("blank question");
    assert!(err.to_string().starts_with("question not sent"));
}

#[test]
fn client_uses_normalized_base_url() {
    let settings = Settings {
        api_base_url: Some("http://localhost:8000/".to_string()),
        request_timeout_secs: Some(5),
        ..Settings::default()
    };
    let client = build_client(&settings).expect("client");
    assert_eq!(client.base_url(), Some("http://localhost:8000"));

    let client = build_client(&Settings::default()).expect("client");
    assert_eq!(client.base_url(), None);
}
