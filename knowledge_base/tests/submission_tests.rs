//! Envio de valores contra um backend simulado (httpmock)

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use httpmock::prelude::*;
use knowledge_base::types::{FieldRef, TypedSlot};
use knowledge_base::{
    user_message, EditableValue, Entry, EntryEditor, FieldDefinition, FieldType, KbError,
    KnowledgeBaseClient, StaticTokenProvider, ValueRecord, ValueSlots,
};
use serde_json::json;

fn client(server: &MockServer) -> KnowledgeBaseClient {
    KnowledgeBaseClient::new(server.base_url(), Arc::new(StaticTokenProvider::new("tok-123")))
        .unwrap()
}

fn field(field_type: FieldType, required: bool) -> FieldDefinition {
    FieldDefinition {
        id: 10,
        kb_set: Some(3),
        name: "Plano".to_string(),
        field_type,
        required,
        options: Some("bronze, silver, gold".to_string()),
    }
}

fn existing_record(entry_id: i64) -> ValueRecord {
    ValueRecord {
        id: Some(55),
        field: FieldRef::Id(10),
        entry_id: Some(entry_id),
        slots: ValueSlots::single(TypedSlot::Text("gold".to_string())),
    }
}

#[tokio::test]
async fn required_empty_value_never_reaches_network() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/entries/");
            then.status(201).json_body(json!({"id": 1, "kb_set": 3, "values": []}));
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Text, true), None);
    let saved = AtomicUsize::new(0);

    let result = editor
        .submit(&client(&server), |_| {
            saved.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    assert!(matches!(result, Err(KbError::RequiredFieldEmpty(_))));
    assert_eq!(
        user_message(&result.unwrap_err()),
        "O campo \"Plano\" é obrigatório"
    );
    assert_eq!(saved.load(Ordering::SeqCst), 0);
    create.assert_hits_async(0).await;
}

#[tokio::test]
async fn optional_empty_value_is_sent_as_cleared_payload() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/entries/")
                .header("Authorization", "Bearer tok-123")
                .json_body(json!({
                    "kb_set": 3,
                    "values": [{
                        "field_id": 10,
                        "value": null,
                        "value_text": null,
                        "value_number": null,
                        "value_boolean": null,
                        "value_date": null,
                        "value_url": null,
                        "value_json": null
                    }]
                }));
            then.status(201).json_body(json!({"id": 90, "kb_set": 3, "values": []}));
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Text, false), None);
    let entry = editor.submit(&client(&server), |_| {}).await.unwrap();

    assert_eq!(entry.id, 90);
    create.assert_async().await;
}

#[tokio::test]
async fn create_posts_single_value_and_calls_back() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/entries/").json_body(json!({
                "kb_set": 3,
                "values": [{
                    "field_id": 10,
                    "value": true,
                    "value_text": null,
                    "value_number": null,
                    "value_boolean": true,
                    "value_date": null,
                    "value_url": null,
                    "value_json": null
                }]
            }));
            then.status(201).json_body(json!({
                "id": 501,
                "kb_set": 3,
                "values": [{"id": 9, "field": 10, "value": true, "value_boolean": true}]
            }));
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Boolean, true), None);
    assert_eq!(editor.value(), &EditableValue::Boolean(false));
    assert!(editor.set_raw("sim"));

    let mut refreshed: Option<Entry> = None;
    let entry = editor
        .submit(&client(&server), |e| refreshed = Some(e.clone()))
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(entry.values[0].entry_id, Some(501));
    assert_eq!(refreshed.map(|e| e.id), Some(501));
}

#[tokio::test]
async fn update_puts_whole_values_array_with_one_item() {
    let server = MockServer::start_async().await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT).path("/entries/77/").json_body(json!({
                "kb_set": 3,
                "values": [{
                    "field_id": 10,
                    "value": "silver",
                    "value_text": "silver",
                    "value_number": null,
                    "value_boolean": null,
                    "value_date": null,
                    "value_url": null,
                    "value_json": null
                }]
            }));
            then.status(200).json_body(json!({
                "id": 77,
                "kb_set": 3,
                "values": [{"id": 55, "field": 10, "value": "silver", "value_text": "silver"}]
            }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/entries/");
            then.status(201);
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Choice, false), Some(existing_record(77)));
    assert_eq!(editor.value(), &EditableValue::Text("gold".to_string()));
    assert!(editor.set_raw("silver"));

    let entry = editor.submit(&client(&server), |_| {}).await.unwrap();

    update.assert_async().await;
    create.assert_hits_async(0).await;
    assert_eq!(entry.kb_set, 3);
    assert_eq!(entry.value_for(10).and_then(|r| r.slots.value_text.clone()).as_deref(), Some("silver"));
}

#[tokio::test]
async fn second_submit_after_create_updates_the_new_entry() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/entries/");
            then.status(201).json_body(json!({
                "id": 640,
                "kb_set": 3,
                "values": [{"id": 31, "field": 10, "value": "gold", "value_text": "gold"}]
            }));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/entries/640/")
                .body_contains("\"value_text\":\"silver\"");
            then.status(200).json_body(json!({
                "id": 640,
                "kb_set": 3,
                "values": [{"id": 31, "field": 10, "value": "silver", "value_text": "silver"}]
            }));
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Choice, false), None);
    assert!(editor.set_raw("gold"));
    editor.submit(&client(&server), |_| {}).await.unwrap();

    assert_eq!(editor.existing().and_then(|r| r.entry_id), Some(640));
    assert_eq!(editor.existing().and_then(|r| r.id), Some(31));

    assert!(editor.set_raw("silver"));
    let entry = editor.submit(&client(&server), |_| {}).await.unwrap();

    create.assert_hits_async(1).await;
    update.assert_hits_async(1).await;
    assert_eq!(entry.id, 640);
}

#[tokio::test]
async fn created_entry_without_echoed_values_still_links_editor() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/entries/");
            then.status(201).json_body(json!({"id": 91, "kb_set": 3, "values": []}));
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Text, false), None);
    assert!(editor.set_raw("  anotação "));
    editor.submit(&client(&server), |_| {}).await.unwrap();

    let existing = editor.existing().unwrap();
    assert_eq!(existing.entry_id, Some(91));
    assert_eq!(existing.slots.value_text.as_deref(), Some("anotação"));
}

#[tokio::test]
async fn backend_validation_errors_become_one_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/entries/");
            then.status(400).json_body(json!({
                "values": [{"value_number": ["Informe um número válido."]}]
            }));
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Number, false), None);
    editor.set_value(EditableValue::Number(Some(10.0)));

    let saved = AtomicUsize::new(0);
    let err = editor
        .submit(&client(&server), |_| {
            saved.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(user_message(&err), "value_number: Informe um número válido.");
    assert_eq!(saved.load(Ordering::SeqCst), 0);
    assert!(!editor.is_submitting());
}

#[tokio::test]
async fn server_error_without_structure_uses_status_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/entries/8/");
            then.status(503).body("Service Unavailable");
        })
        .await;

    let mut editor = EntryEditor::open(3, field(FieldType::Text, false), Some(existing_record(8)));
    let err = editor.submit(&client(&server), |_| {}).await.unwrap_err();

    assert_eq!(user_message(&err), "Erro do servidor (503)");
}

#[tokio::test]
async fn transport_failure_uses_connection_message() {
    // Porta sem servidor
    let client = KnowledgeBaseClient::with_timeouts(
        "http://127.0.0.1:9",
        Arc::new(StaticTokenProvider::anonymous()),
        2,
        1,
    )
    .unwrap();

    let mut editor = EntryEditor::open(3, field(FieldType::Text, false), None);
    let err = editor.submit(&client, |_| {}).await.unwrap_err();

    assert!(matches!(err, KbError::HttpError(_)));
    assert_eq!(
        user_message(&err),
        knowledge_base::submission::CONNECTION_ERROR_MESSAGE
    );
}

#[tokio::test]
async fn list_entries_links_back_references() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET).path("/entries/").query_param("kb_set", "3");
            then.status(200).json_body(json!([
                {"id": 1, "kb_set": 3, "values": [{"id": 2, "field": 10, "value": "a", "value_text": "a"}]}
            ]));
        })
        .await;

    let entries = client(&server).list_entries(3).await.unwrap();

    list.assert_async().await;
    assert_eq!(entries[0].values[0].entry_id, Some(1));

    let editor = EntryEditor::for_entry(&entries[0], field(FieldType::Text, false));
    assert_eq!(editor.value(), &EditableValue::Text("a".to_string()));
}
