//! Criação e listagem de campos contra um backend simulado (httpmock)

use std::sync::Arc;

use httpmock::prelude::*;
use knowledge_base::{
    user_message, FieldDefinition, FieldForm, FieldType, KbError, KnowledgeBaseClient,
    StaticTokenProvider,
};
use serde_json::json;

fn client(server: &MockServer) -> KnowledgeBaseClient {
    KnowledgeBaseClient::new(server.base_url(), Arc::new(StaticTokenProvider::new("tok")))
        .unwrap()
}

#[tokio::test]
async fn create_field_resets_form_and_notifies_parent() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/fields/")
                .header("Authorization", "Bearer tok")
                .json_body(json!({
                    "kb_set": 4,
                    "name": "Plano",
                    "field_type": "choice",
                    "required": true,
                    "options": "bronze, silver, gold"
                }));
            then.status(201).json_body(json!({
                "id": 31,
                "kb_set": 4,
                "name": "Plano",
                "field_type": "choice",
                "required": true,
                "options": "bronze, silver, gold"
            }));
        })
        .await;

    let mut form = FieldForm::new(4);
    form.name = " Plano ".to_string();
    form.field_type = FieldType::Choice;
    form.required = true;
    form.options = "bronze; silver; gold".to_string();

    let mut notified: Option<FieldDefinition> = None;
    let created = form
        .submit(&client(&server), |f| notified = Some(f.clone()))
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(created.id, 31);
    assert_eq!(notified.map(|f| f.id), Some(31));
    assert!(form.name.is_empty());
    assert_eq!(form.field_type, FieldType::Text);
}

#[tokio::test]
async fn duplicate_name_gets_specific_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/fields/");
            then.status(400).json_body(json!({
                "non_field_errors": ["The fields kb_set, name must make a unique set."]
            }));
        })
        .await;

    let mut form = FieldForm::new(4);
    form.name = "Plano".to_string();

    let err = form.submit(&client(&server), |_| {}).await.unwrap_err();

    assert!(matches!(err, KbError::DuplicateFieldName));
    assert_eq!(
        user_message(&err),
        "Já existe um campo com este nome neste conjunto."
    );
    // Formulário preservado para o usuário corrigir
    assert_eq!(form.name, "Plano");
}

#[tokio::test]
async fn other_backend_errors_use_generic_extraction() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/fields/");
            then.status(400)
                .json_body(json!({"field_type": ["\"geo\" não é uma escolha válida."]}));
        })
        .await;

    let mut form = FieldForm::new(4);
    form.name = "Local".to_string();
    form.field_type = FieldType::Unknown("geo".to_string());

    let err = form.submit(&client(&server), |_| {}).await.unwrap_err();
    assert_eq!(
        user_message(&err),
        "field_type: \"geo\" não é uma escolha válida."
    );
}

#[tokio::test]
async fn empty_name_is_rejected_locally() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/fields/");
            then.status(201);
        })
        .await;

    let mut form = FieldForm::new(4);
    form.name = "   ".to_string();

    let err = form.submit(&client(&server), |_| {}).await.unwrap_err();
    assert!(matches!(err, KbError::FieldNameEmpty));
    create.assert_hits_async(0).await;
}

#[tokio::test]
async fn list_fields_tolerates_unknown_types() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/fields/").query_param("kb_set", "4");
            then.status(200).json_body(json!([
                {"id": 1, "kb_set": 4, "name": "Obs", "field_type": "text"},
                {"id": 2, "kb_set": 4, "name": "Mapa", "type": "geo_point", "required": true}
            ]));
        })
        .await;

    let fields = client(&server).list_fields(4).await.unwrap();

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].field_type, FieldType::Unknown("geo_point".to_string()));
}

#[tokio::test]
async fn delete_endpoints() {
    let server = MockServer::start_async().await;
    let del_field = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/fields/31/");
            then.status(204);
        })
        .await;
    let del_entry = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/entries/9/");
            then.status(204);
        })
        .await;

    let client = client(&server);
    client.delete_field(31).await.unwrap();
    client.delete_entry(9).await.unwrap();

    del_field.assert_async().await;
    del_entry.assert_async().await;
}
