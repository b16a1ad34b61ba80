//! Cliente HTTP para a API da base de conhecimento

use crate::auth::{bearer, TokenProvider};
use crate::error::{KbError, Result};
use crate::types::{
    Entry, EntryId, EntryRequest, FieldDefinition, FieldId, NewFieldRequest, SetId,
};
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Cliente para a API REST da base de conhecimento
///
/// Todas as requisições levam `Authorization: Bearer <token>` quando o
/// [`TokenProvider`] injetado tiver um token. 401 não é repetido aqui.
#[derive(Clone)]
pub struct KnowledgeBaseClient {
    http_client: HttpClient,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl KnowledgeBaseClient {
    /// Cria um novo cliente
    ///
    /// # Timeouts
    ///
    /// - Total: 30s
    /// - Connect: 5s
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Self::with_timeouts(base_url, tokens, 30, 5)
    }

    /// Cria um novo cliente com timeouts customizados
    pub fn with_timeouts(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        total_timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let base_url: String = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(KbError::ConfigError("Base URL da API vazia".to_string()));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(total_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .map_err(|e| KbError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            tokens,
        })
    }

    /// Obtém a URL base da API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.get_token() {
            Some(token) => request.header("Authorization", bearer(&token)),
            None => request,
        }
    }

    /// Executa uma requisição GET e parseia JSON
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);

        tracing::debug!("GET {}", url);

        let response = self
            .authorize(self.http_client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// Executa uma requisição POST e parseia JSON
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(endpoint);

        tracing::debug!(
            "POST {} with body: {}",
            url,
            serde_json::to_string(body).unwrap_or_default()
        );

        let response = self
            .authorize(self.http_client.post(&url))
            .json(body)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// Executa uma requisição PUT e parseia JSON
    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(endpoint);

        tracing::debug!("PUT {}", url);

        let response = self
            .authorize(self.http_client.put(&url))
            .json(body)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// Executa uma requisição DELETE (corpo ignorado)
    pub(crate) async fn delete(&self, endpoint: &str) -> Result<()> {
        let url = self.url(endpoint);

        tracing::debug!("DELETE {}", url);

        let response = self
            .authorize(self.http_client.delete(&url))
            .send()
            .await?;

        self.handle_response(response).await?;
        Ok(())
    }

    /// Processa a resposta HTTP e trata erros
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Knowledge base API error ({}): {}", status_code, error_body);

        // Mantém o JSON estruturado para extração de mensagens por campo
        let body = serde_json::from_str::<Value>(&error_body)
            .unwrap_or_else(|_| Value::String(error_body));

        Err(KbError::ApiError {
            status: status_code,
            body,
        })
    }

    // ==================== FIELDS ====================

    /// Lista as definições de campo de um conjunto
    pub async fn list_fields(&self, kb_set: SetId) -> Result<Vec<FieldDefinition>> {
        let fields: Vec<FieldDefinition> = self
            .get_json(&format!("/fields/?kb_set={}", kb_set))
            .await?;

        tracing::info!("📋 Conjunto {} tem {} campos", kb_set, fields.len());
        Ok(fields)
    }

    /// Cria uma definição de campo (`POST /fields/`)
    pub async fn create_field(&self, request: &NewFieldRequest) -> Result<FieldDefinition> {
        self.post_json("/fields/", request).await
    }

    /// Remove uma definição de campo
    pub async fn delete_field(&self, field_id: FieldId) -> Result<()> {
        self.delete(&format!("/fields/{}/", field_id)).await
    }

    // ==================== ENTRIES ====================

    /// Lista as entries de um conjunto, com back-references preenchidos
    pub async fn list_entries(&self, kb_set: SetId) -> Result<Vec<Entry>> {
        let entries: Vec<Entry> = self
            .get_json(&format!("/entries/?kb_set={}", kb_set))
            .await?;
        Ok(entries.into_iter().map(Entry::link_values).collect())
    }

    /// Cria uma entry (`POST /entries/`); o backend aloca o id
    pub async fn create_entry(&self, request: &EntryRequest) -> Result<Entry> {
        let entry: Entry = self.post_json("/entries/", request).await?;
        Ok(entry.link_values())
    }

    /// Substitui o array `values` de uma entry (`PUT /entries/{id}/`)
    pub async fn update_entry(&self, entry_id: EntryId, request: &EntryRequest) -> Result<Entry> {
        let entry: Entry = self
            .put_json(&format!("/entries/{}/", entry_id), request)
            .await?;
        Ok(entry.link_values())
    }

    /// Remove uma entry
    pub async fn delete_entry(&self, entry_id: EntryId) -> Result<()> {
        self.delete(&format!("/entries/{}/", entry_id)).await
    }
}

impl fmt::Debug for KnowledgeBaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeBaseClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
