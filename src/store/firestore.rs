//! HTTP client for the Cloud Firestore REST API

use std::sync::RwLock;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use super::error::StoreError;
use super::wire::{
    CommitRequest, ErrorResponse, ListDocumentsResponse, RunQueryRequest, RunQueryResponse,
    WireDocument, WireWrite,
};
use super::{Document, DocumentStore, Fields, Value, WriteBatch};

/// Firestore client bound to one project's default database
pub struct FirestoreClient {
    /// HTTP client
    client: Client,
    /// `https://firestore.googleapis.com/v1` or an emulator equivalent
    base_url: String,
    /// `projects/{project}/databases/(default)`
    database: String,
    /// Web API key, sent as the `key` query parameter
    api_key: Option<String>,
    /// ID token of the signed-in principal, sent as a bearer token
    id_token: RwLock<Option<String>>,
}

impl FirestoreClient {
    /// Production endpoint
    const API_URL: &'static str = "https://firestore.googleapis.com/v1";
    /// Page size used when listing collections
    const PAGE_SIZE: &'static str = "300";

    /// Create a client for the given project
    pub fn new(project_id: &str, api_key: Option<String>) -> Result<Self, StoreError> {
        Self::with_base_url(Self::API_URL.to_string(), project_id, api_key)
    }

    /// Create a client talking to a local Firestore emulator (`host:port`)
    pub fn with_emulator(host: &str, project_id: &str) -> Result<Self, StoreError> {
        Self::with_base_url(format!("http://{}/v1", host.trim_end_matches('/')), project_id, None)
    }

    fn with_base_url(
        base_url: String,
        project_id: &str,
        api_key: Option<String>,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().user_agent(concat!("lectern/", env!("CARGO_PKG_VERSION"))).build()?;

        Ok(Self {
            client,
            base_url,
            database: format!("projects/{}/databases/(default)", project_id),
            api_key: api_key.filter(|k| !k.is_empty()),
            id_token: RwLock::new(None),
        })
    }

    /// Resource name of a document, as used inside commit writes
    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database, collection, id)
    }

    fn documents_url(&self) -> String {
        format!("{}/{}/documents", self.base_url, self.database)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url(), collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url(), collection, id)
    }

    fn bearer(&self) -> Option<String> {
        self.id_token.read().ok().and_then(|token| token.clone())
    }

    /// Start a request carrying the API key and, when signed in, the ID token
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!("firestore {} {}", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key)]);
        }
        if let Some(token) = self.bearer() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Map non-success responses onto store errors
    async fn check(response: Response, target: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(StoreError::RateLimited { retry_after_seconds: retry_after });
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(target.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StoreError::PermissionDenied(message))
            }
            _ => Err(StoreError::ApiError { status: status.as_u16(), message }),
        }
    }
}

impl DocumentStore for FirestoreClient {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.request(Method::GET, &url).query(&[("pageSize", Self::PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = Self::check(request.send().await?, collection).await?;
            let page: ListDocumentsResponse = serde_json::from_str(&response.text().await?)?;
            for wire in page.documents {
                documents.push(Document::try_from(wire)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let response = self.request(Method::GET, &self.document_url(collection, id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response, id).await?;
        let wire: WireDocument = serde_json::from_str(&response.text().await?)?;
        Ok(Some(Document::try_from(wire)?))
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url());
        let body = RunQueryRequest::field_equals(collection, field, &value);

        let response = Self::check(self.request(Method::POST, &url).json(&body).send().await?, collection)
            .await?;
        let rows: Vec<RunQueryResponse> = serde_json::from_str(&response.text().await?)?;

        rows.into_iter().filter_map(|row| row.document).map(Document::try_from).collect()
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let body = WireDocument::with_fields(&fields);
        let response = Self::check(
            self.request(Method::POST, &self.collection_url(collection)).json(&body).send().await?,
            collection,
        )
        .await?;

        let created: WireDocument = serde_json::from_str(&response.text().await?)?;
        let id = created.id().to_string();
        tracing::info!("created {}/{}", collection, id);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut params: Vec<(&str, &str)> =
            fields.keys().map(|name| ("updateMask.fieldPaths", name.as_str())).collect();
        // Without this precondition a PATCH would create a missing document.
        params.push(("currentDocument.exists", "true"));

        let body = WireDocument::with_fields(&fields);
        Self::check(
            self.request(Method::PATCH, &self.document_url(collection, id))
                .query(&params)
                .json(&body)
                .send()
                .await?,
            id,
        )
        .await?;

        tracing::info!("updated {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        Self::check(self.request(Method::DELETE, &self.document_url(collection, id)).send().await?, id)
            .await?;

        tracing::info!("deleted {}/{}", collection, id);
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let writes = batch
            .deletes()
            .iter()
            .map(|doc| WireWrite { delete: self.document_name(&doc.collection, &doc.id) })
            .collect();
        let url = format!("{}:commit", self.documents_url());

        Self::check(
            self.request(Method::POST, &url).json(&CommitRequest { writes }).send().await?,
            "commit",
        )
        .await?;

        tracing::info!("committed batch of {} deletes", batch.len());
        Ok(())
    }

    fn set_id_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.id_token.write() {
            *slot = token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_resource_layout() {
        let client = FirestoreClient::new("demo", Some("key".into())).unwrap();

        assert_eq!(
            client.document_url("videos", "v1"),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/videos/v1"
        );
        assert_eq!(
            client.document_name("quizzes", "q1"),
            "projects/demo/databases/(default)/documents/quizzes/q1"
        );
    }

    #[test]
    fn emulator_uses_plain_http() {
        let client = FirestoreClient::with_emulator("localhost:8080/", "demo").unwrap();
        assert_eq!(
            client.collection_url("admins"),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/admins"
        );
        assert!(client.api_key.is_none());
    }

    #[test]
    fn empty_api_key_is_ignored() {
        let client = FirestoreClient::new("demo", Some(String::new())).unwrap();
        assert!(client.api_key.is_none());
    }

    #[test]
    fn id_token_can_be_set_and_cleared() {
        let client = FirestoreClient::new("demo", None).unwrap();
        client.set_id_token(Some("token".into()));
        assert_eq!(client.bearer().as_deref(), Some("token"));
        client.set_id_token(None);
        assert!(client.bearer().is_none());
    }
}
