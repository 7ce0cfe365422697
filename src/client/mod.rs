//! Remote API client
//!
//! Typed reqwest client for the news backend, plus the trait seams
//! (`NewsApi`, `AuthApi`, `UploadApi`) that services and controllers depend
//! on so they can be tested against substitutes.
//!
//! Wire types keep the Spanish field names the API speaks; conversions into
//! the domain models (author aliasing, date parsing) live next to the DTOs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::ApiConfig;
use crate::models::{noticia::parse_fecha, NewsDraft, NewsItem, User, UserRole};

/// Error type for API operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure (unreachable host, timeout, malformed body)
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response, carrying the server's `detail` message when present
    #[error("server returned status {status}")]
    Status { status: u16, detail: Option<String> },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Shared bearer-token slot.
///
/// The session store writes it, the API client reads it on every
/// authenticated request. This replaces the HTTP interceptor of the
/// browser incarnation.
#[derive(Debug, Clone, Default)]
pub struct TokenCell(Arc<RwLock<Option<String>>>);

impl TokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bearer token, if any
    pub fn get(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the bearer token (`None` clears it)
    pub fn set(&self, token: Option<String>) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = token;
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Query parameters for `GET /noticias`.
///
/// Every field is optional on the wire; the backend applies its own
/// defaults for anything omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagina: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_por_pagina: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busqueda: Option<String>,
}

/// A news record as the API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct NoticiaDto {
    pub id: i64,
    pub titulo: String,
    pub descripcion: String,
    pub contenido: String,
    pub categoria: String,
    #[serde(default)]
    pub imagen: Option<String>,
    pub fecha: String,
    #[serde(default)]
    pub autor_nombre: Option<String>,
}

/// Paginated listing envelope from `GET /noticias`
#[derive(Debug, Clone, Deserialize)]
pub struct NewsPageDto {
    pub items: Vec<NoticiaDto>,
    pub total_items: i64,
    pub total_paginas: u32,
    pub pagina_actual: u32,
    pub items_por_pagina: u32,
}

/// Outgoing news payload: only the editable fields, never id, timestamp,
/// or author.
#[derive(Debug, Clone, Serialize)]
pub struct NewsPayload {
    pub titulo: String,
    pub descripcion: String,
    pub contenido: String,
    pub categoria: String,
    pub imagen: String,
}

/// Credentials for `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

/// A user record as the API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct UsuarioDto {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub rol: UserRole,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Successful auth exchange: the user plus a bearer token
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponseDto {
    pub usuario: UsuarioDto,
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Response from `POST /upload`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponseDto {
    pub url: String,
}

/// An image file selected for upload
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Original file name
    pub name: String,
    /// MIME type reported for the file
    pub content_type: String,
    /// Raw contents
    pub bytes: Vec<u8>,
}

/// Error body shape shared by the backend's failure responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

// ============================================================================
// Conversions into domain models
// ============================================================================

impl From<NoticiaDto> for NewsItem {
    fn from(dto: NoticiaDto) -> Self {
        Self {
            id: dto.id,
            title: dto.titulo,
            description: dto.descripcion,
            body: dto.contenido,
            category: dto.categoria,
            image: dto.imagen.unwrap_or_default(),
            published_at: parse_fecha(&dto.fecha),
            author: dto.autor_nombre.unwrap_or_default(),
        }
    }
}

impl From<UsuarioDto> for User {
    fn from(dto: UsuarioDto) -> Self {
        Self {
            id: dto.id,
            name: dto.nombre,
            email: dto.email,
            role: dto.rol,
            avatar: dto.avatar,
        }
    }
}

impl From<&NewsDraft> for NewsPayload {
    fn from(draft: &NewsDraft) -> Self {
        Self {
            titulo: draft.title.clone(),
            descripcion: draft.description.clone(),
            contenido: draft.body.clone(),
            categoria: draft.category.clone(),
            imagen: draft.image.clone(),
        }
    }
}

// ============================================================================
// Trait seams
// ============================================================================

/// News endpoints of the remote API
#[async_trait]
pub trait NewsApi: Send + Sync {
    /// `GET /noticias` with the given filters
    async fn list(&self, query: &NewsQuery) -> Result<NewsPageDto, ApiError>;

    /// `GET /noticias/{id}`
    async fn get(&self, id: i64) -> Result<NoticiaDto, ApiError>;

    /// `POST /noticias`
    async fn create(&self, payload: &NewsPayload) -> Result<NoticiaDto, ApiError>;

    /// `PUT /noticias/{id}`
    async fn update(&self, id: i64, payload: &NewsPayload) -> Result<NoticiaDto, ApiError>;

    /// `DELETE /noticias/{id}`
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Auth endpoints of the remote API
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponseDto, ApiError>;

    /// `POST /auth/register`
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponseDto, ApiError>;

    /// `GET /auth/me` with the current bearer token
    async fn me(&self) -> Result<UsuarioDto, ApiError>;
}

/// File upload endpoint of the remote API
#[async_trait]
pub trait UploadApi: Send + Sync {
    /// `POST /upload` as multipart form data
    async fn upload(&self, file: ImageFile) -> Result<UploadResponseDto, ApiError>;
}

// ============================================================================
// reqwest implementation
// ============================================================================

/// HTTP client for the news backend
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: TokenCell,
}

impl ApiClient {
    /// Create a client for the configured base URL, reading bearer tokens
    /// from the shared cell.
    pub fn new(config: &ApiConfig, token: TokenCell) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Turn a non-2xx response into an `ApiError::Status`, keeping the
/// server's `detail` message when the body carries one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .map(|body| body.detail);
    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl NewsApi for ApiClient {
    async fn list(&self, query: &NewsQuery) -> Result<NewsPageDto, ApiError> {
        let response = self
            .http
            .get(self.url("/noticias"))
            .query(query)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn get(&self, id: i64) -> Result<NoticiaDto, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/noticias/{}", id)))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn create(&self, payload: &NewsPayload) -> Result<NoticiaDto, ApiError> {
        let request = self.http.post(self.url("/noticias")).json(payload);
        let response = self.authorize(request).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn update(&self, id: i64, payload: &NewsPayload) -> Result<NoticiaDto, ApiError> {
        let request = self
            .http
            .put(self.url(&format!("/noticias/{}", id)))
            .json(payload);
        let response = self.authorize(request).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(&format!("/noticias/{}", id)));
        let response = self.authorize(request).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponseDto, ApiError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponseDto, ApiError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn me(&self) -> Result<UsuarioDto, ApiError> {
        let request = self.http.get(self.url("/auth/me"));
        let response = self.authorize(request).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl UploadApi for ApiClient {
    async fn upload(&self, file: ImageFile) -> Result<UploadResponseDto, ApiError> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let request = self.http.post(self.url("/upload")).multipart(form);
        let response = self.authorize(request).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_news_query_omits_empty_filters() {
        let query = NewsQuery {
            pagina: Some(2),
            items_por_pagina: Some(4),
            categoria: None,
            busqueda: None,
        };
        let value = serde_json::to_value(&query).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["pagina"], 2);
        assert!(!object.contains_key("categoria"));
        assert!(!object.contains_key("busqueda"));
    }

    #[test]
    fn test_noticia_dto_maps_author_alias_and_date() {
        let dto = NoticiaDto {
            id: 12,
            titulo: "Título".to_string(),
            descripcion: "Descripción".to_string(),
            contenido: "Contenido".to_string(),
            categoria: "Deportes".to_string(),
            imagen: Some("images/x.jpg".to_string()),
            fecha: "2024-12-20T18:30:00".to_string(),
            autor_nombre: Some("María".to_string()),
        };
        let item = NewsItem::from(dto);
        assert_eq!(item.author, "María");
        assert_eq!(item.published_at.year(), 2024);
        assert_eq!(item.published_at.month(), 12);
        assert_eq!(item.image, "images/x.jpg");
    }

    #[test]
    fn test_noticia_dto_defaults_missing_optionals() {
        let dto: NoticiaDto = serde_json::from_str(
            r#"{"id":1,"titulo":"t","descripcion":"d","contenido":"c",
                "categoria":"Cultura","fecha":"2024-01-01"}"#,
        )
        .unwrap();
        let item = NewsItem::from(dto);
        assert_eq!(item.image, "");
        assert_eq!(item.author, "");
    }

    #[test]
    fn test_payload_carries_only_editable_fields() {
        let draft = NewsDraft {
            title: "t".to_string(),
            description: "d".to_string(),
            body: "c".to_string(),
            category: "Cultura".to_string(),
            image: "img".to_string(),
            published_at: chrono::Utc::now(),
            author: "Admin".to_string(),
        };
        let payload = NewsPayload::from(&draft);
        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["categoria", "contenido", "descripcion", "imagen", "titulo"]
        );
    }

    #[test]
    fn test_auth_response_parses_wire_shape() {
        let response: AuthResponseDto = serde_json::from_str(
            r#"{"usuario":{"id":1,"nombre":"Ana","email":"ana@example.com","rol":"admin"},
                "access_token":"tok","token_type":"bearer"}"#,
        )
        .unwrap();
        assert_eq!(response.access_token, "tok");
        let user = User::from(response.usuario);
        assert!(user.is_admin());
        assert_eq!(user.name, "Ana");
    }

    #[test]
    fn test_token_cell_set_and_clear() {
        let cell = TokenCell::new();
        assert_eq!(cell.get(), None);
        cell.set(Some("abc".to_string()));
        assert_eq!(cell.get(), Some("abc".to_string()));
        cell.set(None);
        assert_eq!(cell.get(), None);
    }
}
