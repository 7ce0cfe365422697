//! Admin screen controller
//!
//! View state for the news management screen:
//! - construction fails for non-administrators
//! - management list, create/edit form, deletion
//! - image upload with local validation before any network call
//! - status messages that expire after a few seconds

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::client::{ImageFile, UploadApi};
use crate::config::UploadConfig;
use crate::models::{CategoryFilter, NewsDraft, NewsItem};
use crate::services::{NewsRepository, SessionStore};

/// Page size for the management list; large enough to show everything
const ADMIN_PAGE_SIZE: u32 = 100;

/// How long a status message stays visible
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Image used when the form leaves the image field blank
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1504711434969-e33886168f5c?w=400&h=250&fit=crop";

/// Construction was attempted by a non-administrator
#[derive(Debug, thiserror::Error)]
#[error("Acceso restringido a administradores")]
pub struct AdminAccessDenied;

/// Editable form fields for a news item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsForm {
    pub title: String,
    pub description: String,
    pub body: String,
    pub category: String,
    pub image: String,
}

impl NewsForm {
    fn from_item(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            body: item.body.clone(),
            category: item.category.clone(),
            image: item.image.clone(),
        }
    }
}

/// A transient status banner
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// View state for the news management screen
pub struct AdminController {
    repo: Arc<dyn NewsRepository>,
    uploader: Arc<dyn UploadApi>,
    upload_config: UploadConfig,
    author: String,
    items: Vec<NewsItem>,
    form: NewsForm,
    form_open: bool,
    editing: Option<i64>,
    status: Option<(StatusMessage, Instant)>,
    message_ttl: Duration,
}

impl AdminController {
    /// Build the controller for the current session. Fails when the session
    /// has no administrator, so the caller can redirect.
    pub fn new(
        session: &SessionStore,
        repo: Arc<dyn NewsRepository>,
        uploader: Arc<dyn UploadApi>,
        upload_config: UploadConfig,
    ) -> Result<Self, AdminAccessDenied> {
        let user = session.current_user().filter(|u| u.is_admin());
        let Some(user) = user else {
            return Err(AdminAccessDenied);
        };
        Ok(Self {
            repo,
            uploader,
            upload_config,
            author: user.name,
            items: Vec::new(),
            form: NewsForm::default(),
            form_open: false,
            editing: None,
            status: None,
            message_ttl: STATUS_MESSAGE_TTL,
        })
    }

    /// Override the status message lifetime
    pub fn with_message_ttl(mut self, ttl: Duration) -> Self {
        self.message_ttl = ttl;
        self
    }

    /// Fetch the management list (first page, everything on it).
    pub async fn load_items(&mut self) {
        match self
            .repo
            .fetch_page(1, ADMIN_PAGE_SIZE, CategoryFilter::All, "")
            .await
        {
            Ok(page) => self.items = page.items,
            Err(err) => {
                tracing::warn!(error = %err, "admin list load failed");
                self.set_status("Error al cargar las noticias", true);
            }
        }
    }

    /// Open the form, blank for a new item or populated for editing.
    pub fn open_form(&mut self, item: Option<&NewsItem>) {
        match item {
            Some(item) => {
                self.form = NewsForm::from_item(item);
                self.editing = Some(item.id);
            }
            None => {
                self.form = NewsForm::default();
                self.editing = None;
            }
        }
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.form = NewsForm::default();
        self.editing = None;
        self.form_open = false;
    }

    pub fn form_mut(&mut self) -> &mut NewsForm {
        &mut self.form
    }

    /// Validate and persist the form: create when no item is being edited,
    /// update otherwise. Blank body falls back to the description, blank
    /// image to the placeholder.
    pub async fn save(&mut self) {
        if self.form.title.trim().is_empty()
            || self.form.description.trim().is_empty()
            || self.form.category.trim().is_empty()
        {
            self.set_status("Por favor completa todos los campos requeridos", true);
            return;
        }

        let body = if self.form.body.trim().is_empty() {
            self.form.description.clone()
        } else {
            self.form.body.clone()
        };
        let image = if self.form.image.trim().is_empty() {
            PLACEHOLDER_IMAGE_URL.to_string()
        } else {
            self.form.image.clone()
        };
        let draft = NewsDraft {
            title: self.form.title.clone(),
            description: self.form.description.clone(),
            body,
            category: self.form.category.clone(),
            image,
            published_at: Utc::now(),
            author: self.author.clone(),
        };

        let result = match self.editing {
            Some(id) => self
                .repo
                .update(id, &draft)
                .await
                .map(|_| "Noticia actualizada correctamente")
                .map_err(|e| (e, "Error al actualizar la noticia")),
            None => self
                .repo
                .create(&draft)
                .await
                .map(|_| "Noticia creada correctamente")
                .map_err(|e| (e, "Error al crear la noticia")),
        };

        match result {
            Ok(message) => {
                self.set_status(message, false);
                self.close_form();
                self.load_items().await;
            }
            Err((err, message)) => {
                tracing::warn!(error = %err, "news save failed");
                self.set_status(message, true);
            }
        }
    }

    /// Delete an item and refresh the list.
    pub async fn delete_item(&mut self, id: i64) {
        if self.repo.delete(id).await {
            self.set_status("Noticia eliminada correctamente", false);
            self.load_items().await;
        } else {
            self.set_status("Error al eliminar la noticia", true);
        }
    }

    /// Upload an image for the form. Type and size are checked locally; a
    /// rejected file never reaches the network.
    pub async fn upload_image(&mut self, file: ImageFile) {
        if !self.upload_config.is_type_allowed(&file.content_type) {
            self.set_status(
                "Tipo de archivo no permitido. Solo imágenes PNG, JPG, GIF o WEBP",
                true,
            );
            return;
        }
        if file.bytes.len() as u64 > self.upload_config.max_file_size {
            self.set_status("La imagen es demasiado grande. Máximo 5MB", true);
            return;
        }
        match self.uploader.upload(file).await {
            Ok(response) => {
                self.form.image = response.url;
                self.set_status("Imagen subida exitosamente", false);
            }
            Err(err) => {
                tracing::warn!(error = %err, "image upload failed");
                self.set_status("Error al subir la imagen", true);
            }
        }
    }

    /// The current status banner, or `None` once it has expired.
    pub fn status(&mut self) -> Option<&StatusMessage> {
        if let Some((_, shown_at)) = &self.status {
            if shown_at.elapsed() >= self.message_ttl {
                self.status = None;
            }
        }
        self.status.as_ref().map(|(message, _)| message)
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn form(&self) -> &NewsForm {
        &self.form
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn editing(&self) -> Option<i64> {
        self.editing
    }

    fn set_status(&mut self, text: &str, is_error: bool) {
        self.status = Some((
            StatusMessage {
                text: text.to_string(),
                is_error,
            },
            Instant::now(),
        ));
    }
}
