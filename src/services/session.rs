//! Session store
//!
//! Owns the authenticated user and bearer token for the lifetime of the
//! process:
//! - login / register against the auth API, adopting the session on success
//! - restore from persisted storage without touching the network
//! - verify the persisted token against the API, logging out when stale
//!
//! Persistence mirrors the browser's localStorage keys: the serialized user
//! under `usuario`, the raw token under `token`.

use std::sync::{Arc, RwLock};

use crate::client::{ApiError, AuthApi, LoginRequest, RegisterRequest, TokenCell};
use crate::models::User;
use crate::storage::KeyValueStore;

/// Storage key holding the serialized session user
pub const SESSION_USER_KEY: &str = "usuario";
/// Storage key holding the bearer token
pub const SESSION_TOKEN_KEY: &str = "token";

/// Result of a login or registration attempt, as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    /// Whether the session was established
    pub success: bool,
    /// Spanish status message for the auth screen
    pub message: String,
}

#[derive(Debug, Clone)]
struct SessionData {
    user: User,
    token: String,
}

/// Holds the current session and mediates all auth exchanges
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn KeyValueStore>,
    token_cell: TokenCell,
    state: RwLock<Option<SessionData>>,
}

impl SessionStore {
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn KeyValueStore>,
        token_cell: TokenCell,
    ) -> Self {
        Self {
            api,
            storage,
            token_cell,
            state: RwLock::new(None),
        }
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&request).await {
            Ok(response) => {
                self.adopt(User::from(response.usuario), response.access_token)
                    .await;
                AuthOutcome {
                    success: true,
                    message: "Inicio de sesión exitoso".to_string(),
                }
            }
            Err(err) => AuthOutcome {
                success: false,
                message: failure_message(&err, "Credenciales incorrectas"),
            },
        }
    }

    /// Register a new account; a successful registration also logs in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AuthOutcome {
        let request = RegisterRequest {
            nombre: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.register(&request).await {
            Ok(response) => {
                self.adopt(User::from(response.usuario), response.access_token)
                    .await;
                AuthOutcome {
                    success: true,
                    message: "Registro exitoso".to_string(),
                }
            }
            Err(err) => AuthOutcome {
                success: false,
                message: failure_message(&err, "Error al registrar"),
            },
        }
    }

    /// Rehydrate the session from storage. Returns true when both the user
    /// and token were present. Makes no network calls; pair with
    /// `verify_session` to check the token is still accepted.
    pub async fn restore(&self) -> bool {
        let raw_user = match self.storage.get(SESSION_USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted session user");
                return false;
            }
        };
        let token = match self.storage.get(SESSION_TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted session token");
                return false;
            }
        };
        let user: User = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, "persisted session user is corrupt, discarding");
                self.logout().await;
                return false;
            }
        };
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = Some(SessionData {
            user,
            token: token.clone(),
        });
        self.token_cell.set(Some(token));
        true
    }

    /// Ask the API whether the current token is still valid. Refreshes the
    /// stored user on success; clears the session on any failure.
    pub async fn verify_session(&self) -> bool {
        if self.token().is_none() {
            return false;
        }
        match self.api.me().await {
            Ok(dto) => {
                let user = User::from(dto);
                self.persist_user(&user).await;
                let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
                if let Some(session) = state.as_mut() {
                    session.user = user;
                }
                true
            }
            Err(err) => {
                tracing::info!(error = %err, "session token rejected, logging out");
                self.logout().await;
                false
            }
        }
    }

    /// Drop the session. Safe to call when not logged in.
    pub async fn logout(&self) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.token_cell.set(None);
        if let Err(err) = self.storage.remove(SESSION_USER_KEY).await {
            tracing::warn!(error = %err, "failed to remove persisted session user");
        }
        if let Err(err) = self.storage.remove(SESSION_TOKEN_KEY).await {
            tracing::warn!(error = %err, "failed to remove persisted session token");
        }
    }

    /// The logged-in user, if any
    pub fn current_user(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.user.clone())
    }

    /// The current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.user.is_admin())
            .unwrap_or(false)
    }

    async fn adopt(&self, user: User, token: String) {
        self.persist_user(&user).await;
        if let Err(err) = self.storage.set(SESSION_TOKEN_KEY, &token).await {
            tracing::warn!(error = %err, "failed to persist session token");
        }
        self.token_cell.set(Some(token.clone()));
        *self.state.write().unwrap_or_else(|e| e.into_inner()) =
            Some(SessionData { user, token });
    }

    async fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(err) = self.storage.set(SESSION_USER_KEY, &raw).await {
                    tracing::warn!(error = %err, "failed to persist session user");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize session user");
            }
        }
    }
}

/// The message shown for a failed auth exchange: the server's `detail` when
/// it sent one, the screen's generic message for bare status failures, and
/// a connection error otherwise.
fn failure_message(err: &ApiError, generic: &str) -> String {
    match err {
        ApiError::Status {
            detail: Some(detail),
            ..
        } => detail.clone(),
        ApiError::Status { detail: None, .. } => generic.to_string(),
        ApiError::Transport(_) => "Error de conexión".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AuthResponseDto, UsuarioDto};
    use crate::models::UserRole;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn usuario_dto(role: UserRole) -> UsuarioDto {
        UsuarioDto {
            id: 1,
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            rol: role,
            avatar: None,
        }
    }

    fn auth_response(role: UserRole) -> AuthResponseDto {
        AuthResponseDto {
            usuario: usuario_dto(role),
            access_token: "tok-123".to_string(),
            token_type: "bearer".to_string(),
        }
    }

    /// Auth API stub returning programmed results and counting calls.
    struct StubAuthApi {
        login_result: Mutex<Option<Result<AuthResponseDto, ApiError>>>,
        register_result: Mutex<Option<Result<AuthResponseDto, ApiError>>>,
        me_result: Mutex<Option<Result<UsuarioDto, ApiError>>>,
        calls: AtomicUsize,
    }

    impl StubAuthApi {
        fn new() -> Self {
            Self {
                login_result: Mutex::new(None),
                register_result: Mutex::new(None),
                me_result: Mutex::new(None),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_login(self, result: Result<AuthResponseDto, ApiError>) -> Self {
            *self.login_result.lock().unwrap() = Some(result);
            self
        }

        fn with_register(self, result: Result<AuthResponseDto, ApiError>) -> Self {
            *self.register_result.lock().unwrap() = Some(result);
            self
        }

        fn with_me(self, result: Result<UsuarioDto, ApiError>) -> Self {
            *self.me_result.lock().unwrap() = Some(result);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthApi for StubAuthApi {
        async fn login(&self, _request: &LoginRequest) -> Result<AuthResponseDto, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.login_result.lock().unwrap().clone().unwrap()
        }

        async fn register(
            &self,
            _request: &RegisterRequest,
        ) -> Result<AuthResponseDto, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.register_result.lock().unwrap().clone().unwrap()
        }

        async fn me(&self) -> Result<UsuarioDto, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.me_result.lock().unwrap().clone().unwrap()
        }
    }

    fn store_with(api: StubAuthApi) -> (SessionStore, Arc<crate::storage::MemoryStore>) {
        let storage = Arc::new(crate::storage::MemoryStore::new());
        let store = SessionStore::new(Arc::new(api), storage.clone(), TokenCell::new());
        (store, storage)
    }

    #[tokio::test]
    async fn test_login_success_establishes_session() {
        let api = StubAuthApi::new().with_login(Ok(auth_response(UserRole::Admin)));
        let (store, storage) = store_with(api);

        let outcome = store.login("ana@example.com", "secret").await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Inicio de sesión exitoso");
        assert!(store.is_logged_in());
        assert!(store.is_admin());
        assert_eq!(store.token(), Some("tok-123".to_string()));

        // both keys persisted
        assert!(storage.get(SESSION_USER_KEY).await.unwrap().is_some());
        assert_eq!(
            storage.get(SESSION_TOKEN_KEY).await.unwrap(),
            Some("tok-123".to_string())
        );
    }

    #[tokio::test]
    async fn test_login_failure_messages() {
        let api = StubAuthApi::new().with_login(Err(ApiError::Status {
            status: 401,
            detail: Some("Usuario bloqueado".to_string()),
        }));
        let (store, _) = store_with(api);
        let outcome = store.login("a@b.c", "x").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Usuario bloqueado");
        assert!(!store.is_logged_in());

        let api = StubAuthApi::new().with_login(Err(ApiError::Status {
            status: 401,
            detail: None,
        }));
        let (store, _) = store_with(api);
        assert_eq!(
            store.login("a@b.c", "x").await.message,
            "Credenciales incorrectas"
        );

        let api =
            StubAuthApi::new().with_login(Err(ApiError::Transport("refused".to_string())));
        let (store, _) = store_with(api);
        assert_eq!(store.login("a@b.c", "x").await.message, "Error de conexión");
    }

    #[tokio::test]
    async fn test_register_success_logs_in() {
        let api = StubAuthApi::new().with_register(Ok(auth_response(UserRole::Regular)));
        let (store, _) = store_with(api);

        let outcome = store.register("Ana", "ana@example.com", "secret").await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Registro exitoso");
        assert!(store.is_logged_in());
        assert!(!store.is_admin());
    }

    #[tokio::test]
    async fn test_register_failure_generic_message() {
        let api = StubAuthApi::new().with_register(Err(ApiError::Status {
            status: 400,
            detail: None,
        }));
        let (store, _) = store_with(api);
        let outcome = store.register("Ana", "ana@example.com", "secret").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Error al registrar");
    }

    #[tokio::test]
    async fn test_restore_needs_both_keys_and_makes_no_calls() {
        let api = StubAuthApi::new();
        let (store, storage) = store_with(api);
        assert!(!store.restore().await);

        storage.set(SESSION_TOKEN_KEY, "tok").await.unwrap();
        assert!(!store.restore().await);

        let user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: UserRole::Admin,
            avatar: None,
        };
        storage
            .set(SESSION_USER_KEY, &serde_json::to_string(&user).unwrap())
            .await
            .unwrap();
        assert!(store.restore().await);
        assert!(store.is_admin());
        assert_eq!(store.token(), Some("tok".to_string()));
    }

    #[tokio::test]
    async fn test_restore_discards_corrupt_user() {
        let api = StubAuthApi::new();
        let (store, storage) = store_with(api);
        storage.set(SESSION_USER_KEY, "not json").await.unwrap();
        storage.set(SESSION_TOKEN_KEY, "tok").await.unwrap();

        assert!(!store.restore().await);
        assert_eq!(storage.get(SESSION_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_verify_session_refreshes_user() {
        let mut refreshed = usuario_dto(UserRole::Admin);
        refreshed.nombre = "Ana María".to_string();
        let api = StubAuthApi::new()
            .with_login(Ok(auth_response(UserRole::Admin)))
            .with_me(Ok(refreshed));
        let (store, _) = store_with(api);

        store.login("ana@example.com", "secret").await;
        assert!(store.verify_session().await);
        assert_eq!(store.current_user().unwrap().name, "Ana María");
    }

    #[tokio::test]
    async fn test_verify_session_rejection_logs_out() {
        let api = StubAuthApi::new()
            .with_login(Ok(auth_response(UserRole::Regular)))
            .with_me(Err(ApiError::Status {
                status: 401,
                detail: None,
            }));
        let (store, storage) = store_with(api);

        store.login("ana@example.com", "secret").await;
        assert!(!store.verify_session().await);
        assert!(!store.is_logged_in());
        assert_eq!(storage.get(SESSION_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_verify_session_without_token_skips_api() {
        let api = StubAuthApi::new();
        let (store, _) = store_with(api);
        assert!(!store.verify_session().await);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let api = StubAuthApi::new().with_login(Ok(auth_response(UserRole::Regular)));
        let (store, storage) = store_with(api);

        store.login("ana@example.com", "secret").await;
        store.logout().await;
        assert!(!store.is_logged_in());
        assert_eq!(store.token(), None);
        assert_eq!(storage.get(SESSION_USER_KEY).await.unwrap(), None);

        store.logout().await;
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn test_restore_makes_no_network_calls() {
        let api = StubAuthApi::new();
        let counter_view = Arc::new(api);
        let storage = Arc::new(crate::storage::MemoryStore::new());
        let store = SessionStore::new(counter_view.clone(), storage, TokenCell::new());

        store.restore().await;
        assert_eq!(counter_view.call_count(), 0);
    }
}
