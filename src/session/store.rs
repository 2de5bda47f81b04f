//! Process-wide session store.
//!
//! Owns the in-memory [`Session`], applies [`SessionIntent`]s through the
//! pure reducer, and mirrors token and profile into [`SessionStorage`].

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use tokio::sync::watch;

use crate::gateway::{ApiMethod, GatewayClient, GatewayError, RequestBody, RequestOptions, SessionAccessor};
use crate::mvi::Reducer;
use crate::session::credentials::{BearerToken, Credentials};
use crate::session::reducer::{SessionIntent, SessionReducer};
use crate::session::state::{ProfilePatch, Session, UserProfile};
use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};

/// Shown when the login endpoint fails without a message of its own.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    user: UserProfile,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<Session>,
    storage: Arc<dyn SessionStorage>,
    updates: watch::Sender<Session>,
}

impl SessionStore {
    /// Open the store, rehydrating from any persisted token and profile.
    ///
    /// A persisted token is trusted without a network round-trip until the
    /// backend rejects it.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let mut session = Session::default();

        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted token, starting anonymous");
                None
            }
        };

        if let Some(token) = token {
            let user = match storage.get(USER_KEY) {
                Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                    Ok(user) => Some(user),
                    Err(e) => {
                        tracing::warn!(error = %e, "Persisted user profile is unreadable, ignoring it");
                        None
                    }
                },
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read persisted user profile");
                    None
                }
            };
            session = SessionReducer::reduce(
                session,
                SessionIntent::Rehydrated {
                    token: BearerToken::new(token),
                    user,
                },
            );
            tracing::info!("Session rehydrated from storage");
        }

        let (updates, _) = watch::channel(session.clone());
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(session),
                storage,
                updates,
            }),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().is_authenticated()
    }

    /// Receive every new session state.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.updates.subscribe()
    }

    /// Apply an intent and persist whatever changed.
    pub fn dispatch(&self, intent: SessionIntent) {
        let mut state = self.inner.state.write();
        self.apply(&mut state, intent);
    }

    fn apply(&self, state: &mut Session, intent: SessionIntent) {
        let previous = state.clone();
        *state = SessionReducer::reduce(previous.clone(), intent);
        if *state == previous {
            return;
        }
        self.persist(&previous, state);
        self.inner.updates.send_replace(state.clone());
    }

    fn persist(&self, previous: &Session, current: &Session) {
        let storage = &self.inner.storage;
        let result = match &current.token {
            None if previous.token.is_some() => clear_persisted(storage.as_ref()),
            None => Ok(()),
            Some(token) => {
                let mut result = Ok(());
                if previous.token.as_ref() != Some(token) {
                    result = storage.set(TOKEN_KEY, token.expose());
                }
                if result.is_ok() && previous.user != current.user {
                    result = match &current.user {
                        Some(user) => match serde_json::to_string(user) {
                            Ok(raw) => storage.set(USER_KEY, &raw),
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to serialize user profile");
                                Ok(())
                            }
                        },
                        None => storage.remove(USER_KEY),
                    };
                }
                result
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist session");
        }
    }

    /// Clear memory and storage. Returns whether any session existed.
    fn clear(&self) -> bool {
        let mut state = self.inner.state.write();
        let persisted = matches!(self.inner.storage.get(TOKEN_KEY), Ok(Some(t)) if !t.is_empty());
        let had_session = state.token.is_some() || persisted;

        self.apply(&mut state, SessionIntent::LoggedOut);
        if let Err(e) = clear_persisted(self.inner.storage.as_ref()) {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
        had_session
    }

    /// Sign in against the backend login endpoint.
    ///
    /// On failure `status = failed` and the server's message (or
    /// [`LOGIN_FALLBACK_MESSAGE`]) are recorded. An existing session is left
    /// in place unless the backend answered 401/403.
    pub async fn login(
        &self,
        gateway: &GatewayClient,
        credentials: &Credentials,
    ) -> Result<UserProfile, GatewayError> {
        self.dispatch(SessionIntent::LoginStarted);

        let result = match RequestBody::json(credentials) {
            Ok(body) => gateway
                .request_json::<LoginResponse>(
                    ApiMethod::Post,
                    &gateway.config().login_path,
                    Some(body),
                    RequestOptions::default(),
                )
                .await
                .and_then(|response| {
                    if response.token.trim().is_empty() {
                        Err(GatewayError::Decode("login response has no token".to_string()))
                    } else {
                        Ok(response)
                    }
                }),
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                self.dispatch(SessionIntent::LoginSucceeded {
                    token: BearerToken::new(response.token),
                    user: response.user.clone(),
                });
                tracing::info!(email = %credentials.email, "Logged in");
                Ok(response.user)
            }
            Err(err) => {
                let message = err.user_message(LOGIN_FALLBACK_MESSAGE);
                tracing::warn!(email = %credentials.email, error = %err, "Login failed");
                self.dispatch(SessionIntent::LoginFailed { message });
                Err(err)
            }
        }
    }

    /// User-initiated logout. Callable in any state.
    pub fn logout(&self) {
        if self.clear() {
            tracing::info!("Logged out");
        }
    }

    /// Logout triggered by an auth failure. Same state effect as `logout`;
    /// the redirect signal is raised by the gateway when this returns `true`.
    pub fn force_logout(&self) -> bool {
        self.clear()
    }

    /// Merge fields into the current profile and re-persist it.
    /// Ignored while anonymous.
    pub fn update_profile(&self, patch: ProfilePatch) {
        let mut state = self.inner.state.write();
        if !state.is_authenticated() {
            tracing::debug!("Profile update ignored without a session");
            return;
        }
        self.apply(&mut state, SessionIntent::ProfileUpdated(patch));
    }
}

fn clear_persisted(storage: &dyn SessionStorage) -> Result<(), crate::storage::StorageError> {
    storage.remove(TOKEN_KEY)?;
    storage.remove(USER_KEY)
}

impl SessionAccessor for SessionStore {
    fn token(&self) -> Option<BearerToken> {
        if let Some(token) = self.inner.state.read().token.clone() {
            return Some(token);
        }
        // in-memory session is empty; trust whatever another writer persisted
        match self.inner.storage.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => {
                tracing::debug!("Using persisted token, in-memory session is empty");
                Some(BearerToken::new(token))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    fn invalidate(&self) -> bool {
        self.force_logout()
    }
}
