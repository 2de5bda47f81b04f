use crate::mvi::{Intent, Reducer};
use crate::session::credentials::BearerToken;
use crate::session::state::{AuthStatus, ProfilePatch, Session, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionIntent {
    /// Persisted token found at startup.
    Rehydrated {
        token: BearerToken,
        user: Option<UserProfile>,
    },
    LoginStarted,
    LoginSucceeded {
        token: BearerToken,
        user: UserProfile,
    },
    LoginFailed {
        message: String,
    },
    /// User-initiated or forced; the state effect is the same.
    LoggedOut,
    ProfileUpdated(ProfilePatch),
}

impl Intent for SessionIntent {}

pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = Session;
    type Intent = SessionIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SessionIntent::Rehydrated { token, user } => Session {
                token: Some(token),
                user,
                status: AuthStatus::Succeeded,
                error: None,
            },
            SessionIntent::LoginStarted => Session {
                status: AuthStatus::Loading,
                error: None,
                ..state
            },
            SessionIntent::LoginSucceeded { token, user } => Session {
                token: Some(token),
                user: Some(user),
                status: AuthStatus::Succeeded,
                error: None,
            },
            // credentials only go away through logout or a 401/403
            SessionIntent::LoginFailed { message } => Session {
                status: AuthStatus::Failed,
                error: Some(message),
                ..state
            },
            SessionIntent::LoggedOut => {
                // a failed attempt with nothing to clear keeps its message
                if state.token.is_none() && state.status == AuthStatus::Failed {
                    Session {
                        user: None,
                        ..state
                    }
                } else {
                    Session::default()
                }
            }
            SessionIntent::ProfileUpdated(patch) => {
                if state.token.is_none() {
                    return state;
                }
                let mut user = state.user.unwrap_or_default();
                user.merge(patch);
                Session {
                    user: Some(user),
                    ..state
                }
            }
        }
    }
}
