//! Session data model and lifecycle.
//!
//! ```text
//! anonymous ──login──→ authenticating ──ok──→ authenticated
//!     ↑                      │                     │
//!     └──────── failed ──────┘                     │
//!     └────────────── logout / forced logout ──────┘
//! ```

mod credentials;
mod reducer;
mod state;
mod store;

pub use credentials::{BearerToken, Credentials};
pub use reducer::{SessionIntent, SessionReducer};
pub use state::{AuthStatus, ProfilePatch, Session, SessionPhase, UserProfile};
pub use store::{SessionStore, LOGIN_FALLBACK_MESSAGE};
