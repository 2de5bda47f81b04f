//! Presentation-side consumers of gateway state.
//!
//! Nothing here talks to the network; these types only react to the busy
//! flag and to session-invalidated events.

mod overlay;
mod redirect;

pub use overlay::BusyOverlay;
pub use redirect::{LoginRedirect, Navigator, LOGIN_LOCATION};
