/// Marker trait for intents.
///
/// Intents represent:
/// - User actions (login, logout, profile edits)
/// - Async lifecycle events (request pending, fulfilled, rejected)
pub trait Intent: Send + 'static {}
