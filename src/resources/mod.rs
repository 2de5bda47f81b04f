//! List/mutation slices for the admin resource collections.

mod client;
mod kind;
mod slice;

pub use client::ResourceClient;
pub use kind::Resource;
pub use slice::{items_from_response, ResourceIntent, ResourceReducer, ResourceSlice};
