//! Match persistence and the Action API boundary

pub mod service;
pub mod store;

pub use service::{ActionRequest, ApiReply, GameService};
pub use store::{FileGameStore, GameStore, MemoryGameStore, StoredGame};
