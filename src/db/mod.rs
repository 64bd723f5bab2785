//! Local persistence layer (browser-style key-value storage).

pub mod local;
pub mod store;

pub use local::{LocalDb, Stored};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

/// Storage keys as constants.
pub mod keys {
    pub const PROFILE: &str = "eduVisual_profile";
    pub const API_KEYS: &str = "eduVisual_apiKeys";
    pub const SAVED_PROMPTS: &str = "eduVisual_prompts";
    /// Entitlement flag (JSON boolean)
    pub const ENTITLEMENT: &str = "eduVisual_isPro";
}
