pub mod api;
pub mod duel;
pub mod identity;

// Re-export all types
pub use api::*;
pub use duel::*;
pub use identity::*;
