//! Storage layer: per-aggregate repository traits and the file-backed
//! implementation.

pub mod files;
pub mod traits;

pub use files::{FileConnection, SessionPointer, SessionStorage};
pub use traits::{AccountStorage, FamilyStorage, LedgerStorage, MessageStorage};
