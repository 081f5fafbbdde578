//! Domain layer: business rules, orchestration, and validation.
//!
//! Each service owns the repositories it needs and exposes command-driven
//! operations. Services are cheap to clone and share one `FileConnection`.

pub mod advice_service;
pub mod auth_service;
pub mod commands;
pub mod family_service;
pub mod ledger_service;
pub mod messaging_service;
pub mod models;
pub mod recurrence;
pub mod session_service;

pub use advice_service::{AdviceProvider, AdviceService, FALLBACK_ADVICE};
pub use auth_service::{AuthError, AuthService};
pub use family_service::FamilyService;
pub use ledger_service::LedgerService;
pub use messaging_service::MessagingService;
pub use session_service::{CurrentSession, SessionService};
