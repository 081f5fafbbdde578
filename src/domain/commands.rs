//! Domain-level command and query types.
//!
//! These structs are consumed by the services inside the domain layer.
//! A presentation layer is responsible for mapping its own input types to
//! these before calling in.

pub mod ledger {
    use crate::domain::models::ledger::{TransactionCategory, TransactionStatus};

    /// Status a transaction may be created with. A rejected initial state
    /// is not representable: rejection only exists as a transition out of
    /// `Pending`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum InitialStatus {
        /// Direct parent entry: the balance delta applies immediately.
        Completed,
        /// Child-initiated request: queued until a parent reviews it.
        Pending,
    }

    impl From<InitialStatus> for TransactionStatus {
        fn from(status: InitialStatus) -> Self {
            match status {
                InitialStatus::Completed => TransactionStatus::Completed,
                InitialStatus::Pending => TransactionStatus::Pending,
            }
        }
    }

    /// Input for recording a new transaction on a child's ledger.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub child_id: String,
        /// Any sign accepted; stored as its absolute value.
        pub amount: i64,
        pub description: String,
        pub category: TransactionCategory,
        pub status: InitialStatus,
    }

    /// Input for moving a transaction to a new lifecycle status.
    #[derive(Debug, Clone)]
    pub struct UpdateTransactionStatusCommand {
        pub child_id: String,
        pub transaction_id: String,
        pub status: TransactionStatus,
    }
}

pub mod auth {
    use crate::domain::models::account::Account;
    use crate::domain::models::family::Family;

    /// How a registering parent attaches to a family.
    #[derive(Debug, Clone)]
    pub enum RegistrationMode {
        /// Found a new family; the creator is trusted and approved
        /// immediately.
        CreateFamily { family_name: String },
        /// Join an existing family by its 6-digit code; requires approval.
        JoinFamily { join_code: String },
    }

    #[derive(Debug, Clone)]
    pub struct RegisterParentCommand {
        pub name: String,
        pub email: String,
        pub password: String,
        pub mode: RegistrationMode,
    }

    /// Outcome of a parent registration.
    #[derive(Debug, Clone)]
    pub enum ParentRegistration {
        /// Family creator: account approved and session established.
        SignedIn { account: Account, family: Family },
        /// Joining parent: recorded but gated until an administrator
        /// approves the account.
        PendingApproval { message: String },
    }

    #[derive(Debug, Clone)]
    pub struct RegisterChildCommand {
        pub join_code: String,
        pub name: String,
        pub username: String,
        pub pin: String,
    }

    #[derive(Debug, Clone)]
    pub struct RegisterChildResult {
        pub account: Account,
    }

    /// Successful login: the account and its active family, if any.
    #[derive(Debug, Clone)]
    pub struct LoginResult {
        pub account: Account,
        pub family: Option<Family>,
    }
}

pub mod family {
    use crate::domain::models::family::{Preset, ReminderItem, ScheduleItem};

    /// Upsert a preset in a family's catalog (matched by preset id).
    #[derive(Debug, Clone)]
    pub struct SavePresetCommand {
        pub family_id: String,
        pub preset: Preset,
    }

    /// Wholesale replacement of a family's schedule and reminder lists,
    /// the way the planner edits them.
    #[derive(Debug, Clone)]
    pub struct UpdateScheduleCommand {
        pub family_id: String,
        pub schedules: Vec<ScheduleItem>,
        pub reminders: Vec<ReminderItem>,
    }

    /// Profile edits; `None` fields are left unchanged.
    #[derive(Debug, Clone)]
    pub struct UpdateProfileCommand {
        pub account_id: String,
        pub name: Option<String>,
        pub password: Option<String>,
        pub pin: Option<String>,
    }
}

pub mod messages {
    /// Input for appending a chat message to a family's log.
    #[derive(Debug, Clone)]
    pub struct SendMessageCommand {
        pub family_id: String,
        pub sender_id: String,
        pub text: String,
        pub is_system: bool,
    }
}
