//! Domain models shared by the services and the storage layer.

pub mod account;
pub mod family;
pub mod ledger;
pub mod message;
