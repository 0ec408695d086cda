pub mod export;
pub mod import;
pub mod store;
pub mod validate;

pub use store::{ResultStore, StoreError, TournamentSummary, UpsertOutcome, DEFAULT_STORE_PATH};
