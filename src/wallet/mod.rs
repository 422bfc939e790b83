pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod repository;

pub use error::WalletError;
pub use ledger::WalletLedger;
pub use models::{Wallet, WalletTransaction};
pub use repository::WalletRepository;
