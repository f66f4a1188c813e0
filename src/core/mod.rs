//! Core viewer logic: the user directory and the balance presenter

pub mod balance;
pub mod directory;
mod error;

pub use balance::{present, BalanceOutcome};
pub use directory::DirectoryIndex;
pub use error::ViewerError;
