//! Paper module - simulated ledger for dry runs

pub mod drift;
pub mod ledger;

pub use drift::spawn_drift;
pub use ledger::{PaperAddressDeriver, PaperLedger};
