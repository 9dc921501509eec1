//! Engine module - owns the bot session and the event loop that drives it

pub mod reactive;
pub mod session;

pub use reactive::{LoopSummary, ReactiveLoop};
pub use session::{BotSession, Collaborators, CycleOutcome};
