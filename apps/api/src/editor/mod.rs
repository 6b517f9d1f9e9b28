//! The editing state machine: snapshot history, history-tracked mutations,
//! the completion score, and the sessions that tie them to one document.

pub mod completion;
pub mod handlers;
pub mod history;
pub mod mutations;
pub mod session;
