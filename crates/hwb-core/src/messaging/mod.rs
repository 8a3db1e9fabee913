//! Outbound messaging: the messenger port and the best-effort notifier on top of it.

pub mod notifier;
pub mod port;
