//! Command bridge
//!
//! Typed async functions for every operation the host process exposes. The
//! bridge only depends on [`HostInvoker`], so any transport that can deliver
//! `invoke(name, args)` to the host can sit underneath it.

mod command_bridge;
mod invoker;

pub use command_bridge::{commands, CommandBridge};
pub use invoker::HostInvoker;
