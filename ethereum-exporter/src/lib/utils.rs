//! Shared shutdown plumbing.

/// Capacity of the shutdown broadcast channel.
pub const SHUTDOWN_BROADCAST_CAPACITY: usize = 16;

/// Message broadcast to every task when the exporter is going down.
#[derive(Debug, Clone)]
pub enum ShutdownMessage {
    ShutdownAll,
}
