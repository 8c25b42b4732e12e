//! Status reporting from spawned tasks back to the main loop.

/// Fatal events a task reports before it stops.
#[derive(Debug)]
pub enum State {
    /// The metrics server stopped serving.
    MonitoringShutdown(String),
}

/// Message sent over the status channel.
#[derive(Debug)]
pub struct Status {
    pub state: State,
}
