pub mod cli;
pub mod client;
pub mod commands;
pub mod dispatch;
pub mod logging;
pub mod output;
pub mod session;

pub use client::{ClientFactory, ClusterClient, RemoteFault};
pub use dispatch::{AdminCommand, Dispatcher, ExecutionReport, TerminatingError};
pub use session::SessionContext;
