// ABOUTME: Library root for harbormaster - exposes the deployment workflow for testing.
// ABOUTME: The main binary is in main.rs.

pub mod ci;
pub mod cloud;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod output;
pub mod preview;
pub mod remote;
pub mod ssh;
pub mod tracking;
pub mod types;
