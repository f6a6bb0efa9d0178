//! Shared constants used across the application

/// Default advisor backend when neither the CLI nor the config names one.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Fixed assistant message shown when the backend cannot be reached at all.
/// Transport detail goes to the tracing log, never into the transcript.
pub const CONNECT_ERROR_MESSAGE: &str = "Error connecting to server.";
