pub mod analysis_parser;
pub mod analyzer;
pub mod auth_client;
pub mod session_gate;
