pub mod config;
pub mod control;
pub mod launch;
pub mod logging;
pub mod profile;
pub mod provider;
pub mod retry;
