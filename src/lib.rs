pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod global;
pub mod reporting;
pub mod tracking;

#[cfg(test)]
mod test_util;
