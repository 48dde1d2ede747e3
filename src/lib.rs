pub mod accounts;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod notifier;
pub mod portal;
pub mod resource;
pub mod resources;
pub mod session;
pub mod types;
pub mod validation;

pub use error::PortalError;
pub use portal::Portal;

#[cfg(test)]
pub mod testing;
