#[macro_use]
pub mod models;

pub mod client;
pub mod config;
pub mod errors;
pub mod extract;
pub mod files;
pub mod handlers;
pub mod listing;
pub mod pagination;
pub mod resource;
pub mod response;
pub mod routes;
pub mod state;
pub mod stats;
pub mod store;
pub mod validation;
