pub mod access;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
