pub mod api;
pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod rbac;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;
pub mod workflow;
