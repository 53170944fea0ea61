//! Infrastructure shared by the workspace's services: error responses,
//! environment configuration, tracing setup and HTTP middleware.

pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
