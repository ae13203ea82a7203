mod error;
pub use error::*;
mod gateway;
pub use gateway::*;
mod http;
pub use http::*;

pub mod artwork;
pub mod auth;
pub mod filter;
pub mod retry;
pub mod tmdb;

#[cfg(test)]
pub mod testing;
