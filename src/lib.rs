#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Domain models, the storage backends, authentication (password hashing, access tokens,"]
#![doc = "principal resolution and ownership checks), routing and error handling for the"]
#![doc = "TaskVault API. The binary (`main.rs`) only wires these together and starts the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
