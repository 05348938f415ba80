//! # rookery-server
//!
//! The live-session side of rookery: a session registry fanning authoritative
//! game state out to every connection in a game, a coordinator applying
//! client commands against [`rookery_core`]'s rules engine, collaborator
//! store traits with in-memory implementations, and a newline-delimited-JSON
//! TCP transport.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod locks;
pub mod server;
pub mod session;
pub mod store;

pub use config::ServerConfig;
pub use coordinator::Coordinator;
pub use error::CoordinatorError;
pub use session::{ClientHandle, ConnectionId, SessionRegistry};
pub use store::{GameStore, IdentityStore, MemoryGameStore, MemoryIdentityStore, StoreError};
