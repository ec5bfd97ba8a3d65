//! Session and permission handling shared by the inventory clients
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]

mod access;
mod client;
pub mod permissions;
mod session_store;
mod storage;

pub use access::{check_access, AccessDecision};
pub use client::{ApiResponse, Client, LoginOutcome, UiCallBack};
pub use permissions::{EngineState, PermissionEngine, PermissionSnapshot, Subscription};
pub use session_store::SessionStore;
pub use storage::{FileStore, KvStore, MemoryStore};
