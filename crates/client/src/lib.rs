//! Poll service client, shared by the one-shot commands and the interactive grid.
//!
//! This crate is the single source of truth for talking to the service:
//! session login, reading poll state, writing responses.
//!
//! No UI concepts. No retries. A failed write is reported once and forgotten.

mod auth;
mod client;

pub use auth::{auth_file_path, delete_auth, load_auth, load_auth_from, save_auth, save_auth_to, Credentials};
pub use client::{share_link, ClientError, HttpClient, PersistenceClient};
