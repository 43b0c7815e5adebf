//! Outbound adapters: everything the domain reaches through a port.
//!
//! Persistence holds the Diesel repositories, security the password
//! hasher, storage the image store. Handlers never import from here;
//! wiring happens at server startup.

pub mod persistence;
pub mod security;
pub mod storage;
