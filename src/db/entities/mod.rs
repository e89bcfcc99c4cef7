//! Table definitions

pub mod kv_store;
