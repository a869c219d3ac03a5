// handlers/mod.rs - HTTP handlers, split by whether the session gate applies

pub mod protected;
pub mod public;
