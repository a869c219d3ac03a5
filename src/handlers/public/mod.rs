// handlers/public/mod.rs - Public handlers (no session token required)
//
// Token acquisition endpoints. Requests under these prefixes skip the session gate,
// so every input here is untrusted.

pub mod auth;
