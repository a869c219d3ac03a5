pub mod credential;
pub mod ownership;
pub mod password;
pub mod token;

pub use credential::{CredentialError, CredentialVerifier, FirebaseTokenVerifier, VerifiedIdentity};
pub use ownership::{AccessError, OwnershipAuthorizer, Principal, ROLE_USER};
pub use password::{hash_password, verify_password};
pub use token::{SessionToken, SessionTokenCodec, SigningKey, TokenError, SESSION_LIFETIME_HOURS};
