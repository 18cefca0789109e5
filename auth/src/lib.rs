//! Authentication building blocks for the Scouts backend.
//!
//! Provides the credential primitives the service composes with its user
//! store:
//! - Password hashing (Argon2id, salted PHC strings)
//! - JWT issuance and validation (configurable HS algorithm, mandatory
//!   expiration claim)
//! - An authenticator coordinating both
//!
//! The crate is storage-agnostic on purpose: looking up whether a subject
//! actually exists is the service's job, not this crate's.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use jsonwebtoken::Algorithm;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!", Algorithm::HS256);
//! let claims = Claims::for_subject("alice", 30);
//! let token = handler.encode(&claims).unwrap();
//! let decoded = handler.decode(&token).unwrap();
//! assert_eq!(decoded.subject(), Some("alice"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
