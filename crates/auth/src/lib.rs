//! `storefront-auth`: authentication/authorization boundary.
//!
//! No HTTP and no storage here: this crate owns the
//! user record rules, password hashing, token claims and role checks.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod roles;
pub mod user;

pub use authorize::{require_role, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
pub use user::{RegisterUser, UpdateProfile, User};
