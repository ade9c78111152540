//! Authentication boundary: JWT claims, roles, HS256 validation.
//!
//! Deliberately decoupled from HTTP; the API layer owns header parsing and
//! status-code mapping.

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use roles::Role;
