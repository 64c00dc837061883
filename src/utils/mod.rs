//! Shared utilities:
//!
//! - [`email`]: SMTP email sending
//! - [`errors`]: application error type and response mapping
//! - [`filter`]: dynamic filter predicates for listing queries
//! - [`jwt`]: JWT token creation and verification
//! - [`pagination`]: paging/sort parsing and the listing envelope
//! - [`password`]: password hashing and verification

pub mod email;
pub mod errors;
pub mod filter;
pub mod jwt;
pub mod pagination;
pub mod password;
