//! # Campushub API
//!
//! A REST API built with Rust, Axum, and PostgreSQL for managing a university:
//! students, teachers, courses and course enrollments, with role-based access
//! control and email notifications.
//!
//! ## Architecture
//!
//! The codebase follows a modular architecture inspired by NestJS:
//!
//! ```text
//! src/
//! ├── config/           # Configuration modules (JWT, database, CORS, email)
//! ├── middleware/       # Auth middleware and extractors
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Registration and login
//! │   ├── users/       # Student management
//! │   ├── courses/     # Course management and teacher assignment
//! │   ├── enrollments/ # Course enrollment
//! │   ├── email/       # Email notification endpoints
//! │   └── seed/        # Demo data seeding
//! └── utils/           # Shared utilities (errors, JWT, pagination, filters)
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers (routes)
//! - `service.rs`: Business logic
//! - `model.rs`: Data models, DTOs, database structs
//! - `router.rs`: Axum router configuration
//!
//! ## Roles
//!
//! Every account holds exactly one of three roles:
//!
//! | Role | Description |
//! |------|-------------|
//! | `ROLE_USER` | Students; can enroll in and leave courses |
//! | `ROLE_TEACHER` | Can read student data and claim courses |
//! | `ROLE_ADMIN` | Full management access |
//!
//! ## Authentication
//!
//! The API uses JWT bearer tokens. Tokens carry the user's id, username and
//! role names; handlers enforce role requirements per endpoint.
//!
//! ## API Documentation
//!
//! When the server is running, API documentation is available at:
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod config;
pub mod docs;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;
