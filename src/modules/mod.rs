pub mod auth;
pub mod courses;
pub mod email;
pub mod enrollments;
pub mod seed;
pub mod users;
