use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::model::{LoginRequest, RegisterRequest, TokenResponse};
use crate::modules::courses::model::{CourseDto, CourseView, TeacherRef};
use crate::modules::email::model::{
    BulkEmailRequest, HtmlEmailRequest, RecipientRole, RoleEmailRequest, TextEmailRequest,
};
use crate::modules::enrollments::model::{CourseRef, EnrollmentView, StudentRef};
use crate::modules::users::model::{CreateStudentDto, StudentView, UpdateStudentDto};
use crate::utils::errors::ErrorResponse;
use crate::utils::pagination::PageEnvelope;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::register_admin,
        crate::modules::auth::controller::login,
        crate::modules::users::controller::create_student,
        crate::modules::users::controller::get_students,
        crate::modules::users::controller::get_student,
        crate::modules::users::controller::update_student,
        crate::modules::users::controller::delete_student,
        crate::modules::users::controller::filter_students,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::assign_teacher,
        crate::modules::courses::controller::paginated_courses,
        crate::modules::courses::controller::filter_courses,
        crate::modules::enrollments::controller::enroll,
        crate::modules::enrollments::controller::unenroll,
        crate::modules::enrollments::controller::get_enrollments,
        crate::modules::enrollments::controller::filter_enrollments,
        crate::modules::email::controller::send_text,
        crate::modules::email::controller::send_html,
        crate::modules::email::controller::send_bulk,
        crate::modules::email::controller::send_to_all,
        crate::modules::seed::controller::seed,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            StudentView,
            CreateStudentDto,
            UpdateStudentDto,
            CourseView,
            TeacherRef,
            CourseDto,
            EnrollmentView,
            StudentRef,
            CourseRef,
            TextEmailRequest,
            HtmlEmailRequest,
            BulkEmailRequest,
            RoleEmailRequest,
            RecipientRole,
            ErrorResponse,
            PageEnvelope<StudentView>,
            PageEnvelope<CourseView>,
            PageEnvelope<EnrollmentView>,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Students", description = "Student management endpoints"),
        (name = "Courses", description = "Course management endpoints"),
        (name = "Enrollments", description = "Course enrollment endpoints"),
        (name = "Email", description = "Email notification endpoints"),
        (name = "Seed", description = "Demo data seeding")
    ),
    info(
        title = "Campushub API",
        version = "0.1.0",
        description = "A REST API built with Rust, Axum, and PostgreSQL for managing university students, teachers, courses and enrollments.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
