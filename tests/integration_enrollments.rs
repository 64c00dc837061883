use axum::body::Body;
use axum::http::{Request, StatusCode};
use campushub::config::cors::CorsConfig;
use campushub::config::email::EmailConfig;
use campushub::config::jwt::JwtConfig;
use campushub::modules::users::model::Role;
use campushub::router::init_router;
use campushub::state::AppState;
use campushub::utils::jwt::create_access_token;
use campushub::utils::password::hash_password;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration_test_secret".to_string(),
        access_token_expiry: 3600,
    }
}

fn setup_test_app(pool: PgPool) -> axum::Router {
    let state = AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        email_config: EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@campushub.example".to_string(),
            from_name: "Campushub".to_string(),
        },
        cors_config: CorsConfig {
            allowed_origins: vec![],
        },
    };
    init_router(state)
}

fn admin_token() -> String {
    create_access_token(999, "admin", &[Role::Admin], &test_jwt_config()).unwrap()
}

async fn create_user(pool: &PgPool, username: &str, role: Role) -> i64 {
    let hash = hash_password("123123").unwrap();
    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(hash)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO users_roles (user_id, role_id)
         SELECT $1, id FROM roles WHERE name = $2",
    )
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await
    .unwrap();

    user_id
}

async fn create_course(pool: &PgPool, title: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO courses (title, credit_hours) VALUES ($1, 3) RETURNING id",
    )
    .bind(title)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn create_enrollment(pool: &PgPool, student_id: i64, course_id: i64) {
    sqlx::query(
        "INSERT INTO enrollments (student_id, course_id, enrollment_date)
         VALUES ($1, $2, CURRENT_DATE)",
    )
    .bind(student_id)
    .bind(course_id)
    .execute(pool)
    .await
    .unwrap();
}

fn enroll_request(student_id: i64, course_id: i64, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!(
            "/api/enrollments/enroll?studentId={student_id}&courseId={course_id}"
        ))
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_enroll_is_rejected(pool: PgPool) {
    let student = create_user(&pool, "alice", Role::User).await;
    let course = create_course(&pool, "Algorithms").await;
    let token = admin_token();

    let app = setup_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(enroll_request(student, course, &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(enroll_request(student, course, &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Student is already enrolled in this course");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_staff_accounts_cannot_be_enrolled(pool: PgPool) {
    let teacher = create_user(&pool, "smith", Role::Teacher).await;
    let admin = create_user(&pool, "boss", Role::Admin).await;
    let course = create_course(&pool, "Algorithms").await;
    let token = admin_token();

    let app = setup_test_app(pool.clone());

    for account in [teacher, admin] {
        let response = app
            .clone()
            .oneshot(enroll_request(account, course, &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Teachers and admins cannot be enrolled in courses"
        );
    }

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enroll_rejects_unknown_ids(pool: PgPool) {
    let token = admin_token();
    let app = setup_test_app(pool);

    let response = app
        .oneshot(enroll_request(9999, 9999, &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid studentId or courseId");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_filter_matches_name_case_insensitively(pool: PgPool) {
    create_user(&pool, "Alice", Role::User).await;
    create_user(&pool, "Bob", Role::User).await;
    let token = admin_token();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/students/filter?name=alice", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["content"][0]["username"], "Alice");
    assert_eq!(body["filtersApplied"]["name"], "alice");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_filter_unmatched_instructor_yields_empty_page(pool: PgPool) {
    create_course(&pool, "Algorithms").await;
    let token = admin_token();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/courses/filter?instructorName=smith", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["totalElements"], 0);
    assert_eq!(body["content"].as_array().unwrap().len(), 0);
    assert_eq!(body["last"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enrollment_filter_pages_deterministically(pool: PgPool) {
    let course = create_course(&pool, "Algorithms").await;
    for n in 1..=5 {
        let student = create_user(&pool, &format!("student{n}"), Role::User).await;
        create_enrollment(&pool, student, course).await;
    }
    let token = admin_token();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/enrollments/filter?page=1&size=2", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalElements"], 5);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["last"], false);
}
