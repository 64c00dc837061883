use campushub::config::jwt::JwtConfig;
use campushub::modules::users::model::Role;
use campushub::utils::jwt::{create_access_token, verify_token};

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

#[test]
fn test_create_access_token_success() {
    let jwt_config = get_test_jwt_config();

    let result = create_access_token(1, "student1", &[Role::User], &jwt_config);

    assert!(result.is_ok());
    let token = result.unwrap();
    assert!(!token.is_empty());
}

#[test]
fn test_create_access_token_all_roles() {
    let jwt_config = get_test_jwt_config();

    for role in Role::ALL {
        let result = create_access_token(1, "someone", &[role], &jwt_config);
        assert!(result.is_ok());
    }
}

#[test]
fn test_verify_token_success() {
    let jwt_config = get_test_jwt_config();

    let token = create_access_token(42, "student1", &[Role::User], &jwt_config).unwrap();
    let result = verify_token(&token, &jwt_config);

    assert!(result.is_ok());
    let claims = result.unwrap();
    assert_eq!(claims.sub, "42");
    assert_eq!(claims.username, "student1");
    assert_eq!(claims.roles, vec!["ROLE_USER".to_string()]);
}

#[test]
fn test_token_carries_multiple_roles() {
    let jwt_config = get_test_jwt_config();

    let token =
        create_access_token(7, "admin1", &[Role::Admin, Role::Teacher], &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(
        claims.roles,
        vec!["ROLE_ADMIN".to_string(), "ROLE_TEACHER".to_string()]
    );
}

#[test]
fn test_verify_token_invalid() {
    let jwt_config = get_test_jwt_config();

    let result = verify_token("invalid.token.here", &jwt_config);

    assert!(result.is_err());
}

#[test]
fn test_verify_token_wrong_secret() {
    let jwt_config = get_test_jwt_config();

    let token = create_access_token(1, "student1", &[Role::User], &jwt_config).unwrap();

    let wrong_jwt_config = JwtConfig {
        secret: "different_secret_key".to_string(),
        access_token_expiry: 3600,
    };

    let result = verify_token(&token, &wrong_jwt_config);

    assert!(result.is_err());
}

#[test]
fn test_verify_token_tampered() {
    let jwt_config = get_test_jwt_config();

    let token = create_access_token(1, "student1", &[Role::User], &jwt_config).unwrap();
    let mut tampered = token.clone();
    tampered.pop();

    let result = verify_token(&tampered, &jwt_config);

    assert!(result.is_err());
}

#[test]
fn test_verify_token_empty() {
    let jwt_config = get_test_jwt_config();

    let result = verify_token("", &jwt_config);

    assert!(result.is_err());
}
