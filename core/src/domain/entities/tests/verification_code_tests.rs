//! Unit tests for verification code entity

use chrono::{Duration, TimeZone, Utc};

use crate::domain::entities::verification_code::{VerificationCode, CODE_LENGTH};
use crate::domain::value_objects::CodePurpose;

fn issued_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

fn sample_code() -> VerificationCode {
    VerificationCode::issue(
        "a@x.com",
        CodePurpose::EmailVerification,
        "123456",
        issued_at(),
        Duration::minutes(10),
    )
}

#[test]
fn test_issue_sets_expiry_from_ttl() {
    let code = sample_code();

    assert_eq!(code.identity, "a@x.com");
    assert_eq!(code.code.len(), CODE_LENGTH);
    assert_eq!(code.expires_at, issued_at() + Duration::minutes(10));
    assert!(!code.used);
    assert!(code.is_valid_at(issued_at()));
}

#[test]
fn test_expiry_boundary_is_strict() {
    let code = sample_code();

    let just_before = issued_at() + Duration::minutes(9) + Duration::seconds(59);
    assert!(code.is_valid_at(just_before));

    // expires_at > now is required, so the exact boundary is already expired
    let boundary = issued_at() + Duration::minutes(10);
    assert!(code.is_expired_at(boundary));
    assert!(!code.is_valid_at(boundary));

    let just_after = boundary + Duration::seconds(1);
    assert!(!code.is_valid_at(just_after));
}

#[test]
fn test_used_code_is_not_valid() {
    let mut code = sample_code();
    code.mark_as_used();

    assert!(code.used);
    assert!(!code.is_valid_at(issued_at()));
}

#[test]
fn test_matches_requires_exact_code() {
    let code = sample_code();

    assert!(code.matches("123456"));
    assert!(!code.matches("123457"));
    assert!(!code.matches("12345"));
    assert!(!code.matches("1234567"));
}

#[test]
fn test_accepts_checks_identity_and_purpose() {
    let code = sample_code();
    let now = issued_at() + Duration::minutes(1);

    assert!(code.accepts("a@x.com", "123456", CodePurpose::EmailVerification, now));
    assert!(!code.accepts("b@x.com", "123456", CodePurpose::EmailVerification, now));
    assert!(!code.accepts("a@x.com", "123456", CodePurpose::PasswordReset, now));
}

#[test]
fn test_time_until_expiration() {
    let code = sample_code();

    assert_eq!(
        code.time_until_expiration(issued_at() + Duration::minutes(4)),
        Duration::minutes(6)
    );
    assert_eq!(
        code.time_until_expiration(issued_at() + Duration::minutes(11)),
        Duration::zero()
    );
}

#[test]
fn test_serialization() {
    let code = sample_code();

    let json = serde_json::to_string(&code).unwrap();
    let deserialized: VerificationCode = serde_json::from_str(&json).unwrap();

    assert_eq!(code, deserialized);
    assert!(json.contains("\"email_verification\""));
}
