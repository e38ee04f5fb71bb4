use dl_core::OtpPurpose;

use crate::email::templates::EmailTemplates;

#[test]
fn test_code_mail_contains_code_and_ttl() {
    let templates = EmailTemplates::new("DevLink", 10);
    let message = templates.code("123456", "Ada", OtpPurpose::PasswordReset);

    assert_eq!(message.subject, "Your DevLink password reset code");
    assert!(message.text.contains("123456"));
    assert!(message.text.contains("Hi Ada"));
    assert!(message.text.contains("expires in 10 minutes"));
    assert!(message.text.contains("reset your password"));
}

#[test]
fn test_code_mail_subject_depends_on_purpose() {
    let templates = EmailTemplates::new("DevLink", 10);
    let message = templates.code("654321", "Ada", OtpPurpose::EmailVerification);

    assert_eq!(message.subject, "Verify your DevLink email address");
    assert!(message.text.contains("verify your email address"));
}

#[test]
fn test_confirmation_mail_never_contains_a_code() {
    let templates = EmailTemplates::new("DevLink", 10);
    let message = templates.confirmation("Ada");

    assert_eq!(message.subject, "Your DevLink password was changed");
    assert!(message.text.contains("Hi Ada"));
    assert!(!message.text.chars().any(|c| c.is_ascii_digit()));
}
