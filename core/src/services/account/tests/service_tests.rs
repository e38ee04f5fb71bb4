//! Unit tests for the account service

use std::sync::Arc;

use crate::domain::entities::{Account, OtpPurpose};
use crate::domain::value_objects::VerificationFailure;
use crate::errors::DomainError;
use crate::repositories::{
    AccountRepository, InMemoryAccountRepository, InMemoryOtpRepository, OtpRepository,
};
use crate::services::account::{AccountService, AccountServiceConfig};
use crate::services::otp::tests::mocks::MockEmailDispatcher;
use crate::services::otp::{OtpService, OtpServiceConfig};

const EMAIL: &str = "ada@devlink.io";
const OLD_HASH: &str = "$2b$04$original";

type TestService =
    AccountService<InMemoryOtpRepository, MockEmailDispatcher, InMemoryAccountRepository>;

fn create_service(
    should_fail: bool,
) -> (
    TestService,
    Arc<InMemoryAccountRepository>,
    Arc<MockEmailDispatcher>,
) {
    let accounts = Arc::new(InMemoryAccountRepository::with_accounts([Account::new(
        EMAIL.to_string(),
        "Ada".to_string(),
        OLD_HASH.to_string(),
    )]));
    let dispatcher = Arc::new(MockEmailDispatcher::new(should_fail));
    let otp_service = Arc::new(OtpService::new(
        Arc::new(InMemoryOtpRepository::new()),
        dispatcher.clone(),
        OtpServiceConfig::default(),
    ));
    let service = AccountService::new(
        otp_service,
        accounts.clone(),
        AccountServiceConfig { bcrypt_cost: 4 },
    );
    (service, accounts, dispatcher)
}

#[tokio::test]
async fn test_reset_requires_account() {
    let (service, _, dispatcher) = create_service(false);

    let result = service
        .request_code("nobody@devlink.io", OtpPurpose::PasswordReset)
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
    assert_eq!(dispatcher.sent_count(), 0);
}

#[tokio::test]
async fn test_verification_code_for_unregistered_address() {
    let (service, _, dispatcher) = create_service(false);

    let issued = service
        .request_code("newcomer@devlink.io", OtpPurpose::EmailVerification)
        .await
        .unwrap();

    assert_eq!(
        dispatcher.last_code("newcomer@devlink.io", OtpPurpose::EmailVerification),
        Some(issued.code.code)
    );
}

#[tokio::test]
async fn test_password_reset_flow() {
    let (service, accounts, dispatcher) = create_service(false);

    service
        .request_code(EMAIL, OtpPurpose::PasswordReset)
        .await
        .unwrap();
    let code = dispatcher.last_code(EMAIL, OtpPurpose::PasswordReset).unwrap();

    let outcome = service
        .reset_password(EMAIL, &code, "correct horse battery")
        .await
        .unwrap();
    assert!(outcome.valid);

    let account = accounts.find_by_email(EMAIL).await.unwrap().unwrap();
    assert_ne!(account.password_hash, OLD_HASH);
    assert!(bcrypt::verify("correct horse battery", &account.password_hash).unwrap());
    assert_eq!(dispatcher.confirmations(), vec![EMAIL.to_string()]);
}

#[tokio::test]
async fn test_wrong_code_leaves_password_unchanged() {
    let (service, accounts, dispatcher) = create_service(false);

    service
        .request_code(EMAIL, OtpPurpose::PasswordReset)
        .await
        .unwrap();
    let code = dispatcher.last_code(EMAIL, OtpPurpose::PasswordReset).unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let outcome = service
        .reset_password(EMAIL, wrong, "correct horse battery")
        .await
        .unwrap();

    assert!(!outcome.valid);
    assert_eq!(outcome.reason, Some(VerificationFailure::Mismatch));
    let account = accounts.find_by_email(EMAIL).await.unwrap().unwrap();
    assert_eq!(account.password_hash, OLD_HASH);
    assert!(dispatcher.confirmations().is_empty());
}

#[tokio::test]
async fn test_short_password_rejected_before_verification() {
    let (service, _, dispatcher) = create_service(false);

    service
        .request_code(EMAIL, OtpPurpose::PasswordReset)
        .await
        .unwrap();
    let code = dispatcher.last_code(EMAIL, OtpPurpose::PasswordReset).unwrap();

    let result = service.reset_password(EMAIL, &code, "short").await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));

    // The code was not consumed
    let outcome = service
        .reset_password(EMAIL, &code, "long enough now")
        .await
        .unwrap();
    assert!(outcome.valid);
}

// A reset for an address with no account fails without spending the code
#[tokio::test]
async fn test_reset_without_account_keeps_code() {
    let otp_repository = Arc::new(InMemoryOtpRepository::new());
    let otp_service = Arc::new(OtpService::new(
        otp_repository.clone(),
        Arc::new(MockEmailDispatcher::new(false)),
        OtpServiceConfig::default(),
    ));
    let service = AccountService::new(
        otp_service.clone(),
        Arc::new(InMemoryAccountRepository::new()),
        AccountServiceConfig { bcrypt_cost: 4 },
    );
    let code = otp_service
        .issue("gone@devlink.io", OtpPurpose::PasswordReset)
        .await
        .unwrap();

    let result = service
        .reset_password("gone@devlink.io", &code.code, "correct horse battery")
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));

    let stored = otp_repository
        .find("gone@devlink.io", OtpPurpose::PasswordReset)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.consumed);
    assert_eq!(stored.attempt_count, 0);
}

#[tokio::test]
async fn test_verify_code_requires_password_for_reset() {
    let (service, _, _) = create_service(false);

    let result = service
        .verify_code(EMAIL, "123456", OtpPurpose::PasswordReset, None)
        .await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_verify_email_marks_account() {
    let (service, accounts, dispatcher) = create_service(false);

    service
        .request_code(EMAIL, OtpPurpose::EmailVerification)
        .await
        .unwrap();
    let code = dispatcher
        .last_code(EMAIL, OtpPurpose::EmailVerification)
        .unwrap();

    let outcome = service
        .verify_code(EMAIL, &code, OtpPurpose::EmailVerification, None)
        .await
        .unwrap();

    assert!(outcome.valid);
    let account = accounts.find_by_email(EMAIL).await.unwrap().unwrap();
    assert!(account.email_verified);
}

#[tokio::test]
async fn test_request_code_surfaces_dispatch_failure() {
    let (service, _, _) = create_service(true);

    let result = service
        .request_code(EMAIL, OtpPurpose::EmailVerification)
        .await;

    assert!(matches!(result, Err(DomainError::Dispatch { .. })));
}
