//! Subjects and bodies of the mails the code lifecycle sends

use dl_core::OtpPurpose;

/// A rendered mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub text: String,
}

/// Renders plain-text mails for one product name
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    app_name: String,
    code_ttl_minutes: i64,
}

impl EmailTemplates {
    pub fn new(app_name: impl Into<String>, code_ttl_minutes: i64) -> Self {
        Self {
            app_name: app_name.into(),
            code_ttl_minutes,
        }
    }

    /// Mail carrying a one-time code
    pub fn code(&self, code: &str, display_name: &str, purpose: OtpPurpose) -> EmailMessage {
        let (subject, action) = match purpose {
            OtpPurpose::PasswordReset => (
                format!("Your {} password reset code", self.app_name),
                "reset your password",
            ),
            OtpPurpose::EmailVerification => (
                format!("Verify your {} email address", self.app_name),
                "verify your email address",
            ),
        };

        let text = format!(
            "Hi {name},\n\n\
             Use the code below to {action}:\n\n\
             {code}\n\n\
             The code expires in {ttl} minutes and can only be used once.\n\
             If you did not request it, you can ignore this email.\n\n\
             The {app} team",
            name = display_name,
            action = action,
            code = code,
            ttl = self.code_ttl_minutes,
            app = self.app_name,
        );

        EmailMessage { subject, text }
    }

    /// Mail confirming a password change
    pub fn confirmation(&self, display_name: &str) -> EmailMessage {
        EmailMessage {
            subject: format!("Your {} password was changed", self.app_name),
            text: format!(
                "Hi {name},\n\n\
                 The password for your {app} account was just changed.\n\
                 If this was not you, reset your password right away.\n\n\
                 The {app} team",
                name = display_name,
                app = self.app_name,
            ),
        }
    }
}
