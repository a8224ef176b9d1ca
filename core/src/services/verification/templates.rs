//! Outgoing message rendering

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::CodePurpose;

/// Subject and body handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

impl RenderedMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Plain-text templates for each code purpose
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    app_name: String,
}

impl MessageTemplates {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn render(&self, purpose: CodePurpose, code: &str, ttl_minutes: i64) -> RenderedMessage {
        match purpose {
            CodePurpose::EmailVerification => RenderedMessage::new(
                format!("Verify Your Email - {}", self.app_name),
                format!(
                    "Thank you for registering with {app}. To complete your email verification, \
                     please use the code below:\n\n    {code}\n\n\
                     This code will expire in {ttl} minutes.\n\
                     If you didn't request this verification, please ignore this email.\n",
                    app = self.app_name,
                    code = code,
                    ttl = ttl_minutes,
                ),
            ),
            CodePurpose::PasswordReset => RenderedMessage::new(
                format!("Password Reset Code - {}", self.app_name),
                format!(
                    "You requested a password reset for your {app} account. \
                     Use the code below to reset your password:\n\n    {code}\n\n\
                     This code will expire in {ttl} minutes.\n\
                     If you didn't request this reset, please ignore this email and your \
                     password will remain unchanged.\n",
                    app = self.app_name,
                    code = code,
                    ttl = ttl_minutes,
                ),
            ),
        }
    }
}
