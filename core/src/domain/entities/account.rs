//! Account entity: the part of a DevLink member record the recovery flows touch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: Uuid,

    /// Normalized email address, unique across accounts
    pub email: String,

    /// Name shown on the profile and used to greet the member in mails
    pub display_name: String,

    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the member proved control of the address
    pub email_verified: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new, unverified account
    pub fn new(email: String, display_name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the password hash
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Marks the address as verified
    pub fn verify_email(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }
}
