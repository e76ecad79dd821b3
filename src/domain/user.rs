/// User entity
///
/// Users own workouts, goals and progress records. Authentication is out of
/// scope; a user is just a named owner for the other records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new user with validation
    pub fn new(username: String, email: String) -> Result<Self, DomainError> {
        let username = username.trim().to_string();
        let email = email.trim().to_lowercase();

        if username.is_empty() || username.chars().count() > 50 {
            return Err(DomainError::InvalidName(
                "Username must be between 1 and 50 characters".to_string(),
            ));
        }

        // Deliberately loose: one '@' with something on both sides
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
            None => false,
        };
        if !valid_email {
            return Err(DomainError::Validation {
                message: format!("'{}' is not a valid email address", email),
            });
        }

        Ok(Self {
            id: UserId::new(),
            username,
            email,
            created_at: Utc::now(),
        })
    }

    /// Create a user from existing data (used when loading from database)
    pub fn from_existing(id: UserId, username: String, email: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            email,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_valid_user() {
        let user = UserRecord::new(" sam ".to_string(), "Sam@Example.com".to_string()).unwrap();
        assert_eq!(user.username, "sam");
        assert_eq!(user.email, "sam@example.com");
    }

    #[test]
    fn test_invalid_user_fields() {
        assert!(UserRecord::new("".to_string(), "a@b.c".to_string()).is_err());
        assert!(UserRecord::new("sam".to_string(), "not-an-email".to_string()).is_err());
        assert!(UserRecord::new("sam".to_string(), "@example.com".to_string()).is_err());
    }
}
