//! Registration, login and profile form validation.

use serde::Deserialize;

use crate::common::forms::{FieldErrors, FORM};

const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;

/// Raw registration submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl RegistrationForm {
    /// Validate field constraints, accumulating every violation.
    ///
    /// Username uniqueness is a database question and is checked by the
    /// handler before insert.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "This field is required.");
        } else if username.len() > USERNAME_MAX {
            errors.add(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX} characters."),
            );
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", "This field is required.");
        } else if !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.len() < PASSWORD_MIN {
            errors.add(
                "password1",
                format!("Password must be at least {PASSWORD_MIN} characters."),
            );
        }
        if self.password2 != self.password1 {
            errors.add("password2", "The two password fields didn't match.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Raw login submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", "This field is required.");
        }
        if self.password.is_empty() {
            errors.add("password", "This field is required.");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The error shown when credentials don't check out. Deliberately does
    /// not say which of the two fields was wrong.
    pub fn invalid_credentials() -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.add(FORM, "Please enter a correct username and password.");
        errors
    }
}

/// Profile update submission. All fields free-form text; nothing to reject.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub photo_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegistrationForm {
        RegistrationForm {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password1: "s3cret-enough".into(),
            password2: "s3cret-enough".into(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn test_registration_accumulates_all_errors() {
        let form = RegistrationForm {
            username: "".into(),
            email: "not-an-email".into(),
            password1: "short".into(),
            password2: "different".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
        assert!(errors.has("password1"));
        assert!(errors.has("password2"));
    }

    #[test]
    fn test_password_mismatch() {
        let mut form = valid_registration();
        form.password2 = "something else!".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.has("password2"));
        assert!(!errors.has("password1"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }
}
