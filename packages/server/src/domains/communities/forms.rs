//! Community form validation.

use serde::Deserialize;

use crate::common::forms::FieldErrors;

const NAME_MAX: usize = 100;

/// Raw community create submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CommunityForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "This field is required.");
        } else if name.len() > NAME_MAX {
            errors.add(
                "name",
                format!("Ensure this value has at most {NAME_MAX} characters."),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required() {
        let form = CommunityForm {
            name: "   ".into(),
            description: "anything".into(),
        };
        assert!(form.validate().unwrap_err().has("name"));
    }

    #[test]
    fn test_name_length_capped() {
        let form = CommunityForm {
            name: "x".repeat(NAME_MAX + 1),
            description: String::new(),
        };
        assert!(form.validate().unwrap_err().has("name"));
    }

    #[test]
    fn test_description_is_optional() {
        let form = CommunityForm {
            name: "Chess club".into(),
            description: String::new(),
        };
        assert!(form.validate().is_ok());
    }
}
