//! Typed errors raised by domain services.

use shared::FieldError;
use thiserror::Error;

use crate::storage::Dependent;

/// Per-field validation failures collected from a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Validation failed: {}", describe_fields(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message recorded for `field`, if any
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_dependents(dependents: &[Dependent]) -> String {
    dependents
        .iter()
        .map(|d| format!("{} {}", d.count, d.table))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Deleting {entity} {id} requires confirmation")]
    ConfirmationRequired { entity: &'static str, id: String },

    #[error("{entity} {id} is still referenced by {}", describe_dependents(.dependents))]
    Referenced {
        entity: &'static str,
        id: String,
        dependents: Vec<Dependent>,
    },

    #[error("{entity} refers to a record that does not exist: {message}")]
    InvalidReference { entity: &'static str, message: String },

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    /// Classify a repository failure. Constraint violations reported by
    /// SQLite become typed errors; anything else stays a storage error.
    pub fn from_storage(entity: &'static str, err: anyhow::Error) -> Self {
        let database_error = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
            .and_then(|e| match e {
                sqlx::Error::Database(db) => Some((
                    db.is_foreign_key_violation(),
                    db.is_unique_violation(),
                    db.message().to_string(),
                )),
                _ => None,
            });

        match database_error {
            Some((true, _, message)) => DomainError::InvalidReference { entity, message },
            Some((_, true, message)) => {
                // "UNIQUE constraint failed: payments.receipt_number"
                let field = message
                    .rsplit('.')
                    .next()
                    .map(str::trim)
                    .filter(|f| !f.is_empty() && !f.contains(' '))
                    .unwrap_or("unique")
                    .to_string();
                DomainError::Validation(ValidationErrors::single(&field, "already exists"))
            }
            _ => DomainError::Storage(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let mut errors = ValidationErrors::single("name", "is required");
        errors.add("hire_date", "must be a valid date (YYYY-MM-DD)");
        assert_eq!(
            DomainError::from(errors).to_string(),
            "Validation failed: name: is required; hire_date: must be a valid date (YYYY-MM-DD)"
        );

        let err = DomainError::Referenced {
            entity: "Property",
            id: "3".to_string(),
            dependents: vec![
                Dependent { table: "units", count: 4 },
                Dependent { table: "blocks", count: 1 },
            ],
        };
        assert_eq!(err.to_string(), "Property 3 is still referenced by 4 units, 1 blocks");
    }

    #[test]
    fn test_plain_errors_stay_storage_errors() {
        let err = DomainError::from_storage("Unit", anyhow::anyhow!("disk full"));
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
