use serde::{Deserialize, Serialize};

use super::validation::{Validate, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "super::default_limit")]
    pub limit: i64,
    pub search: Option<String>,
}

impl Validate for CreateCustomer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_len(&["body", "name"], &self.name, 1, 100);
        errors.check_email(&["body", "email"], &self.email);
        if let Some(phone) = &self.phone {
            errors.check_len(&["body", "phone"], phone, 0, 20);
        }
        errors.into_result()
    }
}

impl Validate for UpdateCustomer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_len(&["body", "name"], name, 1, 100);
        }
        if let Some(email) = &self.email {
            errors.check_email(&["body", "email"], email);
        }
        if let Some(phone) = &self.phone {
            errors.check_len(&["body", "phone"], phone, 0, 20);
        }
        errors.into_result()
    }
}

impl Validate for CustomerFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        super::validate_page(self.skip, self.limit)
    }
}
