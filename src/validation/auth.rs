use garde::Validate;
use serde::Deserialize;

use crate::error::Result;
use crate::validation::rules::{min_password, report_to_error, required};

/// The request payload for user registration.
#[derive(Deserialize, Debug, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[garde(custom(required))]
    pub email: String,
    #[serde(default)]
    #[garde(custom(required), custom(min_password))]
    pub password: String,
    #[serde(default)]
    #[garde(custom(required))]
    pub name: String,
}

/// The request payload for user login.
#[derive(Deserialize, Debug, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[garde(custom(required))]
    pub email: String,
    #[serde(default)]
    #[garde(custom(required))]
    pub password: String,
}

impl RegisterRequest {
    /// Checks the payload, reporting the first problem as a validation error.
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(report_to_error)
    }
}

impl LoginRequest {
    /// Checks the payload, reporting the first problem as a validation error.
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(report_to_error)
    }
}
