use serde::Deserialize;

use crate::error::ApiError;
use crate::users::repo_types::UserFields;

/// Request body for create and update. An `id` in the body is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_status: String,
    pub department: String,
}

impl UserPayload {
    pub fn into_fields(self) -> Result<UserFields, ApiError> {
        if self.user_name.trim().is_empty() {
            return Err(ApiError::Validation("user_name is required".into()));
        }
        Ok(UserFields {
            user_name: self.user_name,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            user_status: self.user_status,
            department: self.department,
        })
    }
}
