use serde::{Deserialize, Serialize};

use crate::db_types::{AccountStatus, Role};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountQueryFilter {
    /// Case-insensitive substring match on the name or email
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AccountQueryFilter {
    pub fn with_search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.role.is_none() && self.status.is_none()
    }
}
