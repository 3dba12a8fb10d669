//! The signed-in identity every store call is scoped by.

use poultrybook_core::UserId;

use crate::error::{EngineError, EngineResult};

/// Identity resolved by the outer authentication layer, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserId>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    pub fn require_user(&self) -> EngineResult<UserId> {
        self.user.ok_or(EngineError::AuthRequired)
    }
}
