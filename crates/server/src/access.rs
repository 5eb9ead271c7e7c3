//! Who may call the seller dashboard and admin operations.
//!
//! Authentication happens outside this crate. The session layer hands over
//! the signed-in seller's id, role and account status; this module only
//! decides what that session may do.

use crate::error::{Result, ServiceError};
use catalog_data::{SellerId, SellerRole, SellerStatus};
use serde::{Deserialize, Serialize};

pub const SUSPENDED_MESSAGE: &str = "Your account has been suspended. Please contact support.";
pub const ADMIN_ONLY_MESSAGE: &str = "Access denied. Admin privileges required.";

/// Session variables set at sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub seller_id: Option<SellerId>,
    pub role: SellerRole,
    pub status: SellerStatus,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn seller(seller_id: SellerId, role: SellerRole, status: SellerStatus) -> Self {
        Self {
            seller_id: Some(seller_id),
            role,
            status,
        }
    }

    /// Build a session from raw string variables. Unparseable values fall
    /// back to the least privileged reading: no seller, plain role, pending.
    pub fn from_vars(seller_id: Option<&str>, role: Option<&str>, status: Option<&str>) -> Self {
        Self {
            seller_id: seller_id.and_then(|id| id.trim().parse().ok()),
            role: role.and_then(|r| r.trim().parse().ok()).unwrap_or_default(),
            status: status
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_default(),
        }
    }
}

/// A signed-in seller whose account is not suspended.
pub fn require_seller(session: &Session) -> Result<SellerId> {
    let seller_id = session.seller_id.ok_or(ServiceError::Unauthorized)?;
    if session.status == SellerStatus::Suspended {
        return Err(ServiceError::Forbidden(SUSPENDED_MESSAGE.to_string()));
    }
    Ok(seller_id)
}

/// `require_seller`, and the role must be admin.
pub fn require_admin(session: &Session) -> Result<SellerId> {
    let seller_id = require_seller(session)?;
    if session.role != SellerRole::Admin {
        return Err(ServiceError::Forbidden(ADMIN_ONLY_MESSAGE.to_string()));
    }
    Ok(seller_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_unauthorized() {
        let err = require_seller(&Session::anonymous()).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
    }

    #[test]
    fn test_suspended_seller_is_forbidden() {
        let session = Session::seller(2, SellerRole::Seller, SellerStatus::Suspended);
        let err = require_seller(&session).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), SUSPENDED_MESSAGE);
    }

    #[test]
    fn test_pending_seller_may_use_dashboard() {
        let session = Session::seller(3, SellerRole::Seller, SellerStatus::Pending);
        assert_eq!(require_seller(&session).unwrap(), 3);
    }

    #[test]
    fn test_admin_requires_role() {
        let seller = Session::seller(2, SellerRole::Seller, SellerStatus::Active);
        assert!(matches!(
            require_admin(&seller),
            Err(ServiceError::Forbidden(_))
        ));

        let admin = Session::seller(1, SellerRole::Admin, SellerStatus::Active);
        assert_eq!(require_admin(&admin).unwrap(), 1);
    }

    #[test]
    fn test_from_vars() {
        let session = Session::from_vars(Some("2"), Some("admin"), Some("active"));
        assert_eq!(
            session,
            Session::seller(2, SellerRole::Admin, SellerStatus::Active)
        );

        let garbled = Session::from_vars(Some("two"), Some("root"), None);
        assert_eq!(garbled, Session::anonymous());
    }
}
