use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Account Value Objects
// ============================================================================

/// Shipping address, required before checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Name of the first blank field, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Caller capability as asserted by the auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    /// Admins and sellers run fulfillment and catalog administration
    pub fn is_operator(self) -> bool {
        matches!(self, Role::Admin | Role::Seller)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Why points were credited to an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountCreditReason {
    /// Cancellation of a points-paid order
    Refund { order_id: Uuid },
    /// XP earned elsewhere in the app
    Grant { note: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            street: "1 Court St".to_string(),
            city: "Springfield".to_string(),
            state: "MA".to_string(),
            postal_code: "01101".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_complete_address_has_no_missing_field() {
        assert_eq!(address().missing_field(), None);
    }

    #[test]
    fn test_blank_field_is_reported() {
        let mut address = address();
        address.city = "   ".to_string();
        assert_eq!(address.missing_field(), Some("city"));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" seller ".parse::<Role>().unwrap(), Role::Seller);
        assert!("coach".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_admin_and_seller_operate() {
        assert!(Role::Admin.is_operator());
        assert!(Role::Seller.is_operator());
        assert!(!Role::Buyer.is_operator());
    }
}
