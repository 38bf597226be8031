//! Value types shared by services and handlers.
//!
//! Status and category columns are stored as plain strings; these enums are
//! the typed view of them and the only place their spellings live.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity of the signed-in account, passed explicitly into every service
/// call that reads or writes account-owned rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountContext {
    pub account_id: i64,
    pub account_uid: Uuid,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    PropertyType("property type") {
        Apartment => "apartment",
        Residential => "residential",
        Commercial => "commercial",
        Mixed => "mixed",
        Single => "single",
    }
}

string_enum! {
    PropertyStatus("property status") {
        Active => "active",
        Maintenance => "maintenance",
        Inactive => "inactive",
    }
}

string_enum! {
    /// Rent standing of a tenant.
    TenantPaymentStatus("payment status") {
        Paid => "paid",
        Due => "due",
        Overdue => "overdue",
    }
}

string_enum! {
    BillType("bill type") {
        Rent => "rent",
        Utility => "utility",
        Maintenance => "maintenance",
    }
}

string_enum! {
    BillStatus("bill status") {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
    }
}

string_enum! {
    PaymentStatus("payment status") {
        Pending => "pending",
        Confirmed => "confirmed",
        Failed => "failed",
    }
}

string_enum! {
    SubscriptionStatus("subscription status") {
        Active => "active",
        Cancelled => "cancelled",
        Expired => "expired",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Maintenance".parse::<BillType>(), Ok(BillType::Maintenance));
        assert_eq!(" paid ".parse::<BillStatus>(), Ok(BillStatus::Paid));
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "villa".parse::<PropertyType>().unwrap_err();
        assert_eq!(err.kind, "property type");
        assert_eq!(err.to_string(), "invalid property type: villa");
    }

    #[test]
    fn serializes_as_stored_spelling() {
        let json = serde_json::to_string(&TenantPaymentStatus::Overdue).unwrap();
        assert_eq!(json, "\"overdue\"");
        assert_eq!(PropertyStatus::Active.as_str(), "active");
    }
}
