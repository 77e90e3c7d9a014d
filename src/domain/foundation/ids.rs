//! Strongly-typed identifier value objects.
//!
//! Internal records are keyed by UUIDs generated on our side. Identifiers that
//! originate at the call provider (call IDs, assistant IDs, phone numbers) are
//! opaque strings and are validated only for non-emptiness.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier with the standard constructors.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

/// Declares a provider-issued string identifier that must not be empty.
macro_rules! provider_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier, rejecting empty or whitespace-only input.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Tenant (company) that owns agents, numbers, and billing state.
    CompanyId
);

uuid_id!(
    /// AI voice agent configured by a tenant.
    AgentId
);

uuid_id!(
    /// Internal identifier of a stored call record.
    CallId
);

uuid_id!(
    /// Tenant subscription to a billing plan.
    SubscriptionId
);

uuid_id!(
    /// A half-open billing window of a subscription.
    UsagePeriodId
);

uuid_id!(
    /// Prepaid wallet of a tenant.
    WalletId
);

provider_id!(
    /// Call identifier assigned by the provider; the idempotency key of a call.
    ProviderCallId,
    "provider_call_id"
);

provider_id!(
    /// Assistant identifier assigned by the provider to an agent.
    AssistantId,
    "assistant_id"
);

provider_id!(
    /// Phone number as reported by the provider (usually E.164).
    PhoneNumber,
    "phone_number"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_id_generates_unique_values() {
        let id1 = CompanyId::new();
        let id2 = CompanyId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn wallet_id_round_trips_through_string() {
        let id = WalletId::new();
        let parsed: WalletId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn call_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        assert_eq!(CallId::from_uuid(uuid).as_uuid(), &uuid);
    }

    #[test]
    fn invalid_uuid_string_is_rejected() {
        assert!("not-a-uuid".parse::<SubscriptionId>().is_err());
    }

    #[test]
    fn provider_call_id_rejects_empty() {
        let err = ProviderCallId::new("").unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { field } if field == "provider_call_id"));
    }

    #[test]
    fn provider_call_id_rejects_whitespace() {
        assert!(ProviderCallId::new("   ").is_err());
    }

    #[test]
    fn provider_call_id_is_trimmed() {
        let id = ProviderCallId::new(" call-1 ").unwrap();
        assert_eq!(id.as_str(), "call-1");
    }

    #[test]
    fn phone_number_displays_inner_value() {
        let number = PhoneNumber::new("+15551234567").unwrap();
        assert_eq!(number.to_string(), "+15551234567");
    }

    #[test]
    fn provider_ids_serialize_as_plain_strings() {
        let id = AssistantId::new("asst_1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"asst_1\"");
    }
}
