use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::destination::Destination;

/// Partner role resolved from the stored role record.
///
/// The allow-list is the set of known variants: anything else parses into
/// [`PartnerRole::Unrecognized`], keeping the raw value for logs. Matching is
/// case-insensitive only; padded values are not on the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartnerRole {
    StorePartner,
    RestaurantPartner,
    Unrecognized(String),
}

impl PartnerRole {
    pub const STORE_PARTNER: &'static str = "storepartner";
    pub const RESTAURANT_PARTNER: &'static str = "restaurantpartner";

    /// Parse a raw role string. Never fails; unknown values are `Unrecognized`.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.to_ascii_lowercase();
        match normalized.as_str() {
            Self::STORE_PARTNER => Self::StorePartner,
            Self::RESTAURANT_PARTNER => Self::RestaurantPartner,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Dashboard for an allowed role; `None` for anything off the allow-list.
    pub fn destination(&self) -> Option<Destination> {
        match self {
            Self::StorePartner => Some(Destination::StoreDashboard),
            Self::RestaurantPartner => Some(Destination::RestaurantDashboard),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::StorePartner => Self::STORE_PARTNER,
            Self::RestaurantPartner => Self::RESTAURANT_PARTNER,
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl core::fmt::Display for PartnerRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PartnerRole {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Serialize for PartnerRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PartnerRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
