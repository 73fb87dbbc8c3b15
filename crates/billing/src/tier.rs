//! Subscription tier table.

use serde::{Deserialize, Serialize};

/// Known subscription tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierName {
    Basic,
    Standard,
    Premium,
}

impl TierName {
    pub const ALL: [TierName; 3] = [Self::Basic, Self::Standard, Self::Premium];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    /// Case-insensitive lookup; `None` for unknown names.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(raw))
    }

    fn payment_link_var(self) -> &'static str {
        match self {
            Self::Basic => "PAYMENT_LINK_BASIC",
            Self::Standard => "PAYMENT_LINK_STANDARD",
            Self::Premium => "PAYMENT_LINK_PREMIUM",
        }
    }
}

impl core::fmt::Display for TierName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details shown on the pricing page and used for commission maths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDetails {
    pub name: TierName,
    pub display_name: String,
    /// Fraction of each deal kept as commission (0.3 = 30%).
    pub commission_rate: f64,
    /// Monthly price in whole currency units.
    pub price: u32,
    /// Checkout URL from the environment; opaque, empty when unset.
    pub payment_link: String,
}

impl TierDetails {
    /// Commission rate in basis points (1/100 of a percent).
    pub fn commission_bps(&self) -> u32 {
        (self.commission_rate * 10_000.0).round().clamp(0.0, 10_000.0) as u32
    }
}

/// Payment links per tier, as configured at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentLinks {
    pub basic: String,
    pub standard: String,
    pub premium: String,
}

impl PaymentLinks {
    /// Read `PAYMENT_LINK_BASIC`, `PAYMENT_LINK_STANDARD`, `PAYMENT_LINK_PREMIUM`
    /// through `lookup` (the gateway passes its environment reader).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |tier: TierName| {
            let value = lookup(tier.payment_link_var()).unwrap_or_default();
            if value.is_empty() {
                tracing::debug!(tier = %tier, var = tier.payment_link_var(), "payment link not configured");
            }
            value
        };
        Self {
            basic: read(TierName::Basic),
            standard: read(TierName::Standard),
            premium: read(TierName::Premium),
        }
    }

    fn for_tier(&self, tier: TierName) -> &str {
        match tier {
            TierName::Basic => &self.basic,
            TierName::Standard => &self.standard,
            TierName::Premium => &self.premium,
        }
    }
}

/// Immutable tier table built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    tiers: Vec<TierDetails>,
}

impl TierTable {
    pub fn new(links: &PaymentLinks) -> Self {
        let tier = |name: TierName, display_name: &str, commission_rate: f64, price: u32| {
            TierDetails {
                name,
                display_name: display_name.to_string(),
                commission_rate,
                price,
                payment_link: links.for_tier(name).to_string(),
            }
        };
        Self {
            tiers: vec![
                tier(TierName::Basic, "Basic", 0.10, 299),
                tier(TierName::Standard, "Standard", 0.20, 499),
                tier(TierName::Premium, "Premium", 0.30, 699),
            ],
        }
    }

    pub fn get(&self, name: TierName) -> &TierDetails {
        // Every TierName has exactly one row; built in `new`.
        let idx = TierName::ALL
            .iter()
            .position(|t| *t == name)
            .unwrap_or_default();
        &self.tiers[idx]
    }

    /// Look up a tier by name, falling back to `basic` for unknown names.
    pub fn resolve_tier(&self, name: &str) -> &TierDetails {
        self.get(TierName::parse(name).unwrap_or(TierName::Basic))
    }

    pub fn all(&self) -> &[TierDetails] {
        &self.tiers
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::new(&PaymentLinks::default())
    }
}
