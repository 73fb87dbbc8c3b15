use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commissionhub_core::{DealId, DomainError, DomainResult, PartnerId};

use crate::tier::{TierDetails, TierName};

/// A closed sale attributed to a partner.
///
/// The commission rate is captured from the tier at the time the deal closes,
/// so later tier changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub partner_id: PartnerId,
    pub description: String,
    /// Sale amount in smallest currency unit (e.g., cents).
    pub amount: u64,
    pub tier: TierName,
    pub commission_bps: u32,
    pub closed_at: DateTime<Utc>,
}

impl Deal {
    pub fn new(
        id: DealId,
        partner_id: PartnerId,
        description: impl Into<String>,
        amount: u64,
        tier: &TierDetails,
        closed_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if amount == 0 {
            return Err(DomainError::validation("deal amount must be positive"));
        }
        Ok(Self {
            id,
            partner_id,
            description: description.into(),
            amount,
            tier: tier.name,
            commission_bps: tier.commission_bps(),
            closed_at,
        })
    }

    /// Commission in smallest currency unit, rounded half up.
    pub fn commission(&self) -> u64 {
        let scaled = u128::from(self.amount) * u128::from(self.commission_bps) + 5_000;
        (scaled / 10_000) as u64
    }
}
