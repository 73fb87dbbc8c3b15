use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commissionhub_core::{DealId, DomainError, DomainResult, InvoiceId, PartnerId};

use crate::deal::Deal;

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    Paid,
    Void,
}

/// One deal's contribution to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub line_no: u32,
    pub deal_id: DealId,
    pub deal_amount: u64,
    pub commission: u64,
}

/// Commission owed by one partner for a billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionInvoice {
    id: InvoiceId,
    partner_id: PartnerId,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    status: InvoiceStatus,
    lines: Vec<InvoiceLine>,
    total_commission: u64,
}

impl CommissionInvoice {
    /// Build an open invoice from the partner's deals closed in
    /// `[period_start, period_end)`.
    pub fn issue(
        id: InvoiceId,
        partner_id: PartnerId,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        deals: &[Deal],
    ) -> DomainResult<Self> {
        if period_end <= period_start {
            return Err(DomainError::validation(
                "invoice period must end after it starts",
            ));
        }
        if deals.is_empty() {
            return Err(DomainError::validation("cannot issue invoice without deals"));
        }

        let mut lines = Vec::with_capacity(deals.len());
        let mut total: u64 = 0;
        for (idx, deal) in deals.iter().enumerate() {
            if deal.partner_id != partner_id {
                return Err(DomainError::invariant(format!(
                    "deal {} belongs to another partner",
                    deal.id
                )));
            }
            if deal.closed_at < period_start || deal.closed_at >= period_end {
                return Err(DomainError::invariant(format!(
                    "deal {} closed outside the invoice period",
                    deal.id
                )));
            }
            let commission = deal.commission();
            total = total
                .checked_add(commission)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
            lines.push(InvoiceLine {
                line_no: idx as u32 + 1,
                deal_id: deal.id,
                deal_amount: deal.amount,
                commission,
            });
        }

        Ok(Self {
            id,
            partner_id,
            period_start,
            period_end,
            status: InvoiceStatus::Open,
            lines,
            total_commission: total,
        })
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn partner_id(&self) -> PartnerId {
        self.partner_id
    }

    pub fn period(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.period_start, self.period_end)
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn total_commission(&self) -> u64 {
        self.total_commission
    }

    pub fn mark_paid(&mut self) -> DomainResult<()> {
        match self.status {
            InvoiceStatus::Open => {
                self.status = InvoiceStatus::Paid;
                Ok(())
            }
            InvoiceStatus::Paid => Err(DomainError::invariant("invoice already paid")),
            InvoiceStatus::Void => Err(DomainError::invariant("cannot pay a void invoice")),
        }
    }

    pub fn void(&mut self) -> DomainResult<()> {
        match self.status {
            InvoiceStatus::Open => {
                self.status = InvoiceStatus::Void;
                Ok(())
            }
            InvoiceStatus::Paid => Err(DomainError::invariant("cannot void a paid invoice")),
            InvoiceStatus::Void => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::{TierName, TierTable};
    use chrono::Duration;
    use proptest::prelude::*;

    fn period() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = DateTime::parse_from_rfc3339("2026-09-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        (start, start + Duration::days(30))
    }

    fn deal_for(partner: PartnerId, amount: u64, tier: TierName) -> Deal {
        let table = TierTable::default();
        let (start, _) = period();
        Deal::new(
            DealId::new(),
            partner,
            "order",
            amount,
            table.get(tier),
            start + Duration::days(3),
        )
        .unwrap()
    }

    #[test]
    fn total_is_sum_of_commissions() {
        let partner = PartnerId::new();
        let deals = vec![
            deal_for(partner, 10_000, TierName::Premium),
            deal_for(partner, 2_500, TierName::Basic),
        ];
        let (start, end) = period();
        let invoice = CommissionInvoice::issue(InvoiceId::new(), partner, start, end, &deals).unwrap();

        assert_eq!(invoice.total_commission(), 3_000 + 250);
        assert_eq!(invoice.lines().len(), 2);
        assert_eq!(invoice.lines()[1].line_no, 2);
        assert_eq!(invoice.status(), InvoiceStatus::Open);
    }

    #[test]
    fn foreign_deal_is_rejected() {
        let partner = PartnerId::new();
        let deals = vec![deal_for(PartnerId::new(), 100, TierName::Basic)];
        let (start, end) = period();
        let err = CommissionInvoice::issue(InvoiceId::new(), partner, start, end, &deals).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn deal_outside_period_is_rejected() {
        let partner = PartnerId::new();
        let mut d = deal_for(partner, 100, TierName::Basic);
        let (start, end) = period();
        d.closed_at = end;
        assert!(CommissionInvoice::issue(InvoiceId::new(), partner, start, end, &[d]).is_err());
    }

    #[test]
    fn empty_or_inverted_period_is_rejected() {
        let partner = PartnerId::new();
        let (start, end) = period();
        assert!(CommissionInvoice::issue(InvoiceId::new(), partner, start, end, &[]).is_err());
        let deals = vec![deal_for(partner, 100, TierName::Basic)];
        assert!(CommissionInvoice::issue(InvoiceId::new(), partner, end, start, &deals).is_err());
    }

    #[test]
    fn status_transitions() {
        let partner = PartnerId::new();
        let deals = vec![deal_for(partner, 100, TierName::Basic)];
        let (start, end) = period();

        let mut paid = CommissionInvoice::issue(InvoiceId::new(), partner, start, end, &deals).unwrap();
        paid.mark_paid().unwrap();
        assert!(paid.mark_paid().is_err());
        assert!(paid.void().is_err());

        let mut voided = CommissionInvoice::issue(InvoiceId::new(), partner, start, end, &deals).unwrap();
        voided.void().unwrap();
        voided.void().unwrap();
        assert!(voided.mark_paid().is_err());
    }

    proptest! {
        #[test]
        fn invoice_total_equals_line_sum(amounts in proptest::collection::vec(1u64..1_000_000, 1..20)) {
            let partner = PartnerId::new();
            let deals: Vec<Deal> = amounts
                .iter()
                .map(|a| deal_for(partner, *a, TierName::Standard))
                .collect();
            let (start, end) = period();
            let invoice = CommissionInvoice::issue(InvoiceId::new(), partner, start, end, &deals).unwrap();
            let sum: u64 = invoice.lines().iter().map(|l| l.commission).sum();
            prop_assert_eq!(invoice.total_commission(), sum);
        }
    }
}
