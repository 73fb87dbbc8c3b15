//! `commissionhub-billing`: subscription tiers and commission data shapes.
//!
//! Pure data and arithmetic: no persistence, no IO beyond reading payment
//! links from the environment once at startup.

pub mod deal;
pub mod invoice;
pub mod tier;

pub use deal::Deal;
pub use invoice::{CommissionInvoice, InvoiceLine, InvoiceStatus};
pub use tier::{PaymentLinks, TierDetails, TierName, TierTable};
