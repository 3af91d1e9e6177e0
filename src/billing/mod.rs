//! Billing computations.

pub mod invoice;

pub use invoice::{InvoiceError, InvoiceTotals, LineItem, Money, TAX_RATE_PERCENT, compute_totals};
