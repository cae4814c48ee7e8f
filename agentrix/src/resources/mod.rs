//! Resource facades over the shared [`HttpClient`](crate::HttpClient).
//!
//! Each facade borrows the client, validates its inputs before any I/O and
//! issues exactly one request per method.
//!
//! - [`Payments`] - create, fetch, cancel, list and route payments
//! - [`Agents`] - auto-pay grants, earnings and commissions
//! - [`Merchants`] - products and orders
//! - [`Marketplace`] - product search, recommendations and buyer orders

mod agents;
mod marketplace;
mod merchants;
mod payments;

pub use agents::Agents;
pub use marketplace::Marketplace;
pub use merchants::Merchants;
pub use payments::Payments;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in a path segment: everything but RFC 3986 unreserved.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes an identifier for use as one path segment.
fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}
