//! Orders Data

use crate::domain::orders::records::OrderLine;

/// New Order Data
///
/// The order total is derived from the lines, not supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub lines: Vec<OrderLine>,
}

impl NewOrder {
    /// Sum of `quantity * unit_price` across all lines.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|line| f64::from(line.quantity) * line.unit_price)
            .sum()
    }
}
