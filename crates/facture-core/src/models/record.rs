//! Extracted invoice line items.

use serde::{Deserialize, Serialize};

/// One line item of an invoice table.
///
/// All fields are already rendered strings: prices and amounts carry
/// exactly two fraction digits, the quantity may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Free-text item description.
    pub designation: String,

    /// Quantity, empty when the row carried only price and amount.
    pub quantity: String,

    /// Unit price with two fraction digits.
    pub unit_price: String,

    /// Line amount with two fraction digits.
    pub amount: String,
}

impl InvoiceRecord {
    pub fn new(
        designation: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            designation: designation.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            amount: amount.into(),
        }
    }

    /// Fields in output column order.
    pub fn fields(&self) -> [&str; 4] {
        [
            &self.designation,
            &self.quantity,
            &self.unit_price,
            &self.amount,
        ]
    }
}
