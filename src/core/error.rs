use std::fmt;

use thiserror::Error;

use super::money::format_money;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputField {
    Deposit,
    Fees,
    SalesTaxHold,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InputField::Deposit => "Deposit",
            InputField::Fees => "Processing fees",
            InputField::SalesTaxHold => "Sales tax amount",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("{field} must be a number >= 0 (got {value}).")]
    InvalidInput { field: InputField, value: f64 },

    #[error(
        "Sales tax amount ({}) is greater than Net Used ({}).",
        money(.sales_tax_hold),
        money(.net_used)
    )]
    InsufficientFunds { sales_tax_hold: f64, net_used: f64 },

    #[error("Profit First percentages must total 100%. Yours total {total:.2}%.")]
    PercentageMismatch { total: f64 },
}

fn money(amount: &f64) -> String {
    format_money(*amount)
}
