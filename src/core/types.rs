use serde::Serialize;

/// The four Profit First buckets, each expressed in percent (e.g. `50.0`).
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentages {
    pub profit: f64,
    pub owner_pay: f64,
    pub income_tax: f64,
    pub opex: f64,
}

impl Percentages {
    pub fn total(&self) -> f64 {
        self.profit + self.owner_pay + self.income_tax + self.opex
    }
}

#[derive(Debug, Clone)]
pub struct AllocationInput {
    pub deposit: f64,
    pub fees: f64,
    pub sales_tax_hold: f64,
    pub percentages: Percentages,
    pub back_out_fees: bool,
    pub back_out_sales_tax: bool,
}

/// Breakdown of a single deposit. Amounts are unrounded; formatting happens
/// at the presentation edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub deposit: f64,
    pub fees: f64,
    pub net_used: f64,
    pub sales_tax_hold: f64,
    pub pf_base: f64,
    pub profit_amount: f64,
    pub owner_pay_amount: f64,
    pub income_tax_amount: f64,
    pub opex_amount: f64,
    pub allocations_total: f64,
    pub base_plus_tax_hold: f64,
    pub fees_backed_out: bool,
    pub sales_tax_backed_out: bool,
}
