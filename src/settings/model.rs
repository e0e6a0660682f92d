use serde::{Deserialize, Serialize, de::Deserializer};
use serde_json::{Map, Value};

use crate::core::{AllocationError, Percentages, check_percentages};

const KEY_PROFIT: &str = "pf_profit_percent";
const KEY_OWNER_PAY: &str = "pf_owner_pay_percent";
const KEY_INCOME_TAX: &str = "pf_income_tax_percent";
const KEY_OPEX: &str = "pf_opex_percent";
const KEY_BACK_OUT_FEES: &str = "back_out_processing_fees";
const KEY_BACK_OUT_SALES_TAX: &str = "back_out_sales_tax_before_pf";
const KEY_SALES_TAX_AMOUNT: &str = "sales_tax_amount";

/// Percentages, toggles, and the last sales tax amount remembered between
/// sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Settings {
    #[serde(rename = "pf_profit_percent")]
    pub profit_percent: f64,
    #[serde(rename = "pf_owner_pay_percent")]
    pub owner_pay_percent: f64,
    #[serde(rename = "pf_income_tax_percent")]
    pub income_tax_percent: f64,
    #[serde(rename = "pf_opex_percent")]
    pub opex_percent: f64,
    pub back_out_processing_fees: bool,
    pub back_out_sales_tax_before_pf: bool,
    pub sales_tax_amount: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profit_percent: 5.0,
            owner_pay_percent: 50.0,
            income_tax_percent: 15.0,
            opex_percent: 30.0,
            back_out_processing_fees: true,
            back_out_sales_tax_before_pf: true,
            sales_tax_amount: 0.0,
        }
    }
}

impl Settings {
    /// Builds settings from a parsed JSON object. Each key that is missing or
    /// holds the wrong type falls back to its starter default on its own.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, fallback: f64| {
            map.get(key).and_then(Value::as_f64).unwrap_or(fallback)
        };
        let flag = |key: &str, fallback: bool| {
            map.get(key).and_then(Value::as_bool).unwrap_or(fallback)
        };

        Self {
            profit_percent: number(KEY_PROFIT, defaults.profit_percent),
            owner_pay_percent: number(KEY_OWNER_PAY, defaults.owner_pay_percent),
            income_tax_percent: number(KEY_INCOME_TAX, defaults.income_tax_percent),
            opex_percent: number(KEY_OPEX, defaults.opex_percent),
            back_out_processing_fees: flag(KEY_BACK_OUT_FEES, defaults.back_out_processing_fees),
            back_out_sales_tax_before_pf: flag(
                KEY_BACK_OUT_SALES_TAX,
                defaults.back_out_sales_tax_before_pf,
            ),
            sales_tax_amount: number(KEY_SALES_TAX_AMOUNT, defaults.sales_tax_amount),
        }
    }

    pub fn percentages(&self) -> Percentages {
        Percentages {
            profit: self.profit_percent,
            owner_pay: self.owner_pay_percent,
            income_tax: self.income_tax_percent,
            opex: self.opex_percent,
        }
    }

    /// Settings may only become the new defaults when the split totals 100%.
    pub fn validate(&self) -> Result<(), AllocationError> {
        check_percentages(&self.percentages())
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Settings::from_map(&map))
    }
}
