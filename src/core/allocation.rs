use super::error::{AllocationError, InputField};
use super::types::{Allocation, AllocationInput, Percentages};

/// Allowed drift of the percentage total away from 100. Totals of 99.98 and
/// 100.02 are accepted; 99.97 and 100.03 are not.
pub const PERCENT_TOLERANCE: f64 = 0.02;

// Absorbs the rounding of summing four two-decimal floats.
const SUM_SLACK: f64 = 1e-9;

pub fn check_percentages(percentages: &Percentages) -> Result<(), AllocationError> {
    let total = percentages.total();
    if (total - 100.0).abs() > PERCENT_TOLERANCE + SUM_SLACK {
        return Err(AllocationError::PercentageMismatch { total });
    }
    Ok(())
}

fn check_amount(field: InputField, value: f64) -> Result<(), AllocationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AllocationError::InvalidInput { field, value });
    }
    Ok(())
}

fn share(base: f64, percent: f64) -> f64 {
    base * (percent / 100.0)
}

/// Splits a deposit into the four Profit First buckets.
///
/// Fees are optionally removed first (clamped so the net never drops below
/// zero), then the sales tax hold is optionally set aside. The remaining
/// PF base is divided by the percentages without rounding or remainder
/// redistribution, so `allocations_total` may differ from `pf_base` by
/// floating-point error only.
pub fn calculate(input: &AllocationInput) -> Result<Allocation, AllocationError> {
    check_amount(InputField::Deposit, input.deposit)?;
    check_amount(InputField::Fees, input.fees)?;
    check_amount(InputField::SalesTaxHold, input.sales_tax_hold)?;

    let net_used = if input.back_out_fees {
        (input.deposit - input.fees).max(0.0)
    } else {
        input.deposit
    };

    let pf_base = if input.back_out_sales_tax {
        net_used - input.sales_tax_hold
    } else {
        net_used
    };
    if pf_base < 0.0 {
        return Err(AllocationError::InsufficientFunds {
            sales_tax_hold: input.sales_tax_hold,
            net_used,
        });
    }

    check_percentages(&input.percentages)?;

    let pct = &input.percentages;
    let profit_amount = share(pf_base, pct.profit);
    let owner_pay_amount = share(pf_base, pct.owner_pay);
    let income_tax_amount = share(pf_base, pct.income_tax);
    let opex_amount = share(pf_base, pct.opex);

    Ok(Allocation {
        deposit: input.deposit,
        fees: input.fees,
        net_used,
        sales_tax_hold: input.sales_tax_hold,
        pf_base,
        profit_amount,
        owner_pay_amount,
        income_tax_amount,
        opex_amount,
        allocations_total: profit_amount + owner_pay_amount + income_tax_amount + opex_amount,
        base_plus_tax_hold: pf_base + input.sales_tax_hold,
        fees_backed_out: input.back_out_fees,
        sales_tax_backed_out: input.back_out_sales_tax,
    })
}
