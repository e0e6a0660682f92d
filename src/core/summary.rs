use super::money::format_money;
use super::types::Allocation;

const RULE_WIDTH: usize = 30;

/// Renders the plain-text summary that the form displays and copies to the
/// clipboard.
pub fn render_summary(allocation: &Allocation) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        "PROFIT FIRST ALLOCATION".to_string(),
        heavy,
        String::new(),
        format!("Deposit: {}", format_money(allocation.deposit)),
    ];

    if allocation.fees_backed_out {
        lines.push(format!("Fees Removed: {}", format_money(allocation.fees)));
        lines.push(format!(
            "Net Used (after fees): {}",
            format_money(allocation.net_used)
        ));
    } else {
        lines.push("Fees NOT removed (treated as Opex expense).".to_string());
        lines.push(format!("Net Used: {}", format_money(allocation.net_used)));
    }

    lines.extend([
        format!(
            "Sales Tax Hold (MANUAL, separate): {}",
            format_money(allocation.sales_tax_hold)
        ),
        format!("PF Base Used: {}", format_money(allocation.pf_base)),
        String::new(),
        "MOVE MONEY TO ACCOUNTS (from PF Base):".to_string(),
        light.clone(),
        format!("Profit Account: {}", format_money(allocation.profit_amount)),
        format!("Owner Pay: {}", format_money(allocation.owner_pay_amount)),
        format!(
            "Tax Account (INCOME tax): {}",
            format_money(allocation.income_tax_amount)
        ),
        format!(
            "Operating Expenses: {}",
            format_money(allocation.opex_amount)
        ),
        String::new(),
        "CHECKS:".to_string(),
        light,
        format!(
            "PF allocations total: {} (should equal PF Base)",
            format_money(allocation.allocations_total)
        ),
        format!(
            "PF Base + Sales Tax Hold: {} (should equal Net Used)",
            format_money(allocation.base_plus_tax_hold)
        ),
    ]);

    lines.join("\n")
}
