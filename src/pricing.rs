/// One flat-fee line on an estimate, priced per visit rather than per
/// square foot. Negative prices pass through untouched and act as
/// discounts.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub label: String,
    pub price: f64,
}

/// Priced-out estimate. Amounts carry full float precision; rounding to
/// cents happens at display time via [`format_usd`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBreakdown {
    /// Area times rate, before the minimum charge.
    pub raw_area_cost: f64,
    /// What the area line actually bills: 0 when the area service is off,
    /// otherwise the raw cost clamped up to the minimum charge.
    pub billed_area_cost: f64,
    /// True when the clamp raised the area line.
    pub minimum_applied: bool,
    pub flat_fee_total: f64,
    pub total: f64,
}

/// Price one visit.
///
/// The minimum charge applies to the area line whenever the area service
/// is active and its raw cost falls short, independent of any flat-fee
/// lines; adding an add-on can never lower the bill.
pub fn price_quote(
    area_sq_ft: u64,
    rate_per_sq_ft: f64,
    mowing: bool,
    flat_fees: &[LineItem],
    minimum_charge: f64,
) -> QuoteBreakdown {
    let raw_area_cost = area_sq_ft as f64 * rate_per_sq_ft;
    let minimum_applied = mowing && raw_area_cost < minimum_charge;
    let billed_area_cost = if !mowing {
        0.0
    } else if minimum_applied {
        minimum_charge
    } else {
        raw_area_cost
    };
    let flat_fee_total: f64 = flat_fees.iter().map(|item| item.price).sum();

    QuoteBreakdown {
        raw_area_cost,
        billed_area_cost,
        minimum_applied,
        flat_fee_total,
        total: billed_area_cost + flat_fee_total,
    }
}

/// Currency formatting used everywhere an amount reaches the operator or
/// the customer.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn item(label: &str, price: f64) -> LineItem {
        LineItem { label: label.to_string(), price }
    }

    #[test]
    fn small_lawns_bill_the_minimum_charge() {
        let quote = price_quote(0, 0.02, true, &[], 50.0);
        assert!(quote.minimum_applied);
        assert_eq!(format_usd(quote.total), "$50.00");

        // 1,000 sq ft at $0.02 is $20, still under the floor.
        let quote = price_quote(1_000, 0.02, true, &[], 50.0);
        assert!(quote.minimum_applied);
        assert_eq!(format_usd(quote.billed_area_cost), "$50.00");
        assert_relative_eq!(quote.raw_area_cost, 20.0, max_relative = 1e-12);
    }

    #[test]
    fn large_lawns_bill_the_standard_rate() {
        let quote = price_quote(10_000, 0.02, true, &[], 50.0);
        assert!(!quote.minimum_applied);
        assert_eq!(format_usd(quote.total), "$200.00");
    }

    #[test]
    fn floor_applies_alongside_flat_fees() {
        // The clamp is per area line, not per estimate: a $25 add-on on an
        // unmeasured lawn quotes $50 + $25.
        let quote = price_quote(0, 0.02, true, &[item("Shrub Trimming", 25.0)], 50.0);
        assert!(quote.minimum_applied);
        assert_eq!(format_usd(quote.total), "$75.00");
    }

    #[test]
    fn inactive_area_service_bills_flat_fees_only() {
        let quote = price_quote(
            10_000,
            0.02,
            false,
            &[item("Shrub Trimming", 40.0), item("Lawn Clean-up", 110.0)],
            50.0,
        );
        assert!(!quote.minimum_applied);
        assert_eq!(quote.billed_area_cost, 0.0);
        assert_eq!(format_usd(quote.total), "$150.00");
    }

    #[test]
    fn negative_flat_fees_discount_the_total() {
        let quote = price_quote(10_000, 0.02, true, &[item("Referral credit", -20.0)], 50.0);
        assert_eq!(format_usd(quote.total), "$180.00");
    }

    #[test]
    fn requoting_unchanged_inputs_is_byte_identical() {
        let fees = [item("Shrub Trimming", 35.5)];
        let first = price_quote(4_321, 0.025, true, &fees, 50.0);
        let second = price_quote(4_321, 0.025, true, &fees, 50.0);
        assert_eq!(first, second);
        assert_eq!(
            first.total.to_bits(),
            second.total.to_bits()
        );
    }
}
