use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount as Indian rupees with lakh/crore digit grouping, e.g. `₹1,23,456.50`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let grouped = group_indian(whole);
    if negative {
        format!("-₹{}.{}", grouped, fraction)
    } else {
        format!("₹{}.{}", grouped, fraction)
    }
}

// Last three digits form one group, the rest are grouped in pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_small_amounts() {
        assert_eq!(format_inr(dec!(0)), "₹0.00");
        assert_eq!(format_inr(dec!(13)), "₹13.00");
        assert_eq!(format_inr(dec!(999.5)), "₹999.50");
    }

    #[test]
    fn test_format_indian_grouping() {
        assert_eq!(format_inr(dec!(1000)), "₹1,000.00");
        assert_eq!(format_inr(dec!(123456.5)), "₹1,23,456.50");
        assert_eq!(format_inr(dec!(12345678.005)), "₹1,23,45,678.01");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_inr(dec!(-1500)), "-₹1,500.00");
    }
}
