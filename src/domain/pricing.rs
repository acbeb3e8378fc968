//! Order pricing.
//!
//! Everything here is pure: the rates are passed in, nothing is read from the
//! environment. Line totals are exact; shipping, tax and discount are rounded
//! half-up to cents and the total is the exact combination of those rounded
//! components, so the totals identity holds to the cent.

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::order::{LineItem, PricedOrder, Totals, ValidatedOrder};

const CENTS: i64 = 2;

/// Named pricing rates, injected from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Rates {
    /// Flat shipping cost per order.
    pub shipping_cost: BigDecimal,
    /// Fraction of the subtotal charged as tax, e.g. `0.10`.
    pub tax_rate: BigDecimal,
    /// Fraction of the subtotal given back as discount, e.g. `0.05`.
    pub discount_rate: BigDecimal,
}

fn to_cents(amount: BigDecimal) -> BigDecimal {
    amount.with_scale_round(CENTS, RoundingMode::HalfUp)
}

pub fn subtotal(lines: &[LineItem]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::zero(), |acc, line| acc + &line.line_total)
}

impl Totals {
    /// Derive every component from one already-computed subtotal.
    pub fn from_subtotal(subtotal: BigDecimal, rates: &Rates) -> Self {
        let shipping_total = to_cents(rates.shipping_cost.clone());
        let tax_total = to_cents(&rates.tax_rate * &subtotal);
        let discount_total = to_cents(&rates.discount_rate * &subtotal);
        let total_amount = &subtotal + &shipping_total + &tax_total - &discount_total;

        Self {
            subtotal,
            shipping_total,
            tax_total,
            discount_total,
            total_amount,
        }
    }
}

pub fn price(order: ValidatedOrder, rates: &Rates) -> PricedOrder {
    let totals = Totals::from_subtotal(subtotal(&order.lines), rates);
    PricedOrder {
        customer_id: order.customer_id,
        lines: order.lines,
        totals,
    }
}

impl PricedOrder {
    /// Re-evaluate shipping, tax and discount with other rates, reusing the
    /// stored subtotal.
    pub fn reprice(&self, rates: &Rates) -> PricedOrder {
        PricedOrder {
            customer_id: self.customer_id,
            lines: self.lines.clone(),
            totals: Totals::from_subtotal(self.totals.subtotal.clone(), rates),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use uuid::Uuid;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn rates(shipping: &str, tax: &str, discount: &str) -> Rates {
        Rates {
            shipping_cost: dec(shipping),
            tax_rate: dec(tax),
            discount_rate: dec(discount),
        }
    }

    fn validated(lines: Vec<LineItem>) -> ValidatedOrder {
        ValidatedOrder {
            customer_id: Uuid::new_v4(),
            lines,
        }
    }

    fn assert_identity(totals: &Totals) {
        assert_eq!(
            totals.total_amount,
            &totals.subtotal + &totals.shipping_total + &totals.tax_total - &totals.discount_total
        );
    }

    #[test]
    fn prices_the_reference_cart() {
        let order = validated(vec![LineItem::new(1, 2, dec("10.00"))]);

        let priced = price(order, &rates("5.00", "0.1", "0.05"));

        assert_eq!(priced.totals.subtotal, dec("20.00"));
        assert_eq!(priced.totals.shipping_total, dec("5.00"));
        assert_eq!(priced.totals.tax_total, dec("2.00"));
        assert_eq!(priced.totals.discount_total, dec("1.00"));
        assert_eq!(priced.totals.total_amount, dec("26.00"));
    }

    #[test]
    fn subtotal_sums_every_line_total() {
        let lines = vec![
            LineItem::new(1, 3, dec("1.99")),
            LineItem::new(2, 1, dec("0.50")),
        ];
        assert_eq!(subtotal(&lines), dec("6.47"));
    }

    #[test]
    fn tax_and_discount_round_half_up_to_cents() {
        // 3 x 3.35 = 10.05 ; tax 0.075 * 10.05 = 0.75375 ; discount 0.05 * 10.05 = 0.5025
        let order = validated(vec![LineItem::new(1, 3, dec("3.35"))]);

        let priced = price(order, &rates("0", "0.075", "0.05"));

        assert_eq!(priced.totals.tax_total, dec("0.75"));
        assert_eq!(priced.totals.discount_total, dec("0.50"));
        assert_eq!(priced.totals.total_amount, dec("10.30"));
        assert_identity(&priced.totals);
    }

    #[test]
    fn half_cent_rounds_up() {
        // 0.1 * 0.05 = 0.005
        let totals = Totals::from_subtotal(dec("0.05"), &rates("0", "0.1", "0"));
        assert_eq!(totals.tax_total, dec("0.01"));
    }

    #[test]
    fn pricing_is_idempotent() {
        let order = validated(vec![
            LineItem::new(1, 7, dec("2.49")),
            LineItem::new(4, 1, dec("99.90")),
        ]);
        let rates = rates("4.99", "0.21", "0.15");

        let first = price(order.clone(), &rates);
        let second = price(order, &rates);

        assert_eq!(first, second);
        assert_identity(&first.totals);
    }

    #[test]
    fn reprice_keeps_the_subtotal_and_swaps_the_rates() {
        let priced = price(
            validated(vec![LineItem::new(1, 2, dec("10.00"))]),
            &rates("5.00", "0.1", "0.05"),
        );

        let repriced = priced.reprice(&rates("0", "0.2", "0"));

        assert_eq!(repriced.totals.subtotal, priced.totals.subtotal);
        assert_eq!(repriced.totals.shipping_total, dec("0"));
        assert_eq!(repriced.totals.tax_total, dec("4.00"));
        assert_eq!(repriced.totals.total_amount, dec("24.00"));
        assert_eq!(repriced.lines, priced.lines);
    }

    #[test]
    fn zero_rates_leave_total_equal_to_subtotal() {
        let priced = price(
            validated(vec![LineItem::new(9, 4, dec("12.34"))]),
            &rates("0", "0", "0"),
        );
        assert_eq!(priced.totals.total_amount, dec("49.36"));
    }
}
