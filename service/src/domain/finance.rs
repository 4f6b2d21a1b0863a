//! Financial terms calculator.

use std::time::Duration;

use common::{money::Currency, DateTime, Money, Percent};
use derive_more::{Display, Error, Into};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::contract::{
    terms::Frequency, FinancialTerms, PaymentSchedule,
};

/// Financing tenor in months.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct Tenor(u32);

impl Tenor {
    /// Creates a new [`Tenor`] if the given number of `months` is within the
    /// supported range.
    #[must_use]
    pub fn new(months: u32) -> Option<Self> {
        (1..=120).contains(&months).then_some(Self(months))
    }

    /// Returns the number of months of this [`Tenor`].
    #[must_use]
    pub fn months(self) -> u32 {
        self.0
    }
}

/// Computes Murabaha [`FinancialTerms`] and a monthly [`PaymentSchedule`]
/// from the provided inputs.
///
/// The financed amount is the purchase price minus the down payment, the
/// profit margin is `profit_rate` of the financed amount, and the total is
/// their sum. The installment amount is the total divided by the number of
/// months, rounded to 2 decimal places with banker's rounding (midpoint
/// goes to the nearest even digit); all other derived amounts are exact.
///
/// The first installment is due `first_payment_delay` after `now`, the last
/// one `tenor − 1` calendar months later.
///
/// # Errors
///
/// Returns a [`CalculationError`] if the inputs are malformed or the down
/// payment exceeds the purchase price.
pub fn calculate(
    price: Money,
    down_payment: Money,
    tenor: Tenor,
    profit_rate: Percent,
    first_payment_delay: Duration,
    now: DateTime,
) -> Result<(FinancialTerms, PaymentSchedule), CalculationError> {
    use CalculationError as E;

    if down_payment.currency != price.currency {
        return Err(E::CurrencyMismatch {
            expected: price.currency,
            provided: down_payment.currency,
        });
    }
    if price.amount < Decimal::ZERO {
        return Err(E::NegativeAmount(price));
    }
    if down_payment.amount < Decimal::ZERO {
        return Err(E::NegativeAmount(down_payment));
    }
    if down_payment.amount > price.amount {
        return Err(E::DownPaymentExceedsPrice {
            down_payment,
            price,
        });
    }

    let currency = price.currency;
    let financing = price.amount - down_payment.amount;
    let margin = profit_rate.of(financing);
    let total = financing + margin;
    let installment = (total / Decimal::from(tenor.months()))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

    let in_currency = |amount| Money { amount, currency };

    let terms = FinancialTerms {
        purchase_price: price,
        down_payment,
        financing_amount: in_currency(financing),
        profit_margin: in_currency(margin),
        total_amount: in_currency(total),
    };

    let first_payment_at = (now + first_payment_delay).coerce();
    let schedule = PaymentSchedule {
        installment_amount: in_currency(installment),
        installment_count: tenor.months(),
        frequency: Frequency::Monthly,
        first_payment_at,
        last_payment_at: first_payment_at.add_months(tenor.months() - 1),
    };

    Ok((terms, schedule))
}

/// Error of [`calculate`]-ing financial terms.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum CalculationError {
    /// Down payment is in a different [`Currency`] than the price.
    #[display(
        "down payment currency `{provided}` differs from the price \
         currency `{expected}`"
    )]
    CurrencyMismatch {
        /// [`Currency`] of the purchase price.
        expected: Currency,

        /// [`Currency`] of the provided down payment.
        provided: Currency,
    },

    /// Down payment exceeds the purchase price.
    #[display("down payment `{down_payment}` exceeds the price `{price}`")]
    DownPaymentExceedsPrice {
        /// Provided down payment.
        down_payment: Money,

        /// Purchase price.
        price: Money,
    },

    /// Provided amount is negative.
    #[display("amount `{_0}` is negative")]
    NegativeAmount(#[error(not(source))] Money),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, DateTime, Money, Percent};
    use rust_decimal::Decimal;

    use super::{calculate, CalculationError, Tenor};

    const THIRTY_DAYS: Duration = Duration::from_secs(60 * 60 * 24 * 30);

    fn sar(s: &str) -> Money {
        Money {
            amount: s.parse().unwrap(),
            currency: Currency::Sar,
        }
    }

    fn ten_percent() -> Percent {
        Percent::new(Decimal::new(10, 0)).unwrap()
    }

    #[test]
    fn computes_murabaha_terms() {
        let now = DateTime::from_rfc3339("2024-03-01T00:00:00Z").unwrap();
        let (terms, schedule) = calculate(
            sar("85000"),
            sar("5000"),
            Tenor::new(12).unwrap(),
            ten_percent(),
            THIRTY_DAYS,
            now,
        )
        .unwrap();

        assert_eq!(terms.financing_amount, sar("80000"));
        assert_eq!(terms.profit_margin, sar("8000"));
        assert_eq!(terms.total_amount, sar("88000"));
        assert_eq!(schedule.installment_amount, sar("7333.33"));
        assert_eq!(schedule.installment_count, 12);

        assert_eq!(
            schedule.first_payment_at,
            DateTime::from_rfc3339("2024-03-31T00:00:00Z").unwrap().coerce(),
        );
        assert_eq!(
            schedule.last_payment_at,
            DateTime::from_rfc3339("2025-02-28T00:00:00Z").unwrap().coerce(),
        );
    }

    #[test]
    fn terms_are_internally_consistent() {
        for (price, down, months) in [
            ("50000", "0", 6),
            ("123456.78", "23456.78", 36),
            ("85000", "85000", 12),
        ] {
            let (terms, _) = calculate(
                sar(price),
                sar(down),
                Tenor::new(months).unwrap(),
                ten_percent(),
                THIRTY_DAYS,
                DateTime::now(),
            )
            .unwrap();

            assert_eq!(
                terms.financing_amount.amount + terms.down_payment.amount,
                terms.purchase_price.amount,
            );
            assert_eq!(
                terms.total_amount.amount,
                terms.financing_amount.amount + terms.profit_margin.amount,
            );
        }
    }

    #[test]
    fn rejects_down_payment_above_price() {
        let result = calculate(
            sar("85000"),
            sar("85000.01"),
            Tenor::new(12).unwrap(),
            ten_percent(),
            THIRTY_DAYS,
            DateTime::now(),
        );
        assert!(matches!(
            result,
            Err(CalculationError::DownPaymentExceedsPrice { .. }),
        ));
    }

    #[test]
    fn rejects_currency_mismatch() {
        let usd = Money {
            amount: Decimal::new(5000, 0),
            currency: Currency::Usd,
        };
        let result = calculate(
            sar("85000"),
            usd,
            Tenor::new(12).unwrap(),
            ten_percent(),
            THIRTY_DAYS,
            DateTime::now(),
        );
        assert!(matches!(
            result,
            Err(CalculationError::CurrencyMismatch { .. }),
        ));
    }

    #[test]
    fn installment_uses_bankers_rounding() {
        // 10100 / 8 = 1262.50 exactly; 10001 / 3 = 3333.666... -> 3333.67.
        let (_, schedule) = calculate(
            sar("10001"),
            sar("0"),
            Tenor::new(3).unwrap(),
            Percent::new(Decimal::ZERO).unwrap(),
            THIRTY_DAYS,
            DateTime::now(),
        )
        .unwrap();
        assert_eq!(schedule.installment_amount, sar("3333.67"));
    }
}
