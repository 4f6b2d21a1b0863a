//! [`RiskScorer`] implementations.

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::domain::{
    risk::{Level, RiskAssessment, Score, ScoringError},
    Contract, RiskScorer,
};

/// Deterministic [`RiskScorer`] fixture.
///
/// Scores a [`Contract`] from its financing ratio and tenor alone, so the
/// same contract always yields the same [`RiskAssessment`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FixtureScorer;

impl RiskScorer for FixtureScorer {
    fn assess(
        &self,
        contract: &Contract,
        now: common::DateTime,
    ) -> Result<RiskAssessment, ScoringError> {
        let terms = &contract.financial_terms;
        if terms.purchase_price.amount.is_zero() {
            return Err(ScoringError("zero purchase price".into()));
        }

        let ratio =
            terms.financing_amount.amount / terms.purchase_price.amount;
        let tenor_penalty =
            if contract.payment_schedule.installment_count > 36 {
                5
            } else {
                0
            };
        let score = (Decimal::from(92 - tenor_penalty)
            - ratio * Decimal::from(35))
        .round()
            .to_i64()
            .and_then(|s| u8::try_from(s.clamp(0, 100)).ok())
            .and_then(Score::new)
            .ok_or_else(|| {
                ScoringError("score out of the `0..=100` range".into())
            })?;

        Ok(RiskAssessment {
            score,
            level: Level::of(score),
            shariah_compliant: true,
            notes: vec![
                format!("financing ratio: {}", ratio.round_dp(2)),
                format!(
                    "tenor: {} months",
                    contract.payment_schedule.installment_count,
                ),
            ],
            assessed_at: now.coerce(),
        })
    }
}
