//! Financial and contractual terms of a [`Contract`].

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, DateTimeOf, Money};
use derive_more::{AsRef, Display};

#[cfg(doc)]
use super::Status;
use super::Contract;

/// Murabaha financial terms of a [`Contract`].
///
/// All amounts share one currency. Derived amounts are exact; only the
/// installment amount of the [`PaymentSchedule`] is rounded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FinancialTerms {
    /// Purchase price of the financed vehicle.
    pub purchase_price: Money,

    /// Down payment made by the customer.
    pub down_payment: Money,

    /// Financed amount: purchase price minus down payment.
    pub financing_amount: Money,

    /// Profit margin applied to the financed amount.
    pub profit_margin: Money,

    /// Total amount owed: financed amount plus profit margin.
    pub total_amount: Money,
}

/// Installment schedule of a [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PaymentSchedule {
    /// Amount of a single installment, rounded to 2 decimal places with
    /// banker's rounding.
    pub installment_amount: Money,

    /// Number of installments.
    pub installment_count: u32,

    /// [`Frequency`] of the installments.
    pub frequency: Frequency,

    /// [`DateTime`] of the first installment.
    pub first_payment_at: PaymentDateTime,

    /// [`DateTime`] of the last installment.
    pub last_payment_at: PaymentDateTime,
}

define_kind! {
    #[doc = "Frequency of [`PaymentSchedule`] installments."]
    enum Frequency {
        #[doc = "One installment per calendar month."]
        Monthly = 1,
    }
}

/// Contractual terms of a [`Contract`].
#[derive(Clone, Debug)]
pub struct Terms {
    /// [`OwnershipTransfer`] policy.
    pub ownership_transfer: OwnershipTransfer,

    /// [`EarlySettlement`] rule.
    pub early_settlement: EarlySettlement,

    /// [`LatePayment`] rule.
    pub late_payment: LatePayment,

    /// Free-form special [`Conditions`] requested by the customer.
    pub special_conditions: Option<Conditions>,
}

impl Default for Terms {
    fn default() -> Self {
        Self {
            ownership_transfer: OwnershipTransfer::OnFinalPayment,
            early_settlement: EarlySettlement::RebateOnRemainingProfit,
            late_payment: LatePayment::CharityDonation,
            special_conditions: None,
        }
    }
}

define_kind! {
    #[doc = "Policy of transferring vehicle ownership to the customer."]
    enum OwnershipTransfer {
        #[doc = "Ownership transfers upon the final installment."]
        OnFinalPayment = 1,

        #[doc = "Ownership transfers immediately upon acceptance."]
        Immediate = 2,
    }
}

define_kind! {
    #[doc = "Rule applied when the customer settles early."]
    enum EarlySettlement {
        #[doc = "Remaining profit margin is rebated."]
        RebateOnRemainingProfit = 1,

        #[doc = "No rebate of the remaining profit margin."]
        NoRebate = 2,
    }
}

define_kind! {
    #[doc = "Rule applied to late installments."]
    enum LatePayment {
        #[doc = "A late fee is collected and donated to charity."]
        CharityDonation = 1,

        #[doc = "No penalty is applied."]
        NoPenalty = 2,
    }
}

/// Free-form special conditions of [`Terms`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Conditions(String);

impl Conditions {
    /// Creates a new [`Conditions`] if the given `conditions` are valid.
    #[must_use]
    pub fn new(conditions: impl Into<String>) -> Option<Self> {
        let conditions = conditions.into();
        Self::check(&conditions).then_some(Self(conditions))
    }

    /// Checks whether the given `conditions` are valid [`Conditions`].
    fn check(conditions: impl AsRef<str>) -> bool {
        let conditions = conditions.as_ref();
        conditions.trim() == conditions
            && !conditions.is_empty()
            && conditions.len() <= 4096
    }
}

impl FromStr for Conditions {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Conditions`")
    }
}

/// Marker type indicating a [`Contract`] installment payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// [`DateTime`] of a [`Contract`] installment payment.
pub type PaymentDateTime = DateTimeOf<(Contract, Payment)>;
