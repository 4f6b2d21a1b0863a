//! `Contract`-related definitions.

use axum::{extract::Path, Extension, Json};
use common::Money;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, contract, finance, user, vehicle},
    query, read, Command as _,
};
use uuid::Uuid;

use crate::{
    api::{self, Application},
    define_error, AsError, Context, Error, Service,
};

define_error! {
    enum ContractError {
        #[code = "CONTRACT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Contract` with the provided ID doesn't exist"]
        NotExists,

        #[code = "INVALID_CONTRACT_STATE"]
        #[status = BAD_REQUEST]
        #[message = "`Contract` status doesn't allow the requested operation"]
        InvalidState,
    }
}

/// Request body for creating a new `Contract`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the `User` supplying the financed `Vehicle`.
    pub provider_id: user::Id,

    /// ID of the financed `Vehicle`.
    pub vehicle_id: vehicle::Id,

    /// Down payment of the `Contract` (e.g. `5000SAR`).
    pub down_payment: String,

    /// Financing tenor in months.
    pub tenor_months: u32,

    /// Murabaha terms of the `Contract`.
    #[serde(default)]
    pub terms: Option<TermsRequest>,
}

/// Murabaha terms of a created `Contract`.
#[derive(Clone, Debug, Deserialize)]
pub struct TermsRequest {
    /// Ownership transfer policy (e.g. `ON_FINAL_PAYMENT`).
    pub ownership_transfer: Option<String>,

    /// Early settlement policy (e.g. `REBATE_ON_REMAINING_PROFIT`).
    pub early_settlement: Option<String>,

    /// Late payment policy (e.g. `CHARITY_DONATION`).
    pub late_payment: Option<String>,

    /// Free-form special conditions.
    pub special_conditions: Option<String>,
}

impl TryFrom<TermsRequest> for contract::Terms {
    type Error = Error;

    fn try_from(terms: TermsRequest) -> Result<Self, Self::Error> {
        let TermsRequest {
            ownership_transfer,
            early_settlement,
            late_payment,
            special_conditions,
        } = terms;
        let defaults = Self::default();

        Ok(Self {
            ownership_transfer: ownership_transfer
                .map(|raw| {
                    raw.parse()
                        .map_err(|_| api::invalid_field("ownership_transfer"))
                })
                .transpose()?
                .unwrap_or(defaults.ownership_transfer),
            early_settlement: early_settlement
                .map(|raw| {
                    raw.parse()
                        .map_err(|_| api::invalid_field("early_settlement"))
                })
                .transpose()?
                .unwrap_or(defaults.early_settlement),
            late_payment: late_payment
                .map(|raw| {
                    raw.parse()
                        .map_err(|_| api::invalid_field("late_payment"))
                })
                .transpose()?
                .unwrap_or(defaults.late_payment),
            special_conditions: special_conditions
                .map(|raw| {
                    contract::terms::Conditions::new(raw).ok_or_else(|| {
                        api::invalid_field("special_conditions")
                    })
                })
                .transpose()?,
        })
    }
}

/// Response body of a successful `Contract` creation.
#[derive(Clone, Debug, Serialize)]
pub struct Created {
    /// Created `Contract`.
    pub contract: Contract,

    /// `Application` tracking the created `Contract`.
    pub application: Application,
}

/// Creates a new financing `Contract` along with its tracking `Application`.
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - a request field is malformed;
/// - `INVALID_FINANCIAL_TERMS` - financial terms cannot be derived from the
///                               provided inputs;
/// - `USER_NOT_EXISTS` - a referenced `User` doesn't exist;
/// - `WRONG_ROLE` - a referenced `User` doesn't have the expected role;
/// - `VEHICLE_NOT_EXISTS` - the referenced `Vehicle` doesn't exist;
/// - `VEHICLE_NOT_OF_PROVIDER` - the referenced `Vehicle` isn't supplied by
///                               the referenced provider.
pub async fn create(
    Extension(service): Extension<Service>,
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<Created>), Error> {
    let CreateRequest {
        provider_id,
        vehicle_id,
        down_payment,
        tenor_months,
        terms,
    } = req;

    let down_payment = down_payment
        .parse::<Money>()
        .map_err(|_| api::invalid_field("down_payment"))?;
    let tenor = finance::Tenor::new(tenor_months)
        .ok_or_else(|| api::invalid_field("tenor_months"))?;
    let terms = terms.map(TryInto::try_into).transpose()?.unwrap_or_default();

    let (contract, application) = service
        .execute(command::CreateContract {
            customer_id: ctx.user_id,
            provider_id,
            vehicle_id,
            down_payment,
            tenor,
            terms,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(Created {
            contract: contract.into(),
            application: application.into(),
        }),
    ))
}

/// Returns the `Contract` with the provided ID.
///
/// Possible error codes:
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or the current
///                           `User` is not a party of it.
pub async fn by_id(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, Error> {
    service
        .execute(query::contract::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .filter(|contract| is_party(contract, ctx.user_id))
        .map(|contract| Json(contract.into()))
        .ok_or_else(|| ContractError::NotExists.into())
}

/// Returns the `Application` tracking the `Contract` with the provided ID.
///
/// Possible error codes:
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or the current
///                           `User` is not a party of it.
pub async fn application(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, Error> {
    let id = contract::Id::from(id);

    _ = service
        .execute(query::contract::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .filter(|contract| is_party(contract, ctx.user_id))
        .ok_or_else(|| Error::from(ContractError::NotExists))?;

    service
        .execute(query::contract::PairedApplication::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|application| Json(application.into()))
        .ok_or_else(|| ContractError::NotExists.into())
}

/// Runs the risk analysis over the `Contract` with the provided ID.
///
/// Possible error codes:
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or isn't owned by
///                           the current `User`;
/// - `CONTRACT_NOT_DRAFT` - the `Contract` already left the drafting stage.
pub async fn analyze(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<RiskAssessment>, Error> {
    service
        .execute(command::RunRiskAnalysis {
            contract_id: id.into(),
            customer_id: ctx.user_id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|assessment| Json(assessment.into()))
}

/// Generates the printable document of the `Contract` with the provided ID.
///
/// Possible error codes:
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or isn't owned by
///                           the current `User`;
/// - `RISK_ASSESSMENT_MISSING` - the risk analysis hasn't been run yet;
/// - `INVALID_CONTRACT_STATE` - the `Contract` status doesn't allow the
///                              generation.
pub async fn generate(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, Error> {
    service
        .execute(command::GenerateContract {
            contract_id: id.into(),
            customer_id: ctx.user_id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|document| Json(document.into()))
}

/// Submits the `Contract` with the provided ID for the Shariah review.
///
/// Possible error codes:
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or isn't owned by
///                           the current `User`;
/// - `INVALID_CONTRACT_STATE` - the `Contract` status doesn't allow the
///                              submission.
pub async fn submit(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, Error> {
    service
        .execute(command::SubmitContractForReview {
            contract_id: id.into(),
            customer_id: ctx.user_id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|contract| Json(contract.into()))
}

/// Request body for approving a `Contract` as a scholar.
#[derive(Clone, Debug, Deserialize)]
pub struct ScholarApprovalRequest {
    /// ID of the capital provider `User` to assign to the `Contract`.
    pub capital_provider_id: user::Id,

    /// Review comments.
    pub comments: Option<String>,
}

/// Approves the `Contract` with the provided ID on behalf of the current
/// scholar `User`, assigning a capital provider to it.
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - a request field is malformed;
/// - `USER_NOT_EXISTS` - a referenced `User` doesn't exist;
/// - `WRONG_ROLE` - a referenced `User` doesn't have the expected role;
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist;
/// - `INVALID_CONTRACT_STATE` - the `Contract` status doesn't allow the
///                              approval.
pub async fn scholar_approve(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<ScholarApprovalRequest>,
) -> Result<Json<Contract>, Error> {
    let ScholarApprovalRequest {
        capital_provider_id,
        comments,
    } = req;

    let comments = comments
        .map(|raw| {
            contract::Comments::new(raw)
                .ok_or_else(|| api::invalid_field("comments"))
        })
        .transpose()?;

    service
        .execute(command::ScholarApproveContract {
            contract_id: id.into(),
            scholar_id: ctx.user_id,
            capital_provider_id,
            comments,
        })
        .await
        .map_err(AsError::into_error)
        .map(|contract| Json(contract.into()))
}

/// Request body for approving a `Contract` as a capital provider.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct FinancialApprovalRequest {
    /// Review comments.
    pub comments: Option<String>,
}

/// Approves the `Contract` with the provided ID on behalf of the current
/// capital provider `User`.
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - a request field is malformed;
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or isn't assigned
///                           to the current `User`;
/// - `INVALID_CONTRACT_STATE` - the `Contract` status doesn't allow the
///                              approval.
pub async fn financial_approve(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<FinancialApprovalRequest>,
) -> Result<Json<Contract>, Error> {
    let FinancialApprovalRequest { comments } = req;

    let comments = comments
        .map(|raw| {
            contract::Comments::new(raw)
                .ok_or_else(|| api::invalid_field("comments"))
        })
        .transpose()?;

    service
        .execute(command::CapitalProviderApproveContract {
            contract_id: id.into(),
            capital_provider_id: ctx.user_id,
            comments,
        })
        .await
        .map_err(AsError::into_error)
        .map(|contract| Json(contract.into()))
}

/// Accepts the final terms of the `Contract` with the provided ID.
///
/// Possible error codes:
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or isn't owned by
///                           the current `User`;
/// - `INVALID_CONTRACT_STATE` - the `Contract` status doesn't allow the
///                              acceptance.
pub async fn accept(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, Error> {
    service
        .execute(command::AcceptContractTerms {
            contract_id: id.into(),
            customer_id: ctx.user_id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|contract| Json(contract.into()))
}

/// Request body for opening a negotiation over a `Contract`.
#[derive(Clone, Debug, Deserialize)]
pub struct NegotiationRequest {
    /// Reason of the negotiation.
    pub reason: String,

    /// Changes proposed by the customer.
    pub proposed_changes: String,
}

/// Opens a negotiation over the terms of the `Contract` with the provided ID.
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - a request field is malformed;
/// - `CONTRACT_NOT_EXISTS` - the `Contract` doesn't exist or isn't owned by
///                           the current `User`;
/// - `INVALID_CONTRACT_STATE` - the `Contract` status doesn't allow the
///                              negotiation.
pub async fn negotiate(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<NegotiationRequest>,
) -> Result<Json<Contract>, Error> {
    let NegotiationRequest {
        reason,
        proposed_changes,
    } = req;

    let reason = contract::Reason::new(reason)
        .ok_or_else(|| api::invalid_field("reason"))?;
    let proposed_changes = contract::ProposedChanges::new(proposed_changes)
        .ok_or_else(|| api::invalid_field("proposed_changes"))?;

    service
        .execute(command::InitiateNegotiation {
            contract_id: id.into(),
            customer_id: ctx.user_id,
            reason,
            proposed_changes,
        })
        .await
        .map_err(AsError::into_error)
        .map(|contract| Json(contract.into()))
}

/// Indicates whether the provided `user_id` belongs to a party of the
/// provided `Contract`.
fn is_party(contract: &domain::Contract, user_id: user::Id) -> bool {
    contract.customer_id == user_id
        || contract.provider_id == user_id
        || contract.capital_provider_id == Some(user_id)
        || contract
            .reviews
            .scholar
            .iter()
            .chain(&contract.reviews.financial)
            .any(|review| review.reviewer_id == user_id)
}

/// A financing `Contract` between a customer and a service provider.
#[derive(Clone, Debug, Serialize)]
pub struct Contract {
    /// Unique identifier of this `Contract`.
    pub id: contract::Id,

    /// Human-readable number of this `Contract`.
    pub number: String,

    /// Current status of this `Contract`.
    pub status: String,

    /// ID of the customer `User`.
    pub customer_id: user::Id,

    /// ID of the service provider `User`.
    pub provider_id: user::Id,

    /// ID of the financed `Vehicle`.
    pub vehicle_id: vehicle::Id,

    /// ID of the assigned capital provider `User`.
    pub capital_provider_id: Option<user::Id>,

    /// Derived financial terms of this `Contract`.
    pub financial_terms: FinancialTerms,

    /// Derived payment schedule of this `Contract`.
    pub payment_schedule: PaymentSchedule,

    /// Murabaha terms of this `Contract`.
    pub terms: Terms,

    /// Risk assessment of this `Contract`, if it has been run.
    pub risk_assessment: Option<RiskAssessment>,

    /// Recorded reviews of this `Contract`.
    pub reviews: Reviews,

    /// Open negotiation over this `Contract`, if any.
    pub negotiation: Option<Negotiation>,

    /// [RFC 3339] timestamp of when this `Contract` was created.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] timestamp of when this `Contract` was last updated.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub updated_at: String,
}

impl From<domain::Contract> for Contract {
    fn from(contract: domain::Contract) -> Self {
        let domain::Contract {
            id,
            number,
            customer_id,
            provider_id,
            vehicle_id,
            capital_provider_id,
            financial_terms,
            payment_schedule,
            terms,
            risk_assessment,
            status,
            reviews,
            negotiation,
            created_at,
            updated_at,
            version: _,
        } = contract;

        Self {
            id,
            number: number.to_string(),
            status: status.to_string(),
            customer_id,
            provider_id,
            vehicle_id,
            capital_provider_id,
            financial_terms: financial_terms.into(),
            payment_schedule: payment_schedule.into(),
            terms: terms.into(),
            risk_assessment: risk_assessment.map(Into::into),
            reviews: reviews.into(),
            negotiation: negotiation.map(Into::into),
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        }
    }
}

/// Derived financial terms of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct FinancialTerms {
    /// Price of the financed `Vehicle`.
    pub purchase_price: String,

    /// Down payment of the `Contract`.
    pub down_payment: String,

    /// Financed amount of the `Contract`.
    pub financing_amount: String,

    /// Profit margin of the `Contract`.
    pub profit_margin: String,

    /// Total amount payable over the `Contract`.
    pub total_amount: String,
}

impl From<contract::FinancialTerms> for FinancialTerms {
    fn from(terms: contract::FinancialTerms) -> Self {
        let contract::FinancialTerms {
            purchase_price,
            down_payment,
            financing_amount,
            profit_margin,
            total_amount,
        } = terms;

        Self {
            purchase_price: purchase_price.to_string(),
            down_payment: down_payment.to_string(),
            financing_amount: financing_amount.to_string(),
            profit_margin: profit_margin.to_string(),
            total_amount: total_amount.to_string(),
        }
    }
}

/// Derived payment schedule of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentSchedule {
    /// Amount of a single installment.
    pub installment_amount: String,

    /// Total number of installments.
    pub installment_count: u32,

    /// Frequency of the installments.
    pub frequency: String,

    /// [RFC 3339] timestamp of the first installment.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub first_payment_at: String,

    /// [RFC 3339] timestamp of the last installment.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub last_payment_at: String,
}

impl From<contract::PaymentSchedule> for PaymentSchedule {
    fn from(schedule: contract::PaymentSchedule) -> Self {
        let contract::PaymentSchedule {
            installment_amount,
            installment_count,
            frequency,
            first_payment_at,
            last_payment_at,
        } = schedule;

        Self {
            installment_amount: installment_amount.to_string(),
            installment_count,
            frequency: frequency.to_string(),
            first_payment_at: first_payment_at.to_rfc3339(),
            last_payment_at: last_payment_at.to_rfc3339(),
        }
    }
}

/// Murabaha terms of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct Terms {
    /// Ownership transfer policy.
    pub ownership_transfer: String,

    /// Early settlement policy.
    pub early_settlement: String,

    /// Late payment policy.
    pub late_payment: String,

    /// Free-form special conditions.
    pub special_conditions: Option<String>,
}

impl From<contract::Terms> for Terms {
    fn from(terms: contract::Terms) -> Self {
        let contract::Terms {
            ownership_transfer,
            early_settlement,
            late_payment,
            special_conditions,
        } = terms;

        Self {
            ownership_transfer: ownership_transfer.to_string(),
            early_settlement: early_settlement.to_string(),
            late_payment: late_payment.to_string(),
            special_conditions: special_conditions.map(|c| c.to_string()),
        }
    }
}

/// Risk assessment of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct RiskAssessment {
    /// Aggregated risk score in the `0..=100` range, higher is safer.
    pub score: u8,

    /// Risk level derived from the score.
    pub level: String,

    /// Indicator whether the `Contract` is Shariah compliant.
    pub shariah_compliant: bool,

    /// Free-form notes of the assessment.
    pub notes: Vec<String>,

    /// [RFC 3339] timestamp of when the assessment was performed.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub assessed_at: String,
}

impl From<domain::RiskAssessment> for RiskAssessment {
    fn from(assessment: domain::RiskAssessment) -> Self {
        let domain::RiskAssessment {
            score,
            level,
            shariah_compliant,
            notes,
            assessed_at,
        } = assessment;

        Self {
            score: score.into(),
            level: level.to_string(),
            shariah_compliant,
            notes,
            assessed_at: assessed_at.to_rfc3339(),
        }
    }
}

/// Recorded reviews of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct Reviews {
    /// Shariah compliance review.
    pub scholar: Option<Review>,

    /// Financial review.
    pub financial: Option<Review>,
}

impl From<contract::Reviews> for Reviews {
    fn from(reviews: contract::Reviews) -> Self {
        let contract::Reviews { scholar, financial } = reviews;

        Self {
            scholar: scholar.map(Into::into),
            financial: financial.map(Into::into),
        }
    }
}

/// A recorded review of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct Review {
    /// ID of the `User` who performed the review.
    pub reviewer_id: user::Id,

    /// Decision of the review.
    pub decision: String,

    /// Comments of the review.
    pub comments: Option<String>,

    /// [RFC 3339] timestamp of when the review was performed.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub reviewed_at: String,
}

impl From<contract::Review> for Review {
    fn from(review: contract::Review) -> Self {
        let contract::Review {
            reviewer_id,
            decision,
            comments,
            reviewed_at,
        } = review;

        Self {
            reviewer_id,
            decision: decision.to_string(),
            comments: comments.map(|c| c.to_string()),
            reviewed_at: reviewed_at.to_rfc3339(),
        }
    }
}

/// An open negotiation over a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct Negotiation {
    /// Reason of the negotiation.
    pub reason: String,

    /// Changes proposed by the customer.
    pub proposed_changes: String,

    /// [RFC 3339] timestamp of when the negotiation was opened.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub opened_at: String,
}

impl From<contract::Negotiation> for Negotiation {
    fn from(negotiation: contract::Negotiation) -> Self {
        let contract::Negotiation {
            reason,
            proposed_changes,
            opened_at,
        } = negotiation;

        Self {
            reason: reason.to_string(),
            proposed_changes: proposed_changes.to_string(),
            opened_at: opened_at.to_rfc3339(),
        }
    }
}

/// Printable document of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct Document {
    /// `Contract` the document was generated for.
    pub contract: Contract,

    /// Summary of the financed `Vehicle`.
    pub vehicle: VehicleSummary,

    /// [RFC 3339] timestamp of when the document was generated.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub generated_at: String,
}

impl From<read::contract::Document> for Document {
    fn from(document: read::contract::Document) -> Self {
        let read::contract::Document {
            contract,
            vehicle,
            generated_at,
        } = document;

        Self {
            contract: contract.into(),
            vehicle: vehicle.into(),
            generated_at: generated_at.to_rfc3339(),
        }
    }
}

/// Summary of a financed `Vehicle`.
#[derive(Clone, Debug, Serialize)]
pub struct VehicleSummary {
    /// Make of the `Vehicle`.
    pub make: String,

    /// Model of the `Vehicle`.
    pub model: String,

    /// Production year of the `Vehicle`.
    pub year: u16,

    /// Price of the `Vehicle`.
    pub price: String,
}

impl From<read::contract::VehicleSummary> for VehicleSummary {
    fn from(summary: read::contract::VehicleSummary) -> Self {
        let read::contract::VehicleSummary {
            make,
            model,
            year,
            price,
        } = summary;

        Self {
            make: make.to_string(),
            model: model.to_string(),
            year: year.into(),
            price: price.to_string(),
        }
    }
}

impl AsError for command::create_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_FINANCIAL_TERMS"]
                #[status = BAD_REQUEST]
                #[message = "Financial terms cannot be derived from the \
                             provided inputs"]
                InvalidTerms,

                #[code = "USER_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't exist"]
                UserNotExists,

                #[code = "WRONG_ROLE"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't have the expected \
                             role"]
                WrongRole,

                #[code = "VEHICLE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Vehicle` with the provided ID doesn't exist"]
                VehicleNotExists,

                #[code = "VEHICLE_NOT_OF_PROVIDER"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `Vehicle` isn't supplied by the \
                             referenced provider"]
                VehicleNotOfProvider,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidTerms(_) => Some(Error::InvalidTerms.into()),
            Self::UserNotExists(_) => Some(Error::UserNotExists.into()),
            Self::WrongRole { .. } => Some(Error::WrongRole.into()),
            Self::VehicleNotExists(_) => Some(Error::VehicleNotExists.into()),
            Self::VehicleNotOfProvider { .. } => {
                Some(Error::VehicleNotOfProvider.into())
            }
        }
    }
}

impl AsError for command::run_risk_analysis::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CONTRACT_NOT_DRAFT"]
                #[status = BAD_REQUEST]
                #[message = "`Contract` already left the drafting stage"]
                NotDraft,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ContractNotExists(_) => Some(ContractError::NotExists.into()),
            Self::ContractNotDraft { .. } => Some(Error::NotDraft.into()),
            Self::Scoring(_) => None,
        }
    }
}

impl AsError for command::generate_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RISK_ASSESSMENT_MISSING"]
                #[status = BAD_REQUEST]
                #[message = "Risk analysis hasn't been run over the \
                             `Contract` yet"]
                AssessmentMissing,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ContractNotExists(_) => Some(ContractError::NotExists.into()),
            Self::RiskAssessmentMissing(_) => {
                Some(Error::AssessmentMissing.into())
            }
            Self::VehicleNotExists(_) => None,
            Self::Transition(_) => Some(ContractError::InvalidState.into()),
        }
    }
}

impl AsError for command::submit_contract_for_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ContractNotExists(_) => Some(ContractError::NotExists.into()),
            Self::ApplicationNotExists(_) => None,
            Self::Transition(_) | Self::PhaseRegression(_) => {
                Some(ContractError::InvalidState.into())
            }
        }
    }
}

impl AsError for command::scholar_approve_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't exist"]
                UserNotExists,

                #[code = "WRONG_ROLE"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't have the expected \
                             role"]
                WrongRole,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(Error::UserNotExists.into()),
            Self::WrongRole { .. } => Some(Error::WrongRole.into()),
            Self::ContractNotExists(_) => Some(ContractError::NotExists.into()),
            Self::ApplicationNotExists(_) => None,
            Self::Transition(_) | Self::PhaseRegression(_) => {
                Some(ContractError::InvalidState.into())
            }
        }
    }
}

impl AsError for command::capital_provider_approve_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ContractNotExists(_) => Some(ContractError::NotExists.into()),
            Self::ApplicationNotExists(_) => None,
            Self::Transition(_) | Self::PhaseRegression(_) => {
                Some(ContractError::InvalidState.into())
            }
        }
    }
}

impl AsError for command::accept_contract_terms::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ContractNotExists(_) => Some(ContractError::NotExists.into()),
            Self::Transition(_) => Some(ContractError::InvalidState.into()),
        }
    }
}

impl AsError for command::initiate_negotiation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ContractNotExists(_) => Some(ContractError::NotExists.into()),
            Self::Transition(_) => Some(ContractError::InvalidState.into()),
        }
    }
}
