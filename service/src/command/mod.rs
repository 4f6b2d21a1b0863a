//! [`Command`] definition.

pub mod accept_contract_terms;
pub mod accept_quote;
pub mod add_quote_message;
pub mod capital_provider_approve_contract;
pub mod create_contract;
pub mod generate_contract;
pub mod initiate_negotiation;
pub mod mark_quote_viewed;
pub mod reject_quote;
pub mod request_quote;
pub mod respond_to_quote;
pub mod run_risk_analysis;
pub mod scholar_approve_contract;
pub mod send_quote;
pub mod submit_contract_for_review;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_contract_terms::AcceptContractTerms, accept_quote::AcceptQuote,
    add_quote_message::AddQuoteMessage,
    capital_provider_approve_contract::CapitalProviderApproveContract,
    create_contract::CreateContract, generate_contract::GenerateContract,
    initiate_negotiation::InitiateNegotiation,
    mark_quote_viewed::MarkQuoteViewed, reject_quote::RejectQuote,
    request_quote::RequestQuote, respond_to_quote::RespondToQuote,
    run_risk_analysis::RunRiskAnalysis,
    scholar_approve_contract::ScholarApproveContract, send_quote::SendQuote,
    submit_contract_for_review::SubmitContractForReview,
};
