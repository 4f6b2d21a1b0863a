//! End-to-end tests of the financing `Contract` approval workflow.

use common::{operations::Insert, DateTime, Handler as _, Money};
use service::{
    command,
    domain::{self, application, contract, finance, user, vehicle, Version},
    infra::{FixtureScorer, Mem},
    query, Config, Service,
};

fn service() -> Service<Mem, FixtureScorer> {
    Service::new(Config::default(), Mem::new(), FixtureScorer::default())
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

async fn seed_user(
    svc: &Service<Mem, FixtureScorer>,
    role: user::Role,
) -> user::Id {
    let user = domain::User {
        id: user::Id::new(),
        name: user::Name::new("Seeded User").unwrap(),
        role,
        created_at: DateTime::now().coerce(),
    };
    let id = user.id;
    svc.database().execute(Insert(user)).await.unwrap();
    id
}

async fn seed_vehicle(
    svc: &Service<Mem, FixtureScorer>,
    provider_id: user::Id,
    price: &str,
    availability: vehicle::Availability,
) -> vehicle::Id {
    let now = DateTime::now();
    let vehicle = domain::Vehicle {
        id: vehicle::Id::new(),
        provider_id,
        make: vehicle::Make::new("Toyota").unwrap(),
        model: vehicle::Model::new("Camry").unwrap(),
        year: vehicle::Year::new(2024).unwrap(),
        price: money(price),
        availability,
        inquiry_count: 0,
        created_at: now.coerce(),
        updated_at: now.coerce(),
        version: Version::initial(),
    };
    let id = vehicle.id;
    svc.database().execute(Insert(vehicle)).await.unwrap();
    id
}

/// Creates a Draft `Contract` over a `85000SAR` vehicle with a `5000SAR`
/// down payment and a 12 months tenor.
async fn draft_contract(
    svc: &Service<Mem, FixtureScorer>,
) -> (contract::Id, user::Id) {
    let customer_id = seed_user(svc, user::Role::Customer).await;
    let provider_id = seed_user(svc, user::Role::ServiceProvider).await;
    let vehicle_id = seed_vehicle(
        svc,
        provider_id,
        "85000SAR",
        vehicle::Availability::Available,
    )
    .await;

    let (contract, _) = svc
        .execute(command::CreateContract {
            customer_id,
            provider_id,
            vehicle_id,
            down_payment: money("5000SAR"),
            tenor: finance::Tenor::new(12).unwrap(),
            terms: contract::Terms::default(),
        })
        .await
        .unwrap();

    (contract.id, customer_id)
}

#[tokio::test]
async fn creates_contract_with_derived_terms() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id = seed_vehicle(
        &svc,
        provider_id,
        "85000SAR",
        vehicle::Availability::Available,
    )
    .await;

    let (contract, application) = svc
        .execute(command::CreateContract {
            customer_id,
            provider_id,
            vehicle_id,
            down_payment: money("5000SAR"),
            tenor: finance::Tenor::new(12).unwrap(),
            terms: contract::Terms::default(),
        })
        .await
        .unwrap();

    assert_eq!(contract.status, contract::Status::Draft);
    assert_eq!(contract.number.to_string(), "CTR-000001");
    assert_eq!(
        contract.financial_terms.financing_amount,
        money("80000SAR"),
    );
    assert_eq!(contract.financial_terms.profit_margin, money("8000SAR"));
    assert_eq!(contract.financial_terms.total_amount, money("88000SAR"));
    assert_eq!(
        contract.payment_schedule.installment_amount,
        money("7333.33SAR"),
    );
    assert_eq!(contract.payment_schedule.installment_count, 12);

    assert_eq!(application.contract_id, Some(contract.id));
    assert_eq!(
        application.phases.scholar,
        application::PhaseStatus::Queued,
    );
    assert_eq!(
        application.phases.finance,
        application::PhaseStatus::Queued,
    );
    assert!(application.notifications.is_empty());
}

#[tokio::test]
async fn rejects_down_payment_exceeding_price() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id = seed_vehicle(
        &svc,
        provider_id,
        "85000SAR",
        vehicle::Availability::Available,
    )
    .await;

    let result = svc
        .execute(command::CreateContract {
            customer_id,
            provider_id,
            vehicle_id,
            down_payment: money("90000SAR"),
            tenor: finance::Tenor::new(12).unwrap(),
            terms: contract::Terms::default(),
        })
        .await;

    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::create_contract::ExecutionError::InvalidTerms(
            finance::CalculationError::DownPaymentExceedsPrice { .. },
        ),
    ));
}

#[tokio::test]
async fn walks_the_full_approval_path() {
    let svc = service();
    let (contract_id, customer_id) = draft_contract(&svc).await;
    let scholar_id = seed_user(&svc, user::Role::Scholar).await;
    let capital_provider_id =
        seed_user(&svc, user::Role::CapitalProvider).await;

    let assessment = svc
        .execute(command::RunRiskAnalysis {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    assert!(assessment.shariah_compliant);

    let document = svc
        .execute(command::GenerateContract {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    assert_eq!(
        document.contract.status,
        contract::Status::PendingApproval,
    );
    assert_eq!(document.vehicle.price, money("85000SAR"));

    let contract = svc
        .execute(command::SubmitContractForReview {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    assert_eq!(contract.status, contract::Status::ScholarReview);

    let contract = svc
        .execute(command::ScholarApproveContract {
            contract_id,
            scholar_id,
            capital_provider_id,
            comments: contract::Comments::new("Shariah compliant"),
        })
        .await
        .unwrap();
    assert_eq!(contract.status, contract::Status::FinancialReview);
    assert_eq!(contract.capital_provider_id, Some(capital_provider_id));
    assert!(contract.reviews.scholar.is_some());

    let contract = svc
        .execute(command::CapitalProviderApproveContract {
            contract_id,
            capital_provider_id,
            comments: None,
        })
        .await
        .unwrap();
    assert_eq!(contract.status, contract::Status::Approved);
    assert!(contract.reviews.financial.is_some());

    let contract = svc
        .execute(command::AcceptContractTerms {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    assert_eq!(contract.status, contract::Status::Accepted);

    let application = svc
        .execute(query::contract::PairedApplication::by(contract_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        application.phases.scholar,
        application::PhaseStatus::Approved,
    );
    assert_eq!(
        application.phases.finance,
        application::PhaseStatus::Approved,
    );
    assert_eq!(
        application.phases.partners,
        application::PhaseStatus::Approved,
    );
    assert_eq!(application.notifications.len(), 5);
    assert!(application.notifications.iter().all(|n| !n.read));
}

#[tokio::test]
async fn refuses_generation_without_risk_assessment() {
    let svc = service();
    let (contract_id, customer_id) = draft_contract(&svc).await;

    let result = svc
        .execute(command::GenerateContract {
            contract_id,
            customer_id,
        })
        .await;

    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::generate_contract::ExecutionError::RiskAssessmentMissing(_),
    ));
}

#[tokio::test]
async fn reruns_risk_analysis_while_drafted() {
    let svc = service();
    let (contract_id, customer_id) = draft_contract(&svc).await;

    let first = svc
        .execute(command::RunRiskAnalysis {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    let second = svc
        .execute(command::RunRiskAnalysis {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();

    assert_eq!(first.score, second.score);
}

#[tokio::test]
async fn refuses_approval_before_submission() {
    let svc = service();
    let (contract_id, customer_id) = draft_contract(&svc).await;
    let scholar_id = seed_user(&svc, user::Role::Scholar).await;
    let capital_provider_id =
        seed_user(&svc, user::Role::CapitalProvider).await;

    _ = svc
        .execute(command::RunRiskAnalysis {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::GenerateContract {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();

    let result = svc
        .execute(command::ScholarApproveContract {
            contract_id,
            scholar_id,
            capital_provider_id,
            comments: None,
        })
        .await;

    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::scholar_approve_contract::ExecutionError::Transition(
            contract::TransitionError {
                from: contract::Status::PendingApproval,
                ..
            },
        ),
    ));

    let contract = svc
        .execute(query::contract::ById::by(contract_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contract.status, contract::Status::PendingApproval);
}

#[tokio::test]
async fn hides_contracts_from_non_owners() {
    let svc = service();
    let (contract_id, _) = draft_contract(&svc).await;
    let stranger_id = seed_user(&svc, user::Role::Customer).await;

    let result = svc
        .execute(command::RunRiskAnalysis {
            contract_id,
            customer_id: stranger_id,
        })
        .await;

    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::run_risk_analysis::ExecutionError::ContractNotExists(_),
    ));
}

#[tokio::test]
async fn racing_approvals_settle_into_one_success() {
    let svc = service();
    let (contract_id, customer_id) = draft_contract(&svc).await;
    let scholar_id = seed_user(&svc, user::Role::Scholar).await;
    let capital_provider_id =
        seed_user(&svc, user::Role::CapitalProvider).await;

    _ = svc
        .execute(command::RunRiskAnalysis {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::GenerateContract {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::SubmitContractForReview {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();

    let approve = command::ScholarApproveContract {
        contract_id,
        scholar_id,
        capital_provider_id,
        comments: None,
    };
    let (first, second) =
        tokio::join!(svc.execute(approve.clone()), svc.execute(approve));

    assert!(
        first.is_ok() ^ second.is_ok(),
        "exactly one of two racing approvals must succeed",
    );

    let contract = svc
        .execute(query::contract::ById::by(contract_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contract.status, contract::Status::FinancialReview);
}

#[tokio::test]
async fn opens_negotiation_instead_of_acceptance() {
    let svc = service();
    let (contract_id, customer_id) = draft_contract(&svc).await;
    let scholar_id = seed_user(&svc, user::Role::Scholar).await;
    let capital_provider_id =
        seed_user(&svc, user::Role::CapitalProvider).await;

    _ = svc
        .execute(command::RunRiskAnalysis {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::GenerateContract {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::SubmitContractForReview {
            contract_id,
            customer_id,
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::ScholarApproveContract {
            contract_id,
            scholar_id,
            capital_provider_id,
            comments: None,
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::CapitalProviderApproveContract {
            contract_id,
            capital_provider_id,
            comments: None,
        })
        .await
        .unwrap();

    let contract = svc
        .execute(command::InitiateNegotiation {
            contract_id,
            customer_id,
            reason: contract::Reason::new("Installment too high").unwrap(),
            proposed_changes: contract::ProposedChanges::new(
                "Extend the tenor to 24 months",
            )
            .unwrap(),
        })
        .await
        .unwrap();

    assert_eq!(contract.status, contract::Status::Negotiation);
    assert!(contract.negotiation.is_some());

    let result = svc
        .execute(command::AcceptContractTerms {
            contract_id,
            customer_id,
        })
        .await;
    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::accept_contract_terms::ExecutionError::Transition(_),
    ));
}
