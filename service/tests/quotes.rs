//! End-to-end tests of the `Quote` negotiation protocol.

use std::time::Duration;

use common::{
    operations::{By, Insert, Select},
    DateTime, Handler as _, Money,
};
use service::{
    command,
    domain::{self, quote, user, vehicle, Version},
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
    availability: vehicle::Availability,
) -> vehicle::Id {
    let now = DateTime::now();
    let vehicle = domain::Vehicle {
        id: vehicle::Id::new(),
        provider_id,
        make: vehicle::Make::new("Nissan").unwrap(),
        model: vehicle::Model::new("Patrol").unwrap(),
        year: vehicle::Year::new(2023).unwrap(),
        price: money("250000SAR"),
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

async fn vehicle_by_id(
    svc: &Service<Mem, FixtureScorer>,
    id: vehicle::Id,
) -> domain::Vehicle {
    svc.database()
        .execute(Select(By::<Option<domain::Vehicle>, _>::new(id)))
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn drafts_quote_and_counts_inquiry() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id =
        seed_vehicle(&svc, provider_id, vehicle::Availability::Available)
            .await;

    let q = svc
        .execute(command::RequestQuote {
            customer_id,
            vehicle_id,
            validity: None,
            delivery: None,
        })
        .await
        .unwrap();

    assert_eq!(q.status(DateTime::now()), quote::Status::Draft);
    assert_eq!(q.provider_id, provider_id);
    assert_eq!(q.pricing.total_price, money("250000SAR"));
    assert_eq!(
        q.terms.validity,
        Config::default().default_quote_validity,
    );

    let stored = svc
        .execute(query::quote::ById::by(q.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.vehicle_id, vehicle_id);
    assert_eq!(vehicle_by_id(&svc, vehicle_id).await.inquiry_count, 1);
}

#[tokio::test]
async fn refuses_quoting_unavailable_vehicles() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id =
        seed_vehicle(&svc, provider_id, vehicle::Availability::Sold).await;

    let result = svc
        .execute(command::RequestQuote {
            customer_id,
            vehicle_id,
            validity: None,
            delivery: None,
        })
        .await;

    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::request_quote::ExecutionError::VehicleUnavailable {
            availability: vehicle::Availability::Sold,
            ..
        },
    ));

    assert_eq!(vehicle_by_id(&svc, vehicle_id).await.inquiry_count, 0);
}

#[tokio::test]
async fn accepts_only_after_sending() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id =
        seed_vehicle(&svc, provider_id, vehicle::Availability::Available)
            .await;

    let q = svc
        .execute(command::RequestQuote {
            customer_id,
            vehicle_id,
            validity: None,
            delivery: None,
        })
        .await
        .unwrap();

    let result = svc
        .execute(command::AcceptQuote {
            quote_id: q.id,
            customer_id,
            note: None,
        })
        .await;
    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::accept_quote::ExecutionError::Transition(
            quote::TransitionError {
                from: quote::Status::Draft,
                trigger: quote::Trigger::Accept,
            },
        ),
    ));

    _ = svc
        .execute(command::SendQuote {
            quote_id: q.id,
            provider_id,
        })
        .await
        .unwrap();

    let q = svc
        .execute(command::AcceptQuote {
            quote_id: q.id,
            customer_id,
            note: Some("Deal".to_owned().into()),
        })
        .await
        .unwrap();

    assert_eq!(q.status(DateTime::now()), quote::Status::Accepted);
    assert_eq!(q.messages.len(), 1);
    assert_eq!(q.messages[0].sender_id, customer_id);
}

#[tokio::test]
async fn responding_extends_the_expiration() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id =
        seed_vehicle(&svc, provider_id, vehicle::Availability::Available)
            .await;

    let q = svc
        .execute(command::RequestQuote {
            customer_id,
            vehicle_id,
            validity: Some(Duration::from_secs(60 * 60 * 24)),
            delivery: None,
        })
        .await
        .unwrap();
    let initial_expiry = q.expires_at;

    _ = svc
        .execute(command::SendQuote {
            quote_id: q.id,
            provider_id,
        })
        .await
        .unwrap();

    let q = svc
        .execute(command::RespondToQuote {
            quote_id: q.id,
            responder_id: provider_id,
            message: Some("Revised offer".to_owned().into()),
            pricing: Some(quote::Pricing {
                base_price: money("250000SAR"),
                total_price: money("245000SAR"),
            }),
            validity: Some(Duration::from_secs(60 * 60 * 24 * 14)),
            delivery: None,
        })
        .await
        .unwrap();

    assert_eq!(q.status(DateTime::now()), quote::Status::Responded);
    assert!(q.expires_at > initial_expiry);
    assert_eq!(
        q.response.as_ref().unwrap().pricing.as_ref().unwrap().total_price,
        money("245000SAR"),
    );

    // Responded must pass through Viewed before settling.
    _ = svc
        .execute(command::MarkQuoteViewed {
            quote_id: q.id,
            customer_id,
        })
        .await
        .unwrap();
    let q = svc
        .execute(command::AcceptQuote {
            quote_id: q.id,
            customer_id,
            note: None,
        })
        .await
        .unwrap();
    assert_eq!(q.status(DateTime::now()), quote::Status::Accepted);
}

#[tokio::test]
async fn derives_expiration_from_the_clock() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id =
        seed_vehicle(&svc, provider_id, vehicle::Availability::Available)
            .await;

    let q = svc
        .execute(command::RequestQuote {
            customer_id,
            vehicle_id,
            validity: Some(Duration::ZERO),
            delivery: None,
        })
        .await
        .unwrap();

    let result = svc
        .execute(command::SendQuote {
            quote_id: q.id,
            provider_id,
        })
        .await;

    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::send_quote::ExecutionError::Transition(
            quote::TransitionError {
                from: quote::Status::Expired,
                trigger: quote::Trigger::Send,
            },
        ),
    ));
}

#[tokio::test]
async fn freezes_the_thread_once_settled() {
    let svc = service();
    let customer_id = seed_user(&svc, user::Role::Customer).await;
    let provider_id = seed_user(&svc, user::Role::ServiceProvider).await;
    let vehicle_id =
        seed_vehicle(&svc, provider_id, vehicle::Availability::Available)
            .await;

    let q = svc
        .execute(command::RequestQuote {
            customer_id,
            vehicle_id,
            validity: None,
            delivery: None,
        })
        .await
        .unwrap();

    _ = svc
        .execute(command::AddQuoteMessage {
            quote_id: q.id,
            sender_id: customer_id,
            text: "Is the color configurable?".to_owned().into(),
            attachments: vec![],
        })
        .await
        .unwrap();
    _ = svc
        .execute(command::SendQuote {
            quote_id: q.id,
            provider_id,
        })
        .await
        .unwrap();
    let q = svc
        .execute(command::RejectQuote {
            quote_id: q.id,
            customer_id,
            note: Some("Too expensive".to_owned().into()),
        })
        .await
        .unwrap();

    assert_eq!(q.status(DateTime::now()), quote::Status::Rejected);
    assert_eq!(q.messages.len(), 2);

    let result = svc
        .execute(command::AddQuoteMessage {
            quote_id: q.id,
            sender_id: customer_id,
            text: "Actually, wait".to_owned().into(),
            attachments: vec![],
        })
        .await;
    assert!(matches!(
        result.unwrap_err().as_ref(),
        command::add_quote_message::ExecutionError::Transition(
            quote::TransitionError {
                from: quote::Status::Rejected,
                trigger: quote::Trigger::Message,
            },
        ),
    ));
}
