use std::{
    future::IntoFuture as _,
    io,
    sync::OnceLock,
    time,
};

use application::{api, Args, Config, Service};
use axum::{extract::MatchedPath, Extension};
use common::{operations::Insert, DateTime, Handler as _, Percent};
use service::{
    domain::{self, user, vehicle},
    infra::{FixtureScorer, Mem},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        server,
        service,
        seed,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let profit_rate = Percent::new(service.profit_rate).ok_or_else(|| {
        log::error!(
            "`{}` is not a valid profit rate percentage",
            service.profit_rate,
        );
    })?;

    let service = Service::new(
        service::Config {
            profit_rate,
            first_payment_delay: service.first_payment_delay,
            default_quote_validity: service.default_quote_validity,
        },
        Mem::new(),
        FixtureScorer::default(),
    );

    seed_database(&service, seed).await?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::HeaderName::from_static("x-user-id"),
        ]);
    for origin in server.cors.origins {
        cors = cors.allow_origin(
            origin.parse::<http::header::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not a correct CORS origin: {e}");
            })?,
        );
    }

    let app = api::router()
        .layer(Extension(service))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    tracing::info_span!(
                        "HTTP request",
                        http.flavor = ?r.version(),
                        http.host = r.uri().host(),
                        http.method = r.method().as_str(),
                        http.route = r
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str),
                        http.scheme = r
                            .uri()
                            .scheme()
                            .map(http::uri::Scheme::as_str),
                        http.target = r
                            .uri()
                            .path_and_query()
                            .map(http::uri::PathAndQuery::as_str),
                        http.user_agent = r
                            .headers()
                            .get("User-Agent")
                            .and_then(|h| h.to_str().ok()),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |r: &http::Response<_>,
                     dur: time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(r.status().as_u16()),
                        );

                        if r.status().is_server_error()
                            || r.status().is_client_error()
                        {
                            tracing::error!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        } else {
                            tracing::info!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        }
                    },
                ),
        );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .into_future()
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Seeds the in-memory database of the provided [`Service`] with the
/// configured dataset.
async fn seed_database(
    service: &Service,
    seed: application::config::Seed,
) -> Result<(), ()> {
    let now = DateTime::now();

    for user in seed.users {
        let id = user::Id::from(user.id);
        let name = user::Name::new(&*user.name).ok_or_else(|| {
            log::error!("`{}` is not a valid `User` name", user.name);
        })?;
        let role = user.role.parse::<user::Role>().map_err(|e| {
            log::error!("`{}` is not a valid `User` role: {e}", user.role);
        })?;

        service
            .database()
            .execute(Insert(domain::User {
                id,
                name,
                role,
                created_at: now.coerce(),
            }))
            .await
            .map_err(|e| {
                log::error!("failed to seed `User(id: {id})`: {e}");
            })?;
    }

    for vehicle in seed.vehicles {
        let id = vehicle::Id::from(vehicle.id);
        let make = vehicle::Make::new(&*vehicle.make).ok_or_else(|| {
            log::error!("`{}` is not a valid `Vehicle` make", vehicle.make);
        })?;
        let model = vehicle::Model::new(&*vehicle.model).ok_or_else(|| {
            log::error!("`{}` is not a valid `Vehicle` model", vehicle.model);
        })?;
        let year = vehicle::Year::new(vehicle.year).ok_or_else(|| {
            log::error!("`{}` is not a valid `Vehicle` year", vehicle.year);
        })?;
        let price = vehicle.price.parse().map_err(|e| {
            log::error!(
                "`{}` is not a valid `Vehicle` price: {e}",
                vehicle.price,
            );
        })?;

        service
            .database()
            .execute(Insert(domain::Vehicle {
                id,
                provider_id: vehicle.provider_id.into(),
                make,
                model,
                year,
                price,
                availability: vehicle::Availability::Available,
                inquiry_count: 0,
                created_at: now.coerce(),
                updated_at: now.coerce(),
                version: domain::Version::initial(),
            }))
            .await
            .map_err(|e| {
                log::error!("failed to seed `Vehicle(id: {id})`: {e}");
            })?;
    }

    Ok(())
}
