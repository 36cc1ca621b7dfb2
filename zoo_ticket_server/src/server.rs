use std::time::Duration;

use actix_web::{
    dev::Server,
    web::{JsonConfig, QueryConfig},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use gateway_tools::PaymentGatewayApi;
use log::*;
use zoo_ticket_engine::{
    traits::{FulfillmentProvider, TicketMailer, TicketOrderDatabase},
    OrderFlowApi,
    OrderQueryApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    integrations::ticketing::TicketingApi,
    mailer::SmtpTicketMailer,
    middleware::JwtMiddlewareFactory,
    routes::{
        bank_list,
        health,
        CheckoutRoute,
        CreateOrderRoute,
        OrderTicketGroupRoute,
        OrderTicketGroupsRoute,
        PaymentReturnRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    info!("🚀️ Database ready at {}", config.database_url);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let ticketing = TicketingApi::new(config.ticketing.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mailer = SmtpTicketMailer::new(&config.smtp).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway =
        PaymentGatewayApi::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let verifier = TokenVerifier::new(&config.auth);
    let flow_config = config.flow_config();
    let codec = config.envelope_codec();
    let checkout_options = config.checkout_options();
    let srv = HttpServer::new(move || {
        let order_flow_api =
            OrderFlowApi::new(db.clone(), ticketing.clone(), mailer.clone(), codec.clone(), flow_config.clone());
        let order_query_api = OrderQueryApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ztg::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(order_query_api))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(checkout_options.clone()))
            .configure(|cfg| configure_api::<SqliteDatabase, TicketingApi, SmtpTicketMailer>(cfg, verifier.clone()))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers every route. The caller supplies the `OrderFlowApi<B, F, M>`, `OrderQueryApi<B>`, `PaymentGatewayApi`
/// and `CheckoutOptions` app data.
pub fn configure_api<B, F, M>(cfg: &mut web::ServiceConfig, verifier: TokenVerifier)
where
    B: TicketOrderDatabase + 'static,
    F: FulfillmentProvider + 'static,
    M: TicketMailer + 'static,
{
    let json_config = JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejected a request body. {err}");
        ServerError::MalformedRequest(err.to_string()).into()
    });
    let query_config = QueryConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejected a query string. {err}");
        ServerError::MalformedRequest(err.to_string()).into()
    });
    // Routes under /api see the caller's claims, when a bearer token is given
    let api_scope = web::scope("/api")
        .wrap(JwtMiddlewareFactory::new(verifier))
        .service(OrderTicketGroupsRoute::<B>::new())
        .service(OrderTicketGroupRoute::<B>::new())
        .service(CreateOrderRoute::<B, F, M>::new());
    let payment_scope = web::scope("/payment")
        .service(PaymentReturnRoute::<B, F, M>::new())
        .service(bank_list)
        .service(CheckoutRoute::<B>::new());
    cfg.app_data(json_config).app_data(query_config).service(health).service(api_scope).service(payment_scope);
}
