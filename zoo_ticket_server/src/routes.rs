//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate function or module. Keep this module neat and
//! tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database, gateway, ticketing and SMTP call in here is async
//! for that reason.
use actix_web::{get, http::header::LOCATION, web, HttpResponse, Responder};
use gateway_tools::{CheckoutDetails, PaymentGatewayApi, RedirectForm};
use log::*;
use zoo_ticket_engine::{
    db_types::{OrderStatus, OrderTicketGroup},
    order_objects::{AuthContext, CreateOrderRequest},
    traits::{FulfillmentProvider, OrderManagement, OrderQueryFilter, TicketMailer, TicketOrderDatabase},
    OrderFlowApi,
    OrderQueryApi,
};

use crate::{
    auth::{JwtClaims, UserType},
    config::CheckoutOptions,
    data_objects::{ApiResponse, BankListQuery, CallbackQuery, CheckoutQuery, OrderIdQuery, OrdersQuery},
    errors::{AuthError, ServerError},
};

/// Bank list mode used when the frontend does not ask for one: individual (B2C) banking.
pub const DEFAULT_BANK_LIST_MODE: &str = "01";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(order_ticket_groups => Get "/orderTicketGroups" impl OrderManagement where requires [UserType::Admin, UserType::Customer]);
/// Route handler for the order list.
///
/// Admins see every order and may narrow the list down with the `custId` query parameter. Customers only ever see
/// their own orders; asking for someone else's `custId` is a 403.
pub async fn order_ticket_groups<B: OrderManagement>(
    claims: JwtClaims,
    query: web::Query<OrdersQuery>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = orders_filter(&claims, query.cust_id)?;
    debug!("💻️ GET orders for user #{} ({:?}). Filter: {filter:?}", claims.user_id, claims.user_type);
    let orders = api.fetch_orders(filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(orders)))
}

/// Works out which orders the caller may list.
pub fn orders_filter(claims: &JwtClaims, cust_id: Option<i64>) -> Result<OrderQueryFilter, ServerError> {
    match claims.user_type {
        UserType::Admin => Ok(OrderQueryFilter { cust_id }),
        UserType::Customer => match cust_id {
            Some(id) if id != claims.user_id => {
                info!("💻️ Customer #{} tried to list the orders of customer #{id}", claims.user_id);
                Err(AuthError::InsufficientPermissions("Customers can only view their own orders".into()).into())
            },
            _ => Ok(OrderQueryFilter::for_customer(claims.user_id)),
        },
        UserType::Other => Err(AuthError::InsufficientPermissions("Unknown user type".into()).into()),
    }
}

route!(order_ticket_group => Get "/orderTicketGroup" impl OrderManagement);
/// Route handler for a single order and its line items. This route is public.
pub async fn order_ticket_group<B: OrderManagement>(
    query: web::Query<OrderIdQuery>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = query.order_ticket_group_id.ok_or_else(|| ServerError::MissingField("orderTicketGroupId".into()))?;
    debug!("💻️ GET order ticket group {id}");
    let detail = api
        .fetch_order_detail(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order ticket group {id} does not exist")))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(detail)))
}

route!(create_order => Post "/orderTicketGroup" impl TicketOrderDatabase, FulfillmentProvider, TicketMailer);
/// Route handler for order creation.
///
/// A bearer token is optional. Signed-in customers order under their own account. Everyone else, admins included,
/// orders as a guest and must supply the buyer fields in the request body.
pub async fn create_order<B, F, M>(
    claims: Option<JwtClaims>,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B, F, M>>,
) -> Result<HttpResponse, ServerError>
where
    B: TicketOrderDatabase,
    F: FulfillmentProvider,
    M: TicketMailer,
{
    let request = body.into_inner();
    let auth = match claims {
        Some(c) if c.is_customer() => {
            debug!("💻️ POST order for ticket group {:?} by customer #{}", request.ticket_group_id, c.user_id);
            AuthContext::Authenticated(c.user_id)
        },
        _ => {
            debug!("💻️ POST guest order for ticket group {:?}", request.ticket_group_id);
            AuthContext::Guest(request.buyer_details())
        },
    };
    let response = api.create_order(auth, request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

//----------------------------------------------   Payment  ----------------------------------------------------

route!(payment_return => Get "/return" impl TicketOrderDatabase, FulfillmentProvider, TicketMailer);
/// Route handler for the gateway's return redirect.
///
/// The customer's browser arrives here with the encrypted payment result in the `payload` query parameter. Once the
/// result is processed, the browser is sent on to the frontend's payment result page.
pub async fn payment_return<B, F, M>(
    query: web::Query<CallbackQuery>,
    api: web::Data<OrderFlowApi<B, F, M>>,
) -> Result<HttpResponse, ServerError>
where
    B: TicketOrderDatabase,
    F: FulfillmentProvider,
    M: TicketMailer,
{
    let payload = query.into_inner().payload.filter(|p| !p.trim().is_empty()).ok_or_else(|| {
        info!("💻️ Payment return without a payload");
        ServerError::InvalidCallback
    })?;
    let redirect = api.handle_callback(&payload).await?;
    debug!("💻️ Order [{}] is {}. Redirecting to {}", redirect.order_no, redirect.status, redirect.url);
    Ok(HttpResponse::Found().insert_header((LOCATION, redirect.url)).finish())
}

/// Route handler for the list of banks the customer can pay from.
#[get("/banks")]
pub async fn bank_list(
    query: web::Query<BankListQuery>,
    gateway: web::Data<PaymentGatewayApi>,
) -> Result<HttpResponse, ServerError> {
    let mode = query.into_inner().mode.filter(|m| !m.trim().is_empty());
    let mode = mode.as_deref().unwrap_or(DEFAULT_BANK_LIST_MODE);
    debug!("💻️ GET bank list (mode {mode})");
    let banks = gateway.fetch_bank_list(mode).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(banks)))
}

route!(checkout => Get "/checkout" impl OrderManagement);
/// Route handler for the checkout page.
///
/// Fetches a redirect token from the gateway and returns an HTML page that immediately posts the signed checkout form
/// to the gateway. Only `pending` orders can be paid.
pub async fn checkout<B: OrderManagement>(
    query: web::Query<CheckoutQuery>,
    api: web::Data<OrderQueryApi<B>>,
    gateway: web::Data<PaymentGatewayApi>,
    options: web::Data<CheckoutOptions>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    let id = query.order_ticket_group_id.ok_or_else(|| ServerError::MissingField("orderTicketGroupId".into()))?;
    let order = api
        .fetch_order(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order ticket group {id} does not exist")))?;
    if order.status != OrderStatus::Pending {
        info!("💻️ Checkout requested for order [{}], which is already {}", order.order_no, order.status);
        return Err(ServerError::InvalidValue(format!("Order {} is {} and cannot be paid", order.order_no, order.status)));
    }
    let token = gateway.fetch_redirect_token().await?;
    let details = checkout_details(&order, query.bank_code, query.msg_token);
    let form = RedirectForm::new(gateway.config(), &details, &token, &options.callback_url);
    debug!("💻️ Sending customer to the gateway for order [{}]. Total {}", order.order_no, order.total_amount);
    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(form.to_html()))
}

fn checkout_details(order: &OrderTicketGroup, bank_code: Option<String>, msg_token: Option<String>) -> CheckoutDetails {
    CheckoutDetails {
        buyer_name: order.buyer_name.clone(),
        email: order.email.clone(),
        order_no: order.order_no.to_string(),
        total_amount: order.total_amount,
        product_id: order.ticket_group_id.to_string(),
        product_desc: order.ticket_group_name.clone(),
        bank_code,
        msg_token,
    }
}
