use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewCustomer, NewOrder, NewOrderItem, OrderStatus, OrderTicketGroup, StatusUpdate, StatusUpdateResult},
    helpers::{EnvelopeCodec, PaymentEnvelope, StatusCodeMap},
    ticket_api::{
        errors::OrderFlowError,
        order_objects::{AuthContext, CreateOrderRequest, CreateOrderResponse, PaymentRedirect, ValidOrderRequest},
    },
    traits::{FulfillmentProvider, ItemSummary, TicketEmail, TicketMailer, TicketOrderDatabase},
};

#[derive(Debug, Clone)]
pub struct OrderFlowConfig {
    /// Base URL of the customer-facing frontend. Checkout and payment-result redirects are relative to it.
    pub frontend_base_url: String,
    pub status_codes: StatusCodeMap,
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        Self { frontend_base_url: "http://localhost:3000".to_string(), status_codes: StatusCodeMap::default() }
    }
}

/// `OrderFlowApi` is the order service. It creates orders and processes the gateway's payment callbacks, chaining
/// fulfillment and the ticket email onto a successful payment.
///
/// It is the only component that changes order state.
pub struct OrderFlowApi<B, F, M> {
    db: B,
    fulfillment: F,
    mailer: M,
    codec: EnvelopeCodec,
    config: OrderFlowConfig,
}

impl<B, F, M> Debug for OrderFlowApi<B, F, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({})", self.config.frontend_base_url)
    }
}

impl<B, F, M> OrderFlowApi<B, F, M> {
    pub fn new(db: B, fulfillment: F, mailer: M, codec: EnvelopeCodec, config: OrderFlowConfig) -> Self {
        Self { db, fulfillment, mailer, codec, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    fn frontend_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.frontend_base_url.trim_end_matches('/'))
    }

    /// `<frontend>/checkout.html?orderID=<id>&paymentType=<paymentType>`
    pub fn checkout_url(&self, order_id: i64, payment_type: &str) -> String {
        let payment_type = urlencoding::encode(payment_type);
        self.frontend_url(&format!("/checkout.html?orderID={order_id}&paymentType={payment_type}"))
    }

    /// `<frontend>/paymentRedirect?orderTicketGroupId=<id>&transactionStatus=<status>&orderNo=<orderNo>`
    pub fn payment_redirect(&self, order: &OrderTicketGroup) -> PaymentRedirect {
        let id = order.id.to_string();
        let status = order.status.to_string();
        let url = self.frontend_url(&format!(
            "/paymentRedirect?orderTicketGroupId={}&transactionStatus={}&orderNo={}",
            urlencoding::encode(&id),
            urlencoding::encode(&status),
            urlencoding::encode(order.order_no.as_str())
        ));
        PaymentRedirect { order_id: order.id, order_no: order.order_no.clone(), status: order.status, url }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn status_update(status: OrderStatus, envelope: &PaymentEnvelope) -> StatusUpdate {
    StatusUpdate {
        status: Some(status),
        transaction_id: non_empty(&envelope.transaction_id),
        transaction_date: non_empty(&envelope.transaction_date),
        bank_code: non_empty(&envelope.bank_code),
        bank_name: non_empty(&envelope.bank_name),
        status_message: non_empty(&envelope.status_message),
    }
}

impl<B, F, M> OrderFlowApi<B, F, M>
where
    B: TicketOrderDatabase,
    F: FulfillmentProvider,
    M: TicketMailer,
{
    /// Validates and stores a new `pending` order, and returns the frontend checkout URL for it.
    ///
    /// Signed-in customers are resolved from the customer store; their stored email, name and contact number take
    /// precedence over anything in the request. Guests must supply all buyer fields and are registered as customers on
    /// their first order.
    pub async fn create_order(
        &self,
        auth: AuthContext,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, OrderFlowError> {
        let valid = request.validate()?;
        let (cust_id, buyer) = match auth {
            AuthContext::Authenticated(cust_id) => {
                let customer = self
                    .db
                    .fetch_customer(cust_id)
                    .await?
                    .ok_or_else(|| OrderFlowError::CustomerLookupFailed(format!("customer {cust_id} does not exist")))?;
                let identification_no = request
                    .identification_no
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .unwrap_or_else(|| customer.identification_no.clone());
                let buyer = NewCustomer {
                    email: customer.email,
                    full_name: customer.full_name,
                    identification_no,
                    contact_no: customer.contact_no,
                };
                (cust_id, buyer)
            },
            AuthContext::Guest(details) => {
                let details = details.validate()?;
                let buyer = NewCustomer {
                    email: details.email,
                    full_name: details.full_name,
                    identification_no: details.identification_no,
                    contact_no: details.contact_no,
                };
                let customer = self.db.fetch_or_create_customer(buyer.clone()).await?;
                debug!("🔄️ Guest order for {} resolved to customer #{}", customer.email, customer.id);
                (customer.id, NewCustomer { email: customer.email, ..buyer })
            },
        };
        let order = self.price_order(cust_id, buyer, valid).await?;
        let saved =
            self.db.create_order(order).await.map_err(|e| OrderFlowError::OrderPersistenceFailed(e.to_string()))?;
        info!(
            "🔄️ Order [{}] created with id {} for customer #{cust_id}. Total {}",
            saved.order_no, saved.id, saved.total_amount
        );
        let redirect_url = self.checkout_url(saved.id, &saved.payment_type);
        Ok(CreateOrderResponse { redirect_url, order_id: saved.id })
    }

    /// Looks up the ticket group and prices every line from the catalog.
    async fn price_order(
        &self,
        cust_id: i64,
        buyer: NewCustomer,
        request: ValidOrderRequest,
    ) -> Result<NewOrder, OrderFlowError> {
        let group = self.db.fetch_ticket_group(request.ticket_group_id).await?.ok_or_else(|| {
            OrderFlowError::InvalidValue(format!("ticket group {} does not exist", request.ticket_group_id))
        })?;
        let items = request
            .items
            .iter()
            .map(|item| {
                let variant = group.variant(item.ticket_variant_id).ok_or_else(|| {
                    OrderFlowError::InvalidValue(format!(
                        "ticket variant {} does not belong to ticket group {}",
                        item.ticket_variant_id, group.id
                    ))
                })?;
                Ok(NewOrderItem {
                    ticket_variant_id: variant.id,
                    variant_name: variant.name.clone(),
                    quantity: item.quantity,
                    entry_date: item.entry_date,
                    unit_price: variant.unit_price,
                })
            })
            .collect::<Result<Vec<_>, OrderFlowError>>()?;
        let order = NewOrder {
            cust_id,
            ticket_group_id: group.id,
            ticket_group_name: group.name,
            buyer_name: buyer.full_name,
            email: buyer.email,
            identification_no: buyer.identification_no,
            contact_no: buyer.contact_no,
            payment_method: request.payment_method,
            payment_type: request.payment_type,
            items,
        };
        if order.total_amount().is_none() {
            return Err(OrderFlowError::InvalidValue("the order total is too large".into()));
        }
        Ok(order)
    }

    /// Processes the encrypted payload the gateway attaches to the customer's return redirect.
    ///
    /// Only an undecodable payload or an unknown order is an error. Everything after the status update (fulfillment,
    /// the ticket email) is best effort: failures are logged and the customer is still redirected.
    ///
    /// Callbacks may be repeated and may race. The status update only applies to `pending` orders, so exactly one
    /// callback moves an order into `success`, and only that callback fulfils the order and sends the email.
    pub async fn handle_callback(&self, payload: &str) -> Result<PaymentRedirect, OrderFlowError> {
        let envelope = self.codec.decode(payload).map_err(|e| {
            warn!("🔐️ Rejected a payment callback. {e}");
            OrderFlowError::InvalidEnvelope(e)
        })?;
        let order_no = envelope.order_no.clone();
        let order = self
            .db
            .fetch_order_by_order_no(&order_no)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_no.to_string()))?;
        if order.status == OrderStatus::Success {
            debug!("🔄️ Order [{order_no}] is already paid. Callback with status {} ignored", envelope.status_code);
            return Ok(self.payment_redirect(&order));
        }
        let status = self.config.status_codes.status_for(&envelope.status_code);
        info!("🔄️ Payment callback for order [{order_no}]: gateway status '{}' => {status}", envelope.status_code);
        let result = self.db.update_order_status(&order_no, status_update(status, &envelope)).await?;
        match &result {
            StatusUpdateResult::Transitioned(order) if order.status == OrderStatus::Success => {
                info!("🔄️ Order [{order_no}] is paid");
                self.deliver_tickets(order).await;
            },
            StatusUpdateResult::Transitioned(order) => {
                info!("🔄️ Order [{order_no}] is now {}", order.status);
            },
            StatusUpdateResult::StillPending(_) => {
                debug!("🔄️ Order [{order_no}] is still pending");
            },
            StatusUpdateResult::AlreadyFinal(order) => {
                debug!("🔄️ Order [{order_no}] was already {}. Nothing to do", order.status);
            },
        }
        Ok(self.payment_redirect(result.order()))
    }

    /// Fulfils the order and emails the tickets. Failures leave the order in `success` without the email-sent flag.
    async fn deliver_tickets(&self, order: &OrderTicketGroup) {
        let order_no = &order.order_no;
        let fulfilled = match self.fulfillment.fulfil_order(order_no).await {
            Ok(r) => r,
            Err(e) => {
                error!("🔄️🎟️ Fulfillment of order [{order_no}] failed. No tickets will be emailed. {e}");
                return;
            },
        };
        debug!("🔄️🎟️ Order [{order_no}] fulfilled with {} tickets", fulfilled.tickets.len());
        if fulfilled.tickets.is_empty() {
            warn!("🔄️🎟️ The ticketing system issued no tickets for order [{order_no}]. No email will be sent");
            return;
        }
        let items = if fulfilled.items.is_empty() {
            warn!("🔄️🎟️ No item summary for order [{order_no}]. Using the stored line items instead");
            self.stored_item_summary(order).await
        } else {
            fulfilled.items
        };
        let email = TicketEmail::new(order, items, fulfilled.tickets);
        if let Err(e) = self.mailer.send_tickets(&email).await {
            error!("🔄️📧️ Could not email the tickets for order [{order_no}]. {e}");
            return;
        }
        match self.db.mark_email_sent(order.id).await {
            Ok(true) => info!("🔄️📧️ Tickets for order [{order_no}] emailed to {}", order.email),
            Ok(false) => warn!("🔄️📧️ Tickets for order [{order_no}] were emailed, but the order could not be flagged"),
            Err(e) => error!("🔄️📧️ Tickets for order [{order_no}] were emailed, but the flag was not saved. {e}"),
        }
    }

    async fn stored_item_summary(&self, order: &OrderTicketGroup) -> Vec<ItemSummary> {
        match self.db.fetch_order_items(order.id).await {
            Ok(items) => items
                .into_iter()
                .map(|i| ItemSummary {
                    description: i.variant_name,
                    entry_date: i.entry_date.to_string(),
                    quantity: i.quantity,
                })
                .collect(),
            Err(e) => {
                warn!("🔄️ Could not load the line items for order [{}]. {e}", order.order_no);
                Vec::new()
            },
        }
    }
}
