use mockall::mock;
use zoo_ticket_engine::{
    db_types::OrderNo,
    traits::{FulfillmentError, FulfillmentProvider, FulfillmentResult, MailerError, TicketEmail, TicketMailer},
};

mock! {
    pub Fulfillment {}
    impl FulfillmentProvider for Fulfillment {
        async fn fulfil_order(&self, order_no: &OrderNo) -> Result<FulfillmentResult, FulfillmentError>;
    }
}

mock! {
    pub Mailer {}
    impl TicketMailer for Mailer {
        async fn send_tickets(&self, email: &TicketEmail) -> Result<(), MailerError>;
    }
}
