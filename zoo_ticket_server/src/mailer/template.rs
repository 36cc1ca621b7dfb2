use std::fmt::Write;

use gateway_tools::helpers::escape_html;
use zoo_ticket_engine::traits::TicketEmail;

/// Content-ID of the inline QR image for the `index`th ticket.
pub fn ticket_cid(index: usize) -> String {
    format!("ticket-{index}")
}

pub fn subject(email: &TicketEmail) -> String {
    format!("Your {} tickets (order {})", email.ticket_group_name, email.order_no)
}

/// The HTML body: the order overview followed by one inline QR code per ticket.
pub fn render_html(email: &TicketEmail) -> String {
    let mut tickets = String::new();
    for (i, ticket) in email.tickets.iter().enumerate() {
        let _ = write!(
            tickets,
            r#"
        <div style="text-align: center; margin: 24px 0; page-break-inside: avoid;">
            <img src="cid:{cid}" width="300" height="300" alt="{code}">
            <p style="font-family: monospace; font-size: 16px; margin: 4px 0;">{code}</p>
            <p style="color: #555; margin: 0;">{description}</p>
        </div>"#,
            cid = ticket_cid(i),
            code = escape_html(&ticket.ticket_code),
            description = escape_html(&ticket.description),
        );
    }
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.5; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2e7d32;">Thank you for your purchase, {buyer}!</h2>
        <p>Please show the QR code of each ticket at the entrance.</p>
        <table style="border-collapse: collapse; width: 100%;">
            <tr><td style="padding: 4px 8px;"><b>Ticket</b></td><td>{group}</td></tr>
            <tr><td style="padding: 4px 8px;"><b>Name</b></td><td>{buyer}</td></tr>
            <tr><td style="padding: 4px 8px;"><b>Purchase date</b></td><td>{purchase_date}</td></tr>
            <tr><td style="padding: 4px 8px;"><b>Entry date</b></td><td>{entry_date}</td></tr>
            <tr><td style="padding: 4px 8px;"><b>Quantity</b></td><td>{quantity}</td></tr>
            <tr><td style="padding: 4px 8px;"><b>Order number</b></td><td>{order_no}</td></tr>
        </table>{tickets}
    </div>
</body>
</html>
"#,
        title = escape_html(&subject(email)),
        buyer = escape_html(&email.buyer_name),
        group = escape_html(&email.ticket_group_name),
        purchase_date = email.purchase_date.format("%d %b %Y"),
        entry_date = escape_html(&email.entry_date),
        quantity = escape_html(&email.quantity_description()),
        order_no = escape_html(email.order_no.as_str()),
    )
}

/// Plain-text alternative for mail clients that do not render HTML.
pub fn render_text(email: &TicketEmail) -> String {
    let mut text = format!(
        "Thank you for your purchase, {}!\n\nTicket: {}\nPurchase date: {}\nEntry date: {}\nQuantity: {}\nOrder number: \
         {}\n\nTicket codes:\n",
        email.buyer_name,
        email.ticket_group_name,
        email.purchase_date.format("%d %b %Y"),
        email.entry_date,
        email.quantity_description(),
        email.order_no
    );
    for ticket in &email.tickets {
        let _ = writeln!(text, "  {} {}", ticket.ticket_code, ticket.description);
    }
    text
}
