//! Printable ticket sheets: A4 pages with up to [`TICKETS_PER_PAGE`] QR codes each, centered horizontally, with the
//! ticket code and description under every code. QR modules are drawn as vector squares, so the codes stay sharp at
//! any print resolution.
use log::debug;
use printpdf::{BuiltinFont, Color, Greyscale, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect};
use qrcode::Color as QrColor;
use zoo_ticket_engine::traits::{MailerError, TicketArtifact, TicketEmail};

use crate::mailer::qr::qr_code;

pub const TICKETS_PER_PAGE: usize = 3;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const HEADER_Y: f32 = 285.0;
const FIRST_SLOT_TOP: f32 = 275.0;
const SLOT_HEIGHT: f32 = 88.0;
const QR_SIDE: f32 = 62.0;
const QUIET_ZONE: usize = 4;
const LAYER: &str = "Tickets";

fn render_error<E: std::fmt::Display>(e: E) -> MailerError {
    MailerError::RenderError(format!("Could not build the ticket PDF. {e}"))
}

/// Number of A4 pages needed for `tickets` ticket codes.
pub fn page_count(tickets: usize) -> usize {
    tickets.div_ceil(TICKETS_PER_PAGE)
}

/// Rough width of `text` in a builtin Helvetica face, for centering.
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5 * 0.3528
}

fn centered_text(layer: &PdfLayerReference, text: &str, font_size: f32, y: f32, font: &IndirectFontRef) {
    let x = ((PAGE_WIDTH - text_width(text, font_size)) / 2.0).max(10.0);
    layer.use_text(text, font_size, Mm(x), Mm(y), font);
}

/// Draws the QR code for `data` with its top edge at `top`.
fn draw_qr(layer: &PdfLayerReference, data: &str, top: f32) -> Result<(), MailerError> {
    let code = qr_code(data)?;
    let width = code.width();
    let modules = width + 2 * QUIET_ZONE;
    let module = QR_SIDE / modules as f32;
    let left = (PAGE_WIDTH - QR_SIDE) / 2.0;
    layer.set_fill_color(Color::Greyscale(Greyscale::new(0.0, None)));
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != QrColor::Dark {
            continue;
        }
        let (row, col) = (i / width, i % width);
        let x0 = left + (col + QUIET_ZONE) as f32 * module;
        let y1 = top - (row + QUIET_ZONE) as f32 * module;
        layer.add_rect(Rect::new(Mm(x0), Mm(y1 - module), Mm(x0 + module), Mm(y1)));
    }
    Ok(())
}

fn draw_ticket(
    layer: &PdfLayerReference,
    ticket: &TicketArtifact,
    slot: usize,
    font: &IndirectFontRef,
) -> Result<(), MailerError> {
    let top = FIRST_SLOT_TOP - slot as f32 * SLOT_HEIGHT;
    draw_qr(layer, &ticket.ticket_code, top)?;
    centered_text(layer, &ticket.ticket_code, 12.0, top - QR_SIDE - 6.0, font);
    let caption = match (ticket.description.is_empty(), ticket.entry_date.is_empty()) {
        (false, false) => format!("{} - {}", ticket.description, ticket.entry_date),
        (false, true) => ticket.description.clone(),
        (true, false) => ticket.entry_date.clone(),
        (true, true) => String::default(),
    };
    if !caption.is_empty() {
        centered_text(layer, &caption, 10.0, top - QR_SIDE - 12.0, font);
    }
    Ok(())
}

/// Builds the PDF attachment for `email`. Fails if there are no tickets to print.
pub fn build_ticket_pdf(email: &TicketEmail) -> Result<Vec<u8>, MailerError> {
    if email.tickets.is_empty() {
        return Err(MailerError::RenderError("There are no tickets to print".into()));
    }
    let title = format!("Tickets for order {}", email.order_no);
    let (doc, first_page, first_layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?;
    let header = format!("{} | Order {}", email.ticket_group_name, email.order_no);
    for (page_no, tickets) in email.tickets.chunks(TICKETS_PER_PAGE).enumerate() {
        let layer = if page_no == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            doc.get_page(page).get_layer(layer)
        };
        centered_text(&layer, &header, 11.0, HEADER_Y, &font);
        for (slot, ticket) in tickets.iter().enumerate() {
            draw_ticket(&layer, ticket, slot, &font)?;
        }
    }
    debug!("📧️ Ticket PDF for order {} has {} page(s)", email.order_no, page_count(email.tickets.len()));
    doc.save_to_bytes().map_err(render_error)
}
