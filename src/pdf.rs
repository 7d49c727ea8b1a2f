use std::collections::HashMap;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entity::{budget, budget_item, product_service, user};
use crate::error::AppError;
use crate::models::shared::money;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Font error: {0}")]
    Font(printpdf::Error),

    #[error("Serialization error: {0}")]
    Write(printpdf::Error),
}

impl From<PdfError> for AppError {
    fn from(e: PdfError) -> Self {
        AppError::Internal(format!("PDF render failed: {e}"))
    }
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const BOTTOM: f32 = 24.0;
const LINE: f32 = 6.0;

/// Render a budget as an A4 PDF document.
///
/// Layout: issuer header, client block, one table row per item (with the
/// linked catalog name when present), grand total. Long item lists flow onto
/// additional pages. A diagonal watermark is stamped on every page when the
/// budget asks for one.
pub fn render_budget(
    owner: &user::Model,
    budget: &budget::Model,
    items: &[budget_item::Model],
    catalog: &HashMap<Uuid, product_service::Model>,
) -> Result<Vec<u8>, PdfError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Budget - {}", budget.client_name),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "content",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(PdfError::Font)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(PdfError::Font)?;

    let mut layer = doc.get_page(page).get_layer(layer);
    if budget.has_watermark {
        stamp_watermark(&layer, &regular);
    }

    let mut y = PAGE_HEIGHT - MARGIN;

    // Issuer header.
    let issuer = owner.company_name.as_deref().unwrap_or(&owner.name);
    layer.use_text(issuer, 18.0, Mm(MARGIN), Mm(y), &bold);
    y -= LINE * 1.5;
    layer.use_text(
        format!("Budget issued {}", budget.created_at.format("%Y-%m-%d")),
        10.0,
        Mm(MARGIN),
        Mm(y),
        &regular,
    );
    y -= LINE * 2.0;

    // Client block.
    layer.use_text("Client", 12.0, Mm(MARGIN), Mm(y), &bold);
    y -= LINE;
    layer.use_text(&budget.client_name, 10.0, Mm(MARGIN), Mm(y), &regular);
    y -= LINE;
    if let Some(ref email) = budget.client_email {
        layer.use_text(email, 10.0, Mm(MARGIN), Mm(y), &regular);
        y -= LINE;
    }
    if let Some(ref phone) = budget.client_phone {
        layer.use_text(phone, 10.0, Mm(MARGIN), Mm(y), &regular);
        y -= LINE;
    }
    y -= LINE;

    // Table header.
    draw_table_header(&layer, &bold, y);
    y -= LINE * 1.2;

    for item in items {
        if y < BOTTOM {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            layer = doc.get_page(p).get_layer(l);
            if budget.has_watermark {
                stamp_watermark(&layer, &regular);
            }
            y = PAGE_HEIGHT - MARGIN;
            draw_table_header(&layer, &bold, y);
            y -= LINE * 1.2;
        }

        let label = match item.product_service_id.and_then(|id| catalog.get(&id)) {
            Some(ps) if ps.name != item.name => format!("{} ({})", item.name, ps.name),
            _ => item.name.clone(),
        };

        layer.use_text(truncate(&label, 42), 10.0, Mm(MARGIN), Mm(y), &regular);
        layer.use_text(
            money(item.quantity).to_string(),
            10.0,
            Mm(MARGIN + 92.0),
            Mm(y),
            &regular,
        );
        layer.use_text(
            money(item.unit_price).to_string(),
            10.0,
            Mm(MARGIN + 116.0),
            Mm(y),
            &regular,
        );
        layer.use_text(
            money(item.total_item_price).to_string(),
            10.0,
            Mm(MARGIN + 146.0),
            Mm(y),
            &regular,
        );
        y -= LINE;
    }

    if y < BOTTOM + LINE * 2.0 {
        let (p, l) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        layer = doc.get_page(p).get_layer(l);
        if budget.has_watermark {
            stamp_watermark(&layer, &regular);
        }
        y = PAGE_HEIGHT - MARGIN;
    }

    y -= LINE;
    layer.use_text(
        format!("Total: {}", money(budget.total_value)),
        13.0,
        Mm(MARGIN + 116.0),
        Mm(y),
        &bold,
    );

    if let Some(ref notes) = budget.notes {
        y -= LINE * 2.0;
        layer.use_text("Notes", 11.0, Mm(MARGIN), Mm(y), &bold);
        y -= LINE;
        layer.use_text(truncate(notes, 110), 9.0, Mm(MARGIN), Mm(y), &regular);
    }

    doc.save_to_bytes().map_err(PdfError::Write)
}

fn draw_table_header(layer: &PdfLayerReference, bold: &IndirectFontRef, y: f32) {
    layer.use_text("Item", 10.0, Mm(MARGIN), Mm(y), bold);
    layer.use_text("Qty", 10.0, Mm(MARGIN + 92.0), Mm(y), bold);
    layer.use_text("Unit price", 10.0, Mm(MARGIN + 116.0), Mm(y), bold);
    layer.use_text("Total", 10.0, Mm(MARGIN + 146.0), Mm(y), bold);
}

fn stamp_watermark(layer: &PdfLayerReference, font: &IndirectFontRef) {
    layer.set_fill_color(Color::Rgb(Rgb::new(0.85, 0.85, 0.85, None)));
    layer.use_text("DRAFT", 48.0, Mm(60.0), Mm(PAGE_HEIGHT / 2.0), font);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}
