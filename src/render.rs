use crate::config::CompanyConfig;
use crate::pricing::{format_usd, LineItem, QuoteBreakdown};
use crate::types::Customer;
use anyhow::{Context, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

// A4 sheet, margins in mm.
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;

const BRAND_GREEN: (f64, f64, f64) = (0.153, 0.682, 0.376);
const INK: (f64, f64, f64) = (0.173, 0.243, 0.314);
const MUTED: (f64, f64, f64) = (0.498, 0.549, 0.553);

/// Which copy of the estimate to render. The internal copy carries the
/// rate column and the subtotal line; the customer copy hides both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentVariant {
    Internal,
    Customer,
}

/// Everything the estimate sheet shows, already computed. Rendering is
/// synchronous and deterministic; there is no layout to settle.
pub struct EstimateView<'a> {
    pub company: &'a CompanyConfig,
    pub customer: &'a Customer,
    pub mowing: bool,
    pub flat_fees: &'a [LineItem],
    pub quote: &'a QuoteBreakdown,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

/// Render one estimate sheet to PDF bytes.
pub fn render_estimate_pdf(view: &EstimateView, variant: DocumentVariant) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new("Estimate", Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "estimate");
    let layer = doc.get_page(page).get_layer(layer);

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("Failed to load Helvetica")?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("Failed to load Helvetica Bold")?,
        oblique: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .context("Failed to load Helvetica Oblique")?,
    };

    draw_sheet(&layer, &fonts, view, variant);

    let bytes = doc
        .save_to_bytes()
        .context("Failed to serialize estimate PDF")?;
    Ok(bytes)
}

/// `Internal_<name>.pdf` or `Estimate_<name>.pdf`, with the customer name
/// reduced to filesystem-safe characters.
pub fn estimate_file_name(customer_name: &str, variant: DocumentVariant) -> String {
    let stem = safe_stem(customer_name);
    match variant {
        DocumentVariant::Internal => format!("Internal_{}.pdf", stem),
        DocumentVariant::Customer => format!("Estimate_{}.pdf", stem),
    }
}

fn safe_stem(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "Customer".to_string();
    }
    trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn draw_sheet(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    view: &EstimateView,
    variant: DocumentVariant,
) {
    let right_edge = PAGE_WIDTH - MARGIN;

    // Header: company name and payment block.
    set_color(layer, BRAND_GREEN);
    text(layer, &fonts.bold, 22.0, MARGIN, 30.0, &view.company.name);
    set_color(layer, MUTED);
    text(layer, &fonts.bold, 8.0, MARGIN, 40.0, "PAYMENT INFO");
    set_color(layer, INK);
    text(
        layer,
        &fonts.regular,
        10.0,
        MARGIN,
        45.0,
        &format!("Venmo: {}", view.company.payment_handle),
    );
    rule(layer, 52.0, MARGIN, right_edge, BRAND_GREEN, 1.0);

    // Bill-to block on the left, estimate details on the right.
    let mut y = 62.0;
    set_color(layer, MUTED);
    text(layer, &fonts.bold, 8.0, MARGIN, y, "BILL TO:");
    text(layer, &fonts.bold, 8.0, 130.0, y, "ESTIMATE DETAILS:");
    set_color(layer, INK);
    y += 6.0;
    text(
        layer,
        &fonts.bold,
        12.0,
        MARGIN,
        y,
        non_empty(&view.customer.name, "Valued Customer"),
    );
    let date = chrono::Local::now().format("%m/%d/%Y").to_string();
    text(layer, &fonts.regular, 10.0, 130.0, y, &format!("Date: {}", date));
    y += 6.0;
    text(
        layer,
        &fonts.regular,
        10.0,
        MARGIN,
        y,
        non_empty(&view.customer.address, "Service Address"),
    );
    for contact in [&view.customer.email, &view.customer.phone] {
        if !contact.is_empty() {
            y += 5.0;
            text(layer, &fonts.regular, 9.0, MARGIN, y, contact);
        }
    }

    // Pricing table.
    let mut y = y.max(80.0) + 14.0;
    set_color(layer, INK);
    text(layer, &fonts.bold, 10.0, MARGIN, y, "Description");
    if variant == DocumentVariant::Internal {
        text(layer, &fonts.bold, 10.0, 120.0, y, "Details");
    }
    text(layer, &fonts.bold, 10.0, 168.0, y, "Amount");
    rule(layer, y + 2.5, MARGIN, right_edge, (0.93, 0.93, 0.93), 0.8);

    if view.mowing {
        y += 9.0;
        text(layer, &fonts.bold, 10.0, MARGIN, y, "Lawn Mowing & Maintenance");
        if variant == DocumentVariant::Internal {
            let detail = if view.quote.minimum_applied {
                "Min. Charge"
            } else {
                "Standard Rate"
            };
            text(layer, &fonts.regular, 10.0, 120.0, y, detail);
        }
        text(
            layer,
            &fonts.bold,
            10.0,
            168.0,
            y,
            &format_usd(view.quote.billed_area_cost),
        );
        rule(layer, y + 2.5, MARGIN, right_edge, (0.93, 0.93, 0.93), 0.4);
    }

    for item in view.flat_fees {
        y += 9.0;
        text(layer, &fonts.bold, 10.0, MARGIN, y, &item.label);
        if variant == DocumentVariant::Internal {
            text(layer, &fonts.regular, 10.0, 120.0, y, "Flat Fee");
        }
        text(layer, &fonts.bold, 10.0, 168.0, y, &format_usd(item.price));
        rule(layer, y + 2.5, MARGIN, right_edge, (0.93, 0.93, 0.93), 0.4);
    }

    // Totals block, right-aligned like the on-screen card.
    y += 14.0;
    if variant == DocumentVariant::Internal {
        set_color(layer, INK);
        text(layer, &fonts.regular, 10.0, 130.0, y, "Subtotal:");
        text(layer, &fonts.regular, 10.0, 168.0, y, &format_usd(view.quote.total));
        y += 7.0;
    }
    rule(layer, y - 4.0, 130.0, right_edge, (0.87, 0.87, 0.87), 0.4);
    set_color(layer, BRAND_GREEN);
    text(layer, &fonts.bold, 14.0, 130.0, y + 2.0, "Total:");
    text(
        layer,
        &fonts.bold,
        14.0,
        162.0,
        y + 2.0,
        &format_usd(view.quote.total),
    );
    y += 12.0;

    // Notes panel.
    if !view.customer.notes.is_empty() {
        y += 4.0;
        set_color(layer, BRAND_GREEN);
        text(layer, &fonts.bold, 8.0, MARGIN, y, "NOTES:");
        set_color(layer, INK);
        for line in wrap_text(&view.customer.notes, 95) {
            y += 5.0;
            text(layer, &fonts.regular, 9.0, MARGIN, y, &line);
        }
    }

    // Footer: contact, location, next steps.
    let footer = 262.0;
    rule(layer, footer, MARGIN, right_edge, BRAND_GREEN, 1.0);
    set_color(layer, BRAND_GREEN);
    text(layer, &fonts.bold, 8.0, MARGIN, footer + 7.0, "CONTACT US");
    text(layer, &fonts.bold, 8.0, 85.0, footer + 7.0, "SERVICE LOCATION");
    text(layer, &fonts.bold, 8.0, 150.0, footer + 7.0, "NEXT STEPS");
    set_color(layer, INK);
    text(layer, &fonts.bold, 11.0, MARGIN, footer + 13.0, &view.company.phone);
    text(
        layer,
        &fonts.regular,
        9.0,
        85.0,
        footer + 13.0,
        non_empty(&view.customer.address, "Property Address"),
    );
    text(
        layer,
        &fonts.bold,
        9.0,
        150.0,
        footer + 13.0,
        "Call or text to schedule",
    );
    text(layer, &fonts.bold, 9.0, 150.0, footer + 17.5, "your service.");
    text(
        layer,
        &fonts.oblique,
        8.0,
        150.0,
        footer + 23.0,
        &format!(
            "This estimate is valid for {} days.",
            view.company.estimate_valid_days
        ),
    );
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Place text at `x` mm from the left edge and `top` mm down from the top
/// of the sheet. PDF space runs bottom-up; the layout reads top-down.
fn text(layer: &PdfLayerReference, font: &IndirectFontRef, size: f64, x: f64, top: f64, s: &str) {
    layer.use_text(s, size as f32, Mm(x as f32), Mm((PAGE_HEIGHT - top) as f32), font);
}

fn rule(
    layer: &PdfLayerReference,
    top: f64,
    x1: f64,
    x2: f64,
    color: (f64, f64, f64),
    thickness: f64,
) {
    layer.set_outline_color(Color::Rgb(Rgb::new(
        color.0 as f32,
        color.1 as f32,
        color.2 as f32,
        None,
    )));
    layer.set_outline_thickness(thickness as f32);
    let y = Mm((PAGE_HEIGHT - top) as f32);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1 as f32), y), false),
            (Point::new(Mm(x2 as f32), y), false),
        ],
        is_closed: false,
    });
}

fn set_color(layer: &PdfLayerReference, color: (f64, f64, f64)) {
    layer.set_fill_color(Color::Rgb(Rgb::new(
        color.0 as f32,
        color.1 as f32,
        color.2 as f32,
        None,
    )));
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::price_quote;
    use crate::types::Services;

    fn sample_company() -> CompanyConfig {
        toml::from_str(
            r#"
            name = "Sharp Lawn Mowing"
            phone = "(954) 787-8150"
            payment_handle = "@Breck-Wiener"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn both_variants_render_a_pdf() {
        let company = sample_company();
        let customer = Customer {
            name: "Pat Doyle".to_string(),
            address: "12 Ocean Dr".to_string(),
            notes: "Gate code 4411. Watch for the sprinkler heads along the east fence."
                .to_string(),
            ..Default::default()
        };
        let services = Services {
            shrubs: true,
            shrub_price: 40.0,
            ..Default::default()
        };
        let flat_fees = services.flat_fees();
        let quote = price_quote(4_200, 0.02, true, &flat_fees, 50.0);
        let view = EstimateView {
            company: &company,
            customer: &customer,
            mowing: true,
            flat_fees: &flat_fees,
            quote: &quote,
        };

        for variant in [DocumentVariant::Internal, DocumentVariant::Customer] {
            let bytes = render_estimate_pdf(&view, variant).unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }
    }

    #[test]
    fn file_names_strip_unsafe_characters() {
        assert_eq!(
            estimate_file_name("Pat O'Doyle Jr.", DocumentVariant::Customer),
            "Estimate_Pat_O_Doyle_Jr_.pdf"
        );
        assert_eq!(
            estimate_file_name("  ", DocumentVariant::Internal),
            "Internal_Customer.pdf"
        );
    }

    #[test]
    fn wrap_text_respects_word_boundaries() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }
}
