//! Correction request PDFs
//!
//! One A4 page per request, Helvetica, every stored field.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::CorrectionRequest;
use shared::util::format_millis;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_LEFT: f32 = 20.0;
const VALUE_LEFT: f32 = 70.0;
const TOP: f32 = 270.0;
const LINE_HEIGHT: f32 = 7.0;
const WRAP_AT: usize = 70;

pub fn single_filename(id: i64) -> String {
    format!("correction_{id}.pdf")
}

pub fn export_filename(date: chrono::NaiveDate) -> String {
    format!("all_corrections_{}.pdf", date.format("%Y-%m-%d"))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_error(err: impl std::fmt::Display) -> AppError {
    AppError::with_message(
        ErrorCode::PdfGenerationFailed,
        format!("Failed to generate PDF: {err}"),
    )
}

/// Render `corrections` into one document; an empty slice yields a notice page
pub fn render(title: &str, corrections: &[CorrectionRequest]) -> AppResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    let first = doc.get_page(first_page).get_layer(first_layer);
    match corrections.split_first() {
        None => {
            first.use_text(title, 16.0, Mm(MARGIN_LEFT), Mm(TOP), &fonts.bold);
            first.use_text(
                "No correction requests match this filter.",
                11.0,
                Mm(MARGIN_LEFT),
                Mm(TOP - 2.0 * LINE_HEIGHT),
                &fonts.regular,
            );
        }
        Some((head, rest)) => {
            draw_correction(&first, &fonts, head);
            for correction in rest {
                let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
                draw_correction(&doc.get_page(page).get_layer(layer), &fonts, correction);
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

fn draw_correction(layer: &PdfLayerReference, fonts: &Fonts, c: &CorrectionRequest) {
    layer.use_text(
        format!("Member Correction Request #{}", c.id),
        16.0,
        Mm(MARGIN_LEFT),
        Mm(TOP),
        &fonts.bold,
    );

    let submitted = format_millis(c.submitted_at);
    let resolved = match (c.resolved_at, c.resolved_by.as_deref()) {
        (Some(at), Some(by)) => format!("{} by {by}", format_millis(at)),
        (Some(at), None) => format_millis(at),
        _ => "-".to_string(),
    };

    let fields: [(&str, &str); 13] = [
        ("Status", c.status.as_str()),
        ("Submitted", &submitted),
        ("Resolved", &resolved),
        ("Member Number", &c.member_number),
        ("ID Number", &c.id_number),
        ("Current Name", &c.current_name),
        ("Current Zone", &c.current_zone),
        ("Current Status", &c.current_status),
        ("Correct Name", or_dash(c.correct_name.as_deref())),
        ("Correct Zone", or_dash(c.correct_zone.as_deref())),
        ("Email", or_dash(c.email.as_deref())),
        ("Phone", or_dash(c.phone.as_deref())),
        ("Additional Notes", or_dash(c.additional_notes.as_deref())),
    ];

    let mut y = TOP - 2.0 * LINE_HEIGHT;
    for (label, value) in fields {
        layer.use_text(format!("{label}:"), 11.0, Mm(MARGIN_LEFT), Mm(y), &fonts.bold);
        for line in wrap(value, WRAP_AT) {
            layer.use_text(line, 11.0, Mm(VALUE_LEFT), Mm(y), &fonts.regular);
            y -= LINE_HEIGHT;
        }
    }
}

/// Greedy word wrap; words longer than `width` are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(split);
        }
        let needed = if current.is_empty() { word.len() } else { current.len() + 1 + word.len() };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CorrectionStatus;

    fn sample(id: i64) -> CorrectionRequest {
        CorrectionRequest {
            id,
            member_id: Some(1),
            member_number: "M001".into(),
            id_number: "12345678".into(),
            current_name: "Jane Doe".into(),
            current_zone: "Nairobi".into(),
            current_status: "active".into(),
            correct_name: Some("Jane Wanjiru".into()),
            correct_zone: None,
            email: Some("jane@example.com".into()),
            phone: None,
            additional_notes: Some("Name changed after marriage. ".repeat(10)),
            status: CorrectionStatus::Pending,
            submitted_at: 1_700_000_000_000,
            resolved_at: None,
            resolved_by: None,
        }
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = render("Correction 1", &[sample(1), sample(2)]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let empty = render("All corrections", &[]).unwrap();
        assert!(empty.starts_with(b"%PDF"));
    }

    #[test]
    fn filenames() {
        assert_eq!(single_filename(42), "correction_42.pdf");
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "all_corrections_2024-03-09.pdf");
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("alpha beta gamma delta", 11);
        assert_eq!(lines, ["alpha beta", "gamma delta"]);
        assert_eq!(wrap("", 10), [""]);
        assert_eq!(wrap("abcdefghij", 4), ["abcd", "efgh", "ij"]);
    }
}
