//! CLI matrix presenter: text table or JSON.

use std::fmt::Write as _;

use insucalc_core::product::DocumentEntry;
use insucalc_core::row::Row;
use insucalc_orchestration::catalog::{CodeInspection, CodeListing};
use insucalc_orchestration::interfaces::MatrixPresenter;
use insucalc_orchestration::store::MatrixSnapshot;

use crate::output::{column_width, format_number, format_premium, pad};
use crate::ui;

const HEADERS: [&str; 8] = [
    "구분", "코드", "상품명", "보험기간", "납입기간", "가입나이", "데이터", "남/여 보험료",
];

/// CLI presenter.
pub struct CLIMatrixPresenter {
    json: bool,
    quiet: bool,
}

impl CLIMatrixPresenter {
    #[must_use]
    pub fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    fn print_json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{text}"),
            Err(err) => ui::print_error(&format!("JSON 직렬화 실패: {err}")),
        }
    }
}

fn availability_cell(row: &Row) -> String {
    let a = row.availability();
    let yn = |b: bool| if b { 'Y' } else { 'N' };
    format!("{}{}{}", yn(a.reserve_key), yn(a.reserve_rate), yn(a.premium_rate))
}

fn cells(row: &Row) -> [String; 8] {
    [
        row.kind().label().to_string(),
        row.key().insu_cd.clone(),
        row.name().to_string(),
        row.key().insu_term.clone(),
        row.key().pay_term.clone(),
        row.age_range().to_string(),
        availability_cell(row),
        format!(
            "{} / {}",
            format_premium(row.male_premium()),
            format_premium(row.female_premium())
        ),
    ]
}

/// Render the matrix as an aligned text table, followed by row notes.
#[must_use]
pub fn render_matrix(snapshot: &MatrixSnapshot) -> String {
    let body: Vec<[String; 8]> = snapshot.rows.iter().map(cells).collect();
    let widths: Vec<usize> = (0..HEADERS.len())
        .map(|i| column_width(body.iter().map(|r| r[i].as_str()).chain([HEADERS[i]]), 2))
        .collect();

    let line = |values: &[&str]| -> String {
        values
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (v, w))| pad(v, *w, i == HEADERS.len() - 1))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "주계약 {}  나이 {}  기준금액 {}만원  행 {}",
        snapshot.primary_code.as_deref().unwrap_or("—"),
        snapshot.age,
        format_number(snapshot.base_amount),
        snapshot.rows.len()
    );
    let _ = writeln!(out, "{}", line(&HEADERS));
    let total: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    let _ = writeln!(out, "{}", "-".repeat(total));
    for row in &body {
        let refs: Vec<&str> = row.iter().map(String::as_str).collect();
        let _ = writeln!(out, "{}", line(&refs));
    }

    let notes: Vec<&Row> = snapshot.rows.iter().filter(|r| r.error().is_some()).collect();
    if !notes.is_empty() {
        let _ = writeln!(out);
        for row in notes {
            let _ = writeln!(out, "* {}: {}", row.key(), row.error().unwrap_or_default());
        }
    }
    out
}

impl MatrixPresenter for CLIMatrixPresenter {
    fn present_matrix(&self, snapshot: &MatrixSnapshot) {
        if self.json {
            self.print_json(snapshot);
            return;
        }
        if !self.quiet {
            ui::print_header(&format!(
                "보험료 매트릭스 ({}%)",
                snapshot.progress
            ));
        }
        print!("{}", render_matrix(snapshot));
        for error in &snapshot.errors {
            ui::print_warning(error);
        }
    }

    fn present_documents(&self, documents: &[DocumentEntry]) {
        if self.json {
            self.print_json(&documents);
            return;
        }
        if !self.quiet {
            ui::print_header(&format!("문서 {}건", documents.len()));
        }
        for doc in documents {
            match doc.size {
                Some(size) => println!("{}  ({} bytes)", doc.name, format_number(size)),
                None => println!("{}", doc.name),
            }
        }
    }

    fn present_codes(&self, listing: &CodeListing) {
        if self.json {
            self.print_json(listing);
            return;
        }
        if !self.quiet {
            ui::print_header(&listing.document);
        }
        for code in &listing.codes {
            println!("{}  {}", code.insu_cd, code.name);
        }
        if let Some(advisory) = &listing.advisory {
            ui::print_warning(advisory);
        }
    }

    fn present_inspection(&self, inspection: &CodeInspection) {
        if self.json {
            self.print_json(inspection);
            return;
        }
        if !self.quiet {
            ui::print_header(&format!("{} (나이 {})", inspection.code, inspection.age));
        }
        if let Some(product) = &inspection.product {
            println!("상품명: {}", product.display_name());
            for terms in product.term_list() {
                println!(
                    "  {} / {} / {}",
                    terms.insu_term_or_placeholder(),
                    terms.pay_term_or_placeholder(),
                    terms.age_range_or_placeholder()
                );
            }
        }
        if let Some(limit) = &inspection.limit {
            let display = limit.display.clone().unwrap_or_else(|| {
                format!(
                    "{} ~ {}",
                    format_premium(limit.min_won),
                    format_premium(limit.max_won)
                )
            });
            println!("가입한도: {display}");
        }
        if let Some(range) = &inspection.premium_range {
            println!(
                "남 보험료: {} ~ {}",
                format_premium(range.man_min),
                format_premium(range.man_max)
            );
            println!(
                "여 보험료: {} ~ {}",
                format_premium(range.fml_min),
                format_premium(range.fml_max)
            );
        }
        for note in &inspection.notes {
            println!("- {note}");
        }
        for message in &inspection.messages {
            ui::print_warning(message);
        }
    }

    fn present_error(&self, error: &str) {
        ui::print_error(error);
    }
}
