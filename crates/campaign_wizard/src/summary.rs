use std::fmt::Write as _;

use shared::money::format_brl;

use crate::step::StepData;

/// Read-only digest of the staged campaign shown on the review step.
pub fn render_summary(data: &StepData) -> String {
    let mut out = String::new();
    let budget = data.budget.as_ref();

    let _ = writeln!(out, "Ad name: {}", budget.map(|b| b.name.as_str()).unwrap_or("-"));
    let _ = writeln!(
        out,
        "Objective: {}",
        data.objective
            .map(|o| o.as_str().to_uppercase())
            .unwrap_or_else(|| "-".into())
    );
    let _ = writeln!(
        out,
        "Budget type: {}",
        budget
            .map(|b| b.kind.as_str().to_uppercase())
            .unwrap_or_else(|| "-".into())
    );
    let _ = writeln!(
        out,
        "Budget value: {}",
        format_brl(budget.map(|b| b.amount).unwrap_or(0.0))
    );

    match budget.and_then(|b| b.parsed_schedule()) {
        Some((start, end)) => {
            let _ = writeln!(out, "Start date: {}", start.format("%d/%m/%Y %H:%M"));
            let _ = writeln!(out, "End date: {}", end.format("%d/%m/%Y %H:%M"));
        }
        None => {
            let _ = writeln!(
                out,
                "Start date: {}",
                budget.map(|b| b.schedule_start.as_str()).unwrap_or("-")
            );
            let _ = writeln!(
                out,
                "End date: {}",
                budget.map(|b| b.schedule_end.as_str()).unwrap_or("-")
            );
        }
    }

    if let Some(media) = &data.medias {
        let _ = writeln!(
            out,
            "Media: {} ({}, {} bytes)",
            media.file_name,
            media.mime_type,
            media.size()
        );
    }

    let _ = writeln!(out, "Selected locations:");
    for placement in &data.localization {
        let _ = writeln!(
            out,
            "  {} ({:.4}, {:.4})",
            placement.name, placement.latitude, placement.longitude
        );
    }

    out
}
