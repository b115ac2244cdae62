//! Reusable UI components
//!
//! Cards, badges and bars shared by the views.

use crate::theme;
use crate::types::{confidence_bucket, ConfidenceLevel};
use eframe::egui;

/// View title with icon and a muted subtitle line
pub fn page_header(ui: &mut egui::Ui, icon: &str, title: &str, subtitle: &str) {
    ui.horizontal(|ui| {
        ui.add(
            egui::Label::new(
                egui::RichText::new(icon)
                    .size(theme::FONT_DISPLAY)
                    .color(theme::ACCENT),
            )
            .selectable(false),
        );
        ui.add(
            egui::Label::new(
                egui::RichText::new(title)
                    .size(theme::FONT_DISPLAY)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            )
            .selectable(false),
        );
    });
    if !subtitle.is_empty() {
        ui.label(egui::RichText::new(subtitle).color(theme::TEXT_MUTED));
    }
    ui.add_space(theme::SPACING_XL);
}

/// Card with a heading and optional description above the body
pub fn card<R>(
    ui: &mut egui::Ui,
    title: &str,
    description: Option<&str>,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> R {
    theme::card_frame()
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            if !title.is_empty() {
                ui.label(
                    egui::RichText::new(title)
                        .size(theme::FONT_TITLE)
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                );
            }
            if let Some(desc) = description {
                ui.label(egui::RichText::new(desc).color(theme::TEXT_MUTED));
            }
            if !title.is_empty() || description.is_some() {
                ui.add_space(theme::SPACING_MD);
            }
            add_contents(ui)
        })
        .inner
}

/// Inline error box
pub fn error_card(ui: &mut egui::Ui, message: &str) {
    theme::tinted_frame(theme::STATUS_ERROR).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal_wrapped(|ui| {
            ui.label(
                egui::RichText::new(egui_phosphor::regular::WARNING_CIRCLE)
                    .color(theme::STATUS_ERROR),
            );
            ui.label(egui::RichText::new(message).color(theme::STATUS_ERROR));
        });
    });
}

/// Highlighted note, e.g. disclaimers and explainers
pub fn note_card(ui: &mut egui::Ui, tint: egui::Color32, icon: &str, title: &str, body: &str) {
    theme::tinted_frame(tint).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(icon).color(tint));
            ui.label(egui::RichText::new(title).strong().color(tint));
        });
        ui.label(egui::RichText::new(body).color(theme::TEXT_SECONDARY));
    });
}

/// Spinner with a label
pub fn loading_row(ui: &mut egui::Ui, text: &str) {
    ui.horizontal(|ui| {
        ui.add(egui::Spinner::new().size(16.0).color(theme::ACCENT));
        ui.label(egui::RichText::new(text).color(theme::TEXT_MUTED));
    });
}

/// Pill-shaped label
pub fn badge(ui: &mut egui::Ui, text: &str, bg: egui::Color32, fg: egui::Color32) -> egui::Response {
    let galley = ui.painter().layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(theme::FONT_SMALL),
        fg,
    );
    let size = egui::vec2(galley.size().x + 16.0, theme::BADGE_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        painter.rect_filled(rect, theme::BADGE_HEIGHT / 2.0, bg);
        painter.rect_stroke(
            rect,
            theme::BADGE_HEIGHT / 2.0,
            egui::Stroke::new(theme::STROKE_DEFAULT, fg.gamma_multiply(0.4)),
            egui::StrokeKind::Inside,
        );
        painter.galley(rect.center() - galley.size() / 2.0, galley, fg);
    }
    response
}

/// Badge colored by the confidence label, with the probability band on hover
pub fn confidence_badge(ui: &mut egui::Ui, label: &str) -> egui::Response {
    let (bg, fg) = theme::confidence_colors(confidence_bucket(label));
    let response = badge(ui, label, bg, fg);
    match ConfidenceLevel::parse(label) {
        Some(level) => response.on_hover_text(level.band()),
        None => response,
    }
}

/// Badge for "Appear" / "Not Appear"
pub fn prediction_badge(ui: &mut egui::Ui, prediction: &str) -> egui::Response {
    let color = if prediction == "Appear" {
        theme::STATUS_SUCCESS
    } else {
        theme::TEXT_MUTED
    };
    badge(ui, prediction, color.gamma_multiply(0.08), color)
}

/// Horizontal bar filled to `p` with the percentage beside it
pub fn probability_bar(ui: &mut egui::Ui, p: f64, width: f32) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 8.0), egui::Sense::hover());
        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 4.0, theme::BG_SURFACE);
            let filled = egui::Rect::from_min_size(
                rect.min,
                egui::vec2(rect.width() * p.clamp(0.0, 1.0) as f32, rect.height()),
            );
            painter.rect_filled(filled, 4.0, theme::ACCENT);
        }
        ui.label(
            egui::RichText::new(crate::utils::format_percent(p))
                .monospace()
                .color(theme::TEXT_SECONDARY),
        );
    });
}

/// Big number with a caption, used for model metrics
pub fn stat_tile(ui: &mut egui::Ui, label: &str, value: &str, width: f32) {
    theme::section_frame().show(ui, |ui| {
        ui.set_width(width);
        ui.label(egui::RichText::new(label).size(theme::FONT_LABEL).color(theme::TEXT_MUTED));
        ui.label(
            egui::RichText::new(value)
                .size(theme::FONT_DISPLAY)
                .strong()
                .color(theme::ACCENT_LIGHT),
        );
    });
}

/// Lay out `count` tiles per row, splitting the width evenly
pub fn tile_width(ui: &egui::Ui, count: usize) -> f32 {
    let spacing = ui.spacing().item_spacing.x;
    let frame_padding = 2.0 * 12.0 + 2.0 * theme::STROKE_DEFAULT;
    let per_tile = (ui.available_width() - spacing * (count as f32 - 1.0)) / count as f32;
    (per_tile - frame_padding).max(80.0)
}

/// Round number cell used by the grid and the top-pick cards
pub fn number_ball(ui: &mut egui::Ui, number: u32, selected: bool, enabled: bool) -> egui::Response {
    let size = egui::vec2(theme::NUMBER_CELL, theme::NUMBER_CELL);
    let sense = if enabled {
        egui::Sense::click()
    } else {
        egui::Sense::hover()
    };
    let (rect, response) = ui.allocate_exact_size(size, sense);
    if ui.is_rect_visible(rect) {
        let base = if selected {
            theme::NUMBER_SELECTED
        } else {
            theme::NUMBER_UNSELECTED
        };
        let (fill, draw_rect) = if enabled {
            theme::button_visual(&response, base, rect)
        } else {
            (theme::BTN_DISABLED, rect)
        };
        let text_color = if !enabled {
            theme::BTN_DISABLED_TEXT
        } else if selected {
            theme::TEXT_PRIMARY
        } else {
            theme::TEXT_SECONDARY
        };
        let painter = ui.painter();
        painter.rect_filled(draw_rect, theme::RADIUS_MEDIUM, fill);
        painter.text(
            draw_rect.center(),
            egui::Align2::CENTER_CENTER,
            number.to_string(),
            egui::FontId::proportional(theme::FONT_BODY),
            text_color,
        );
    }
    response
}
