//! Results view: static training report with images served by the backend

use super::images::show_image;
use super::App;
use crate::constants::{RESULT_IMAGES, SHAP_IMAGES};
use crate::theme;
use crate::ui::components;
use eframe::egui;
use egui_phosphor::regular as icons;

// Final model metrics from the training report
const REPORT_METRICS: [(&str, f64, &str); 3] = [
    ("F1-Score", 0.2592, "3.87x better than random"),
    ("Precision", 0.1495, "Positive predictions accuracy"),
    ("Recall", 1.0, "All positives detected"),
];

/// Caption under each report image, keyed by path
fn caption(path: &str) -> Option<&'static str> {
    match path {
        "/outputs/results/baseline_comparison.png" => {
            Some("CatBoost against Logistic Regression and Random Forest baselines")
        }
        "/outputs/results/catboost_comparison.png" => Some("Performance breakdown across metrics"),
        "/outputs/results/catboost_training_history.png" => Some(
            "Training converged without overfitting, helped by built-in overfitting \
             protection and early stopping",
        ),
        "/outputs/results/hyperparameter_heatmaps.png" => {
            Some("Grid search over learning_rate, depth, l2_leaf_reg and iterations")
        }
        "/outputs/results/top_10_configs.png" => {
            Some("Best configurations out of 100+ tested")
        }
        "/outputs/explainability/shap/shap_summary.png" => {
            Some("Per-sample SHAP values for the most influential features")
        }
        "/outputs/explainability/shap/shap_feature_importance.png" => {
            Some("Mean absolute SHAP value per feature")
        }
        _ => None,
    }
}

impl App {
    pub(crate) fn render_results(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        components::page_header(
            ui,
            icons::CHART_BAR,
            "Model Training Results",
            "CatBoost training and evaluation report",
        );

        components::card(
            ui,
            "Model Performance Summary",
            Some("CatBoost gradient boosting classifier, binary target (appeared: 0/1)"),
            |ui| {
                let w = components::tile_width(ui, REPORT_METRICS.len());
                ui.horizontal(|ui| {
                    for (label, value, note) in REPORT_METRICS {
                        theme::section_frame().show(ui, |ui| {
                            ui.set_width(w);
                            ui.label(egui::RichText::new(label).color(theme::TEXT_MUTED));
                            ui.label(
                                egui::RichText::new(crate::utils::format_percent(value))
                                    .size(theme::FONT_DISPLAY)
                                    .strong()
                                    .color(theme::ACCENT_LIGHT),
                            );
                            ui.label(
                                egui::RichText::new(note)
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_DIM),
                            );
                        });
                    }
                });
                ui.add_space(theme::SPACING_MD);
                ui.label(
                    egui::RichText::new(
                        "A 25.92% F1-score is 3.87x the 6.7% random baseline. Lottery draws are \
                         random, so the model can only pick up weak statistical patterns.",
                    )
                    .color(theme::TEXT_SECONDARY),
                );
            },
        );
        ui.add_space(theme::SPACING_LG);

        for (title, path) in RESULT_IMAGES {
            self.report_image_card(ui, ctx, title, path);
            ui.add_space(theme::SPACING_LG);
        }

        ui.label(
            egui::RichText::new("SHAP Explainability")
                .size(theme::FONT_TITLE)
                .strong()
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(theme::SPACING_MD);
        for (title, path) in SHAP_IMAGES {
            self.report_image_card(ui, ctx, title, path);
            ui.add_space(theme::SPACING_LG);
        }

        components::card(ui, "Key Insights from Training", None, |ui| {
            for (title, body) in [
                (
                    "CatBoost outperformed baselines",
                    "better F1-score than Logistic Regression and Random Forest",
                ),
                (
                    "Performance ceiling reflects randomness",
                    "the model learned real patterns without overfitting",
                ),
                (
                    "100% recall",
                    "every positive case is found, at the cost of precision under class imbalance",
                ),
            ] {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(icons::CHECK).color(theme::STATUS_SUCCESS));
                    ui.label(egui::RichText::new(title).strong().color(theme::TEXT_PRIMARY));
                    ui.label(egui::RichText::new(body).color(theme::TEXT_SECONDARY));
                });
            }
        });
    }

    fn report_image_card(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, title: &str, path: &str) {
        components::card(ui, title, caption(path), |ui| {
            let width = ui.available_width();
            let state = self.images.asset(ctx, self.runtime.handle(), &self.api, path);
            show_image(ui, state, width);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_report_image_has_a_caption() {
        for (_, path) in RESULT_IMAGES.iter().chain(SHAP_IMAGES) {
            assert!(caption(path).is_some(), "{path}");
        }
    }
}
