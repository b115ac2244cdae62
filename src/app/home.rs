//! Home view: hero, model statistics, feature highlights

use super::tasks::Request;
use super::{App, View};
use crate::theme;
use crate::types::ModelStats;
use crate::ui::components;
use crate::utils::{format_percent, format_thousands, humanize_feature};
use eframe::egui;
use egui_phosphor::regular as icons;
use tracing::warn;

const STATS_ERROR: &str = "Failed to load statistics. Make sure the backend is running.";

const HIGHLIGHTS: [(&str, &str, &str); 4] = [
    (
        icons::BRAIN,
        "CatBoost ML",
        "Gradient boosting tuned for tabular data with categorical features",
    ),
    (
        icons::CHART_BAR,
        "SHAP Explainability",
        "See which features push each prediction up or down",
    ),
    (
        icons::TREND_UP,
        "17 Lotteries",
        "Draw history from NLB and DLB games",
    ),
    (
        icons::SHIELD_CHECK,
        "Educational Use",
        "Lottery draws are random; no model can beat them",
    ),
];

#[derive(Default)]
pub struct HomeState {
    stats: Option<ModelStats>,
    error: Option<String>,
    request: Request<ModelStats>,
    requested: bool,
}

impl HomeState {
    pub fn reset(&mut self) {
        self.request.abandon();
        *self = Self::default();
    }

    /// A failed fetch is retried on the next visit or health check
    pub fn retry_if_failed(&mut self) {
        if self.error.is_some() && !self.request.in_flight() {
            self.requested = false;
        }
    }

    fn receive(&mut self, result: Result<ModelStats, crate::api::ApiError>) {
        match result {
            Ok(stats) => {
                self.stats = Some(stats);
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load statistics");
                self.stats = None;
                self.error = Some(STATS_ERROR.to_string());
            }
        }
    }
}

impl App {
    pub(crate) fn render_home(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        // Statistics are fetched once per session
        if !self.home.requested {
            self.home.requested = true;
            let api = self.api.clone();
            self.home
                .request
                .start(self.runtime.handle(), ctx, async move { api.get_statistics().await });
        }
        if let Some(result) = self.home.request.poll() {
            self.home.receive(result);
        }

        // Hero
        ui.vertical_centered(|ui| {
            ui.add_space(theme::SPACING_XL);
            components::badge(
                ui,
                "Applied Machine Learning Project",
                theme::ACCENT_MUTED,
                theme::ACCENT_LIGHT,
            );
            ui.add_space(theme::SPACING_MD);
            ui.label(
                egui::RichText::new("Sri Lankan Lottery ML Analyzer")
                    .size(34.0)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
            ui.label(
                egui::RichText::new(
                    "Machine learning predictions with SHAP explainability, for educational purposes",
                )
                .size(theme::FONT_HEADING)
                .color(theme::TEXT_MUTED),
            );
            ui.add_space(theme::SPACING_LG);
            ui.horizontal(|ui| {
                // Center the two buttons
                let width = 2.0 * 170.0 + ui.spacing().item_spacing.x;
                ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));
                let size = egui::vec2(170.0, theme::BUTTON_HEIGHT_LARGE);
                if ui
                    .add_sized(size, theme::button_accent(format!("{} Try Predictions", icons::SPARKLE)))
                    .clicked()
                {
                    self.set_view(View::Predict);
                }
                if ui
                    .add_sized(size, theme::button(format!("{} View Explainability", icons::BRAIN)))
                    .clicked()
                {
                    self.set_view(View::Explain);
                }
            });
        });
        ui.add_space(28.0);

        // Model statistics
        ui.label(
            egui::RichText::new("Model Performance")
                .size(theme::FONT_TITLE)
                .strong()
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(theme::SPACING_MD);

        if let Some(error) = &self.home.error {
            components::error_card(ui, error);
            ui.label(
                egui::RichText::new(format!(
                    "Expected the backend at {}",
                    self.api.base_url()
                ))
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_DIM),
            );
        } else if let Some(stats) = &self.home.stats {
            let w = components::tile_width(ui, 4);
            ui.horizontal(|ui| {
                components::stat_tile(ui, "Model Type", &stats.model_type, w);
                components::stat_tile(ui, "F1-Score", &format_percent(stats.f1_score), w);
                components::stat_tile(
                    ui,
                    "Training Samples",
                    &format_thousands(stats.training_samples),
                    w,
                );
                components::stat_tile(ui, "Features", &stats.features_count.to_string(), w);
            });
            if !stats.top_5_features.is_empty() {
                ui.add_space(theme::SPACING_LG);
                components::card(ui, "Most influential features", None, |ui| {
                    for (i, feature) in stats.top_5_features.iter().enumerate() {
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(format!("{}.", i + 1))
                                    .monospace()
                                    .color(theme::TEXT_DIM),
                            );
                            ui.label(
                                egui::RichText::new(humanize_feature(feature))
                                    .color(theme::TEXT_SECONDARY),
                            );
                        });
                    }
                });
            }
        } else {
            components::loading_row(ui, "Loading model statistics...");
        }

        ui.add_space(28.0);

        // Highlights
        ui.label(
            egui::RichText::new("Key Features")
                .size(theme::FONT_TITLE)
                .strong()
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(theme::SPACING_MD);
        let w = components::tile_width(ui, 2);
        ui.columns(2, |cols| {
            for (i, (icon, title, body)) in HIGHLIGHTS.iter().enumerate() {
                let ui = &mut cols[i % 2];
                theme::section_frame().show(ui, |ui| {
                    ui.set_width(w.min(ui.available_width()));
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(*icon).size(20.0).color(theme::ACCENT));
                        ui.label(
                            egui::RichText::new(*title)
                                .size(theme::FONT_HEADING)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        );
                    });
                    ui.label(egui::RichText::new(*body).color(theme::TEXT_MUTED));
                });
                ui.add_space(theme::SPACING_MD);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    fn stats() -> ModelStats {
        ModelStats {
            model_type: "CatBoost".to_string(),
            f1_score: 0.2592,
            precision: 0.1495,
            recall: 1.0,
            training_samples: 485094,
            features_count: 42,
            top_5_features: vec!["appearance_rate".to_string()],
        }
    }

    #[test]
    fn failure_shows_fixed_message() {
        let mut state = HomeState::default();
        state.receive(Err(ApiError::Status { status: 500, detail: Some("boom".into()) }));
        assert_eq!(state.error.as_deref(), Some(STATS_ERROR));
        assert!(state.stats.is_none());
    }

    #[test]
    fn success_clears_error() {
        let mut state = HomeState::default();
        state.error = Some("old".into());
        state.receive(Ok(stats()));
        assert!(state.error.is_none());
        assert_eq!(state.stats.as_ref().map(|s| s.training_samples), Some(485094));
    }

    #[test]
    fn reset_allows_refetch() {
        let mut state = HomeState::default();
        state.requested = true;
        state.receive(Ok(stats()));
        state.reset();
        assert!(!state.requested);
        assert!(state.stats.is_none());
    }

    #[test]
    fn failure_is_retried_but_success_is_kept() {
        let mut state = HomeState::default();
        state.requested = true;
        state.receive(Err(ApiError::Status { status: 503, detail: None }));
        state.retry_if_failed();
        assert!(!state.requested);

        state.requested = true;
        state.receive(Ok(stats()));
        state.retry_if_failed();
        assert!(state.requested);
    }
}
