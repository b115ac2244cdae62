//! Predict view: pick numbers, ask the model, show ranked probabilities

use super::tasks::Request;
use super::App;
use crate::api::{ApiClient, ApiError};
use crate::constants::{MAX_SELECTION, NUMBER_RANGE, QUICK_PICK_SIZES};
use crate::selection::NumberSelection;
use crate::theme;
use crate::types::PredictionResponse;
use crate::ui::components;
use crate::utils::{format_percent, format_timestamp};
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use egui_phosphor::regular as icons;
use rand::Rng;
use tracing::{debug, info, warn};

const EMPTY_SELECTION: &str = "Please select at least one number";
const PREDICT_FALLBACK: &str = "Failed to get predictions. Make sure the backend is running.";
const BAD_DRAW_ID: &str = "Draw ID must be a whole number";

#[derive(Debug, Clone, PartialEq)]
pub enum PredictPhase {
    Idle,
    Selecting,
    Predicting,
    ShowingResults(PredictionResponse),
    ShowingError(String),
}

/// What gets sent to `POST /predict`
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub lottery: String,
    pub numbers: Vec<u32>,
    pub draw_id: Option<u32>,
}

pub struct PredictState {
    pub(crate) selection: NumberSelection,
    pub(crate) phase: PredictPhase,
    pub(crate) lottery: String,
    pub(crate) draw_id: String,
    request: Request<PredictionResponse>,
}

fn parse_draw_id(input: &str) -> Result<Option<u32>, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(|_| BAD_DRAW_ID)
}

impl PredictState {
    pub fn new(lottery: &str) -> Self {
        Self {
            selection: NumberSelection::default(),
            phase: PredictPhase::Idle,
            lottery: lottery.to_string(),
            draw_id: String::new(),
            request: Request::default(),
        }
    }

    /// Results and errors stay on screen while the selection is edited
    fn settle(&mut self) {
        match self.phase {
            PredictPhase::Idle if !self.selection.is_empty() => self.phase = PredictPhase::Selecting,
            PredictPhase::Selecting if self.selection.is_empty() => self.phase = PredictPhase::Idle,
            _ => {}
        }
    }

    pub fn toggle(&mut self, n: u32) -> bool {
        let changed = self.selection.toggle(n);
        if changed {
            self.settle();
        }
        changed
    }

    pub fn quick_pick<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        self.selection.quick_pick(count, rng);
        debug!(count, picked = ?self.selection.to_vec(), "Quick pick");
        self.settle();
    }

    /// Empty the selection and forget results, errors and any pending request
    pub fn clear(&mut self) {
        self.selection.clear();
        self.request.abandon();
        self.phase = PredictPhase::Idle;
    }

    pub fn is_predicting(&self) -> bool {
        self.phase == PredictPhase::Predicting
    }

    pub fn can_submit(&self) -> bool {
        !self.selection.is_empty() && !self.is_predicting()
    }

    /// Validate and move to `Predicting`. Returns `None` with the phase set
    /// to an error when there is nothing valid to send.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.is_predicting() {
            return None;
        }
        if self.selection.is_empty() {
            self.phase = PredictPhase::ShowingError(EMPTY_SELECTION.to_string());
            return None;
        }
        let draw_id = match parse_draw_id(&self.draw_id) {
            Ok(id) => id,
            Err(msg) => {
                self.phase = PredictPhase::ShowingError(msg.to_string());
                return None;
            }
        };
        self.phase = PredictPhase::Predicting;
        Some(Submission {
            lottery: self.lottery.clone(),
            numbers: self.selection.to_vec(),
            draw_id,
        })
    }

    pub fn finish(&mut self, result: Result<PredictionResponse, ApiError>) {
        self.phase = match result {
            Ok(resp) => {
                info!(
                    lottery = %resp.lottery,
                    count = resp.predictions.len(),
                    top = ?resp.top_5_numbers,
                    "Predictions received"
                );
                PredictPhase::ShowingResults(resp)
            }
            Err(e) => {
                warn!(error = %e, "Prediction failed");
                PredictPhase::ShowingError(e.user_message(PREDICT_FALLBACK))
            }
        };
    }

    pub fn submit(
        &mut self,
        runtime: &tokio::runtime::Handle,
        ctx: &egui::Context,
        api: &ApiClient,
    ) {
        let Some(sub) = self.begin_submit() else {
            return;
        };
        let api = api.clone();
        self.request.start(runtime, ctx, async move {
            api.predict(&sub.lottery, &sub.numbers, sub.draw_id).await
        });
    }

    pub fn poll(&mut self) {
        if let Some(result) = self.request.poll() {
            self.finish(result);
        }
    }
}

impl App {
    pub(crate) fn render_predict(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        self.ensure_lotteries(ctx);
        self.predict.poll();

        components::page_header(
            ui,
            icons::SPARKLE,
            "Lottery Number Predictions",
            "Select numbers to predict their probability of appearing in the next draw",
        );

        self.render_predict_controls(ui);
        ui.add_space(theme::SPACING_LG);
        self.render_number_grid(ui);
        ui.add_space(theme::SPACING_LG);

        // Submit
        ui.vertical_centered(|ui| {
            let predicting = self.predict.is_predicting();
            let label = if predicting {
                "Predicting...".to_string()
            } else {
                format!("{} Get Predictions", icons::SPARKLE)
            };
            let button = ui.add_enabled(
                self.predict.can_submit(),
                theme::button_accent(label).min_size(egui::vec2(200.0, theme::BUTTON_HEIGHT_LARGE)),
            );
            if button.clicked() {
                self.predict.submit(self.runtime.handle(), ctx, &self.api);
            }
            if predicting {
                ui.add(egui::Spinner::new().color(theme::ACCENT));
            }
        });
        ui.add_space(theme::SPACING_LG);

        match &self.predict.phase {
            PredictPhase::ShowingError(msg) => components::error_card(ui, msg),
            PredictPhase::ShowingResults(resp) => render_results(ui, resp),
            _ => {}
        }
    }

    fn render_predict_controls(&mut self, ui: &mut egui::Ui) {
        components::card(
            ui,
            "Selection Controls",
            Some("Choose a lottery and select numbers to predict"),
            |ui| {
                ui.label(egui::RichText::new("Lottery").color(theme::TEXT_MUTED));
                App::lottery_picker(ui, "predict_lottery", &self.lotteries, &mut self.predict.lottery);
                if let Some(info) = self.lotteries.items.iter().find(|l| l.name == self.predict.lottery) {
                    ui.label(
                        egui::RichText::new(format!("Draw format: {}", info.draw_format))
                            .size(theme::FONT_LABEL)
                            .color(theme::TEXT_DIM),
                    );
                }
                ui.add_space(theme::SPACING_MD);

                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Draw ID").color(theme::TEXT_MUTED));
                    ui.add(
                        egui::TextEdit::singleline(&mut self.predict.draw_id)
                            .hint_text("next draw")
                            .desired_width(120.0),
                    )
                    .on_hover_text("Optional. Leave empty to predict the next draw.");
                });
                ui.add_space(theme::SPACING_MD);

                ui.label(egui::RichText::new("Quick actions").color(theme::TEXT_MUTED));
                ui.horizontal_wrapped(|ui| {
                    for count in QUICK_PICK_SIZES {
                        if ui
                            .add(theme::button(format!("{} Quick Pick ({count})", icons::SHUFFLE)))
                            .clicked()
                        {
                            self.predict.quick_pick(count, &mut rand::rng());
                        }
                    }
                    if ui.add(theme::button(format!("{} Clear All", icons::X))).clicked() {
                        self.predict.clear();
                    }
                });
                ui.add_space(theme::SPACING_MD);

                ui.horizontal_wrapped(|ui| {
                    let count = self.predict.selection.len();
                    let (bg, fg) = if count > 0 {
                        (theme::ACCENT_MUTED, theme::ACCENT_LIGHT)
                    } else {
                        (theme::BG_SURFACE, theme::TEXT_MUTED)
                    };
                    components::badge(ui, &format!("Selected: {count} / {MAX_SELECTION} numbers"), bg, fg);

                    // Chips remove a number on click
                    let mut remove = None;
                    for n in self.predict.selection.iter() {
                        if ui
                            .add(
                                egui::Button::new(
                                    egui::RichText::new(format!("{n} {}", icons::X))
                                        .size(theme::FONT_LABEL)
                                        .color(theme::ACCENT_LIGHT),
                                )
                                .fill(theme::ACCENT_MUTED)
                                .corner_radius(theme::RADIUS_DEFAULT),
                            )
                            .clicked()
                        {
                            remove = Some(n);
                        }
                    }
                    if let Some(n) = remove {
                        self.predict.toggle(n);
                    }
                });
            },
        );
    }

    fn render_number_grid(&mut self, ui: &mut egui::Ui) {
        let title = format!(
            "Select Numbers ({}-{})",
            NUMBER_RANGE.start(),
            NUMBER_RANGE.end()
        );
        components::card(
            ui,
            &title,
            Some("Click numbers to select or deselect (max 20)"),
            |ui| {
                let gap = 6.0;
                let per_row = ((ui.available_width() + gap) / (theme::NUMBER_CELL + gap))
                    .floor()
                    .clamp(8.0, 20.0) as u32;
                let full = self.predict.selection.is_full();
                let mut clicked = None;
                egui::Grid::new("number_grid")
                    .spacing([gap, gap])
                    .show(ui, |ui| {
                        for n in NUMBER_RANGE {
                            let selected = self.predict.selection.contains(n);
                            let enabled = selected || !full;
                            if components::number_ball(ui, n, selected, enabled).clicked() {
                                clicked = Some(n);
                            }
                            if (n - NUMBER_RANGE.start() + 1) % per_row == 0 {
                                ui.end_row();
                            }
                        }
                    });
                if let Some(n) = clicked {
                    self.predict.toggle(n);
                }
            },
        );
    }
}

fn render_results(ui: &mut egui::Ui, resp: &PredictionResponse) {
    components::card(
        ui,
        "Top 5 Recommended Numbers",
        Some("Highest probability numbers from your selection"),
        |ui| {
            let picks = resp.top_picks();
            let w = components::tile_width(ui, picks.len().max(1));
            ui.horizontal(|ui| {
                for (i, pred) in picks.iter().enumerate() {
                    theme::section_frame().show(ui, |ui| {
                        ui.set_width(w);
                        ui.vertical_centered(|ui| {
                            ui.label(
                                egui::RichText::new(format!("#{}", i + 1))
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_DIM),
                            );
                            ui.label(
                                egui::RichText::new(pred.number.to_string())
                                    .size(32.0)
                                    .strong()
                                    .color(theme::ACCENT),
                            );
                            ui.label(
                                egui::RichText::new(format_percent(pred.probability))
                                    .size(theme::FONT_HEADING)
                                    .color(theme::TEXT_SECONDARY),
                            );
                            components::confidence_badge(ui, &pred.confidence);
                        });
                    });
                }
            });
        },
    );
    ui.add_space(theme::SPACING_LG);

    components::card(
        ui,
        "All Predictions",
        Some("Probability breakdown for every selected number"),
        |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "Draw {} · {}",
                    resp.draw_id,
                    format_timestamp(&resp.timestamp)
                ))
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_DIM),
            );
            ui.add_space(theme::SPACING_SM);
            TableBuilder::new(ui)
                .id_salt("predictions_table")
                .striped(true)
                .vscroll(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::exact(50.0))
                .column(Column::exact(70.0))
                .column(Column::initial(220.0).at_least(160.0))
                .column(Column::initial(120.0))
                .column(Column::remainder())
                .header(24.0, |mut header| {
                    for title in ["Rank", "Number", "Probability", "Prediction", "Confidence"] {
                        header.col(|ui| {
                            ui.label(egui::RichText::new(title).strong().color(theme::TEXT_MUTED));
                        });
                    }
                })
                .body(|mut body| {
                    for (i, pred) in resp.ranked().into_iter().enumerate() {
                        body.row(theme::NUMBER_CELL + 4.0, |mut row| {
                            row.col(|ui| {
                                ui.label(egui::RichText::new((i + 1).to_string()).color(theme::TEXT_DIM));
                            });
                            row.col(|ui| {
                                components::number_ball(ui, pred.number, true, true);
                            });
                            row.col(|ui| {
                                components::probability_bar(ui, pred.probability, 96.0);
                            });
                            row.col(|ui| {
                                components::prediction_badge(ui, &pred.prediction);
                            });
                            row.col(|ui| {
                                components::confidence_badge(ui, &pred.confidence);
                            });
                        });
                    }
                });
        },
    );
    ui.add_space(theme::SPACING_LG);

    components::note_card(
        ui,
        theme::STATUS_WARNING,
        icons::WARNING,
        "Note",
        "Predictions come from historical patterns learned by a CatBoost model. \
         Lottery outcomes are random. Use for educational purposes only.",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::serve_once;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{Duration, Instant};

    const RESPONSE: &str = r#"{
        "lottery": "MAHAJANA_SAMPATHA",
        "draw_id": 1201,
        "predictions": [
            {"number": 23, "probability": 0.10, "prediction": "Not Appear", "confidence": "Very High (Unlikely)"},
            {"number": 7, "probability": 0.62, "prediction": "Appear", "confidence": "Medium (Likely)"},
            {"number": 42, "probability": 0.05, "prediction": "Not Appear", "confidence": "Very High (Unlikely)"}
        ],
        "top_5_numbers": [7, 23, 42],
        "timestamp": "2026-01-10T12:00:00"
    }"#;

    fn wait(state: &mut PredictState) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.is_predicting() && Instant::now() < deadline {
            state.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn phases_follow_selection() {
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        assert_eq!(state.phase, PredictPhase::Idle);
        assert!(!state.can_submit());
        state.toggle(7);
        assert_eq!(state.phase, PredictPhase::Selecting);
        assert!(state.can_submit());
        state.toggle(7);
        assert_eq!(state.phase, PredictPhase::Idle);
    }

    #[test]
    fn empty_submit_sets_error() {
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        assert!(state.begin_submit().is_none());
        assert_eq!(state.phase, PredictPhase::ShowingError(EMPTY_SELECTION.to_string()));
    }

    #[test]
    fn submission_carries_sorted_numbers_and_draw_id() {
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        for n in [42, 7, 23] {
            state.toggle(n);
        }
        state.draw_id = " 1201 ".to_string();
        let sub = state.begin_submit().unwrap();
        assert_eq!(sub.numbers, vec![7, 23, 42]);
        assert_eq!(sub.draw_id, Some(1201));
        assert!(state.is_predicting());
        assert!(!state.can_submit());
        // A second submit while in flight does nothing
        assert!(state.begin_submit().is_none());
    }

    #[test]
    fn non_numeric_draw_id_is_rejected_locally() {
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        state.toggle(3);
        state.draw_id = "next".to_string();
        assert!(state.begin_submit().is_none());
        assert_eq!(state.phase, PredictPhase::ShowingError(BAD_DRAW_ID.to_string()));
    }

    #[test]
    fn server_detail_or_fallback_is_shown() {
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        state.toggle(3);
        state.begin_submit();
        state.finish(Err(ApiError::Status { status: 400, detail: Some("Invalid lottery".into()) }));
        assert_eq!(state.phase, PredictPhase::ShowingError("Invalid lottery".to_string()));
        state.begin_submit();
        state.finish(Err(ApiError::Status { status: 502, detail: None }));
        assert_eq!(state.phase, PredictPhase::ShowingError(PREDICT_FALLBACK.to_string()));
    }

    #[test]
    fn clear_drops_results() {
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        state.toggle(3);
        state.phase = PredictPhase::ShowingError("x".into());
        state.clear();
        assert_eq!(state.phase, PredictPhase::Idle);
        assert!(state.selection.is_empty());
    }

    #[test]
    fn quick_pick_moves_to_selecting() {
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        state.quick_pick(10, &mut StdRng::seed_from_u64(3));
        assert_eq!(state.selection.len(), 10);
        assert_eq!(state.phase, PredictPhase::Selecting);
    }

    #[test]
    fn predict_round_trip_ranks_results() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let (base, rx) = serve_once(200, "application/json", RESPONSE);
        let api = ApiClient::new(&base);

        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        for n in [7, 23, 42] {
            state.toggle(n);
        }
        state.submit(rt.handle(), &ctx, &api);
        wait(&mut state);

        let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(captured.request_line.starts_with("POST /predict "));
        let PredictPhase::ShowingResults(resp) = &state.phase else {
            panic!("expected results, got {:?}", state.phase);
        };
        let ranked: Vec<(u32, f64)> = resp.ranked().iter().map(|p| (p.number, p.probability)).collect();
        assert_eq!(ranked, vec![(7, 0.62), (23, 0.10), (42, 0.05)]);
        assert_eq!(resp.top_picks()[0].number, 7);
        assert_eq!(format_percent(resp.top_picks()[0].probability), "62.00%");
    }

    #[test]
    fn unreachable_backend_shows_fallback() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let api = ApiClient::new(&format!("http://127.0.0.1:{port}"));
        let mut state = PredictState::new("MAHAJANA_SAMPATHA");
        state.toggle(1);
        state.submit(rt.handle(), &ctx, &api);
        wait(&mut state);
        assert_eq!(state.phase, PredictPhase::ShowingError(PREDICT_FALLBACK.to_string()));
    }
}
