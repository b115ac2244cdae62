//! About view: project background, backend info, project files, connection

use super::tasks::Request;
use super::{App, FileViewer};
use crate::constants::PROJECT_FILES;
use crate::theme;
use crate::types::ApiInfo;
use crate::ui::components;
use eframe::egui;
use egui_phosphor::regular as icons;
use tracing::{info, warn};

pub struct AboutState {
    info: Option<ApiInfo>,
    info_error: Option<String>,
    info_req: Request<ApiInfo>,
    requested: bool,
    pub(crate) url_input: String,
    url_error: Option<String>,
}

/// Accepts http(s) URLs only; trailing slashes are dropped
pub fn normalize_base_url(input: &str) -> Result<String, &'static str> {
    let url = input.trim().trim_end_matches('/');
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or("URL must start with http:// or https://")?;
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err("URL must include a host");
    }
    Ok(url.to_string())
}

impl AboutState {
    pub fn new(api_url: &str) -> Self {
        Self {
            info: None,
            info_error: None,
            info_req: Request::default(),
            requested: false,
            url_input: api_url.to_string(),
            url_error: None,
        }
    }

    /// Forget backend info so it is fetched again from the new URL
    pub fn reset(&mut self) {
        self.info_req.abandon();
        self.info = None;
        self.info_error = None;
        self.requested = false;
    }
}

impl App {
    pub(crate) fn render_about(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if !self.about.requested {
            self.about.requested = true;
            let api = self.api.clone();
            self.about
                .info_req
                .start(self.runtime.handle(), ctx, async move { api.api_info().await });
        }
        if let Some(result) = self.about.info_req.poll() {
            match result {
                Ok(info) => {
                    self.about.info = Some(info);
                    self.about.info_error = None;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load API info");
                    self.about.info_error = Some(e.to_string());
                }
            }
        }

        components::page_header(
            ui,
            icons::INFO,
            "About This Project",
            "An educational machine learning system demonstrating gradient boosting with explainability",
        );

        components::card(ui, "Project Overview", None, |ui| {
            ui.label(
                egui::RichText::new(
                    "CatBoost gradient boosting with SHAP and LIME explainability, applied to \
                     Sri Lankan lottery draw history from the National Lotteries Board (NLB) and \
                     the Development Lotteries Board (DLB).",
                )
                .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(theme::SPACING_MD);
            let w = components::tile_width(ui, 4);
            ui.horizontal(|ui| {
                components::stat_tile(ui, "Lotteries", "17", w);
                components::stat_tile(ui, "Draws", "8,085", w);
                components::stat_tile(ui, "Samples", "485K", w);
                components::stat_tile(ui, "Features", "20", w);
            });
        });
        ui.add_space(theme::SPACING_LG);

        components::card(ui, "Methodology", None, |ui| {
            for (title, body) in [
                (
                    "Algorithm",
                    "CatBoost classifier: native categorical handling and built-in overfitting protection",
                ),
                (
                    "Features",
                    "Frequency, temporal, statistical and hot/cold features per number and draw",
                ),
                (
                    "SHAP",
                    "TreeExplainer over 10,000 samples for global importance",
                ),
                (
                    "LIME",
                    "Instance-level explanations; 85%+ agreement with SHAP",
                ),
            ] {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("•").color(theme::ACCENT));
                    ui.label(egui::RichText::new(title).strong().color(theme::TEXT_PRIMARY));
                    ui.label(egui::RichText::new(body).color(theme::TEXT_SECONDARY));
                });
            }
        });
        ui.add_space(theme::SPACING_LG);

        components::note_card(
            ui,
            theme::STATUS_WARNING,
            icons::WARNING,
            "Ethical Disclaimer",
            "Lottery draws are random. This project is an academic exercise in machine learning \
             and explainability. It is not intended for gambling, and no prediction here should \
             be used to buy tickets.",
        );
        ui.add_space(theme::SPACING_LG);

        self.render_project_files(ui, ctx);
        ui.add_space(theme::SPACING_LG);
        self.render_backend_info(ui);
        ui.add_space(theme::SPACING_LG);
        self.render_connection(ui, ctx);
    }

    fn render_project_files(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        components::card(
            ui,
            "Project Files",
            Some("Notebooks and scripts served by the backend"),
            |ui| {
                for (label, path) in PROJECT_FILES {
                    ui.horizontal(|ui| {
                        let icon = if crate::notebook::is_notebook(path) {
                            icons::NOTEBOOK
                        } else {
                            icons::FILE_CODE
                        };
                        ui.label(egui::RichText::new(icon).color(theme::ACCENT));
                        if ui
                            .link(egui::RichText::new(*label).color(theme::TEXT_PRIMARY))
                            .clicked()
                        {
                            info!(path, "Opening project file");
                            self.file_viewer = Some(FileViewer::open(
                                self.runtime.handle(),
                                ctx,
                                &self.api,
                                path,
                            ));
                        }
                        ui.label(
                            egui::RichText::new(*path)
                                .monospace()
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        );
                    });
                }
            },
        );
    }

    fn render_backend_info(&mut self, ui: &mut egui::Ui) {
        components::card(ui, "Backend", None, |ui| {
            match (&self.about.info, &self.about.info_error) {
                (Some(info), _) => {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&info.message).strong().color(theme::TEXT_PRIMARY));
                        components::badge(ui, &format!("v{}", info.version), theme::ACCENT_MUTED, theme::ACCENT_LIGHT);
                    });
                    if !info.description.is_empty() {
                        ui.label(egui::RichText::new(&info.description).color(theme::TEXT_SECONDARY));
                    }
                    if !info.warning.is_empty() {
                        ui.label(egui::RichText::new(&info.warning).color(theme::STATUS_WARNING));
                    }
                    if !info.endpoints.is_empty() {
                        ui.add_space(theme::SPACING_SM);
                        egui::Grid::new("endpoints_grid")
                            .num_columns(2)
                            .spacing([24.0, 2.0])
                            .show(ui, |ui| {
                                for (name, route) in &info.endpoints {
                                    ui.label(egui::RichText::new(name).color(theme::TEXT_MUTED));
                                    ui.label(egui::RichText::new(route).monospace());
                                    ui.end_row();
                                }
                            });
                    }
                }
                (None, Some(err)) => components::error_card(ui, &format!("Backend info unavailable: {err}")),
                (None, None) => components::loading_row(ui, "Contacting backend..."),
            }
            ui.add_space(theme::SPACING_SM);
            if ui
                .add(theme::button(format!("{} Open API docs", icons::ARROW_SQUARE_OUT)))
                .clicked()
            {
                let url = self.api.url("/docs");
                if let Err(e) = open::that(&url) {
                    warn!(url = %url, error = %e, "Failed to open API docs");
                }
            }
        });
    }

    fn render_connection(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mut apply = None;
        components::card(
            ui,
            "Connection",
            Some("Base URL of the prediction service"),
            |ui| {
                ui.horizontal(|ui| {
                    let edit = ui.add(
                        egui::TextEdit::singleline(&mut self.about.url_input)
                            .hint_text(crate::constants::DEFAULT_API_BASE_URL)
                            .desired_width(320.0),
                    );
                    let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.add(theme::button_accent("Save")).clicked() || enter {
                        match normalize_base_url(&self.about.url_input) {
                            Ok(url) => {
                                self.about.url_error = None;
                                self.about.url_input = url.clone();
                                apply = Some(url);
                            }
                            Err(msg) => self.about.url_error = Some(msg.to_string()),
                        }
                    }
                });
                if let Some(err) = &self.about.url_error {
                    ui.label(egui::RichText::new(err).color(theme::STATUS_ERROR));
                }
                ui.label(
                    egui::RichText::new(format!(
                        "Currently using {}. The {} environment variable overrides the saved value on start.",
                        self.api.base_url(),
                        crate::constants::API_URL_ENV
                    ))
                    .size(theme::FONT_LABEL)
                    .color(theme::TEXT_DIM),
                );
            },
        );
        if let Some(url) = apply {
            self.set_api_base_url(ctx, &url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_validation() {
        assert_eq!(normalize_base_url(" http://localhost:8000/ "), Ok("http://localhost:8000".to_string()));
        assert_eq!(normalize_base_url("https://api.example.org"), Ok("https://api.example.org".to_string()));
        assert!(normalize_base_url("localhost:8000").is_err());
        assert!(normalize_base_url("http://").is_err());
        assert!(normalize_base_url("http://bad host").is_err());
    }

    #[test]
    fn reset_keeps_typed_url() {
        let mut state = AboutState::new("http://localhost:8000");
        state.requested = true;
        state.url_input = "http://10.0.0.2:8000".to_string();
        state.reset();
        assert!(!state.requested);
        assert_eq!(state.url_input, "http://10.0.0.2:8000");
    }
}
