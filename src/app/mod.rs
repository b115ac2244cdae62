//! App module - contains the main application state and logic

mod about;
mod explain;
mod file_viewer;
mod home;
pub(crate) mod images;
mod lotteries;
mod predict;
mod results;
pub(crate) mod tasks;

pub(crate) use about::AboutState;
pub(crate) use explain::ExplainState;
pub(crate) use file_viewer::FileViewer;
pub(crate) use home::HomeState;
pub(crate) use lotteries::LotteryList;
pub(crate) use predict::PredictState;

use crate::api::ApiClient;
use crate::settings::Settings;
use crate::theme;
use crate::types::*;
use eframe::egui;
use images::ImageCache;
use std::path::PathBuf;
use tasks::Request;
use tracing::{debug, info, warn};

// ============================================================================
// NAVIGATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Predict,
    Explain,
    Results,
    About,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Home,
        View::Predict,
        View::Explain,
        View::Results,
        View::About,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Predict => "Predict",
            View::Explain => "Explain",
            View::Results => "Results",
            View::About => "About",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            View::Home => egui_phosphor::regular::HOUSE,
            View::Predict => egui_phosphor::regular::SPARKLE,
            View::Explain => egui_phosphor::regular::LIGHTBULB,
            View::Results => egui_phosphor::regular::CHART_BAR,
            View::About => egui_phosphor::regular::INFO,
        }
    }

    /// Key persisted in settings
    pub fn key(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Predict => "predict",
            View::Explain => "explain",
            View::Results => "results",
            View::About => "about",
        }
    }

    pub fn from_key(key: &str) -> Option<View> {
        View::ALL.into_iter().find(|v| v.key() == key)
    }
}

/// Backend reachability shown by the nav bar dot
#[derive(Debug, Clone, PartialEq)]
pub enum Health {
    Checking,
    Online(HealthStatus),
    Offline(String),
}

impl Health {
    pub fn color(&self) -> egui::Color32 {
        match self {
            Health::Checking => theme::TEXT_DIM,
            Health::Online(status) if status.model_loaded => theme::STATUS_SUCCESS,
            Health::Online(_) => theme::STATUS_WARNING,
            Health::Offline(_) => theme::STATUS_ERROR,
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            Health::Checking => "Checking backend...".to_string(),
            Health::Online(status) if status.model_loaded => format!(
                "Backend online, model loaded (explainability {})",
                if status.shap_loaded { "ready" } else { "unavailable" }
            ),
            Health::Online(_) => "Backend online, model not loaded".to_string(),
            Health::Offline(reason) => format!("Backend unreachable: {reason}"),
        }
    }
}

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) api: ApiClient,
    /// Base URL as saved in settings; `api` may use an env override instead
    pub(crate) saved_api_url: String,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) data_dir: PathBuf,
    pub(crate) view: View,
    pub(crate) default_lottery: String,
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    // Session data shared by several views
    pub(crate) health: Health,
    pub(crate) health_req: Request<HealthStatus>,
    pub(crate) lotteries: LotteryList,
    // Per-view state
    pub(crate) home: HomeState,
    pub(crate) predict: PredictState,
    pub(crate) explain: ExplainState,
    pub(crate) about: AboutState,
    pub(crate) file_viewer: Option<FileViewer>,
    pub(crate) images: ImageCache,
    // Window geometry, saved on exit
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        // Apply theme from theme.rs
        theme::apply_visuals(&cc.egui_ctx);

        let api_url = settings.effective_api_url();
        info!(url = %api_url, "Using prediction service");

        let view = View::from_key(&settings.last_view).unwrap_or(View::Home);

        let mut app = Self {
            api: ApiClient::new(&api_url),
            saved_api_url: settings.api_base_url.clone(),
            runtime,
            data_dir,
            view,
            default_lottery: settings.default_lottery.clone(),
            logo_texture: None,
            health: Health::Checking,
            health_req: Request::default(),
            lotteries: LotteryList::default(),
            home: HomeState::default(),
            predict: PredictState::new(&settings.default_lottery),
            explain: ExplainState::new(&settings.default_lottery),
            about: AboutState::new(&api_url),
            file_viewer: None,
            images: ImageCache::default(),
            window_pos: None,
            window_size: None,
            needs_center: false,
        };
        app.check_health(&cc.egui_ctx);
        app
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            api_base_url: self.saved_api_url.clone(),
            default_lottery: self.default_lottery.clone(),
            last_view: self.view.key().to_string(),
        };
        settings.save(&self.data_dir);
    }

    pub(crate) fn set_view(&mut self, view: View) {
        if self.view != view {
            debug!(from = self.view.key(), to = view.key(), "Switching view");
            self.view = view;
            self.retry_failed_fetches();
        }
    }

    /// Point the client at a new backend. Everything fetched from the old
    /// one is dropped and fetched again on demand.
    pub(crate) fn set_api_base_url(&mut self, ctx: &egui::Context, url: &str) {
        let api = ApiClient::new(url);
        info!(url = %api.base_url(), "API base URL changed");
        self.saved_api_url = api.base_url().to_string();
        self.api = api;

        self.lotteries.reset();
        self.home.reset();
        self.about.reset();
        self.images.clear();

        self.save_settings();
        self.check_health(ctx);
    }

    /// Session data that failed to load is fetched again on next use
    fn retry_failed_fetches(&mut self) {
        self.lotteries.retry_if_failed();
        self.home.retry_if_failed();
    }

    pub(crate) fn check_health(&mut self, ctx: &egui::Context) {
        self.retry_failed_fetches();
        self.health = Health::Checking;
        let api = self.api.clone();
        self.health_req
            .start(self.runtime.handle(), ctx, async move { api.health_check().await });
    }

    pub(crate) fn ensure_lotteries(&mut self, ctx: &egui::Context) {
        self.lotteries.ensure(self.runtime.handle(), ctx, &self.api);
    }

    /// Collect results for session-wide requests
    pub(crate) fn poll_session(&mut self) {
        if let Some(result) = self.health_req.poll() {
            self.health = match result {
                Ok(status) => {
                    debug!(model_loaded = status.model_loaded, "Health check ok");
                    Health::Online(status)
                }
                Err(e) => {
                    warn!(error = %e, "Health check failed");
                    Health::Offline(e.to_string())
                }
            };
        }
        self.lotteries.poll();
    }

    /// Combo box listing the known lotteries, bound to `selected`
    pub(crate) fn lottery_picker(
        ui: &mut egui::Ui,
        id: &str,
        lotteries: &LotteryList,
        selected: &mut String,
    ) {
        let current = lotteries.items.iter().find(|l| &l.name == selected);
        let text = match current {
            Some(info) => info.picker_label(),
            None if lotteries.items.is_empty() && lotteries.error.is_none() => {
                "Loading lotteries...".to_string()
            }
            None => selected.clone(),
        };
        egui::ComboBox::from_id_salt(id)
            .selected_text(text)
            .width(ui.available_width().min(420.0))
            .show_ui(ui, |ui| {
                for info in &lotteries.items {
                    ui.selectable_value(selected, info.name.clone(), info.picker_label());
                }
            });
        if let Some(err) = &lotteries.error {
            ui.label(
                egui::RichText::new(format!("{} {err}", egui_phosphor::regular::WARNING_CIRCLE))
                    .size(theme::FONT_LABEL)
                    .color(theme::STATUS_ERROR),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_keys_round_trip() {
        for view in View::ALL {
            assert_eq!(View::from_key(view.key()), Some(view));
        }
        assert_eq!(View::from_key("settings"), None);
    }

    #[test]
    fn health_dot_colors() {
        let status = |model_loaded| HealthStatus {
            status: "healthy".to_string(),
            model_loaded,
            shap_loaded: false,
            timestamp: String::new(),
        };
        assert_eq!(Health::Online(status(true)).color(), theme::STATUS_SUCCESS);
        assert_eq!(Health::Online(status(false)).color(), theme::STATUS_WARNING);
        assert_eq!(Health::Offline("refused".into()).color(), theme::STATUS_ERROR);
    }
}
