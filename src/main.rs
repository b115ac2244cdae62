#![windows_subsystem = "windows"]
//! Lottery ML Analyzer - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod api;
mod app;
mod constants;
mod notebook;
mod selection;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;

use app::{App, View};
use constants::*;
use eframe::egui;
use tracing::{error, info};

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "lottery-ml-analyzer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lottery_ml_analyzer=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = utils::get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Lottery ML Analyzer starting");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return Err(eframe::Error::AppCreation(Box::new(e)));
        }
    };

    // Load saved window position/size
    let settings = settings::Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1280.0, 860.0)))
        .with_min_inner_size([900.0, 600.0])
        .with_title(APP_NAME);

    // Window/taskbar icon from the embedded SVG
    if let Some((rgba, width, height)) = utils::rasterize_logo_square(256) {
        let icon = egui::IconData { rgba, width, height };
        viewport = viewport.with_icon(std::sync::Arc::new(icon));
    }

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, settings, data_dir, runtime);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        self.poll_session();

        self.render_nav_bar(ctx);

        // Footer disclaimer (before CentralPanel)
        egui::TopBottomPanel::bottom("footer")
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_ELEVATED)
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(
                            "Educational use only. Lottery draws are random; predictions carry no guarantee.",
                        )
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("v{APP_VERSION}"))
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel - active view (MUST be added LAST after all side/top/bottom panels)
        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(0)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt(self.view.key())
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        // Center content column
                        let content_w = ui.available_width().min(theme::CONTENT_MAX_WIDTH);
                        let side = ((ui.available_width() - content_w) / 2.0).max(0.0);
                        ui.horizontal(|ui| {
                            ui.add_space(side);
                            ui.vertical(|ui| {
                                ui.set_width(content_w - 2.0 * theme::SPACING_XL);
                                ui.add_space(theme::SPACING_XL);
                                match self.view {
                                    View::Home => self.render_home(ui, ctx),
                                    View::Predict => self.render_predict(ui, ctx),
                                    View::Explain => self.render_explain(ui, ctx),
                                    View::Results => self.render_results(ui, ctx),
                                    View::About => self.render_about(ui, ctx),
                                }
                                ui.add_space(theme::SPACING_XL * 2.0);
                            });
                        });
                    });
            });

        // File viewer modal
        if let Some(viewer) = &mut self.file_viewer {
            if !viewer.show(ctx, &mut self.images) {
                info!(path = %viewer.path, "File viewer closed");
                self.file_viewer = None;
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
    }
}

// ============================================================================
// NAVIGATION BAR
// ============================================================================

impl App {
    fn render_nav_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("nav_bar")
            .exact_height(theme::NAV_HEIGHT)
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_ELEVATED)
                    .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE))
                    .inner_margin(egui::Margin::symmetric(16, 0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    if self.logo_texture.is_none() {
                        self.logo_texture = utils::rasterize_logo(96).map(|(pixels, w, h)| {
                            ctx.load_texture(
                                "logo",
                                egui::ColorImage::from_rgba_unmultiplied(
                                    [w as usize, h as usize],
                                    &pixels,
                                ),
                                egui::TextureOptions::LINEAR,
                            )
                        });
                    }
                    if let Some(texture) = &self.logo_texture {
                        let aspect = texture.size()[1] as f32 / texture.size()[0] as f32;
                        let logo_w = 48.0;
                        ui.image(egui::load::SizedTexture::new(
                            texture.id(),
                            egui::vec2(logo_w, logo_w * aspect),
                        ));
                    }
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(APP_NAME)
                                .size(theme::FONT_TITLE)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        )
                        .selectable(false),
                    );
                    ui.add_space(theme::SPACING_XL);

                    for view in View::ALL {
                        if nav_tab(ui, view, self.view == view).clicked() {
                            self.set_view(view);
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (rect, response) =
                            ui.allocate_exact_size(egui::vec2(20.0, 20.0), egui::Sense::click());
                        let color = self.health.color();
                        let radius = if response.hovered() { 6.0 } else { 5.0 };
                        ui.painter().circle_filled(rect.center(), radius, color);
                        if response
                            .on_hover_text(format!("{}\nClick to re-check", self.health.tooltip()))
                            .clicked()
                        {
                            self.check_health(ctx);
                        }
                    });
                });
            });
    }
}

/// Tab button with an accent underline when active
fn nav_tab(ui: &mut egui::Ui, view: View, active: bool) -> egui::Response {
    let text = format!("{} {}", view.icon(), view.label());
    let galley = ui.painter().layout_no_wrap(
        text,
        egui::FontId::proportional(theme::FONT_BODY),
        theme::TEXT_PRIMARY,
    );
    let size = egui::vec2(galley.size().x + 24.0, theme::NAV_HEIGHT - 12.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    if ui.is_rect_visible(rect) {
        let (fill, draw_rect) = if active {
            (theme::BG_SURFACE, rect)
        } else {
            theme::button_visual(&response, theme::BG_ELEVATED, rect)
        };
        let painter = ui.painter();
        painter.rect_filled(draw_rect, theme::RADIUS_MEDIUM, fill);
        let color = if active {
            theme::TEXT_PRIMARY
        } else if response.hovered() {
            theme::TEXT_SECONDARY
        } else {
            theme::TEXT_MUTED
        };
        painter.galley_with_override_text_color(
            draw_rect.center() - galley.size() / 2.0,
            galley,
            color,
        );
        if active {
            let underline = egui::Rect::from_min_max(
                egui::pos2(draw_rect.left() + 10.0, draw_rect.bottom() - 2.0),
                egui::pos2(draw_rect.right() - 10.0, draw_rect.bottom()),
            );
            painter.rect_filled(underline, 1.0, theme::ACCENT);
        }
    }
    response
}
