//! Modal viewer for project files: notebooks get cell rendering, everything
//! else is shown as code.

use super::images::{show_image, ImageCache};
use super::tasks::Request;
use crate::api::{ApiClient, ApiError};
use crate::notebook::{render_markdown, Block, Cell, Document, Output, Span};
use crate::theme;
use crate::ui::components;
use eframe::egui;
use egui_phosphor::regular as icons;
use tracing::{info, warn};

pub struct FileViewer {
    pub(crate) path: String,
    content: Option<String>,
    document: Option<Document>,
    error: Option<String>,
    request: Request<String>,
    status: Option<String>,
}

impl FileViewer {
    pub fn open(
        runtime: &tokio::runtime::Handle,
        ctx: &egui::Context,
        api: &ApiClient,
        path: &str,
    ) -> Self {
        let mut viewer = Self::empty(path);
        let api = api.clone();
        let fetch_path = path.to_string();
        viewer
            .request
            .start(runtime, ctx, async move { api.fetch_file(&fetch_path).await });
        viewer
    }

    fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            content: None,
            document: None,
            error: None,
            request: Request::default(),
            status: None,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn is_loading(&self) -> bool {
        self.request.in_flight()
    }

    fn receive(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(content) => {
                match Document::parse(&self.path, &content) {
                    Ok(doc) => self.document = Some(doc),
                    Err(msg) => {
                        warn!(path = %self.path, "Notebook did not parse");
                        self.error = Some(msg);
                    }
                }
                self.content = Some(content);
            }
            Err(e) => {
                warn!(path = %self.path, error = %e, "Failed to fetch file");
                let reason = e.user_message(&e.to_string());
                self.error = Some(format!("Unable to load file: {reason}"));
            }
        }
    }

    pub fn poll(&mut self) {
        if let Some(result) = self.request.poll() {
            self.receive(result);
        }
    }

    fn download(&mut self) {
        let Some(content) = &self.content else {
            return;
        };
        let Some(target) = rfd::FileDialog::new()
            .set_file_name(self.file_name())
            .save_file()
        else {
            return;
        };
        match std::fs::write(&target, content) {
            Ok(()) => {
                info!(path = %target.display(), "File saved");
                self.status = Some(format!("Saved to {}", target.display()));
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "Failed to save file");
                self.status = Some(format!("Save failed: {e}"));
            }
        }
    }

    /// Draw the modal. Returns false once the user closes it.
    pub fn show(&mut self, ctx: &egui::Context, images: &mut ImageCache) -> bool {
        self.poll();

        let screen = ctx.screen_rect();
        let width = (screen.width() * 0.8).min(1000.0);
        let height = screen.height() * 0.8;
        let mut keep_open = true;

        let modal = egui::Modal::new(egui::Id::new("file_viewer_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(160))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(width);

                // Title bar
                ui.horizontal(|ui| {
                    let icon = if crate::notebook::is_notebook(&self.path) {
                        icons::NOTEBOOK
                    } else {
                        icons::FILE_CODE
                    };
                    ui.label(egui::RichText::new(icon).size(theme::FONT_HEADING).color(theme::ACCENT));
                    ui.label(
                        egui::RichText::new(self.file_name())
                            .size(theme::FONT_HEADING)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(egui::Button::new(icons::X).frame(false))
                            .on_hover_text("Close")
                            .clicked()
                        {
                            keep_open = false;
                        }
                        if ui
                            .add_enabled(
                                self.content.is_some(),
                                theme::button(format!("{} Download", icons::DOWNLOAD_SIMPLE)),
                            )
                            .clicked()
                        {
                            self.download();
                        }
                    });
                });
                ui.label(
                    egui::RichText::new(&self.path)
                        .monospace()
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
                if let Some(status) = &self.status {
                    ui.label(egui::RichText::new(status).size(theme::FONT_LABEL).color(theme::TEXT_MUTED));
                }
                ui.separator();

                egui::ScrollArea::vertical()
                    .max_height(height)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        if let Some(err) = &self.error {
                            components::error_card(ui, err);
                        } else if let Some(doc) = &self.document {
                            match doc {
                                Document::Notebook(nb) => {
                                    for (i, cell) in nb.cells.iter().enumerate() {
                                        render_cell(ui, ctx, images, &self.path, i, cell);
                                    }
                                }
                                Document::Code(text) => code_block(ui, text),
                            }
                        } else {
                            components::loading_row(ui, "Loading file...");
                        }
                    });
            });

        if modal.should_close() {
            keep_open = false;
        }
        keep_open
    }
}

fn code_block(ui: &mut egui::Ui, text: &str) {
    theme::code_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.add(egui::Label::new(
            egui::RichText::new(text).monospace().color(theme::TEXT_SECONDARY),
        ));
    });
}

fn render_cell(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    images: &mut ImageCache,
    path: &str,
    index: usize,
    cell: &Cell,
) {
    match cell {
        Cell::Markdown { source } => {
            for block in render_markdown(source) {
                render_block(ui, &block);
            }
            ui.add_space(theme::SPACING_MD);
        }
        Cell::Code {
            source,
            execution_count,
            outputs,
        } => {
            let count = execution_count.map(|n| n.to_string()).unwrap_or_default();
            ui.label(
                egui::RichText::new(format!("In [{count}]:"))
                    .monospace()
                    .size(theme::FONT_SMALL)
                    .color(theme::ACCENT),
            );
            code_block(ui, source);
            if !outputs.is_empty() {
                ui.label(
                    egui::RichText::new(format!("Out [{count}]:"))
                        .monospace()
                        .size(theme::FONT_SMALL)
                        .color(theme::ACCENT_ALT),
                );
                for (j, output) in outputs.iter().enumerate() {
                    let key = format!("{path}#{index}:{j}");
                    render_output(ui, ctx, images, &key, output.kind());
                }
            }
            ui.add_space(theme::SPACING_LG);
        }
        Cell::Raw { source } => {
            code_block(ui, source);
            ui.add_space(theme::SPACING_MD);
        }
        Cell::Unknown => {}
    }
}

fn render_block(ui: &mut egui::Ui, block: &Block) {
    match block {
        Block::Heading(level, text) => {
            let size = match level {
                1 => 24.0,
                2 => 20.0,
                _ => theme::FONT_TITLE,
            };
            ui.label(egui::RichText::new(text).size(size).strong().color(theme::TEXT_PRIMARY));
        }
        Block::Paragraph(spans) => {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                for span in spans {
                    match span {
                        Span::Plain(t) => ui.label(egui::RichText::new(t).color(theme::TEXT_SECONDARY)),
                        Span::Bold(t) => ui.label(egui::RichText::new(t).strong().color(theme::TEXT_PRIMARY)),
                    };
                }
            });
        }
        Block::ListItem(text) => {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new("•").color(theme::ACCENT));
                ui.label(egui::RichText::new(text).color(theme::TEXT_SECONDARY));
            });
        }
        Block::Spacer => ui.add_space(theme::SPACING_SM),
    }
}

fn render_output(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    images: &mut ImageCache,
    key: &str,
    output: Output,
) {
    match output {
        Output::Error {
            name,
            message,
            traceback,
        } => {
            theme::tinted_frame(theme::STATUS_ERROR).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    egui::RichText::new(format!("{name}: {message}"))
                        .strong()
                        .color(theme::STATUS_ERROR),
                );
                if !traceback.is_empty() {
                    ui.label(egui::RichText::new(traceback).monospace().size(theme::FONT_SMALL));
                }
            });
        }
        Output::Image(data) => {
            let width = ui.available_width();
            let state = images.embedded(ctx, key, &data);
            show_image(ui, state, width);
        }
        Output::Html(markup) => {
            ui.label(
                egui::RichText::new("HTML output")
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );
            code_block(ui, &markup);
        }
        Output::Text(text) => code_block(ui, &text),
        Output::Empty => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::serve_once;
    use std::time::{Duration, Instant};

    fn fetch(status: u16, body: &str, path: &str) -> FileViewer {
        let (base, _rx) = serve_once(status, "text/plain", body);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut viewer = FileViewer::open(rt.handle(), &ctx, &ApiClient::new(&base), path);
        let deadline = Instant::now() + Duration::from_secs(5);
        while viewer.is_loading() && Instant::now() < deadline {
            viewer.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
        viewer
    }

    #[test]
    fn malformed_notebook_shows_inline_error() {
        let viewer = fetch(200, "{ not json", "notebooks/01_data_exploration.ipynb");
        assert_eq!(viewer.error.as_deref(), Some("Failed to parse notebook JSON"));
        assert!(viewer.document.is_none());
        // Raw content stays downloadable
        assert_eq!(viewer.content.as_deref(), Some("{ not json"));
    }

    #[test]
    fn script_renders_as_code() {
        let viewer = fetch(200, "print('hi')\n", "backend/main.py");
        assert!(matches!(viewer.document, Some(Document::Code(ref s)) if s == "print('hi')\n"));
        assert!(viewer.error.is_none());
        assert_eq!(viewer.file_name(), "main.py");
    }

    #[test]
    fn missing_file_reports_reason() {
        let viewer = fetch(404, r#"{"detail": "File not found"}"#, "notebooks/missing.ipynb");
        assert_eq!(viewer.error.as_deref(), Some("Unable to load file: File not found"));
    }

    #[test]
    fn transport_failure_is_not_fatal() {
        let mut viewer = FileViewer::empty("src/preprocessing/feature_engineer.py");
        viewer.receive(Err(ApiError::Status { status: 500, detail: None }));
        assert_eq!(
            viewer.error.as_deref(),
            Some("Unable to load file: HTTP 500: request failed")
        );
    }
}
