//! Report image and embedded notebook image loading

use crate::api::ApiClient;
use crate::theme;
use base64::Engine;
use eframe::egui;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub enum ImageState {
    Loading,
    Ready(egui::TextureHandle),
    Failed(String),
}

type Arrivals = Arc<Mutex<Vec<(String, Result<Vec<u8>, String>)>>>;

#[derive(Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageState>,
    arrived: Arrivals,
}

/// Decode PNG (or any format `image` knows) into an egui image
pub fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw()))
}

impl ImageCache {
    /// State of a static asset, fetching it on first use
    pub fn asset(
        &mut self,
        ctx: &egui::Context,
        runtime: &tokio::runtime::Handle,
        api: &ApiClient,
        path: &str,
    ) -> &ImageState {
        self.collect(ctx);
        if !self.entries.contains_key(path) {
            debug!(path, "Fetching image");
            self.entries.insert(path.to_string(), ImageState::Loading);
            let api = api.clone();
            let key = path.to_string();
            let arrived = self.arrived.clone();
            let ctx = ctx.clone();
            runtime.spawn(async move {
                let result = api.fetch_asset(&key).await.map_err(|e| e.to_string());
                if let Ok(mut a) = arrived.lock() {
                    a.push((key, result));
                }
                ctx.request_repaint();
            });
        }
        &self.entries[path]
    }

    /// State of a base64 image embedded in a notebook, decoded on first use
    pub fn embedded(&mut self, ctx: &egui::Context, key: &str, base64_png: &str) -> &ImageState {
        if !self.entries.contains_key(key) {
            let state = base64::engine::general_purpose::STANDARD
                .decode(base64_png)
                .map_err(|e| e.to_string())
                .and_then(|bytes| decode_image(&bytes))
                .map(|img| ImageState::Ready(ctx.load_texture(key, img, egui::TextureOptions::LINEAR)))
                .unwrap_or_else(|e| {
                    warn!(key, error = %e, "Embedded image could not be decoded");
                    ImageState::Failed(e)
                });
            self.entries.insert(key.to_string(), state);
        }
        &self.entries[key]
    }

    /// Upload fetched bytes as textures
    fn collect(&mut self, ctx: &egui::Context) {
        let arrived: Vec<_> = match self.arrived.lock() {
            Ok(mut a) => a.drain(..).collect(),
            Err(_) => return,
        };
        for (key, result) in arrived {
            let state = match result.and_then(|bytes| decode_image(&bytes)) {
                Ok(img) => ImageState::Ready(ctx.load_texture(&key, img, egui::TextureOptions::LINEAR)),
                Err(e) => {
                    warn!(path = %key, error = %e, "Image unavailable");
                    ImageState::Failed(e)
                }
            };
            self.entries.insert(key, state);
        }
    }

    /// Drop everything, e.g. after the backend URL changes. Fetches still
    /// running land in the old arrivals slot and are never collected.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.arrived = Arrivals::default();
    }
}

/// Draw an image scaled down to fit `max_width`, or its placeholder
pub fn show_image(ui: &mut egui::Ui, state: &ImageState, max_width: f32) {
    match state {
        ImageState::Loading => {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new().color(theme::ACCENT));
                ui.label(egui::RichText::new("Loading image...").color(theme::TEXT_DIM));
            });
        }
        ImageState::Ready(texture) => {
            let size = texture.size_vec2();
            let scale = (max_width / size.x).min(1.0);
            ui.image(egui::load::SizedTexture::new(texture.id(), size * scale));
        }
        ImageState::Failed(reason) => {
            theme::section_frame().show(ui, |ui| {
                ui.set_width(max_width.min(ui.available_width()));
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(egui_phosphor::regular::IMAGE_BROKEN)
                            .size(28.0)
                            .color(theme::TEXT_DIM),
                    );
                    ui.label(egui::RichText::new("Image unavailable").color(theme::TEXT_MUTED));
                })
                .response
                .on_hover_text(reason.as_str());
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_dimensions() {
        let img = decode_image(&tiny_png()).unwrap();
        assert_eq!(img.size, [3, 2]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_image(b"not an image").is_err());
    }

    #[test]
    fn bad_base64_marks_embedded_image_failed() {
        let ctx = egui::Context::default();
        let mut cache = ImageCache::default();
        assert!(matches!(cache.embedded(&ctx, "nb:0:0", "%%%"), ImageState::Failed(_)));
    }

    #[test]
    fn clear_discards_fetches_from_previous_backend() {
        use crate::api::stub::serve_once;
        use std::io::Read;
        use std::net::TcpListener;
        use std::time::Duration;

        // Old backend accepts, stalls, then hangs up
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let old_base = format!("http://{}", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                std::thread::sleep(Duration::from_millis(300));
            }
        });

        let rt = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut cache = ImageCache::default();
        let path = "/outputs/results/baseline_comparison.png";

        cache.asset(&ctx, rt.handle(), &ApiClient::new(&old_base), path);
        cache.clear();
        std::thread::sleep(Duration::from_millis(800));

        let (new_base, rx) = serve_once(404, "application/json", r#"{"detail": "Not Found"}"#);
        let state = cache.asset(&ctx, rt.handle(), &ApiClient::new(&new_base), path);
        assert!(matches!(state, ImageState::Loading));
        let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(captured.request_line.starts_with(&format!("GET {path}")));
    }
}
