//! Background requests: run an API future on the runtime and hand the
//! result back to the UI thread.

use crate::api::ApiError;
use eframe::egui;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

type Slot<T> = Arc<Mutex<Option<(u64, Result<T, ApiError>)>>>;

/// One outstanding request per view action. Starting again supersedes the
/// previous request: its future is cancelled and any result it already
/// produced is dropped on poll.
pub struct Request<T> {
    slot: Slot<T>,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl<T> Default for Request<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            generation: 0,
            cancel: None,
        }
    }
}

impl<T: Send + 'static> Request<T> {
    pub fn start<F>(&mut self, runtime: &tokio::runtime::Handle, ctx: &egui::Context, fut: F)
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }
        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        let slot = self.slot.clone();
        let ctx = ctx.clone();
        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(generation, "Request superseded");
                }
                result = fut => {
                    if let Ok(mut s) = slot.lock() {
                        // Never overwrite a newer request's result
                        if s.as_ref().map_or(true, |(g, _)| *g < generation) {
                            *s = Some((generation, result));
                        }
                    }
                    ctx.request_repaint();
                }
            }
        });
    }

    pub fn in_flight(&self) -> bool {
        self.cancel.is_some()
    }

    /// Take the finished result of the latest request, if any
    pub fn poll(&mut self) -> Option<Result<T, ApiError>> {
        let (generation, result) = self.slot.lock().ok()?.take()?;
        if generation != self.generation {
            debug!(generation, current = self.generation, "Dropping stale result");
            return None;
        }
        self.cancel = None;
        Some(result)
    }

    /// Forget the outstanding request without starting a new one
    pub fn abandon(&mut self) {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }
        self.generation += 1;
    }
}
