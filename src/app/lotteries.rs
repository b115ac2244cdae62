//! Lottery list shared by the predict and explain pickers

use super::tasks::Request;
use crate::api::{ApiClient, ApiError};
use crate::types::LotteryInfo;
use eframe::egui;
use tracing::{info, warn};

const LOTTERIES_ERROR: &str = "Failed to load lotteries";

/// Fetched once per session; a failed fetch is retried on the next
/// view entry or health check.
#[derive(Default)]
pub struct LotteryList {
    pub(crate) items: Vec<LotteryInfo>,
    pub(crate) error: Option<String>,
    request: Request<Vec<LotteryInfo>>,
    requested: bool,
}

impl LotteryList {
    pub fn ensure(&mut self, runtime: &tokio::runtime::Handle, ctx: &egui::Context, api: &ApiClient) {
        if self.requested {
            return;
        }
        self.requested = true;
        let api = api.clone();
        self.request
            .start(runtime, ctx, async move { api.get_lotteries().await });
    }

    pub fn is_loading(&self) -> bool {
        self.request.in_flight()
    }

    fn receive(&mut self, result: Result<Vec<LotteryInfo>, ApiError>) {
        match result {
            Ok(list) => {
                info!(count = list.len(), "Lotteries loaded");
                self.items = list;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load lotteries");
                self.error = Some(LOTTERIES_ERROR.to_string());
            }
        }
    }

    pub fn poll(&mut self) {
        if let Some(result) = self.request.poll() {
            self.receive(result);
        }
    }

    /// Allow another fetch if the last one failed
    pub fn retry_if_failed(&mut self) {
        if self.error.is_some() && !self.request.in_flight() {
            self.requested = false;
        }
    }

    pub fn reset(&mut self) {
        self.request.abandon();
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::serve_once;
    use std::time::{Duration, Instant};

    fn settle(list: &mut LotteryList) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while list.is_loading() && Instant::now() < deadline {
            list.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn failed_fetch_is_shown_and_retried() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut list = LotteryList::default();

        let (down, _rx) = serve_once(503, "application/json", r#"{"detail": "Model not loaded"}"#);
        list.ensure(rt.handle(), &ctx, &ApiClient::new(&down));
        settle(&mut list);
        assert_eq!(list.error.as_deref(), Some(LOTTERIES_ERROR));
        assert!(list.items.is_empty());

        // Still marked as requested until a retry is allowed
        let (up, rx) = serve_once(
            200,
            "application/json",
            r#"[{"name": "MAHAJANA_SAMPATHA", "display_name": "Mahajana Sampatha",
                 "number_range": "0-9", "draws_in_dataset": 1200, "numbers_per_draw": 6,
                 "has_letter": true, "draw_format": "6 digits + letter"}]"#,
        );
        let api = ApiClient::new(&up);
        list.ensure(rt.handle(), &ctx, &api);
        assert!(!list.is_loading());

        list.retry_if_failed();
        list.ensure(rt.handle(), &ctx, &api);
        settle(&mut list);
        let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(captured.request_line.starts_with("GET /lotteries"));
        assert!(list.error.is_none());
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name, "MAHAJANA_SAMPATHA");
    }

    #[test]
    fn success_is_kept_for_the_session() {
        let mut list = LotteryList::default();
        list.requested = true;
        list.receive(Ok(Vec::new()));
        list.retry_if_failed();
        assert!(list.requested);
    }
}
