use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::background::BackgroundFetcher;
use crate::location::LocationResolver;
use crate::state::ResolutionState;

/// Runs one resolution cycle: locate, exchange for a background, settle.
///
/// Geolocation problems never surface here. Any webhook failure becomes
/// `Failed` with the error's message.
pub async fn run_cycle(resolver: &LocationResolver, fetcher: &BackgroundFetcher) -> ResolutionState {
    let location = resolver.resolve().await;

    match fetcher.fetch(&location).await {
        Ok(background) => ResolutionState::ready(background.location, background.image_url),
        Err(e) => {
            tracing::error!("Background request failed: {}", e);
            ResolutionState::failed(e.to_string())
        }
    }
}

/// Owns the UI-visible [`ResolutionState`] and is its only writer.
///
/// Every cycle is tagged with a generation. A result is published only if
/// its generation is still current and the state is still `Loading`, so a
/// superseded or torn-down cycle can never overwrite newer state.
#[derive(Clone)]
pub struct ResolutionController {
    inner: Arc<Inner>,
}

struct Inner {
    resolver: LocationResolver,
    fetcher: BackgroundFetcher,
    state: watch::Sender<ResolutionState>,
    generation: AtomicU64,
    started: AtomicBool,
    closed: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn publish(&self, generation: u64, outcome: ResolutionState) -> bool {
        self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation || !current.is_loading() {
                return false;
            }
            *current = outcome;
            true
        })
    }
}

impl ResolutionController {
    pub fn new(resolver: LocationResolver, fetcher: BackgroundFetcher) -> Self {
        let (state, _) = watch::channel(ResolutionState::Loading);

        Self {
            inner: Arc::new(Inner {
                resolver,
                fetcher,
                state,
                generation: AtomicU64::new(0),
                started: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                task: Mutex::new(None),
            }),
        }
    }

    /// Launches the initial cycle. Only the first call does anything.
    pub fn start(&self) -> bool {
        let mut task = self.inner.task.lock();
        if self.inner.closed.load(Ordering::SeqCst) || self.inner.started.swap(true, Ordering::SeqCst)
        {
            return false;
        }

        let generation = self.inner.generation.load(Ordering::SeqCst);
        *task = Some(self.spawn_cycle(generation));
        true
    }

    /// Abandons the current cycle, re-enters `Loading` and starts over.
    pub fn restart(&self) -> bool {
        let mut task = self.inner.task.lock();
        if self.inner.closed.load(Ordering::SeqCst) {
            return false;
        }
        self.inner.started.store(true, Ordering::SeqCst);

        if let Some(previous) = task.take() {
            previous.abort();
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_replace(ResolutionState::Loading);

        tracing::info!("Restarting resolution (cycle {})", generation);
        *task = Some(self.spawn_cycle(generation));
        true
    }

    /// Tears the controller down. In-flight work is abandoned and its
    /// result, should it still arrive, is ignored.
    pub fn shutdown(&self) {
        let mut task = self.inner.task.lock();
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = task.take() {
            handle.abort();
        }
        // wake anyone blocked in wait_settled
        self.inner.state.send_modify(|_| {});
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ResolutionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.inner.state.subscribe()
    }

    /// Waits for the current cycle to leave `Loading`. Returns immediately
    /// with whatever is current once the controller has been shut down.
    pub async fn wait_settled(&self) -> ResolutionState {
        let mut receiver = self.subscribe();
        let closed = &self.inner.closed;

        receiver
            .wait_for(|state| state.is_settled() || closed.load(Ordering::SeqCst))
            .await
            .map(|state| state.clone())
            .unwrap_or_else(|_| self.state())
    }

    fn spawn_cycle(&self, generation: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tracing::info!("Starting resolution cycle {}", generation);
            let outcome = run_cycle(&inner.resolver, &inner.fetcher).await;

            if inner.publish(generation, outcome) {
                tracing::info!("Resolution cycle {} settled", generation);
            } else {
                tracing::debug!("Discarding stale result of cycle {}", generation);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use crate::models::LocationData;
    use reqwest::Client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Controller whose geolocation always falls back (ip lookup answers 500)
    async fn controller_for(server: &MockServer) -> ResolutionController {
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(500))
            .mount(server)
            .await;

        let client = Arc::new(Client::new());
        let endpoints = Endpoints {
            ip_lookup_url: format!("{}/ip", server.uri()),
            geo_api_base: format!("{}/geo", server.uri()),
            webhook_url: format!("{}/webhook", server.uri()),
        };
        let fetcher = BackgroundFetcher::new(Arc::clone(&client), endpoints.webhook_url.clone());
        let resolver = LocationResolver::new(client, endpoints);
        ResolutionController::new(resolver, fetcher)
    }

    async fn wait_for_webhook_request(server: &MockServer) {
        let received = async {
            loop {
                let requests = server.received_requests().await.unwrap_or_default();
                if requests.iter().any(|request| request.url.path() == "/webhook") {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), received)
            .await
            .expect("webhook was never called");
    }

    fn image_reply(url: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "imgUrl": url }))
    }

    #[tokio::test]
    async fn test_start_reaches_ready_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(image_reply("https://x/nyc.png"))
            .expect(1)
            .mount(&server)
            .await;
        let controller = controller_for(&server).await;

        assert!(controller.state().is_loading());
        assert!(controller.start());
        assert!(!controller.start());

        let state = controller.wait_settled().await;
        assert_eq!(
            state,
            ResolutionState::ready(LocationData::fallback(), "https://x/nyc.png")
        );
        assert_eq!(controller.state(), state);
    }

    #[tokio::test]
    async fn test_webhook_failure_reaches_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let controller = controller_for(&server).await;
        controller.start();

        match controller.wait_settled().await {
            ResolutionState::Failed { message } => assert!(message.contains("404")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_restart_after_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(image_reply("https://x/second.png"))
            .mount(&server)
            .await;
        let controller = controller_for(&server).await;

        controller.start();
        assert!(matches!(
            controller.wait_settled().await,
            ResolutionState::Failed { .. }
        ));

        assert!(controller.restart());
        assert!(controller.state().is_loading());

        match controller.wait_settled().await {
            ResolutionState::Ready {
                background_image_url,
                ..
            } => assert_eq!(background_image_url, "https://x/second.png"),
            other => panic!("expected ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_discards_in_flight_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(image_reply("https://x/late.png").set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        let controller = controller_for(&server).await;

        controller.start();
        wait_for_webhook_request(&server).await;
        controller.shutdown();

        assert!(controller.wait_settled().await.is_loading());
        // let the delayed reply land; the aborted cycle must not publish it
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(controller.state().is_loading());

        assert!(controller.is_shut_down());
        assert!(!controller.start());
        assert!(!controller.restart());
    }

    #[tokio::test]
    async fn test_stale_generation_is_not_published() {
        let server = MockServer::start().await;
        let controller = controller_for(&server).await;

        controller.inner.generation.fetch_add(1, Ordering::SeqCst);
        let stale = ResolutionState::failed("stale");
        assert!(!controller.inner.publish(0, stale));
        assert!(controller.state().is_loading());

        assert!(controller.inner.publish(1, ResolutionState::failed("current")));
        // terminal states are never overwritten within a cycle
        assert!(!controller.inner.publish(1, ResolutionState::failed("again")));
        assert_eq!(controller.state(), ResolutionState::failed("current"));
    }
}
