//! Navigation controller
//!
//! Owns the request lifecycle of fragment navigation:
//! - throttling through a sliding request window
//! - a single in-flight navigation, superseded by newer ones
//! - hash history synchronization
//! - logical redirects through the configured sentinel status
//!
//! Every method runs to completion; the controller is driven from one
//! event loop and never locks.

use std::collections::HashMap;
use std::time::Instant;

use splice_dom::{
    AnchorAction, AnchorClick, ContentRenderer, Cursor, DomBridge, FormMethod, FormSubmission,
    Interceptor, RefreshLock, WarningToast,
};
use splice_fetch::{
    Completion, FetchError, FetchRequest, FetchResponse, Fetcher, RequestHandle, RequestId,
};
use splice_navigation::{
    hash_location, hash_url, merge_form_action, normalize_location, request_location, Admission,
    NavigationState, RequestWindow,
};

use crate::config::NavigationConfig;
use crate::failure::NavigationFailure;
use crate::navigator::UiEvent;
use crate::Result;

/// What happened to a fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent(RequestId),
    Throttled,
}

struct InFlightRequest {
    id: RequestId,
    path: String,
    handle: Box<dyn RequestHandle>,
}

struct PendingSubmission {
    history_location: String,
}

pub struct NavigationController<F, D> {
    config: NavigationConfig,
    fetcher: F,
    renderer: ContentRenderer<D>,
    interceptor: Interceptor,
    window: RequestWindow,
    refresh: RefreshLock,
    in_flight: Option<InFlightRequest>,
    submissions: HashMap<RequestId, PendingSubmission>,
    /// Last displayed location, sent in place of a referrer
    last_location: Option<String>,
    state: NavigationState,
}

impl<F: Fetcher, D: DomBridge> NavigationController<F, D> {
    pub fn new(config: NavigationConfig, fetcher: F, dom: D) -> Result<Self> {
        config.validate()?;

        let interceptor = Interceptor::new(
            config.disabled_anchor_classes.iter().cloned(),
            config.exclude_anchor_classes.iter().cloned(),
        );
        let window = RequestWindow::new(config.maximum_ajax_requests, config.request_window());
        let refresh = RefreshLock::new(config.refresh_animation());

        Ok(Self {
            config,
            fetcher,
            renderer: ContentRenderer::new(dom),
            interceptor,
            window,
            refresh,
            in_flight: None,
            submissions: HashMap::new(),
            last_location: None,
            state: NavigationState::Idle,
        })
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn dom(&self) -> &D {
        self.renderer.dom()
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn last_location(&self) -> Option<&str> {
        self.last_location.as_deref()
    }

    /// Path of the navigation request currently in flight
    pub fn in_flight_path(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|r| r.path.as_str())
    }

    /// Attempts still counted by the throttle window
    pub fn pending_attempts(&self) -> usize {
        self.window.len()
    }

    /// A navigation or form submission is awaiting its completion
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || !self.submissions.is_empty()
    }

    /// The logical location held in the document hash
    pub fn current_location(&self) -> String {
        hash_location(&self.renderer.dom().location()).to_string()
    }

    pub fn normalize_location(&self, candidate: &str) -> String {
        normalize_location(
            candidate,
            &self.renderer.dom().location(),
            &self.config.initial_url,
        )
    }

    /// Load whatever the document hash points at, or the initial location.
    pub fn start(&mut self) {
        let location = self.current_location();
        if location.is_empty() {
            self.navigate_to("/", true);
        } else {
            self.navigate_to(&location, true);
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::AnchorClick(click) => {
                self.handle_anchor_click(&click);
            }
            UiEvent::FormSubmit(form) => {
                if let Err(e) = self.submit_form(&form) {
                    tracing::warn!(error = %e, action = ?form.action, "Form submission dropped");
                }
            }
            UiEvent::PopState => self.pop_state(),
            UiEvent::Refresh => {
                self.refresh();
            }
        }
    }

    /// Update history and load `path`.
    pub fn navigate_to(&mut self, path: &str, push_history: bool) -> Dispatch {
        let location = self.normalize_location(path);

        if push_history {
            let url = hash_url(&self.renderer.dom().location(), &location);
            self.renderer.dom_mut().push_history(&url);
        }

        self.fetch_and_render(&location)
    }

    /// Request `path` and render it into the content region.
    pub fn fetch_and_render(&mut self, path: &str) -> Dispatch {
        let now = now();

        if self.window.record(now) == Admission::Throttled {
            tracing::warn!(
                path = %path,
                attempts = self.window.len(),
                limit = self.window.capacity(),
                "Navigation throttled"
            );

            let toast = WarningToast::new(
                self.config.ajax_throttling_message.clone(),
                self.config.throttle_notice(),
            );
            let dom = self.renderer.dom_mut();
            dom.set_cursor(Cursor::Progress);
            dom.warn(&toast);

            // A throttled attempt leaves a running request alone
            if self.state != NavigationState::Requesting {
                self.transition(NavigationState::Throttled);
            }
            return Dispatch::Throttled;
        }

        if let Some(mut previous) = self.in_flight.take() {
            // Abort errors must not flash over the current markup
            let snapshot = self.renderer.replace(None);
            previous.handle.abort();
            self.transition(NavigationState::Cancelled);
            self.renderer.dom_mut().set_cursor(Cursor::Progress);
            self.renderer.replace(Some(&snapshot));

            tracing::debug!(
                request_id = %previous.id,
                path = %previous.path,
                "Superseded in-flight navigation"
            );
        }

        self.transition(NavigationState::Requesting);

        let id = RequestId::new();
        let request = self.outgoing(FetchRequest::get(path));
        let handle = self.fetcher.send(id, request);
        self.in_flight = Some(InFlightRequest {
            id,
            path: path.to_string(),
            handle,
        });

        tracing::info!(request_id = %id, path = %path, "Navigating");

        Dispatch::Sent(id)
    }

    /// Classify an anchor click and act on it.
    pub fn handle_anchor_click(&mut self, click: &AnchorClick) -> AnchorAction {
        let action = self.interceptor.classify(click);

        match &action {
            AnchorAction::Navigate(href) => {
                self.navigate_to(href, true);
            }
            AnchorAction::OpenNewContext(href) => {
                self.renderer.dom_mut().open_new_context(href);
            }
            AnchorAction::Native | AnchorAction::Suppress => {}
        }

        action
    }

    /// Submit a form as a fragment request.
    ///
    /// Returns the request id, or `None` when the form opened a new
    /// browsing context instead.
    pub fn submit_form(&mut self, form: &FormSubmission) -> Result<Option<RequestId>> {
        let document = self.renderer.dom().location();
        let target = merge_form_action(form.action.as_deref(), &form.fields, &document)?;

        if form.opens_new_context() {
            self.renderer.dom_mut().open_new_context(target.merged.as_str());
            return Ok(None);
        }

        // Actions on another origin keep their scheme and host
        let request = match form.method {
            FormMethod::Get => FetchRequest::get(request_location(&target.merged, &document)),
            FormMethod::Post => FetchRequest::post_form(
                request_location(&target.action, &document),
                target.encoded.clone(),
            ),
        };

        let id = RequestId::new();
        let history_location = target.history_location(&document);
        tracing::info!(
            request_id = %id,
            method = request.method.as_str(),
            location = %history_location,
            "Submitting form"
        );

        // Submissions complete independently of navigations
        let _handle = self.fetcher.send(id, self.outgoing(request));
        self.submissions
            .insert(id, PendingSubmission { history_location });

        Ok(Some(id))
    }

    /// Reload the current location, at most once per animation period.
    pub fn refresh(&mut self) -> bool {
        if !self.refresh.try_acquire(now()) {
            tracing::debug!("Refresh ignored while animating");
            return false;
        }

        self.renderer.dom_mut().set_refresh_spinning(true);
        let location = self.current_location();
        self.navigate_to(&location, true);
        true
    }

    /// Back/forward moved the document; load its hash without a new entry.
    pub fn pop_state(&mut self) {
        let location = self.current_location();
        self.navigate_to(&location, false);
    }

    /// Route a fetch completion to the navigation or submission it belongs to.
    pub fn settle(&mut self, completion: Completion) {
        let Completion { id, outcome } = completion;

        if let Some(submission) = self.submissions.remove(&id) {
            self.settle_submission(submission, outcome);
            return;
        }

        let request = match self.in_flight.take() {
            Some(request) if request.id == id => request,
            other => {
                self.in_flight = other;
                match outcome {
                    Err(FetchError::Aborted) => {
                        tracing::debug!(request_id = %id, "Discarded aborted request")
                    }
                    _ => tracing::debug!(request_id = %id, "Ignoring stale completion"),
                }
                return;
            }
        };

        match outcome {
            Ok(response) => self.on_navigation_success(request.path, response),
            Err(error) => {
                let next = if error.is_aborted() {
                    NavigationState::Cancelled
                } else {
                    NavigationState::Failed
                };
                self.transition(next);
                self.renderer.dom_mut().set_cursor(Cursor::Default);

                tracing::warn!(
                    request_id = %id,
                    path = %request.path,
                    status = error.status(),
                    error = %error,
                    "Navigation failed"
                );
                self.process_error(&error);
            }
        }
    }

    /// Expire throttle entries and re-arm the refresh control.
    pub fn tick(&mut self) {
        let now = now();
        self.window.expire(now);
        if self.refresh.expire(now) {
            self.renderer.dom_mut().set_refresh_spinning(false);
        }
    }

    /// Earliest moment `tick` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.window.next_expiry(), self.refresh.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn on_navigation_success(&mut self, path: String, response: FetchResponse) {
        // A completed request resets throttling
        self.window.reset();

        if response.status == self.config.redirection_code {
            let Some(location) = response.header("location").map(str::to_string) else {
                self.transition(NavigationState::Failed);
                self.process_error(&missing_location(response.status));
                return;
            };

            self.transition(NavigationState::Redirected);
            tracing::info!(from = %path, to = %location, "Following redirect");
            self.navigate_to(&location, true);
            self.last_location = Some(location);
            return;
        }

        self.transition(NavigationState::Success);
        self.last_location = Some(path.clone());

        if response.header("content-disposition").is_some() {
            tracing::info!(path = %path, "Handing download to the browser");
            self.renderer.dom_mut().assign_location(&path);
        } else {
            self.renderer.replace(Some(&response.body));
            self.renderer.dom_mut().set_cursor(Cursor::Default);
        }
    }

    fn settle_submission(
        &mut self,
        submission: PendingSubmission,
        outcome: std::result::Result<FetchResponse, FetchError>,
    ) {
        match outcome {
            Ok(response) if response.status == self.config.redirection_code => {
                match response.header("location").map(str::to_string) {
                    Some(location) => {
                        tracing::info!(to = %location, "Following redirect after form submission");
                        self.navigate_to(&location, true);
                    }
                    None => self.process_error(&missing_location(response.status)),
                }
            }
            Ok(response) => {
                let url = hash_url(
                    &self.renderer.dom().location(),
                    &submission.history_location,
                );
                self.renderer.dom_mut().push_history(&url);
                self.renderer.replace(Some(&response.body));
                self.last_location = Some(submission.history_location);
            }
            Err(error) => {
                tracing::warn!(
                    location = %submission.history_location,
                    error = %error,
                    "Form submission failed"
                );
                self.process_error(&error);
            }
        }
    }

    fn process_error(&mut self, error: &FetchError) {
        let failure = NavigationFailure::classify(error);

        if let Some(content) = failure.content(self.config.debug) {
            self.renderer.replace(Some(&content));
        } else if matches!(failure, NavigationFailure::Transport { .. }) {
            self.renderer.dom_mut().show_server_error();
        }
    }

    fn outgoing(&self, request: FetchRequest) -> FetchRequest {
        request
            .header("Accept", "text/html")
            .header(
                self.config.referer_header.clone(),
                self.last_location.clone().unwrap_or_default(),
            )
    }

    fn transition(&mut self, next: NavigationState) {
        if self.state.is_settled() && next != NavigationState::Idle {
            self.state = NavigationState::Idle;
        }

        if !self.state.can_transition_to(next) {
            tracing::warn!(
                from = %self.state,
                to = %next,
                "Unexpected navigation state transition"
            );
        } else {
            tracing::debug!(from = %self.state, to = %next, "Navigation state transition");
        }

        self.state = next;
    }
}

fn missing_location(status: u16) -> FetchError {
    FetchError::Status {
        status,
        status_text: "Redirect without Location header".to_string(),
        body: String::new(),
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use splice_dom::HeadlessDom;
    use splice_fetch::Method;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    #[derive(Clone)]
    struct SentRequest {
        id: RequestId,
        request: FetchRequest,
        aborted: Arc<AtomicBool>,
    }

    impl SentRequest {
        fn is_aborted(&self) -> bool {
            self.aborted.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct RecordingFetcher {
        sent: Mutex<Vec<SentRequest>>,
    }

    impl RecordingFetcher {
        fn sent(&self) -> Vec<SentRequest> {
            self.sent.lock().clone()
        }

        fn urls(&self) -> Vec<String> {
            self.sent.lock().iter().map(|s| s.request.url.clone()).collect()
        }
    }

    struct FlagHandle(Arc<AtomicBool>);

    impl RequestHandle for FlagHandle {
        fn abort(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl Fetcher for RecordingFetcher {
        fn send(&self, id: RequestId, request: FetchRequest) -> Box<dyn RequestHandle> {
            let aborted = Arc::new(AtomicBool::new(false));
            self.sent.lock().push(SentRequest {
                id,
                request,
                aborted: aborted.clone(),
            });
            Box::new(FlagHandle(aborted))
        }
    }

    type TestController = NavigationController<RecordingFetcher, HeadlessDom>;

    fn controller_at(config: NavigationConfig, location: &str) -> (TestController, HeadlessDom) {
        let dom = HeadlessDom::new(Url::parse(location).unwrap());
        let controller =
            NavigationController::new(config, RecordingFetcher::default(), dom.clone()).unwrap();
        (controller, dom)
    }

    fn controller(config: NavigationConfig) -> (TestController, HeadlessDom) {
        controller_at(config, "https://app.example/")
    }

    fn config() -> NavigationConfig {
        NavigationConfig::new("/dashboard", 278)
    }

    fn sent(dispatch: Dispatch) -> RequestId {
        match dispatch {
            Dispatch::Sent(id) => id,
            Dispatch::Throttled => panic!("Expected request to be sent"),
        }
    }

    fn ok(id: RequestId, response: FetchResponse) -> Completion {
        Completion {
            id,
            outcome: Ok(response),
        }
    }

    fn failed(id: RequestId, error: FetchError) -> Completion {
        Completion {
            id,
            outcome: Err(error),
        }
    }

    fn not_found() -> FetchError {
        FetchError::Status {
            status: 404,
            status_text: "Not Found".to_string(),
            body: "<h1>No such page</h1>".to_string(),
        }
    }

    #[test]
    fn test_start_without_hash_loads_initial_url() {
        let (mut controller, dom) = controller(config());

        controller.start();
        let request = &controller.fetcher().sent()[0];
        assert_eq!(request.request.url, "/dashboard");
        assert_eq!(request.request.method, Method::Get);
        assert_eq!(controller.current_location(), "/dashboard");

        controller.settle(ok(request.id, FetchResponse::new(200, "<p>dashboard</p>")));

        let state = dom.snapshot();
        assert_eq!(state.content, "<p>dashboard</p>");
        assert_eq!(state.cursor, Cursor::Default);
        assert_eq!(state.history.len(), 1);
        assert_eq!(controller.last_location(), Some("/dashboard"));
        assert_eq!(controller.state(), NavigationState::Success);
        assert!(!controller.is_busy());
        assert_eq!(controller.pending_attempts(), 0);
        assert!(controller.next_deadline().is_none());
    }

    #[test]
    fn test_start_with_hash_loads_hash_location() {
        let (mut controller, _dom) =
            controller_at(config(), "https://app.example/#/documents/?page=2");

        controller.start();
        assert_eq!(controller.fetcher().urls(), vec!["/documents/?page=2"]);
    }

    #[test]
    fn test_history_entry_records_location_in_hash() {
        let (mut controller, dom) = controller_at(config(), "https://app.example/app/?lang=en");

        controller.navigate_to("/documents/?page=2", true);

        let entry = dom.snapshot().history.pop().unwrap();
        assert_eq!(entry.url.as_str(), "https://app.example/app/?lang=en#/documents/?page=2");
    }

    #[test]
    fn test_referer_substitute_header() {
        let (mut controller, _dom) = controller(config());

        let first = sent(controller.navigate_to("/dashboard", true));
        controller.settle(ok(first, FetchResponse::new(200, "<p>dashboard</p>")));
        controller.navigate_to("/documents/", true);

        let requests = controller.fetcher().sent();
        assert_eq!(requests[0].request.header_value("X-Alt-Referer"), Some(""));
        assert_eq!(
            requests[1].request.header_value("X-Alt-Referer"),
            Some("/dashboard")
        );
        assert_eq!(requests[1].request.header_value("Accept"), Some("text/html"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_rejects_and_recovers() {
        let (mut controller, dom) = controller(NavigationConfig {
            maximum_ajax_requests: 2,
            ajax_request_timeout: 1000,
            ..config()
        });

        assert!(matches!(controller.navigate_to("/a", true), Dispatch::Sent(_)));
        assert!(matches!(controller.navigate_to("/b", true), Dispatch::Sent(_)));
        assert_eq!(controller.navigate_to("/c", true), Dispatch::Throttled);

        // No request for /c was ever issued
        assert_eq!(controller.fetcher().urls(), vec!["/a", "/b"]);
        let state = dom.snapshot();
        assert_eq!(state.toasts.len(), 1);
        assert_eq!(state.toasts[0].message, "Too many requests.");
        assert_eq!(state.toasts[0].timeout, Duration::from_millis(10_000));
        assert_eq!(state.cursor, Cursor::Progress);
        // The running request for /b is untouched
        assert_eq!(controller.in_flight_path(), Some("/b"));
        assert_eq!(controller.state(), NavigationState::Requesting);

        tokio::time::advance(Duration::from_millis(1000)).await;
        controller.tick();
        assert_eq!(controller.pending_attempts(), 0);

        assert!(matches!(controller.navigate_to("/d", true), Dispatch::Sent(_)));
        assert_eq!(controller.fetcher().urls(), vec!["/a", "/b", "/d"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_attempts_keep_window_full() {
        let (mut controller, _dom) = controller(NavigationConfig {
            maximum_ajax_requests: 1,
            ajax_request_timeout: 1000,
            ..config()
        });

        controller.navigate_to("/a", true);
        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(controller.navigate_to("/b", true), Dispatch::Throttled);

        // /a aged out, the rejected /b attempt has not
        tokio::time::advance(Duration::from_millis(500)).await;
        controller.tick();
        assert_eq!(controller.pending_attempts(), 1);
        assert_eq!(controller.navigate_to("/c", true), Dispatch::Throttled);
    }

    #[test]
    fn test_superseded_request_restores_markup() {
        let (mut controller, dom) = controller(config());
        dom.set_markup("<p>current</p>");

        let a = sent(controller.navigate_to("/a", true));
        let before = dom.markup();
        let b = sent(controller.navigate_to("/b", true));

        assert_eq!(dom.markup(), before);
        let requests = controller.fetcher().sent();
        assert!(requests[0].is_aborted());
        assert!(!requests[1].is_aborted());
        assert_eq!(controller.in_flight_path(), Some("/b"));

        // The abort surfaces later and must not show anything
        controller.settle(failed(a, FetchError::Aborted));
        assert_eq!(dom.markup(), "<p>current</p>");
        assert_eq!(dom.snapshot().server_errors, 0);
        assert_eq!(controller.in_flight_path(), Some("/b"));

        controller.settle(ok(b, FetchResponse::new(200, "<p>b</p>")));
        assert_eq!(dom.markup(), "<p>b</p>");
        assert_eq!(controller.last_location(), Some("/b"));
    }

    #[test]
    fn test_late_success_of_superseded_request_is_ignored() {
        let (mut controller, dom) = controller(config());

        let a = sent(controller.navigate_to("/a", true));
        controller.navigate_to("/b", true);
        controller.settle(ok(a, FetchResponse::new(200, "<p>a</p>")));

        assert_eq!(dom.markup(), "");
        assert_eq!(controller.last_location(), None);
        assert_eq!(controller.in_flight_path(), Some("/b"));
    }

    #[test]
    fn test_sentinel_redirect_is_followed() {
        let (mut controller, dom) = controller(config());
        dom.set_markup("<p>form</p>");

        let id = sent(controller.navigate_to("/save/", true));
        controller.settle(ok(
            id,
            FetchResponse::new(278, "<p>redirect body</p>").with_header("Location", "/foo?x=1"),
        ));

        assert_eq!(controller.fetcher().urls(), vec!["/save/", "/foo?x=1"]);
        assert_eq!(controller.last_location(), Some("/foo?x=1"));
        assert_eq!(dom.markup(), "<p>form</p>");
        assert_eq!(controller.in_flight_path(), Some("/foo?x=1"));
        assert_eq!(controller.state(), NavigationState::Requesting);
        assert_eq!(controller.current_location(), "/foo?x=1");
        // The follow-up still carries the location displayed before
        assert_eq!(
            controller.fetcher().sent()[1].request.header_value("X-Alt-Referer"),
            Some("")
        );
    }

    #[test]
    fn test_sentinel_without_location_is_an_error() {
        let (mut controller, dom) = controller(config());

        let id = sent(controller.navigate_to("/save/", true));
        controller.settle(ok(id, FetchResponse::new(278, "")));

        assert_eq!(controller.fetcher().urls(), vec!["/save/"]);
        assert_eq!(dom.markup(), "Redirect without Location header");
        assert_eq!(controller.state(), NavigationState::Failed);
    }

    #[test]
    fn test_content_disposition_hands_off_download() {
        let (mut controller, dom) = controller(config());
        dom.set_markup("<p>list</p>");

        let id = sent(controller.navigate_to("/export/?format=csv", true));
        controller.settle(ok(
            id,
            FetchResponse::new(200, "a,b,c")
                .with_header("Content-Disposition", "attachment; filename=\"export.csv\""),
        ));

        let state = dom.snapshot();
        assert_eq!(state.assigned, vec!["/export/?format=csv"]);
        assert_eq!(state.content, "<p>list</p>");
        assert_eq!(controller.last_location(), Some("/export/?format=csv"));
    }

    #[test]
    fn test_http_error_renders_body_and_releases_slot() {
        let (mut controller, dom) = controller(config());

        let id = sent(controller.navigate_to("/missing/", true));
        controller.settle(failed(id, not_found()));

        assert_eq!(dom.markup(), "<h1>No such page</h1>");
        assert_eq!(controller.state(), NavigationState::Failed);
        assert!(!controller.is_busy());
        assert_eq!(dom.snapshot().cursor, Cursor::Default);

        controller.navigate_to("/documents/", true);
        assert!(!controller.fetcher().sent()[0].is_aborted());
        assert_eq!(controller.state(), NavigationState::Requesting);
    }

    #[test]
    fn test_transport_error_shows_dialog() {
        let (mut controller, dom) = controller(config());
        dom.set_markup("<p>kept</p>");

        let id = sent(controller.navigate_to("/documents/", true));
        controller.settle(failed(id, FetchError::Transport("connection refused".into())));

        let state = dom.snapshot();
        assert_eq!(state.server_errors, 1);
        assert_eq!(state.content, "<p>kept</p>");
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_debug_mode_renders_banner() {
        let (mut controller, dom) = controller(NavigationConfig {
            debug: true,
            ..config()
        });

        let id = sent(controller.navigate_to("/missing/", true));
        controller.settle(failed(id, not_found()));

        let markup = dom.markup();
        assert!(markup.contains("status code: 404"));
        assert!(markup.contains("&lt;h1&gt;No such page&lt;/h1&gt;"));
        assert_eq!(dom.snapshot().server_errors, 0);
    }

    #[test]
    fn test_stale_completion_ignored() {
        let (mut controller, dom) = controller(config());

        controller.settle(ok(RequestId::new(), FetchResponse::new(200, "<p>stray</p>")));

        assert_eq!(dom.markup(), "");
        assert_eq!(controller.state(), NavigationState::Idle);
    }

    #[test]
    fn test_script_and_hash_anchors_are_not_intercepted() {
        let (mut controller, dom) = controller(config());

        for href in ["javascript:;", "#"] {
            let action = controller.handle_anchor_click(&AnchorClick::new(href));
            assert_eq!(action, AnchorAction::Native);
        }

        assert!(controller.fetcher().sent().is_empty());
        assert!(dom.snapshot().history.is_empty());
    }

    #[test]
    fn test_anchor_clicks_in_rendered_fragment() {
        let (mut controller, dom) = controller(NavigationConfig {
            exclude_anchor_classes: vec!["new_window".to_string()],
            ..config()
        });

        let id = sent(controller.navigate_to("/documents/", true));
        controller.settle(ok(
            id,
            FetchResponse::new(
                200,
                r#"<a class="next" href="/documents/?page=2">Next</a>
                   <a class="new_window" href="/help/">Help</a>"#,
            ),
        ));

        let next = dom.anchor("a.next").unwrap();
        assert_eq!(
            controller.handle_anchor_click(&next),
            AnchorAction::Navigate("/documents/?page=2".to_string())
        );

        let help = dom.anchor("a.new_window").unwrap();
        assert_eq!(controller.handle_anchor_click(&help), AnchorAction::Native);

        assert_eq!(
            controller.fetcher().urls(),
            vec!["/documents/", "/documents/?page=2"]
        );
    }

    #[test]
    fn test_modifier_click_opens_new_context() {
        let (mut controller, dom) = controller(config());

        let click = AnchorClick::new("/documents/").with_modifiers(splice_dom::Modifiers {
            meta: true,
            ..Default::default()
        });
        controller.handle_anchor_click(&click);

        assert_eq!(dom.snapshot().opened, vec!["/documents/"]);
        assert!(controller.fetcher().sent().is_empty());
    }

    #[test]
    fn test_get_form_submission() {
        let (mut controller, dom) = controller_at(config(), "https://app.example/#/documents/");
        let form = FormSubmission {
            fields: vec![("page".to_string(), "4".to_string())],
            ..Default::default()
        };

        let id = controller.submit_form(&form).unwrap().unwrap();
        let request = &controller.fetcher().sent()[0];
        assert_eq!(request.request.method, Method::Get);
        assert_eq!(request.request.url, "/documents/?page=4");

        controller.settle(ok(id, FetchResponse::new(200, "<p>page 4</p>")));

        let state = dom.snapshot();
        assert_eq!(state.content, "<p>page 4</p>");
        assert_eq!(
            state.history.last().unwrap().url.fragment(),
            Some("/documents/?page=4")
        );
        assert_eq!(controller.last_location(), Some("/documents/?page=4"));
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_post_form_redirect() {
        let (mut controller, _dom) = controller(config());
        let form = FormSubmission {
            action: Some("/tags/create/".to_string()),
            method: FormMethod::Post,
            fields: vec![("label".to_string(), "urgent mail".to_string())],
            ..Default::default()
        };

        let id = controller.submit_form(&form).unwrap().unwrap();
        let request = controller.fetcher().sent()[0].request.clone();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "/tags/create/");
        assert_eq!(request.body.as_deref(), Some("label=urgent+mail"));

        controller.settle(ok(id, FetchResponse::new(278, "").with_header("Location", "/tags/")));
        assert_eq!(controller.fetcher().urls(), vec!["/tags/create/", "/tags/"]);
        assert_eq!(controller.in_flight_path(), Some("/tags/"));
    }

    #[test]
    fn test_form_error_renders_server_page() {
        let (mut controller, dom) = controller(config());
        let form = FormSubmission {
            action: Some("/missing/".to_string()),
            ..Default::default()
        };

        let id = controller.submit_form(&form).unwrap().unwrap();
        controller.settle(failed(id, not_found()));

        assert_eq!(dom.markup(), "<h1>No such page</h1>");
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_cross_origin_form_keeps_host() {
        let (mut controller, _dom) = controller_at(config(), "https://app.example/#/documents/");
        let search = |method| FormSubmission {
            action: Some("https://search.example/find/".to_string()),
            method,
            fields: vec![("q".to_string(), "x".to_string())],
            ..Default::default()
        };

        controller.submit_form(&search(FormMethod::Get)).unwrap();
        controller.submit_form(&search(FormMethod::Post)).unwrap();
        controller.handle_anchor_click(&AnchorClick::new("https://search.example/find/?q=x"));

        assert_eq!(
            controller.fetcher().urls(),
            vec![
                "https://search.example/find/?q=x",
                "https://search.example/find/",
                "https://search.example/find/?q=x",
            ]
        );
    }

    #[test]
    fn test_blank_target_form_opens_new_context() {
        let (mut controller, dom) = controller(config());
        let form = FormSubmission {
            action: Some("/search/".to_string()),
            target: Some("_blank".to_string()),
            fields: vec![("q".to_string(), "x".to_string())],
            ..Default::default()
        };

        assert!(controller.submit_form(&form).unwrap().is_none());
        assert_eq!(dom.snapshot().opened, vec!["https://app.example/search/?q=x"]);
        assert!(controller.fetcher().sent().is_empty());
    }

    #[test]
    fn test_pop_state_does_not_push_history() {
        let (mut controller, dom) = controller(config());

        dom.set_location(Url::parse("https://app.example/#/tags/").unwrap());
        controller.pop_state();

        assert!(dom.snapshot().history.is_empty());
        assert_eq!(controller.fetcher().urls(), vec!["/tags/"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_collapses_rapid_clicks() {
        let (mut controller, dom) = controller_at(config(), "https://app.example/#/documents/");

        assert!(controller.refresh());
        assert!(dom.snapshot().refresh_spinning);
        assert!(!controller.refresh());
        assert_eq!(controller.fetcher().urls(), vec!["/documents/"]);

        tokio::time::advance(Duration::from_millis(1000)).await;
        controller.tick();
        assert!(!dom.snapshot().refresh_spinning);

        assert!(controller.refresh());
        assert_eq!(controller.fetcher().urls(), vec!["/documents/", "/documents/"]);
    }

    #[test]
    fn test_next_deadline_tracks_window() {
        let (mut controller, _dom) = controller(config());
        assert!(controller.next_deadline().is_none());

        controller.navigate_to("/a", true);
        assert!(controller.next_deadline().is_some());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dom = HeadlessDom::new(Url::parse("https://app.example/").unwrap());
        let result = NavigationController::new(
            NavigationConfig::new("/", 278),
            RecordingFetcher::default(),
            dom,
        );
        assert!(result.is_err());
    }
}
