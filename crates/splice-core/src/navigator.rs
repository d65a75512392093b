//! Navigator event loop
//!
//! One task owns the controller and feeds it, in arrival order:
//! - UI events posted through a [`NavigatorHandle`]
//! - fetch completions
//! - timer ticks at the controller's next deadline
//!
//! Hosts post every click and submission through the same channel, so
//! markup inserted after startup needs no extra wiring.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use splice_dom::{AnchorClick, DomBridge, FormSubmission, Interceptor};
use splice_fetch::{Completion, Fetcher};
use tokio::sync::mpsc;

use crate::controller::NavigationController;
use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UiEvent {
    AnchorClick(AnchorClick),
    FormSubmit(FormSubmission),
    /// Back/forward navigation changed the document location
    PopState,
    /// The refresh control was clicked
    Refresh,
}

/// Posts UI events to a running [`Navigator`]
#[derive(Clone)]
pub struct NavigatorHandle {
    events: mpsc::UnboundedSender<UiEvent>,
    interceptor: Arc<Interceptor>,
}

impl NavigatorHandle {
    /// Post an anchor click. Returns whether the host must prevent the
    /// browser's default action.
    pub fn click(&self, click: AnchorClick) -> Result<bool> {
        let prevent_default = self.interceptor.classify(&click).prevents_default();
        self.send(UiEvent::AnchorClick(click))?;
        Ok(prevent_default)
    }

    /// Post a form submission; native submission is always prevented.
    pub fn submit(&self, form: FormSubmission) -> Result<()> {
        self.send(UiEvent::FormSubmit(form))
    }

    pub fn pop_state(&self) -> Result<()> {
        self.send(UiEvent::PopState)
    }

    pub fn refresh(&self) -> Result<()> {
        self.send(UiEvent::Refresh)
    }

    fn send(&self, event: UiEvent) -> Result<()> {
        self.events.send(event).map_err(|_| CoreError::Closed)
    }
}

pub struct Navigator<F, D> {
    controller: NavigationController<F, D>,
    events: mpsc::UnboundedReceiver<UiEvent>,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl<F: Fetcher, D: DomBridge> Navigator<F, D> {
    pub fn new(
        controller: NavigationController<F, D>,
        completions: mpsc::UnboundedReceiver<Completion>,
    ) -> (Self, NavigatorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = NavigatorHandle {
            events: tx,
            interceptor: Arc::new(controller.interceptor().clone()),
        };

        (
            Self {
                controller,
                events: rx,
                completions,
            },
            handle,
        )
    }

    /// Perform the initial load and process events.
    ///
    /// Returns the controller once every handle is dropped and no request
    /// is outstanding.
    pub async fn run(mut self) -> NavigationController<F, D> {
        self.controller.start();
        let mut events_open = true;

        loop {
            if !events_open && !self.controller.is_busy() {
                break;
            }

            let deadline = self.controller.next_deadline();

            tokio::select! {
                event = self.events.recv(), if events_open => match event {
                    Some(event) => {
                        tracing::trace!(?event, "UI event");
                        self.controller.handle_event(event);
                    }
                    None => {
                        tracing::debug!("All navigator handles dropped");
                        events_open = false;
                    }
                },
                completion = self.completions.recv() => match completion {
                    Some(completion) => self.controller.settle(completion),
                    None => {
                        tracing::warn!("Fetcher completion channel closed");
                        break;
                    }
                },
                _ = sleep_until(deadline) => self.controller.tick(),
            }
        }

        tracing::info!("Navigator stopped");
        self.controller
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
