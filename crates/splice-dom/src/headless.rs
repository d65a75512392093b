//! In-memory page
//!
//! `HeadlessDom` keeps the content region as a markup string and records
//! every side effect the navigation core asks for. It is cheap to clone;
//! clones share state, so a host keeps one handle while the controller
//! owns another.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use url::Url;

use crate::bridge::{ContentEvent, Cursor, DomBridge, WarningToast};
use crate::error::DomError;
use crate::interceptor::{AnchorClick, FormMethod, FormSubmission};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: Url,
    pub pushed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HeadlessState {
    pub content: String,
    pub location: Url,
    pub history: Vec<HistoryEntry>,
    pub events: Vec<ContentEvent>,
    pub cursor: Cursor,
    pub toasts: Vec<WarningToast>,
    /// Targets opened in new browsing contexts
    pub opened: Vec<String>,
    /// Targets handed to full browser navigation
    pub assigned: Vec<String>,
    pub server_errors: usize,
    pub refresh_spinning: bool,
}

#[derive(Debug, Clone)]
pub struct HeadlessDom {
    state: Arc<RwLock<HeadlessState>>,
}

impl HeadlessDom {
    pub fn new(location: Url) -> Self {
        Self {
            state: Arc::new(RwLock::new(HeadlessState {
                content: String::new(),
                location,
                history: Vec::new(),
                events: Vec::new(),
                cursor: Cursor::Default,
                toasts: Vec::new(),
                opened: Vec::new(),
                assigned: Vec::new(),
                server_errors: 0,
                refresh_spinning: false,
            })),
        }
    }

    /// Set the content region without firing notifications
    pub fn set_markup(&self, html: &str) {
        self.state.write().content = html.to_string();
    }

    pub fn markup(&self) -> String {
        self.state.read().content.clone()
    }

    /// Move the document, as back/forward buttons do
    pub fn set_location(&self, location: Url) {
        self.state.write().location = location;
    }

    pub fn snapshot(&self) -> HeadlessState {
        self.state.read().clone()
    }

    /// Describe a click on the first anchor matching `selector`.
    pub fn anchor(&self, selector: &str) -> Result<AnchorClick> {
        let parsed = parse_selector(selector)?;
        let document = Html::parse_fragment(&self.markup());
        let anchor = document
            .select(&parsed)
            .next()
            .ok_or_else(|| DomError::ElementNotFound(selector.to_string()))?;

        let ancestors = anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .map(|element| element.value().classes().map(str::to_string).collect())
            .collect();

        Ok(AnchorClick {
            href: anchor.value().attr("href").map(str::to_string),
            classes: anchor.value().classes().map(str::to_string).collect(),
            ancestors,
            modifiers: Default::default(),
        })
    }

    /// Describe submitting the first form matching `selector`.
    pub fn form(&self, selector: &str) -> Result<FormSubmission> {
        let parsed = parse_selector(selector)?;
        let document = Html::parse_fragment(&self.markup());
        let form = document
            .select(&parsed)
            .next()
            .ok_or_else(|| DomError::ElementNotFound(selector.to_string()))?;

        let method = form
            .value()
            .attr("method")
            .and_then(|m| m.parse().ok())
            .unwrap_or(FormMethod::Get);

        Ok(FormSubmission {
            action: form.value().attr("action").map(str::to_string),
            method,
            target: form.value().attr("target").map(str::to_string),
            fields: serialize_controls(form)?,
        })
    }
}

impl DomBridge for HeadlessDom {
    fn content(&self) -> String {
        self.markup()
    }

    fn set_content(&mut self, html: &str) {
        self.set_markup(html);
    }

    fn dispatch(&mut self, event: ContentEvent) {
        self.state.write().events.push(event);
    }

    fn location(&self) -> Url {
        self.state.read().location.clone()
    }

    fn push_history(&mut self, url: &Url) {
        let mut state = self.state.write();
        state.location = url.clone();
        state.history.push(HistoryEntry {
            url: url.clone(),
            pushed_at: Utc::now(),
        });
    }

    fn assign_location(&mut self, target: &str) {
        self.state.write().assigned.push(target.to_string());
    }

    fn open_new_context(&mut self, target: &str) {
        self.state.write().opened.push(target.to_string());
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.state.write().cursor = cursor;
    }

    fn warn(&mut self, toast: &WarningToast) {
        self.state.write().toasts.push(toast.clone());
    }

    fn show_server_error(&mut self) {
        self.state.write().server_errors += 1;
    }

    fn set_refresh_spinning(&mut self, spinning: bool) {
        self.state.write().refresh_spinning = spinning;
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| DomError::InvalidSelector(selector.to_string()))
}

/// Successful controls of a form, in document order.
fn serialize_controls(form: ElementRef<'_>) -> Result<Vec<(String, String)>> {
    let controls = parse_selector("input[name], select[name], textarea[name]")?;
    let options = parse_selector("option")?;
    let mut fields: Vec<(String, String)> = Vec::new();

    for control in form.select(&controls) {
        let element = control.value();
        if element.attr("disabled").is_some() {
            continue;
        }
        let name = element.attr("name").unwrap_or_default().to_string();

        match element.name() {
            "textarea" => fields.push((name, control.text().collect())),
            "select" => {
                let all: Vec<ElementRef<'_>> = control.select(&options).collect();
                let chosen = all
                    .iter()
                    .find(|option| option.value().attr("selected").is_some())
                    .or_else(|| all.first());
                if let Some(option) = chosen {
                    let value = option
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| option.text().collect());
                    fields.push((name, value));
                }
            }
            _ => {
                let kind = element.attr("type").unwrap_or("text").to_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "reset" | "image" | "file" => continue,
                    "checkbox" | "radio" if element.attr("checked").is_none() => continue,
                    "checkbox" | "radio" => {
                        let value = element.attr("value").unwrap_or("on");
                        fields.push((name, value.to_string()));
                    }
                    _ => {
                        let value = element.attr("value").unwrap_or_default();
                        fields.push((name, value.to_string()));
                    }
                }
            }
        }
    }

    Ok(fields)
}
