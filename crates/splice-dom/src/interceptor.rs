//! Link and form interception
//!
//! Anchor clicks are classified in order:
//! 1. excluded class on the anchor or an ancestor → native behaviour
//! 2. disabled class on the anchor or an ancestor → swallowed
//! 3. no href, `javascript:` or bare `#` → native behaviour
//! 4. ctrl/meta click → new browsing context
//! 5. anchor or its parent marked `disabled` → swallowed
//! 6. everything else → fragment navigation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Class that marks an anchor as visually disabled
const DISABLED_CLASS: &str = "disabled";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// The click asks for a new browsing context
    pub fn requests_new_context(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Snapshot of a clicked anchor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorClick {
    pub href: Option<String>,
    pub classes: Vec<String>,
    /// Class lists of the anchor's ancestors, nearest first
    pub ancestors: Vec<Vec<String>>,
    pub modifiers: Modifiers,
}

impl AnchorClick {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Default::default()
        }
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes = classes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_ancestor(mut self, classes: &[&str]) -> Self {
        self.ancestors
            .push(classes.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    fn lineage(&self) -> impl Iterator<Item = &String> {
        self.classes.iter().chain(self.ancestors.iter().flatten())
    }

    fn parent_classes(&self) -> &[String] {
        self.ancestors.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// What to do with an anchor click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorAction {
    /// Let the browser handle the click
    Native,
    /// Prevent the default action and do nothing else
    Suppress,
    /// Prevent the default action and open the href in a new context
    OpenNewContext(String),
    /// Prevent the default action and navigate to the href
    Navigate(String),
}

impl AnchorAction {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, AnchorAction::Native)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormMethod {
    #[default]
    Get,
    Post,
}

impl std::str::FromStr for FormMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "get" => Ok(FormMethod::Get),
            "post" => Ok(FormMethod::Post),
            _ => Err(format!("Unknown form method: {}", s)),
        }
    }
}

/// Snapshot of a submitted form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub action: Option<String>,
    pub method: FormMethod,
    pub target: Option<String>,
    /// Successful controls in document order
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn opens_new_context(&self) -> bool {
        self.target.as_deref() == Some("_blank")
    }
}

/// Decides which anchor clicks the navigation core takes over
#[derive(Debug, Clone, Default)]
pub struct Interceptor {
    disabled_classes: HashSet<String>,
    excluded_classes: HashSet<String>,
}

impl Interceptor {
    pub fn new<I, J>(disabled_classes: I, excluded_classes: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Self {
            disabled_classes: disabled_classes.into_iter().collect(),
            excluded_classes: excluded_classes.into_iter().collect(),
        }
    }

    pub fn classify(&self, click: &AnchorClick) -> AnchorAction {
        if click.lineage().any(|c| self.excluded_classes.contains(c)) {
            return AnchorAction::Native;
        }

        if click.lineage().any(|c| self.disabled_classes.contains(c)) {
            return AnchorAction::Suppress;
        }

        let href = match click.href.as_deref() {
            Some(href) => href,
            None => return AnchorAction::Native,
        };

        if is_script_target(href) || href == "#" {
            return AnchorAction::Native;
        }

        if click.modifiers.requests_new_context() {
            return AnchorAction::OpenNewContext(href.to_string());
        }

        let disabled = click.classes.iter().any(|c| c == DISABLED_CLASS)
            || click.parent_classes().iter().any(|c| c == DISABLED_CLASS);
        if disabled {
            return AnchorAction::Suppress;
        }

        AnchorAction::Navigate(href.to_string())
    }
}

fn is_script_target(href: &str) -> bool {
    href.trim_start()
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}
