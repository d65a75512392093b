//! Content region renderer

use crate::bridge::{ContentEvent, DomBridge};

pub struct ContentRenderer<D> {
    dom: D,
}

impl<D: DomBridge> ContentRenderer<D> {
    pub fn new(dom: D) -> Self {
        Self { dom }
    }

    /// Swap the content region's markup and return what was there before.
    ///
    /// With `None` the region is left untouched and no notifications fire;
    /// the call only snapshots the current markup.
    pub fn replace(&mut self, html: Option<&str>) -> String {
        let previous = self.dom.content();

        if let Some(html) = html {
            self.dom.dispatch(ContentEvent::PreUpdate);
            self.dom.set_content(html);
            self.dom.dispatch(ContentEvent::Updated);

            tracing::trace!(
                previous_len = previous.len(),
                new_len = html.len(),
                "Replaced content region"
            );
        }

        previous
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn into_inner(self) -> D {
        self.dom
    }
}
