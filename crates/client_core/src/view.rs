//! View seam between the controller and whatever displays the registry.

use std::time::Instant;

use crate::status::{StatusLine, StatusMessage};

pub trait RegistryView {
    /// Replaces the whole list with freshly rendered markup.
    fn render_list(&mut self, markup: &str);
    fn show_status(&mut self, message: StatusMessage);
    /// Returns the form inputs to their initial values.
    fn reset_form(&mut self);
    /// Blocking yes/no question; `false` means the user declined.
    fn confirm(&mut self, prompt: &str) -> bool;
}

type Confirmer = Box<dyn FnMut(&str) -> bool>;

/// Headless view that holds the rendered markup in memory.
pub struct HtmlView {
    list_markup: String,
    status: StatusLine,
    form_resets: usize,
    confirmer: Confirmer,
}

impl Default for HtmlView {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlView {
    /// A view whose confirmation prompts are always declined.
    pub fn new() -> Self {
        Self {
            list_markup: String::new(),
            status: StatusLine::default(),
            form_resets: 0,
            confirmer: Box::new(|_| false),
        }
    }

    pub fn with_confirm(mut self, confirmer: impl FnMut(&str) -> bool + 'static) -> Self {
        self.confirmer = Box::new(confirmer);
        self
    }

    pub fn list_markup(&self) -> &str {
        &self.list_markup
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status_at(Instant::now())
    }

    pub fn status_at(&self, now: Instant) -> Option<&StatusMessage> {
        self.status.visible(now)
    }

    pub fn form_resets(&self) -> usize {
        self.form_resets
    }
}

impl RegistryView for HtmlView {
    fn render_list(&mut self, markup: &str) {
        self.list_markup.clear();
        self.list_markup.push_str(markup);
    }

    fn show_status(&mut self, message: StatusMessage) {
        self.status.show(message, Instant::now());
    }

    fn reset_form(&mut self) {
        self.form_resets += 1;
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        (self.confirmer)(prompt)
    }
}
