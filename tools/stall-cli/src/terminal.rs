//! Views that print coordinator updates to the terminal.

use std::rc::Rc;

use console::style;
use serde::Serialize;
use stall_checkout::{
    BasketData, FormData, GalleryData, HeaderData, ModalData, PreviewData, Render, SuccessData,
    Views,
};
use stall_commerce::buyer::FieldGroup;

use crate::output::{step_badge, Output};

/// Prints every view update. In JSON mode each update is one line.
pub struct TerminalView {
    output: Output,
}

impl TerminalView {
    /// Views that all print through `output`.
    pub fn views(output: Output) -> Views {
        let view = Rc::new(Self { output });
        Views {
            gallery: view.clone(),
            preview: view.clone(),
            basket: view.clone(),
            header: view.clone(),
            order_form: view.clone(),
            contacts_form: view.clone(),
            success: view.clone(),
            modal: view,
        }
    }

    /// Emit a JSON record and report whether the text form should be skipped.
    fn json<D: Serialize>(&self, view: &str, data: &D) -> bool {
        if self.output.is_json() {
            self.output
                .json_line(&serde_json::json!({ "view": view, "data": data }));
            return true;
        }
        false
    }
}

impl Render<GalleryData> for TerminalView {
    fn render(&self, data: &GalleryData) {
        if self.json("gallery", data) {
            return;
        }
        self.output.header("Catalog");
        if let Some(error) = &data.error {
            self.output.warn(&format!("Catalog unavailable: {}", error));
        }
        if data.degraded {
            self.output.warn("Showing fallback catalog");
        }
        for card in &data.cards {
            self.output.table_row(
                &[
                    card.id.as_str(),
                    card.title.as_str(),
                    card.category.as_str(),
                    card.price_label.as_str(),
                ],
                &[36, 24, 12, 16],
            );
        }
    }
}

impl Render<PreviewData> for TerminalView {
    fn render(&self, data: &PreviewData) {
        if self.json("preview", data) {
            return;
        }
        self.output.header(&data.card.title);
        self.output.kv("category", &data.card.category);
        self.output.kv("price", &data.card.price_label);
        if !data.description.is_empty() {
            self.output.kv("about", &data.description);
        }
        let action = if data.action.is_enabled() {
            style(data.action.label()).green().to_string()
        } else {
            style(data.action.label()).dim().to_string()
        };
        self.output.kv("action", &action);
    }
}

impl Render<BasketData> for TerminalView {
    fn render(&self, data: &BasketData) {
        if self.json("basket", data) || (!self.output.is_verbose() && data.lines.is_empty()) {
            return;
        }
        self.output.header("Basket");
        for line in &data.lines {
            self.output.list_item(&format!(
                "{}. {}  {}",
                line.index, line.title, line.price_label
            ));
        }
        self.output.kv("total", &data.total_label);
    }
}

impl Render<HeaderData> for TerminalView {
    fn render(&self, data: &HeaderData) {
        if self.json("header", data) {
            return;
        }
        self.output.debug(&format!("basket counter: {}", data.count));
    }
}

impl Render<FormData> for TerminalView {
    fn render(&self, data: &FormData) {
        let name = match data.group {
            FieldGroup::Order => "order_form",
            FieldGroup::Contacts => "contacts_form",
        };
        if self.json(name, data) {
            return;
        }
        if data.submitting {
            self.output.debug("order submission in flight");
        }
        if let Some(notice) = &data.notice {
            self.output.warn(notice);
        }
        if !data.valid {
            self.output.debug(&format!("{}: {}", name, data.errors));
        }
    }
}

impl Render<SuccessData> for TerminalView {
    fn render(&self, data: &SuccessData) {
        if self.json("success", data) {
            return;
        }
        self.output.success(&format!("Order placed. {}", data.message));
    }
}

impl Render<ModalData> for TerminalView {
    fn render(&self, data: &ModalData) {
        if self.json("modal", data) {
            return;
        }
        self.output.debug(&format!("step: {}", step_badge(data.step)));
    }
}
