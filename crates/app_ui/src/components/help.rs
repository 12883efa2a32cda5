//! Help/usage screen

use egui::{RichText, Ui};

pub struct HelpView;

impl HelpView {
    pub fn ui(ui: &mut Ui, text: &str) {
        egui::ScrollArea::both().show(ui, |ui| {
            ui.add_space(8.0);
            ui.label(RichText::new(text).monospace());
        });
    }
}
