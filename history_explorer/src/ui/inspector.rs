//! Record inspector: details of the last picked entity.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::catalog::CatalogRecord;
use crate::ui::{apply_panel_style, ui_core, DisplayState, ACCENT, MUTED};

const POSITIVE: egui::Color32 = egui::Color32::from_rgb(110, 210, 140);
const NEGATIVE: egui::Color32 = egui::Color32::from_rgb(230, 130, 110);

pub fn inspector_plugin(app: &mut App) {
    ui_core(app);
    app.add_systems(Update, (inspector_panel_system, dismiss_selection_system));
}

fn dismiss_selection_system(keys: Res<ButtonInput<KeyCode>>, mut display: ResMut<DisplayState>) {
    if keys.just_pressed(KeyCode::Escape) {
        display.dismiss();
    }
}

fn inspector_panel_system(mut contexts: EguiContexts, mut display: ResMut<DisplayState>) {
    let Some(record) = display.selected.clone() else {
        return;
    };

    let mut close = false;
    egui::SidePanel::right("inspector")
        .default_width(320.0)
        .frame(inspector_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_record(ui, &record);
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                    dismiss_hint(ui);
                });
            });
        });

    if close {
        display.dismiss();
    }
}

fn show_record(ui: &mut egui::Ui, record: &CatalogRecord) {
    ui.label(egui::RichText::new(&record.title).size(18.0).color(ACCENT));
    ui.label(
        egui::RichText::new(format!(
            "{}  |  {}  |  {}",
            record.display_year,
            record.category.label(),
            record.era.label()
        ))
        .size(12.0)
        .color(egui::Color32::from_rgb(140, 160, 180)),
    );
    ui.add_space(8.0);
    ui.label(&record.description);

    if !record.specs.is_empty() {
        section(ui, "Specifications");
        egui::Grid::new("specs").num_columns(2).striped(true).show(ui, |ui| {
            for (label, value) in &record.specs {
                ui.label(egui::RichText::new(label).color(MUTED));
                ui.label(value);
                ui.end_row();
            }
        });
    }

    bullet_list(ui, "Advantages", &record.advantages, POSITIVE);
    bullet_list(ui, "Disadvantages", &record.disadvantages, NEGATIVE);

    if !record.key_figures.is_empty() {
        section(ui, "Key figures");
        ui.label(record.key_figures.join(", "));
    }
    if let Some(significance) = &record.significance {
        section(ui, "Significance");
        ui.label(significance);
    }
    if !record.impact.is_empty() {
        section(ui, "Impact");
        ui.label(&record.impact);
    }
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(10.0);
    ui.label(egui::RichText::new(title).size(13.0).color(ACCENT));
    ui.add_space(2.0);
}

fn bullet_list(ui: &mut egui::Ui, title: &str, items: &[String], color: egui::Color32) {
    if items.is_empty() {
        return;
    }
    section(ui, title);
    for item in items {
        ui.label(egui::RichText::new(format!("- {item}")).color(color));
    }
}

fn inspector_frame() -> egui::Frame {
    egui::Frame::default()
        .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 220))
        .inner_margin(egui::Margin::same(14))
}

fn dismiss_hint(ui: &mut egui::Ui) {
    ui.label(egui::RichText::new("Esc to dismiss").size(11.0).color(MUTED));
}
