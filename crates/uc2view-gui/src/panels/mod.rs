pub mod controls;
pub mod histogram;
pub mod menu_bar;
pub mod status;
pub mod viewport;

/// Show a ComboBox for enum selection. Returns `true` if the value changed.
pub(crate) fn enum_combo<T: PartialEq + Copy + ToString>(
    ui: &mut egui::Ui,
    label: &str,
    current: &mut T,
    options: &[T],
) -> bool {
    let resp = egui::ComboBox::from_label(label)
        .selected_text(current.to_string())
        .show_ui(ui, |ui| {
            let mut changed = false;
            for &choice in options {
                if ui
                    .selectable_value(current, choice, choice.to_string())
                    .changed()
                {
                    changed = true;
                }
            }
            changed
        });
    resp.inner == Some(true)
}

pub(crate) fn section_header(ui: &mut egui::Ui, label: &str, status: Option<&str>) {
    ui.horizontal(|ui| {
        ui.strong(label);
        if let Some(s) = status {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(s);
            });
        }
    });
}
