use crate::config::{AppSettings, PracticeSettings};
use crate::practice::{newest_char, KOCH_ORDER};
use egui::RichText;

pub fn render_settings_panel(
    ui: &mut egui::Ui,
    settings: &mut AppSettings,
    settings_changed: &mut bool,
) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        // Morse Settings
        egui::CollapsingHeader::new(RichText::new("Morse Settings").strong())
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Character WPM:");
                    if ui
                        .add(
                            egui::Slider::new(&mut settings.morse.char_speed, 5.0..=50.0)
                                .fixed_decimals(0),
                        )
                        .changed()
                    {
                        *settings_changed = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Effective WPM:");
                    if ui
                        .add(
                            egui::Slider::new(&mut settings.morse.eff_speed, 0.0..=50.0)
                                .fixed_decimals(0),
                        )
                        .on_hover_text("Farnsworth spacing; 0 or at least the character speed turns it off")
                        .changed()
                    {
                        *settings_changed = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Tone (Hz):");
                    if ui
                        .add(
                            egui::Slider::new(&mut settings.morse.tone_hz, 300.0..=1500.0)
                                .fixed_decimals(0),
                        )
                        .changed()
                    {
                        *settings_changed = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Volume:");
                    if ui
                        .add(egui::Slider::new(&mut settings.morse.volume, 0.0..=1.0))
                        .changed()
                    {
                        *settings_changed = true;
                    }
                });
            });

        ui.add_space(8.0);

        // Practice Settings
        egui::CollapsingHeader::new(RichText::new("Practice Settings").strong())
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Koch Lesson:");
                    if ui
                        .add(egui::Slider::new(
                            &mut settings.practice.koch_level,
                            PracticeSettings::MIN_KOCH_LEVEL..=KOCH_ORDER.len(),
                        ))
                        .changed()
                    {
                        *settings_changed = true;
                    }
                    ui.label(
                        RichText::new(newest_char(settings.practice.koch_level).to_string())
                            .monospace(),
                    );
                });

                ui.horizontal(|ui| {
                    ui.label("Group Size:");
                    if ui
                        .add(egui::DragValue::new(&mut settings.practice.group_size).range(1..=10))
                        .changed()
                    {
                        *settings_changed = true;
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Length (seconds):");
                    if ui
                        .add(
                            egui::Slider::new(&mut settings.practice.target_seconds, 5.0..=600.0)
                                .fixed_decimals(0),
                        )
                        .changed()
                    {
                        *settings_changed = true;
                    }
                });
            });

        ui.add_space(8.0);

        // Display Settings
        egui::CollapsingHeader::new(RichText::new("Display Settings").strong())
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Font Size:");
                    if ui
                        .add(
                            egui::Slider::new(&mut settings.ui.font_size, 10.0..=24.0)
                                .fixed_decimals(0),
                        )
                        .changed()
                    {
                        *settings_changed = true;
                    }
                });

                if ui
                    .checkbox(&mut settings.ui.show_waveform, "Show Waveform")
                    .changed()
                {
                    *settings_changed = true;
                }

                if ui
                    .checkbox(&mut settings.ui.show_code, "Show Dots and Dashes")
                    .changed()
                {
                    *settings_changed = true;
                }
            });
    });
}
