use crate::app::KochApp;
use crate::morse::encoder::{decode, encode, text_to_code, SUPPORTED_CHARS};
use crate::playback::{format_time, PlaybackState, PlaybackStatus, StatusColor};
use crate::practice::{lesson_chars, newest_char, AlignOp, GradeResult};
use egui::{Color32, Pos2, RichText, Sense, Stroke, Vec2};

const WAVEFORM_HEIGHT: f32 = 48.0;

pub fn render_main_panel(ui: &mut egui::Ui, app: &mut KochApp) {
    if let Some(notice) = app.notice.clone() {
        ui.horizontal(|ui| {
            ui.label(RichText::new(notice).color(Color32::YELLOW));
            if ui.button("Dismiss").clicked() {
                app.notice = None;
            }
        });
        ui.add_space(4.0);
    }

    render_lesson_bar(ui, app);

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    render_text_input(ui, app);

    ui.add_space(8.0);

    let state = app.state();
    render_transport(ui, app, &state);

    ui.add_space(4.0);
    render_status(ui, app, &state);

    if app.settings.ui.show_waveform {
        ui.add_space(8.0);
        render_waveform(ui, app, &state);
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    render_answer(ui, app);

    if let Some(ref result) = app.last_grade {
        ui.add_space(8.0);
        render_grade(ui, result);
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    render_reference(ui, app);

    ui.add_space(8.0);
    render_key_hints(ui);
}

fn render_lesson_bar(ui: &mut egui::Ui, app: &KochApp) {
    let level = app.settings.practice.koch_level;
    let chars: String = lesson_chars(level).iter().collect();

    ui.horizontal(|ui| {
        ui.label(RichText::new("Lesson:").strong());
        ui.label(format!("{}", level));

        ui.add_space(20.0);

        ui.label(RichText::new("New:").strong());
        ui.label(RichText::new(newest_char(level).to_string()).monospace());

        ui.add_space(20.0);

        ui.label(RichText::new("WPM:").strong());
        let morse = &app.settings.morse;
        if morse.timing().is_farnsworth() {
            ui.label(format!("{:.0}/{:.0}", morse.char_speed, morse.eff_speed));
        } else {
            ui.label(format!("{:.0}", morse.char_speed));
        }
    });

    ui.label(RichText::new(chars).monospace().weak());
}

fn render_text_input(ui: &mut egui::Ui, app: &mut KochApp) {
    let editable = app.state().status == PlaybackStatus::Idle;

    let response = ui.add_enabled(
        editable,
        egui::TextEdit::multiline(&mut app.text_input)
            .font(egui::TextStyle::Monospace)
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .hint_text("Text to send, or generate a lesson"),
    );
    if response.changed() {
        app.controller
            .preload(&app.text_input, &app.settings.morse);
    }

    if app.settings.ui.show_code && !app.text_input.is_empty() {
        ui.label(RichText::new(text_to_code(&app.text_input)).monospace().weak());
    }

    ui.horizontal(|ui| {
        if ui.button("Generate Lesson").clicked() {
            app.generate_lesson();
        }
        if ui.button("Open...").clicked() {
            app.open_text_file();
        }
        if ui
            .add_enabled(editable, egui::Button::new("Clear"))
            .clicked()
        {
            app.set_text(String::new());
        }
    });
}

fn render_transport(ui: &mut egui::Ui, app: &mut KochApp, state: &PlaybackState) {
    ui.horizontal(|ui| {
        let play_label = match state.status {
            PlaybackStatus::Idle => "Play",
            PlaybackStatus::Playing => "Pause",
            PlaybackStatus::Paused => "Resume",
        };
        let can_play = app.controller.is_audio_available()
            && (state.status != PlaybackStatus::Idle || !app.text_input.trim().is_empty());
        if ui
            .add_enabled(can_play, egui::Button::new(play_label))
            .clicked()
        {
            app.toggle_play();
        }

        if ui
            .add_enabled(state.status != PlaybackStatus::Idle, egui::Button::new("Stop"))
            .clicked()
        {
            app.stop();
        }

        if ui.button("Replay").clicked() {
            app.replay();
        }

        ui.add_space(10.0);

        ui.label(
            RichText::new(format!(
                "{} / {}",
                format_time(state.current_time),
                format_time(state.total_duration)
            ))
            .monospace(),
        );
    });

    // Seek bar
    let mut fraction = state.progress();
    let response = ui.add_enabled(
        state.status != PlaybackStatus::Idle,
        egui::Slider::new(&mut fraction, 0.0..=1.0).show_value(false),
    );
    if response.changed() {
        app.seek(fraction as f64 * state.total_duration);
    }
}

fn status_color(color: StatusColor) -> Color32 {
    match color {
        StatusColor::Gray => Color32::GRAY,
        StatusColor::Yellow => Color32::YELLOW,
        StatusColor::LightBlue => Color32::LIGHT_BLUE,
        StatusColor::Green => Color32::from_rgb(100, 200, 100),
        StatusColor::Orange => Color32::from_rgb(255, 165, 0),
    }
}

fn render_status(ui: &mut egui::Ui, app: &KochApp, state: &PlaybackState) {
    let (status_text, color) = state.status_text();

    ui.horizontal(|ui| {
        ui.label(RichText::new("Status:").strong());
        ui.label(RichText::new(status_text).color(status_color(color)));

        if let Some((ch, _)) = app.controller.current_char() {
            ui.add_space(20.0);
            ui.label(RichText::new(ch.to_string()).monospace().strong());
        }
    });
}

/// Step plot of the keying envelope with a play head; click to seek
fn render_waveform(ui: &mut egui::Ui, app: &mut KochApp, state: &PlaybackState) {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(Vec2::new(width, WAVEFORM_HEIGHT), Sense::click());
    let rect = response.rect;
    painter.rect_filled(rect, 2.0, ui.visuals().extreme_bg_color);

    let samples = app.controller.waveform_data();
    let total = state.total_duration;
    if samples.is_empty() || total <= 0.0 {
        return;
    }

    let to_x = |t: f64| rect.left() + (t / total).clamp(0.0, 1.0) as f32 * rect.width();
    let to_y = |v: f32| rect.bottom() - 4.0 - v * (rect.height() - 8.0);

    let mut points = Vec::with_capacity(samples.len() * 2);
    let mut prev: Option<f32> = None;
    for &(t, v) in samples {
        let x = to_x(t);
        if let Some(prev_y) = prev {
            points.push(Pos2::new(x, prev_y));
        }
        let y = to_y(v);
        points.push(Pos2::new(x, y));
        prev = Some(y);
    }
    painter.add(egui::Shape::line(
        points,
        Stroke::new(1.5, Color32::from_rgb(100, 200, 100)),
    ));

    if state.status != PlaybackStatus::Idle || state.is_complete() {
        let x = to_x(state.current_time);
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::YELLOW),
        );
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let fraction = ((pos.x - rect.left()) / rect.width()).clamp(0.0, 1.0) as f64;
            app.seek(fraction * total);
        }
    }
}

fn render_answer(ui: &mut egui::Ui, app: &mut KochApp) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Copy:").strong());
        let response = ui.add_sized(
            Vec2::new(ui.available_width() - 70.0, 24.0),
            egui::TextEdit::singleline(&mut app.answer_input)
                .font(egui::TextStyle::Monospace)
                .hint_text("Type what you heard"),
        );
        if response.changed() {
            app.answer_input = app.answer_input.to_uppercase();
        }
        if app.focus_answer && !app.show_settings {
            response.request_focus();
            app.focus_answer = false;
        }

        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Check").clicked() || submitted {
            app.grade_answer();
        }
    });
}

fn render_grade(ui: &mut egui::Ui, result: &GradeResult) {
    let color = if result.accuracy >= 90.0 {
        Color32::GREEN
    } else if result.accuracy >= 70.0 {
        Color32::YELLOW
    } else {
        Color32::RED
    };

    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{:.0}%", result.accuracy)).color(color).strong());
        ui.label(format!("{} correct, {} errors", result.correct, result.errors));
    });

    // Sent text with mistakes marked
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for op in &result.ops {
            let text = match *op {
                AlignOp::Match(ch) => RichText::new(ch.to_string()).color(Color32::GREEN),
                AlignOp::Substitute { expected, .. } => {
                    RichText::new(expected.to_string()).color(Color32::RED).underline()
                }
                AlignOp::Delete(expected) => {
                    RichText::new(expected.to_string()).color(Color32::GRAY).strikethrough()
                }
                AlignOp::Insert(typed) => {
                    RichText::new(typed.to_string()).color(Color32::from_rgb(255, 165, 0))
                }
            };
            ui.label(text.monospace());
        }
    });
}

/// Code chart for every supported character, lesson characters highlighted,
/// with a dot/dash lookup field
fn render_reference(ui: &mut egui::Ui, app: &mut KochApp) {
    let lesson = lesson_chars(app.settings.practice.koch_level);

    egui::CollapsingHeader::new("Morse Reference")
        .default_open(false)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Code:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.lookup_input)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(100.0)
                        .hint_text(".-.-.-"),
                );
                let code = app.lookup_input.trim();
                if !code.is_empty() {
                    match decode(code) {
                        Some(ch) => ui.label(RichText::new(ch.to_string()).monospace().strong()),
                        None => ui.label(RichText::new("no match").weak()),
                    };
                }
            });

            ui.add_space(4.0);
            egui::Grid::new("morse_reference")
                .num_columns(8)
                .spacing([12.0, 2.0])
                .show(ui, |ui| {
                    for (i, &ch) in SUPPORTED_CHARS.iter().enumerate() {
                        let code = encode(ch).unwrap_or_default();
                        let text = RichText::new(format!("{} {}", ch, code)).monospace();
                        let text = if lesson.contains(&ch) {
                            text.color(Color32::from_rgb(100, 200, 100))
                        } else {
                            text.weak()
                        };
                        ui.label(text);
                        if i % 8 == 7 {
                            ui.end_row();
                        }
                    }
                });
        });
}

fn render_key_hints(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("F1").strong().monospace());
        ui.label("Play/Pause");
        ui.add_space(10.0);

        ui.label(RichText::new("F2").strong().monospace());
        ui.label("Replay");
        ui.add_space(10.0);

        ui.label(RichText::new("F3").strong().monospace());
        ui.label("New Lesson");
        ui.add_space(10.0);

        ui.label(RichText::new("PgUp/PgDn").strong().monospace());
        ui.label("WPM");
        ui.add_space(10.0);

        ui.label(RichText::new("Esc").strong().monospace());
        ui.label("Stop");
    });
}
