use crossbeam_channel::Receiver;
use egui::Key;
use egui_file_dialog::FileDialog;
use std::path::Path;
use std::time::Instant;

use crate::config::AppSettings;
use crate::playback::controller::POLL_INTERVAL;
use crate::playback::{PlaybackController, PlaybackState, PlaybackStatus};
use crate::practice::{grade, GradeResult, PracticeGenerator, KOCH_ORDER};
use crate::ui::{render_main_panel, render_settings_panel};

pub struct KochApp {
    pub settings: AppSettings,
    pub notice: Option<String>,

    pub controller: PlaybackController,
    state_rx: Receiver<PlaybackState>,
    generator: PracticeGenerator,

    /// Text to send
    pub text_input: String,
    /// What the user copied
    pub answer_input: String,
    pub last_grade: Option<GradeResult>,
    pub focus_answer: bool,
    /// Dots and dashes typed into the reference lookup
    pub lookup_input: String,

    // UI state
    pub show_settings: bool,
    settings_changed: bool,

    file_dialog: FileDialog,
}

impl KochApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let load = AppSettings::load_with_notice();
        let settings = load.settings;

        let mut controller = PlaybackController::new(&settings.morse);
        let state_rx = controller.subscribe();
        let mut last_status = PlaybackStatus::Idle;
        controller.on_state_change(move |state| {
            if state.status != last_status {
                log::debug!("Playback {:?} -> {:?}", last_status, state.status);
                last_status = state.status;
            }
        });
        let notice = if controller.is_audio_available() {
            load.notice
        } else {
            Some("No audio output available. Playback is disabled.".to_string())
        };

        Self {
            settings,
            notice,
            controller,
            state_rx,
            generator: PracticeGenerator::new(),
            text_input: String::new(),
            answer_input: String::new(),
            last_grade: None,
            focus_answer: false,
            lookup_input: String::new(),
            show_settings: false,
            settings_changed: false,
            file_dialog: FileDialog::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    /// Replace the text with a fresh Koch lesson and get it ready to play
    pub fn generate_lesson(&mut self) {
        let timing = self.settings.morse.timing();
        let text = self.generator.generate(&self.settings.practice, &timing);
        log::info!(
            "Generated lesson {} text: {} chars",
            self.settings.practice.koch_level,
            text.len()
        );
        self.set_text(text);
    }

    pub fn set_text(&mut self, text: String) {
        self.controller.stop();
        self.text_input = text;
        self.reset_answer();
        self.controller.preload(&self.text_input, &self.settings.morse);
    }

    pub fn open_text_file(&mut self) {
        self.file_dialog.pick_file();
    }

    fn load_text_file(&mut self, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                log::info!("Loaded practice text from {}", path.display());
                self.set_text(content.trim().to_string());
            }
            Err(e) => {
                log::warn!("Unable to read {}: {}", path.display(), e);
                self.notice = Some(format!("Could not open {}: {}", path.display(), e));
            }
        }
    }

    pub fn play(&mut self) {
        if self.text_input.trim().is_empty() {
            return;
        }
        self.reset_answer();
        self.controller.play(&self.text_input, &self.settings.morse);
    }

    /// Play from idle, otherwise pause or resume
    pub fn toggle_play(&mut self) {
        match self.state().status {
            PlaybackStatus::Idle => self.play(),
            PlaybackStatus::Playing => self.controller.pause(),
            PlaybackStatus::Paused => self.controller.resume(),
        }
    }

    pub fn stop(&mut self) {
        self.controller.stop();
    }

    pub fn replay(&mut self) {
        self.reset_answer();
        self.controller.replay();
    }

    pub fn seek(&mut self, seconds: f64) {
        self.controller.seek(seconds);
    }

    pub fn grade_answer(&mut self) {
        let Some(sent) = self.controller.current_text() else {
            return;
        };
        let result = grade(sent, &self.answer_input);
        log::info!(
            "Graded answer: {:.0}% ({} correct, {} errors)",
            result.accuracy,
            result.correct,
            result.errors
        );
        self.last_grade = Some(result);
    }

    fn reset_answer(&mut self) {
        self.answer_input.clear();
        self.last_grade = None;
    }

    fn process_state_updates(&mut self) {
        while let Ok(state) = self.state_rx.try_recv() {
            if state.is_complete() {
                self.focus_answer = true;
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            // F1 - Play / Pause / Resume
            if i.key_pressed(Key::F1) {
                self.toggle_play();
            }

            // F2 - Replay
            if i.key_pressed(Key::F2) {
                self.replay();
            }

            // F3 - New lesson text
            if i.key_pressed(Key::F3) {
                self.generate_lesson();
            }

            // Page Up / Down - Character speed
            if i.key_pressed(Key::PageUp) && self.settings.morse.char_speed < 50.0 {
                self.settings.morse.char_speed += 1.0;
                self.settings_changed = true;
            }
            if i.key_pressed(Key::PageDown) && self.settings.morse.char_speed > 5.0 {
                self.settings.morse.char_speed -= 1.0;
                self.settings_changed = true;
            }

            // Escape - Stop
            if i.key_pressed(Key::Escape) {
                self.stop();
            }
        });
    }

    fn apply_settings_changes(&mut self) {
        if self.settings_changed {
            self.settings.morse = self.settings.morse.clamped();
            self.settings.practice = self.settings.practice.clamped(KOCH_ORDER.len());

            self.controller.set_frequency(self.settings.morse.tone_hz);
            self.controller.set_volume(self.settings.morse.volume);

            // Speed changes need a new timeline
            if self.state().status == PlaybackStatus::Idle && !self.text_input.is_empty() {
                self.controller
                    .preload(&self.text_input, &self.settings.morse);
            }

            if let Err(e) = self.settings.save() {
                log::warn!("Failed to save settings: {}", e);
            }

            self.settings_changed = false;
        }
    }
}

impl eframe::App for KochApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size
        ctx.style_mut(|style| {
            style.text_styles.iter_mut().for_each(|(_, font_id)| {
                font_id.size = self.settings.ui.font_size;
            });
        });

        // Advance playback and pick up published state
        self.controller.update();
        self.process_state_updates();

        // Handle keyboard input
        self.handle_keyboard(ctx);

        // Apply any settings changes
        self.apply_settings_changes();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Text...").clicked() {
                        self.open_text_file();
                        ui.close();
                    }
                    if ui.button("Settings").clicked() {
                        self.show_settings = !self.show_settings;
                        ui.close();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Settings window (separate OS window)
        if self.show_settings {
            let settings = &mut self.settings;
            let settings_changed = &mut self.settings_changed;
            let show_settings = &mut self.show_settings;

            ctx.show_viewport_immediate(
                egui::ViewportId::from_hash_of("settings_viewport"),
                egui::ViewportBuilder::default()
                    .with_title("Settings")
                    .with_inner_size([420.0, 460.0]),
                |ctx, _class| {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        render_settings_panel(ui, settings, settings_changed);
                    });

                    if ctx.input(|i| i.viewport().close_requested()) {
                        *show_settings = false;
                    }
                },
            );
        }

        // Text file picker
        self.file_dialog.update(ctx);
        if let Some(path) = self.file_dialog.take_picked() {
            self.load_text_file(&path);
        }

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| {
            render_main_panel(ui, self);
        });

        // Wake up for the next progress tick while playing
        if self.state().is_playing() {
            if let Some(wait) = self.controller.next_tick_in(Instant::now()) {
                ctx.request_repaint_after(wait.min(POLL_INTERVAL));
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.dispose();
        log::info!("Audio released on exit");
    }
}
