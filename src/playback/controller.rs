//! Transport state machine over the audio scheduler.
//!
//! `Idle --play--> Playing --pause--> Paused --resume--> Playing`, with
//! `stop` returning to `Idle` from anywhere and `seek` keeping the current
//! state. A repeating poll tick publishes progress while playing and returns
//! to `Idle` once the clock passes the end of the timeline.

use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};

use super::state::{PlaybackState, PlaybackStatus};
use super::timer::ProgressTimer;
use crate::audio::{AudioError, AudioScheduler, CpalOutput, OutputDevice};
use crate::config::MorseSettings;
use crate::messages::AudioEvent;
use crate::morse::{build_timeline, waveform, Timeline};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Playback counts as finished this close to the end
pub const COMPLETION_EPSILON: f64 = 0.01;

/// Spacing of waveform samples handed to the UI
pub const WAVEFORM_INTERVAL: f64 = 0.005;

/// Text with everything derived from it for one playback
struct PlaybackContent {
    text: String,
    settings: MorseSettings,
    timeline: Timeline,
    waveform: Vec<(f64, f32)>,
}

impl PlaybackContent {
    fn build(text: &str, settings: &MorseSettings) -> Self {
        let timeline = build_timeline(text, &settings.timing());
        let waveform = waveform::sample(&timeline, WAVEFORM_INTERVAL);
        log::debug!(
            "Built timeline: {} events, {:.2}s",
            timeline.events().len(),
            timeline.duration()
        );
        Self {
            text: text.to_string(),
            settings: settings.clone(),
            timeline,
            waveform,
        }
    }

    /// Same keying: tone and volume don't change the timeline
    fn matches(&self, text: &str, settings: &MorseSettings) -> bool {
        self.text == text && self.settings.timing() == settings.timing()
    }
}

type StateCallback = Box<dyn FnMut(&PlaybackState)>;

pub struct PlaybackController {
    scheduler: AudioScheduler,
    state: PlaybackState,
    timer: ProgressTimer,
    /// What is (or was last) scheduled; also the replay cache
    content: Option<PlaybackContent>,
    preloaded: Option<PlaybackContent>,
    subscribers: Vec<Sender<PlaybackState>>,
    callbacks: Vec<StateCallback>,
    event_rx: Receiver<AudioEvent>,
}

impl PlaybackController {
    /// Open the default audio output. Failure leaves the controller usable
    /// but silent.
    pub fn new(settings: &MorseSettings) -> Self {
        let (event_tx, event_rx) = bounded::<AudioEvent>(64);
        let device = CpalOutput::new(event_tx, &settings.clamped())
            .map(|output| Box::new(output) as Box<dyn OutputDevice>);
        Self::with_device(device, event_rx)
    }

    pub fn with_device(
        device: Result<Box<dyn OutputDevice>, AudioError>,
        event_rx: Receiver<AudioEvent>,
    ) -> Self {
        Self {
            scheduler: AudioScheduler::new(device),
            state: PlaybackState::default(),
            timer: ProgressTimer::new(POLL_INTERVAL),
            content: None,
            preloaded: None,
            subscribers: Vec::new(),
            callbacks: Vec::new(),
            event_rx,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_audio_available(&self) -> bool {
        self.scheduler.is_available()
    }

    /// Receive every published state, in transition order
    pub fn subscribe(&mut self) -> Receiver<PlaybackState> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn on_state_change(&mut self, callback: impl FnMut(&PlaybackState) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Build and cache the timeline for `text` without playing it
    pub fn preload(&mut self, text: &str, settings: &MorseSettings) {
        let content = PlaybackContent::build(text, &settings.clamped());
        if self.state.status == PlaybackStatus::Idle {
            self.set_state(PlaybackState {
                total_duration: content.timeline.duration(),
                ..PlaybackState::default()
            });
        }
        self.preloaded = Some(content);
    }

    pub fn play(&mut self, text: &str, settings: &MorseSettings) {
        self.play_at(text, settings, Instant::now());
    }

    /// Start playing from the beginning. Anything already playing or paused
    /// is cancelled first.
    pub fn play_at(&mut self, text: &str, settings: &MorseSettings, now: Instant) {
        let settings = settings.clamped();
        let content = match self.preloaded.take() {
            Some(mut preloaded) if preloaded.matches(text, &settings) => {
                preloaded.settings = settings.clone();
                preloaded
            }
            _ => PlaybackContent::build(text, &settings),
        };

        if !self.scheduler.is_available() {
            log::warn!("Audio unavailable, not playing");
            self.content = Some(content);
            return;
        }

        if self.state.status != PlaybackStatus::Idle {
            self.halt();
        }

        self.scheduler.set_frequency(settings.tone_hz);
        self.scheduler.set_volume(settings.volume);
        if !self.scheduler.resume_clock() {
            self.content = Some(content);
            return;
        }

        let total_duration = self.scheduler.schedule(&content.timeline);
        self.content = Some(content);
        self.timer.start(now);

        log::info!("Playing {:.2}s of Morse", total_duration);
        self.set_state(PlaybackState {
            status: PlaybackStatus::Playing,
            current_time: 0.0,
            total_duration,
            paused_at: 0.0,
        });
    }

    pub fn pause(&mut self) {
        if self.state.status != PlaybackStatus::Playing {
            log::warn!("Ignoring pause while {:?}", self.state.status);
            return;
        }

        let position = self
            .scheduler
            .current_time()
            .min(self.state.total_duration);
        self.scheduler.release();
        self.scheduler.suspend_clock();
        self.timer.cancel();

        log::info!("Paused at {:.2}s", position);
        self.set_state(PlaybackState {
            status: PlaybackStatus::Paused,
            current_time: position,
            paused_at: position,
            ..self.state
        });
    }

    pub fn resume(&mut self) {
        self.resume_at(Instant::now());
    }

    pub fn resume_at(&mut self, now: Instant) {
        if self.state.status != PlaybackStatus::Paused {
            log::warn!("Ignoring resume while {:?}", self.state.status);
            return;
        }
        if !self.scheduler.resume_clock() {
            return;
        }

        let position = self.state.paused_at;
        self.scheduler.schedule_from(position);
        self.timer.start(now);

        log::info!("Resumed from {:.2}s", position);
        self.set_state(PlaybackState {
            status: PlaybackStatus::Playing,
            current_time: position,
            ..self.state
        });
    }

    /// Back to idle from any state. Safe to call at any time.
    pub fn stop(&mut self) {
        let was_active = self.state.status != PlaybackStatus::Idle;
        self.halt();
        self.scheduler.suspend_clock();

        let next = PlaybackState {
            status: PlaybackStatus::Idle,
            current_time: 0.0,
            paused_at: 0.0,
            total_duration: self.state.total_duration,
        };
        if was_active {
            log::info!("Stopped");
        }
        if next != self.state {
            self.set_state(next);
        }
    }

    /// Jump to `seconds`, clamped to the timeline. Playing continues from
    /// there; paused stays paused at the new position.
    pub fn seek(&mut self, seconds: f64) {
        if self.state.status == PlaybackStatus::Idle {
            log::warn!("Ignoring seek to {:.2}s while idle", seconds);
            return;
        }
        if self.content.is_none() {
            log::warn!("Ignoring seek with nothing loaded");
            return;
        }

        let position = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, self.state.total_duration)
        };

        match self.state.status {
            PlaybackStatus::Playing => {
                self.scheduler.schedule_from(position);
                self.set_state(PlaybackState {
                    current_time: position,
                    ..self.state
                });
            }
            PlaybackStatus::Paused => {
                self.set_state(PlaybackState {
                    current_time: position,
                    paused_at: position,
                    ..self.state
                });
            }
            PlaybackStatus::Idle => {}
        }
    }

    pub fn replay(&mut self) {
        self.replay_at(Instant::now());
    }

    /// Play the cached text again from the start
    pub fn replay_at(&mut self, now: Instant) {
        let Some((text, settings)) = self
            .current_content()
            .map(|c| (c.text.clone(), c.settings.clone()))
        else {
            log::warn!("Nothing to replay");
            return;
        };
        self.play_at(&text, &settings, now);
    }

    pub fn set_frequency(&mut self, tone_hz: f32) {
        self.scheduler.set_frequency(tone_hz);
        for content in self.content.iter_mut().chain(self.preloaded.iter_mut()) {
            content.settings.tone_hz = tone_hz;
            content.settings = content.settings.clamped();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.scheduler.set_volume(volume);
        for content in self.content.iter_mut().chain(self.preloaded.iter_mut()) {
            content.settings.volume = volume;
            content.settings = content.settings.clamped();
        }
    }

    /// Step waveform of the loaded timeline
    pub fn waveform_data(&self) -> &[(f64, f32)] {
        self.current_content()
            .map(|c| c.waveform.as_slice())
            .unwrap_or(&[])
    }

    /// Text of the loaded timeline
    pub fn current_text(&self) -> Option<&str> {
        self.current_content().map(|c| c.text.as_str())
    }

    /// The character under the play head and its index in the text
    pub fn current_char(&self) -> Option<(char, usize)> {
        if self.state.status == PlaybackStatus::Idle {
            return None;
        }
        self.content
            .as_ref()
            .and_then(|c| c.timeline.char_at(self.state.current_time))
    }

    /// Time until the next poll tick, if playing
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Drive the poll loop; call from the UI loop as often as convenient
    pub fn update_at(&mut self, now: Instant) {
        self.process_audio_events();

        if self.state.status != PlaybackStatus::Playing || !self.timer.fire(now) {
            return;
        }

        let total_duration = self.state.total_duration;
        let current_time = self.scheduler.current_time();

        if current_time >= total_duration - COMPLETION_EPSILON {
            self.timer.cancel();
            self.scheduler.release();
            self.scheduler.suspend_clock();
            log::info!("Playback complete");
            self.set_state(PlaybackState {
                status: PlaybackStatus::Idle,
                current_time: total_duration,
                total_duration,
                paused_at: 0.0,
            });
        } else {
            self.set_state(PlaybackState {
                current_time,
                ..self.state
            });
        }
    }

    /// Release the audio device. The controller is silent afterwards.
    pub fn dispose(&mut self) {
        self.stop();
        self.scheduler.dispose();
        self.subscribers.clear();
        self.callbacks.clear();
    }

    fn current_content(&self) -> Option<&PlaybackContent> {
        if self.state.status == PlaybackStatus::Idle && self.preloaded.is_some() {
            self.preloaded.as_ref()
        } else {
            self.content.as_ref().or(self.preloaded.as_ref())
        }
    }

    /// Cancel audio and the poll timer without publishing
    fn halt(&mut self) {
        self.timer.cancel();
        self.scheduler.stop();
    }

    fn process_audio_events(&mut self) {
        loop {
            match self.event_rx.try_recv() {
                Ok(AudioEvent::StreamError(message)) => {
                    log::warn!("Audio stream error: {}", message);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
        self.subscribers.retain(|tx| tx.send(state).is_ok());
        for callback in &mut self.callbacks {
            callback(&state);
        }
    }
}
