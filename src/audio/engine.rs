use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

use super::chain::{lock_chain, SharedChain, ToneChain};
use super::device::OutputDevice;
use super::error::AudioError;
use crate::config::MorseSettings;
use crate::messages::AudioEvent;

/// The system's default output, rendering the tone chain on the cpal
/// callback thread
pub struct CpalOutput {
    chain: SharedChain,
    stream: Option<cpal::Stream>,
}

impl CpalOutput {
    pub fn new(event_tx: Sender<AudioEvent>, settings: &MorseSettings) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_rate = supported_config.sample_rate().0;

        let chain = ToneChain::new(sample_rate, settings.tone_hz, settings.volume).shared();
        let chain_for_callback = SharedChain::clone(&chain);

        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &supported_config.into(),
                chain_for_callback,
                event_tx,
            )?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &supported_config.into(),
                chain_for_callback,
                event_tx,
            )?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &supported_config.into(),
                chain_for_callback,
                event_tx,
            )?,
            other => return Err(AudioError::UnsupportedSampleFormat(format!("{:?}", other))),
        };

        // The stream runs for the device's lifetime; the chain starts
        // suspended so the clock waits for the first resume.
        stream.play()?;

        log::info!(
            "Opened audio output {} at {} Hz",
            device.name().unwrap_or_else(|_| "(unnamed)".to_string()),
            sample_rate
        );

        Ok(Self {
            chain,
            stream: Some(stream),
        })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        chain: SharedChain,
        event_tx: Sender<AudioEvent>,
    ) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;

        device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let num_frames = data.len() / channels;
                let mut mono_buffer = vec![0.0f32; num_frames];

                {
                    let mut chain = lock_chain(&chain);
                    chain.fill_buffer(&mut mono_buffer);
                }

                // Duplicate mono to all channels
                for (frame_idx, frame) in data.chunks_mut(channels).enumerate() {
                    let sample = mono_buffer.get(frame_idx).copied().unwrap_or(0.0);
                    let converted: T = T::from_sample(sample);
                    for channel_sample in frame.iter_mut() {
                        *channel_sample = converted;
                    }
                }
            },
            move |err| {
                let _ = event_tx.try_send(AudioEvent::StreamError(err.to_string()));
            },
            None,
        )
    }
}

impl OutputDevice for CpalOutput {
    fn chain(&self) -> &SharedChain {
        &self.chain
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.stream.is_none() {
            return Err(AudioError::Closed);
        }
        let mut chain = lock_chain(&self.chain);
        if !chain.is_running() {
            log::debug!("Audio clock resumed at {:.3}s", chain.now());
        }
        chain.set_running(true);
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        if self.stream.is_none() {
            return Err(AudioError::Closed);
        }
        let mut chain = lock_chain(&self.chain);
        if chain.is_running() {
            log::debug!("Audio clock suspended at {:.3}s", chain.now());
        }
        chain.set_running(false);
        Ok(())
    }

    fn close(&mut self) {
        lock_chain(&self.chain).set_running(false);
        if self.stream.take().is_some() {
            log::debug!("Closed audio output stream");
        }
    }

    fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}
