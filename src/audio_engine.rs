use std::f32::consts::TAU;
use std::sync::{Arc, RwLock};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::AudioError;
use crate::types::{clamp_finite, SimulationParams, AMPLITUDE_MAX, AMPLITUDE_MIN};

pub const BASE_TONE_HZ: f32 = 100.0;
pub const TONE_SCALE: f32 = 15.0;
pub const TONE_MIN_HZ: f32 = 60.0;
pub const TONE_MAX_HZ: f32 = 2_000.0;
pub const VOLUME_SCALE: f32 = 0.15;
pub const OUTPUT_ATTENUATION: f32 = 0.1;
/// Time constant of the frequency and gain ramps, in seconds.
pub const SMOOTHING_SECONDS: f32 = 0.1;

/// Plate "pitch": grows with the sum of squared mode indices, kept audible.
pub fn tone_frequency(freq_m: f32, freq_n: f32) -> f32 {
    let target = BASE_TONE_HZ + (freq_m * freq_m + freq_n * freq_n) * TONE_SCALE;
    if target.is_nan() {
        return TONE_MIN_HZ;
    }
    target.clamp(TONE_MIN_HZ, TONE_MAX_HZ)
}

pub fn tone_volume(amplitude: f32) -> f32 {
    clamp_finite(amplitude, AMPLITUDE_MIN, AMPLITUDE_MAX) / AMPLITUDE_MAX * VOLUME_SCALE
}

/// What the oscillator should converge to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToneTarget {
    pub frequency: f32,
    pub gain: f32,
    /// Set once by the first tone request; the oscillator never stops after.
    pub running: bool,
}

/// Output side of the tone controller.
pub trait ToneSink {
    fn set_target(&self, target: ToneTarget);
    fn resume(&self) -> Result<(), AudioError>;
}

pub struct AudioEngine {
    target: Arc<RwLock<ToneTarget>>,
    stream: cpal::Stream,
    pub device_name: String,
    pub sample_rate: u32,
}

impl AudioEngine {
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown output device".to_owned());

        let supported_config = device.default_output_config()?;
        let config = supported_config.config();
        let sample_rate = config.sample_rate.0;

        let target = Arc::new(RwLock::new(ToneTarget::default()));

        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, target.clone())?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, target.clone())?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, target.clone())?,
            other => return Err(AudioError::UnsupportedSampleFormat(format!("{other:?}"))),
        };

        stream.play()?;
        log::info!("audio output on {device_name} at {sample_rate} Hz");

        Ok(Self {
            target,
            stream,
            device_name,
            sample_rate,
        })
    }
}

impl ToneSink for AudioEngine {
    fn set_target(&self, target: ToneTarget) {
        write_copy(&self.target, target);
    }

    fn resume(&self) -> Result<(), AudioError> {
        self.stream.play()?;
        Ok(())
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    target: Arc<RwLock<ToneTarget>>,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut voice = ToneVoice::new(config.sample_rate.0 as f32);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let target = read_copy(&target);
            write_audio_buffer(data, channels, &mut voice, target);
        },
        move |err| {
            log::error!("audio stream error: {err}");
        },
        None,
    )?;

    Ok(stream)
}

fn write_audio_buffer<T>(
    output: &mut [T],
    channels: usize,
    voice: &mut ToneVoice,
    target: ToneTarget,
) where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    for frame in output.chunks_mut(channels) {
        let sample = T::from_sample(voice.next_sample(target));
        for out in frame.iter_mut() {
            *out = sample;
        }
    }
}

/// Sine oscillator whose frequency and gain approach their targets
/// exponentially, like a Web Audio `setTargetAtTime` ramp.
struct ToneVoice {
    sample_rate: f32,
    smoothing: f32,
    phase: f32,
    frequency: f32,
    gain: f32,
    running: bool,
}

impl ToneVoice {
    fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        Self {
            sample_rate,
            smoothing: 1.0 - (-1.0 / (SMOOTHING_SECONDS * sample_rate)).exp(),
            phase: 0.0,
            frequency: 0.0,
            gain: 0.0,
            running: false,
        }
    }

    fn next_sample(&mut self, target: ToneTarget) -> f32 {
        if !self.running {
            if !target.running {
                return 0.0;
            }
            // Start at pitch; only the gain fades in.
            self.running = true;
            self.frequency = target.frequency;
        }

        self.frequency += (target.frequency - self.frequency) * self.smoothing;
        self.gain += (target.gain - self.gain) * self.smoothing;
        self.phase = wrap_phase(self.phase + TAU * self.frequency / self.sample_rate);
        self.phase.sin() * self.gain
    }
}

enum ToneState<S> {
    Uninitialized,
    Unavailable,
    Ready {
        sink: S,
        target: ToneTarget,
        playing: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneStatus {
    Uninitialized,
    Unavailable,
    Muted,
    Playing,
}

type Opener<S> = Box<dyn FnMut() -> Result<S, AudioError>>;

/// Lazily opens the output on the first tone request and only retunes it
/// afterwards. If opening fails every later call is a no-op.
pub struct ToneController<S: ToneSink = AudioEngine> {
    state: ToneState<S>,
    opener: Opener<S>,
}

impl ToneController<AudioEngine> {
    pub fn new() -> Self {
        Self::with_opener(AudioEngine::new)
    }
}

impl Default for ToneController<AudioEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ToneSink> ToneController<S> {
    pub fn with_opener(opener: impl FnMut() -> Result<S, AudioError> + 'static) -> Self {
        Self {
            state: ToneState::Uninitialized,
            opener: Box::new(opener),
        }
    }

    pub fn status(&self) -> ToneStatus {
        match &self.state {
            ToneState::Uninitialized => ToneStatus::Uninitialized,
            ToneState::Unavailable => ToneStatus::Unavailable,
            ToneState::Ready { playing: true, .. } => ToneStatus::Playing,
            ToneState::Ready { playing: false, .. } => ToneStatus::Muted,
        }
    }

    pub fn sink(&self) -> Option<&S> {
        match &self.state {
            ToneState::Ready { sink, .. } => Some(sink),
            _ => None,
        }
    }

    /// Current target, if the output is open.
    pub fn target(&self) -> Option<ToneTarget> {
        match &self.state {
            ToneState::Ready { target, .. } => Some(*target),
            _ => None,
        }
    }

    fn ensure_initialized(&mut self) {
        if !matches!(self.state, ToneState::Uninitialized) {
            return;
        }
        self.state = match (self.opener)() {
            Ok(sink) => {
                let target = ToneTarget::default();
                sink.set_target(target);
                ToneState::Ready {
                    sink,
                    target,
                    playing: false,
                }
            }
            Err(err) => {
                log::warn!("audio disabled: {err}");
                ToneState::Unavailable
            }
        };
    }

    pub fn play_tone(&mut self, freq_m: f32, freq_n: f32, volume: f32) {
        self.ensure_initialized();
        if let ToneState::Ready {
            sink,
            target,
            playing,
        } = &mut self.state
        {
            *target = ToneTarget {
                frequency: tone_frequency(freq_m, freq_n),
                gain: clamp_finite(volume, 0.0, 1.0) * OUTPUT_ATTENUATION,
                running: true,
            };
            sink.set_target(*target);
            *playing = true;
        }
    }

    pub fn stop_tone(&mut self) {
        if let ToneState::Ready {
            sink,
            target,
            playing,
        } = &mut self.state
        {
            target.gain = 0.0;
            sink.set_target(*target);
            *playing = false;
        }
    }

    pub fn resume(&self) {
        if let ToneState::Ready { sink, .. } = &self.state {
            if let Err(err) = sink.resume() {
                log::warn!("{err}");
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ToneKey {
    freq_m: f32,
    freq_n: f32,
    amplitude: f32,
    audio_on: bool,
}

/// Re-issues tone commands only when the inputs that shape the tone change.
#[derive(Debug, Default)]
pub struct ToneSync {
    last: Option<ToneKey>,
}

impl ToneSync {
    pub fn sync<S: ToneSink>(
        &mut self,
        controller: &mut ToneController<S>,
        params: &SimulationParams,
        audio_on: bool,
    ) -> bool {
        let key = ToneKey {
            freq_m: params.frequency_m,
            freq_n: params.frequency_n,
            amplitude: params.amplitude,
            audio_on,
        };
        if self.last == Some(key) {
            return false;
        }
        self.last = Some(key);

        if audio_on && params.amplitude > 0.0 {
            controller.play_tone(
                params.frequency_m,
                params.frequency_n,
                tone_volume(params.amplitude),
            );
        } else {
            controller.stop_tone();
        }
        true
    }
}

fn read_copy<T: Copy>(lock: &RwLock<T>) -> T {
    match lock.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_copy<T: Copy>(lock: &RwLock<T>, value: T) {
    match lock.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

fn wrap_phase(mut phase: f32) -> f32 {
    while phase >= TAU {
        phase -= TAU;
    }
    phase
}
