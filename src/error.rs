/// Failures opening or driving the audio output.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No default audio output device found")]
    NoOutputDevice,

    #[error("Failed to read default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Unsupported output sample format from audio device: {0}")]
    UnsupportedSampleFormat(String),

    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}
