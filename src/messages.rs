/// Messages from the audio device thread to the UI thread
#[derive(Clone, Debug, PartialEq)]
pub enum AudioEvent {
    /// The output stream reported an error; playback may have gone silent
    StreamError(String),
}
