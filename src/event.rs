/// Completions of the simulated backend delays, delivered to the UI thread
/// over the app channel.
#[derive(Debug, Clone)]
pub enum AppEvent {
    OtpSent { phone: String },
    OtpVerified { phone: String },
    AiReplyReady { chat_id: String, text: String },
    OlderMessagesSettled { chat_id: String },
}
