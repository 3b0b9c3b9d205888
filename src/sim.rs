//! Stand-in for the backend this demo does not have. Every "remote"
//! interaction is a delayed `AppEvent`: OTP delivery, OTP verification, the
//! AI reply, and the scroll-settle pause after revealing an older page.

use crate::event::AppEvent;
use rand::Rng;
use std::sync::mpsc;
use tokio::runtime::Handle;
use tokio::time::{self, Duration};

const OTP_DELAY_MS: u64 = 1000;
const SETTLE_DELAY_MS: u64 = 1000;
const AI_REPLY_BASE_MS: u64 = 1500;
const AI_REPLY_JITTER_MS: u64 = 1000;

#[derive(Clone)]
pub struct Simulator {
    runtime: Handle,
    tx: mpsc::Sender<AppEvent>,
}

impl Simulator {
    pub fn new(runtime: Handle, tx: mpsc::Sender<AppEvent>) -> Self {
        Self { runtime, tx }
    }

    fn schedule(&self, delay: Duration, event: AppEvent) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            time::sleep(delay).await;
            // The receiver is gone only during shutdown.
            let _ = tx.send(event);
        });
    }

    pub fn send_otp(&self, phone: String) {
        self.schedule(
            Duration::from_millis(OTP_DELAY_MS),
            AppEvent::OtpSent { phone },
        );
    }

    pub fn verify_otp(&self, phone: String) {
        self.schedule(
            Duration::from_millis(OTP_DELAY_MS),
            AppEvent::OtpVerified { phone },
        );
    }

    /// Schedules the canned AI reply with 1.5–2.5 s of latency jitter.
    pub fn ai_reply(&self, chat_id: String, prompt: &str) {
        let jitter = rand::rng().random_range(0..AI_REPLY_JITTER_MS);
        let text = format!("This is a simulated AI response to \"{prompt}\"");
        self.schedule(
            Duration::from_millis(AI_REPLY_BASE_MS + jitter),
            AppEvent::AiReplyReady { chat_id, text },
        );
    }

    pub fn settle_older_messages(&self, chat_id: String) {
        self.schedule(
            Duration::from_millis(SETTLE_DELAY_MS),
            AppEvent::OlderMessagesSettled { chat_id },
        );
    }
}
