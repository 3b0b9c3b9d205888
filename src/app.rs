use crate::auth::{self, LoginSession};
use crate::event::AppEvent;
use crate::sim::Simulator;
use crate::store::{ChatData, ChatStore, MessageDraft, Sender};
use crate::theme::{self, Theme, ThemeKind};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Local;
use eframe::egui::{self, Align, Layout, RichText, ScrollArea};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

const NOTICE_TTL: Duration = Duration::from_secs(4);
const SEARCH_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Success,
    Info,
    Error,
}

struct Notice {
    text: String,
    kind: NoticeKind,
    created: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginStep {
    Phone,
    Otp,
}

struct LoginForm {
    step: LoginStep,
    country_index: Option<usize>,
    phone: String,
    otp: String,
    busy: bool,
}

impl LoginForm {
    fn new() -> Self {
        Self {
            step: LoginStep::Phone,
            country_index: None,
            phone: String::new(),
            otp: String::new(),
            busy: false,
        }
    }

    fn full_phone(&self) -> String {
        let code = self
            .country_index
            .and_then(|i| auth::COUNTRY_CODES.get(i))
            .map(|(_, code)| *code)
            .unwrap_or("");
        format!("{code} {}", self.phone)
    }
}

struct DashboardState {
    search_query: String,
    search_applied: String,
    search_edited: Option<Instant>,
    create_open: bool,
    new_name: String,
    confirm_delete: Option<(String, String)>,
}

impl DashboardState {
    fn new() -> Self {
        Self {
            search_query: String::new(),
            search_applied: String::new(),
            search_edited: None,
            create_open: false,
            new_name: String::new(),
            confirm_delete: None,
        }
    }
}

#[derive(Default)]
struct ChatViewState {
    draft: String,
    attach_path: String,
    pending_image: Option<String>,
    loading_older: bool,
}

enum Screen {
    Login,
    Dashboard,
    Chat { id: String },
}

pub struct ParlorApp {
    rx: Receiver<AppEvent>,
    sim: Simulator,
    store: ChatStore,
    login_slot: PathBuf,
    theme_slot: PathBuf,
    theme: Theme,
    theme_dirty: bool,
    screen: Screen,
    login: LoginForm,
    dashboard: DashboardState,
    chat_view: ChatViewState,
    notices: Vec<Notice>,
}

impl ParlorApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        sim: Simulator,
        store: ChatStore,
        login_slot: PathBuf,
        theme_slot: PathBuf,
    ) -> Self {
        // Route guard: a valid login session skips the login screen.
        let screen = if auth::load(&login_slot).is_some() {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        let theme = Theme::for_kind(theme::load_preference(&theme_slot));

        Self {
            rx,
            sim,
            store,
            login_slot,
            theme_slot,
            theme,
            theme_dirty: true,
            screen,
            login: LoginForm::new(),
            dashboard: DashboardState::new(),
            chat_view: ChatViewState::default(),
            notices: Vec::new(),
        }
    }

    fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notices.push(Notice {
            text: text.into(),
            kind,
            created: Instant::now(),
        });
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::OtpSent { phone } => {
                if self.login.busy && self.login.step == LoginStep::Phone {
                    self.login.busy = false;
                    self.login.step = LoginStep::Otp;
                    self.notify(NoticeKind::Success, "OTP sent successfully!");
                    self.notify(
                        NoticeKind::Info,
                        format!("Please check your phone {phone} for the OTP."),
                    );
                }
            }
            AppEvent::OtpVerified { phone } => {
                if self.login.busy && self.login.step == LoginStep::Otp {
                    self.login.busy = false;
                    auth::save(&self.login_slot, &LoginSession::new(phone));
                    self.notify(NoticeKind::Success, "OTP verified successfully!");
                    self.login = LoginForm::new();
                    self.screen = Screen::Dashboard;
                }
            }
            AppEvent::AiReplyReady { chat_id, text } => {
                // Dropped when the chatroom was deleted mid-delay; the store
                // no-ops on unknown ids either way.
                self.store.add_message(
                    &chat_id,
                    MessageDraft {
                        text,
                        sender: Sender::Ai,
                        image_url: None,
                    },
                );
                self.store.set_is_typing(&chat_id, false);
            }
            AppEvent::OlderMessagesSettled { chat_id } => {
                if matches!(&self.screen, Screen::Chat { id } if *id == chat_id) {
                    self.chat_view.loading_older = false;
                }
            }
        }
    }

    fn has_pending_work(&self) -> bool {
        self.login.busy
            || self.chat_view.loading_older
            || !self.notices.is_empty()
            || self.dashboard.search_edited.is_some()
            || matches!(&self.screen, Screen::Chat { id }
                if self.store.chat(id).is_some_and(|c| c.is_typing))
    }

    fn prune_notices(&mut self) {
        self.notices
            .retain(|notice| notice.created.elapsed() < NOTICE_TTL);
    }

    fn apply_search_debounce(&mut self) {
        // Empty queries apply immediately; anything else waits for a pause.
        if self.dashboard.search_query.trim().is_empty() {
            self.dashboard.search_applied.clear();
            self.dashboard.search_edited = None;
        } else if let Some(edited) = self.dashboard.search_edited {
            if edited.elapsed() >= SEARCH_DEBOUNCE {
                self.dashboard.search_applied =
                    self.dashboard.search_query.trim().to_lowercase();
                self.dashboard.search_edited = None;
            }
        }
    }

    fn logout(&mut self) {
        auth::clear(&self.login_slot);
        self.login = LoginForm::new();
        self.screen = Screen::Login;
        self.notify(NoticeKind::Info, "Logged out.");
    }

    fn toggle_theme(&mut self) {
        let kind = self.theme.kind.toggled();
        self.theme = Theme::for_kind(kind);
        self.theme_dirty = true;
        theme::save_preference(&self.theme_slot, kind);
    }

    fn open_chat(&mut self, chat_id: String) {
        self.chat_view = ChatViewState::default();
        self.screen = Screen::Chat { id: chat_id };
    }

    fn send_chat_message(&mut self, chat_id: &str) {
        let text = self.chat_view.draft.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.store.add_message(
            chat_id,
            MessageDraft {
                text: text.clone(),
                sender: Sender::User,
                image_url: self.chat_view.pending_image.take(),
            },
        );
        self.store.set_is_typing(chat_id, true);
        self.sim.ai_reply(chat_id.to_string(), &text);

        self.chat_view.draft.clear();
        self.chat_view.attach_path.clear();
    }

    fn render_notices(&mut self, ctx: &egui::Context) {
        if self.notices.is_empty() {
            return;
        }

        let (success, danger, surface, muted) = (
            self.theme.success,
            self.theme.danger,
            self.theme.surface_3,
            self.theme.text_muted,
        );
        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
            .show(ctx, |ui| {
                for notice in &self.notices {
                    let accent = match notice.kind {
                        NoticeKind::Success => success,
                        NoticeKind::Info => muted,
                        NoticeKind::Error => danger,
                    };
                    egui::Frame::new()
                        .fill(surface)
                        .stroke(egui::Stroke::new(1.0, accent))
                        .corner_radius(egui::CornerRadius::same(8))
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.label(&notice.text);
                        });
                }
            });
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        let mut go_dashboard = false;
        let mut toggle_theme = false;
        let mut logout = false;
        let in_chat = matches!(self.screen, Screen::Chat { .. });
        let theme_label = match self.theme.kind {
            ThemeKind::Light => "Dark mode",
            ThemeKind::Dark => "Light mode",
        };

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Parlor");
                ui.separator();
                if in_chat {
                    if ui.button("Back to dashboard").clicked() {
                        go_dashboard = true;
                    }
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Logout").clicked() {
                        logout = true;
                    }
                    if ui.button(theme_label).clicked() {
                        toggle_theme = true;
                    }
                });
            });
        });

        if go_dashboard {
            self.screen = Screen::Dashboard;
        }
        if toggle_theme {
            self.toggle_theme();
        }
        if logout {
            self.logout();
        }
    }

    fn render_login(&mut self, ctx: &egui::Context) {
        let mut send_otp = false;
        let mut verify_otp = false;
        let mut reset_number = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(ui.available_height() * 0.18);
            ui.vertical_centered(|ui| {
                ui.set_max_width(360.0);
                self.theme.card_frame().show(ui, |ui| match self.login.step {
                    LoginStep::Phone => {
                        ui.heading("Login");
                        ui.label(
                            RichText::new(
                                "Enter your phone number to receive a verification code.",
                            )
                            .color(self.theme.text_muted),
                        );
                        ui.add_space(8.0);

                        let selected = self
                            .login
                            .country_index
                            .and_then(|i| auth::COUNTRY_CODES.get(i))
                            .map(|(name, code)| format!("{name} ({code})"))
                            .unwrap_or_else(|| "Select Country Code".to_string());
                        egui::ComboBox::from_id_salt("country_code")
                            .width(ui.available_width())
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                for (i, (name, code)) in
                                    auth::COUNTRY_CODES.iter().enumerate()
                                {
                                    ui.selectable_value(
                                        &mut self.login.country_index,
                                        Some(i),
                                        format!("{name} ({code})"),
                                    );
                                }
                            });

                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.login.phone)
                                .hint_text("Phone number")
                                .desired_width(f32::INFINITY),
                        );
                        self.login.phone.retain(|c| c.is_ascii_digit());
                        self.login.phone.truncate(auth::PHONE_DIGITS);

                        let ready = auth::valid_phone(&self.login.phone)
                            && self.login.country_index.is_some()
                            && !self.login.busy;
                        let submitted = response.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter));

                        ui.add_space(4.0);
                        ui.horizontal(|ui| {
                            if self.login.busy {
                                ui.add(egui::Spinner::new());
                            }
                            if ui
                                .add_enabled(ready, egui::Button::new("Send OTP"))
                                .clicked()
                                || (submitted && ready)
                            {
                                send_otp = true;
                            }
                        });
                    }
                    LoginStep::Otp => {
                        ui.heading("Enter OTP");
                        ui.label(
                            RichText::new(format!(
                                "We've sent a code to {}. Please enter it below.",
                                self.login.full_phone()
                            ))
                            .color(self.theme.text_muted),
                        );
                        ui.add_space(8.0);

                        ui.add(
                            egui::TextEdit::singleline(&mut self.login.otp)
                                .hint_text("6-digit code")
                                .desired_width(f32::INFINITY),
                        );
                        self.login.otp.retain(|c| c.is_ascii_digit());
                        self.login.otp.truncate(auth::OTP_DIGITS);

                        let ready = auth::valid_otp(&self.login.otp) && !self.login.busy;
                        ui.add_space(4.0);
                        ui.horizontal(|ui| {
                            if self.login.busy {
                                ui.add(egui::Spinner::new());
                            }
                            if ui
                                .add_enabled(ready, egui::Button::new("Verify & Login"))
                                .clicked()
                            {
                                verify_otp = true;
                            }
                        });
                        if ui.link("Use a different number").clicked() {
                            reset_number = true;
                        }
                    }
                });
            });
        });

        if send_otp {
            self.login.busy = true;
            self.sim.send_otp(self.login.full_phone());
        }
        if verify_otp {
            self.login.busy = true;
            self.sim.verify_otp(self.login.full_phone());
        }
        if reset_number {
            self.login = LoginForm::new();
        }
    }

    fn render_dashboard(&mut self, ctx: &egui::Context) {
        let mut open_chat: Option<String> = None;
        let mut request_delete: Option<(String, String)> = None;
        let mut open_create = false;

        // Sorted by the most recent message, newest chatroom first.
        let mut rooms: Vec<&ChatData> = self.store.chats().values().collect();
        rooms.sort_by(|a, b| {
            let a_ts = a.last_message().map(|m| m.timestamp);
            let b_ts = b.last_message().map(|m| m.timestamp);
            b_ts.cmp(&a_ts)
        });
        let query = self.dashboard.search_applied.clone();
        let rooms: Vec<(String, String, Option<String>)> = rooms
            .into_iter()
            .filter(|room| query.is_empty() || room.name.to_lowercase().contains(&query))
            .map(|room| {
                (
                    room.id.clone(),
                    room.name.clone(),
                    room.last_message().map(|m| m.text.clone()),
                )
            })
            .collect();

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().id_salt("dashboard").show(ui, |ui| {
                ui.heading("My Chatrooms");
                ui.label(
                    RichText::new("Create, manage, and join conversations.")
                        .color(self.theme.text_muted),
                );
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    if ui.button("Create Chatroom").clicked() {
                        open_create = true;
                    }
                    let search = ui.add(
                        egui::TextEdit::singleline(&mut self.dashboard.search_query)
                            .hint_text("Search chatrooms...")
                            .desired_width(240.0),
                    );
                    if search.changed() {
                        self.dashboard.search_edited = Some(Instant::now());
                    }
                });
                ui.add_space(8.0);

                if rooms.is_empty() {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("No chatrooms here... yet!");
                        ui.label(
                            RichText::new(
                                "Click the \"Create Chatroom\" button to get started.",
                            )
                            .color(self.theme.text_muted),
                        );
                    });
                }

                for (id, name, last_message) in &rooms {
                    self.theme.card_frame().show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.strong(name);
                        if let Some(last) = last_message {
                            let mut preview = last.clone();
                            if preview.chars().count() > 80 {
                                preview = preview.chars().take(80).collect::<String>() + "…";
                            }
                            ui.label(
                                RichText::new(format!("Last: \"{preview}\""))
                                    .color(self.theme.text_muted)
                                    .small(),
                            );
                        }
                        ui.horizontal(|ui| {
                            if ui.button("Join Chat").clicked() {
                                open_chat = Some(id.clone());
                            }
                            if ui
                                .button(RichText::new("Delete").color(self.theme.danger))
                                .clicked()
                            {
                                request_delete = Some((id.clone(), name.clone()));
                            }
                        });
                    });
                }
            });
        });

        if open_create {
            self.dashboard.create_open = true;
            self.dashboard.new_name.clear();
        }
        if let Some(pending) = request_delete {
            self.dashboard.confirm_delete = Some(pending);
        }
        if let Some(id) = open_chat {
            self.open_chat(id);
        }

        self.render_create_dialog(ctx);
        self.render_delete_dialog(ctx);
    }

    fn render_create_dialog(&mut self, ctx: &egui::Context) {
        if !self.dashboard.create_open {
            return;
        }

        let mut create = false;
        let mut open = self.dashboard.create_open;
        egui::Window::new("Create New Chatroom")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Give your new chatroom a distinct name.");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.dashboard.new_name)
                        .hint_text("e.g., Q4 Planning Session"),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Create").clicked() || submitted {
                    create = true;
                }
            });
        self.dashboard.create_open = open;

        if create {
            let name = self.dashboard.new_name.trim().to_string();
            if name.is_empty() {
                self.notify(NoticeKind::Error, "Chatroom name cannot be empty.");
            } else {
                self.store.initialize_chat(&name);
                self.notify(
                    NoticeKind::Success,
                    format!("Chatroom \"{name}\" created successfully!"),
                );
                self.dashboard.new_name.clear();
                self.dashboard.create_open = false;
            }
        }
    }

    fn render_delete_dialog(&mut self, ctx: &egui::Context) {
        let Some((id, name)) = self.dashboard.confirm_delete.clone() else {
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Are you absolutely sure?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "This will permanently delete the \"{name}\" chatroom. \
                     This action cannot be undone."
                ));
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                    if ui
                        .button(RichText::new("Delete").color(self.theme.danger))
                        .clicked()
                    {
                        confirmed = true;
                    }
                });
            });

        if confirmed {
            self.store.delete_chat(&id);
            self.notify(
                NoticeKind::Success,
                format!("Chatroom \"{name}\" deleted successfully!"),
            );
        }
        if confirmed || cancelled {
            self.dashboard.confirm_delete = None;
        }
    }

    fn render_chat(&mut self, ctx: &egui::Context, chat_id: &str) {
        let Some(chat) = self.store.chat(chat_id).cloned() else {
            self.notify(NoticeKind::Error, "Chatroom not found.");
            self.screen = Screen::Dashboard;
            return;
        };

        let mut load_older = false;
        let mut send_now = false;
        let mut attach_now = false;
        let mut remove_image = false;
        let mut copied: Option<String> = None;

        egui::TopBottomPanel::bottom("composer")
            .frame(self.theme.composer_frame())
            .show(ctx, |ui| {
                if let Some(preview) = &self.chat_view.pending_image {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format!(
                                "Attached image ({} KiB)",
                                preview.len() / 1024
                            ))
                            .color(self.theme.text_muted)
                            .small(),
                        );
                        if ui.small_button("X").clicked() {
                            remove_image = true;
                        }
                    });
                }

                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.chat_view.attach_path)
                            .hint_text("Image path...")
                            .desired_width(180.0),
                    );
                    if ui.button("Attach").clicked() {
                        attach_now = true;
                    }

                    let input_enabled = !chat.is_typing;
                    let hint = if chat.is_typing {
                        "Waiting for response..."
                    } else {
                        "Type your message..."
                    };
                    let response = ui.add_enabled(
                        input_enabled,
                        egui::TextEdit::singleline(&mut self.chat_view.draft)
                            .hint_text(hint)
                            .desired_width(ui.available_width() - 70.0),
                    );
                    if response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && input_enabled
                    {
                        send_now = true;
                    }
                    let clicked = ui
                        .add_enabled(
                            input_enabled && !self.chat_view.draft.trim().is_empty(),
                            egui::Button::new("Send"),
                        )
                        .clicked();
                    send_now |= clicked;
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(&chat.name);
            });
            ui.separator();

            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        if self.chat_view.loading_older {
                            ui.add(egui::Spinner::new());
                        } else if !chat.has_more_messages {
                            ui.label(
                                RichText::new("You are at the start of the conversation.")
                                    .color(self.theme.text_muted)
                                    .small(),
                            );
                        } else if ui.button("Load earlier messages").clicked() {
                            load_older = true;
                        }
                    });

                    for message in &chat.messages {
                        let is_ai = message.sender == Sender::Ai;
                        let (layout, fill, text_color) = if is_ai {
                            (
                                Layout::top_down(Align::Min),
                                self.theme.surface_2,
                                self.theme.text_primary,
                            )
                        } else {
                            (
                                Layout::top_down(Align::Max),
                                self.theme.accent_muted,
                                self.theme.text_on_accent,
                            )
                        };

                        ui.with_layout(layout, |ui| {
                            self.theme.bubble_frame(fill).show(ui, |ui| {
                                ui.set_max_width(ui.available_width() * 0.75);
                                if message.image_url.is_some() {
                                    ui.label(
                                        RichText::new("[image attachment]")
                                            .color(text_color)
                                            .italics()
                                            .small(),
                                    );
                                }
                                ui.label(RichText::new(&message.text).color(text_color));
                            });
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(
                                        message
                                            .timestamp
                                            .with_timezone(&Local)
                                            .format("%Y-%m-%d %H:%M")
                                            .to_string(),
                                    )
                                    .color(self.theme.text_muted)
                                    .small(),
                                );
                                if ui.small_button("Copy").clicked() {
                                    copied = Some(message.text.clone());
                                }
                            });
                        });
                    }

                    if chat.is_typing {
                        ui.horizontal(|ui| {
                            ui.add(egui::Spinner::new());
                            ui.label(
                                RichText::new("Gemini is typing...")
                                    .color(self.theme.text_muted),
                            );
                        });
                    }
                });
        });

        if remove_image {
            self.chat_view.pending_image = None;
        }
        if attach_now {
            let path = self.chat_view.attach_path.trim().to_string();
            match load_image_data_url(Path::new(&path)) {
                Ok(data_url) => self.chat_view.pending_image = Some(data_url),
                Err(err) => self.notify(NoticeKind::Error, err),
            }
        }
        if load_older && !self.chat_view.loading_older {
            self.chat_view.loading_older = true;
            self.store.load_previous_messages(chat_id);
            self.sim.settle_older_messages(chat_id.to_string());
        }
        if send_now {
            self.send_chat_message(chat_id);
        }
        if let Some(text) = copied {
            ctx.copy_text(text);
            self.notify(NoticeKind::Success, "Message copied to clipboard.");
        }
    }
}

impl eframe::App for ParlorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.theme_dirty {
            self.theme.apply_visuals(ctx);
            self.theme_dirty = false;
        }

        self.drain_events(ctx);
        self.prune_notices();
        self.apply_search_debounce();

        match &self.screen {
            Screen::Login => self.render_login(ctx),
            Screen::Dashboard => {
                self.render_header(ctx);
                self.render_dashboard(ctx);
            }
            Screen::Chat { id } => {
                let id = id.clone();
                self.render_header(ctx);
                self.render_chat(ctx, &id);
            }
        }

        self.render_notices(ctx);

        if self.has_pending_work() {
            ctx.request_repaint_after(Duration::from_millis(120));
        }
    }
}

/// Reads an image file and embeds it as a data URL, the storable stand-in
/// for the original's FileReader upload.
fn load_image_data_url(path: &Path) -> Result<String, String> {
    if path.as_os_str().is_empty() {
        return Err("Enter an image path to attach.".to_string());
    }

    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => return Err("Unsupported image type (png, jpg, gif, webp).".to_string()),
    };

    let bytes = std::fs::read(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::load_image_data_url;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("parlor_app_{}_{nanos}_{name}", std::process::id()))
    }

    #[test]
    fn attachments_become_data_urls() {
        let path = temp_file("pixel.png");
        fs::write(&path, [0x89, 0x50, 0x4E, 0x47]).expect("fixture should write");

        let data_url = load_image_data_url(&path).expect("png should encode");
        assert!(data_url.starts_with("data:image/png;base64,"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        let path = temp_file("notes.txt");
        let error = load_image_data_url(&path).expect_err("txt is not an image");
        assert!(error.contains("Unsupported image type"));
    }

    #[test]
    fn missing_files_report_the_path() {
        let path = temp_file("missing.png");
        let error = load_image_data_url(&path).expect_err("file does not exist");
        assert!(error.contains("Failed to read"));
    }
}
