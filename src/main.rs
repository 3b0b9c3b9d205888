mod app;
mod auth;
mod event;
mod sim;
mod store;
mod theme;

use app::ParlorApp;
use eframe::egui;
use sim::Simulator;
use std::sync::mpsc;
use store::{persist, ChatStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("parlor-runtime")
        .build()?;
    let sim = Simulator::new(runtime.handle().clone(), tx);

    let mut store = ChatStore::new(persist::chat_store_path());
    store.initialize();

    let app = ParlorApp::new(
        rx,
        sim,
        store,
        persist::login_path(),
        persist::theme_path(),
    );
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([840.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Parlor",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
