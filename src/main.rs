use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use std::sync::mpsc::{self, TryRecvError};

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod domain;
mod filter;
mod inputter;
mod loader;
mod model;
mod pagination;
mod sort;
mod ui;
mod users;
mod view;

use controller::Controller;
use domain::{Args, LoadError, Message, UDConfig, UDError};
use loader::{UserClient, spawn_load};
use model::{Model, Status};
use ui::TableUI;

fn main() -> ExitCode {
    let args = Args::parse();
    let result = run(&args);
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(log_file: &str) -> Result<(), UDError> {
    let path = shellexpand::full(log_file).map_err(|e| UDError::LoggingFailed(e.to_string()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| UDError::LoggingFailed(e.to_string()))
}

fn run(args: &Args) -> Result<(), UDError> {
    init_logging(&args.log_file)?;
    let cfg = UDConfig::from(args);
    info!("Starting userdir with {:?}", cfg);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let (sender, receiver) = mpsc::channel();
    let _load_task = spawn_load(runtime.handle(), UserClient::with_url(&cfg.url), sender);

    let mut model = Model::init(&cfg);
    let ui = TableUI::new();
    let controller = Controller::new(&cfg);
    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        match receiver.try_recv() {
            Ok(message) => model.update(message)?,
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                if model.status == Status::LOADING {
                    error!("Loader finished without delivering a result");
                    model.update(Message::DataLoaded(Err(LoadError::Network(
                        "loader stopped unexpectedly".to_string(),
                    ))))?;
                }
            }
        }

        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        };
    }

    runtime.shutdown_background();

    match model.error() {
        Some(e) => Err(UDError::LoadFailed(e.clone())),
        None => Ok(()),
    }
}
