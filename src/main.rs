use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use video_mirror::camera::{native, NativeBackend};
use video_mirror::cli::{self, Args, Command};
use video_mirror::config::Config;
use video_mirror::dialogs::{Prompter, SdlPrompter};
use video_mirror::display::{run_render_loop, SdlDisplay};
use video_mirror::pipeline::Variant;
use video_mirror::preflight;
use video_mirror::session::{Outcome, Session};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    native::request_access();

    if let Some(Command::ListDevices) = args.command {
        cli::list_devices(&NativeBackend, &config);
        return ExitCode::SUCCESS;
    }

    let prompter = SdlPrompter;
    let runtime = match preflight::check() {
        Ok(runtime) => runtime,
        Err(missing) => {
            for dep in &missing {
                log::error!("Missing dependency: {}", dep);
            }
            prompter.error(
                "Missing Dependencies",
                &preflight::missing_dependencies_message(&missing),
            );
            return ExitCode::FAILURE;
        }
    };

    let variant = Variant::from(args.variant);
    let window = config.window_config();
    let mut session = Session::new(
        Arc::new(NativeBackend),
        prompter,
        config.session_settings(variant),
    );

    let running = session.running_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::Release);
    }) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    log::info!("Starting video mirror ({} pipeline)", variant);
    let result = session.run(|pipeline, running| {
        let mut display = SdlDisplay::open(&runtime.sdl, &runtime.video, &window)?;
        let mut surface = display.surface();
        run_render_loop(&mut surface, pipeline, running)
    });

    match result {
        Ok(Outcome::Closed(_)) => log::info!("Mirror closed"),
        Ok(outcome) => log::debug!("Session ended early: {:?}", outcome),
        Err(e) => {
            log::error!("{}", e);
            session.prompter().error("Error", &e.to_string());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
