use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};
use key_echo::KeyEchoModule;
use keycodes_core::{Module, Runtime, is_module_loaded, load_config};
use keycodes_platform::{Platform, key_definitions};
use keycodes_shared_types::{
    AppEvent, Frontend,
    config::{LogOutput, LoggingConfig},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Shows the name, code and modifiers a toolkit reports for each key press.
#[derive(Debug, Parser)]
#[command(name = "keycodes", version)]
struct Cli {
    /// Config file; defaults apply when it does not exist.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture keys in the terminal.
    Terminal,
    /// Capture keys in a native window.
    Window,
    /// Print every key a front end defines, sorted by code.
    List {
        /// Front end whose key table to print; the configured one by default.
        frontend: Option<Frontend>,
    },
}

fn init_tracing(logging: &LoggingConfig, frontend: Frontend) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    match (logging.output, &logging.file) {
        (LogOutput::File, Some(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        _ if frontend == Frontend::Terminal => {
            // stderr shares the tty the viewer draws on
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).context("load config")?;

    let frontend = match cli.command {
        Some(Command::List { frontend }) => {
            let frontend = frontend.unwrap_or(config.viewer.frontend);
            for def in key_definitions(frontend)? {
                println!("{def}");
            }
            return Ok(());
        }
        Some(Command::Terminal) => Frontend::Terminal,
        Some(Command::Window) => Frontend::Window,
        None => config.viewer.frontend,
    };

    init_tracing(&config.logging, frontend)?;
    info!(%frontend, "keycodes starting");

    let tokio_rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    let runtime = Runtime::new(cli.config, config);
    let ctx = runtime.module_context();

    let modules: Vec<Box<dyn Module>> =
        vec![Box::new(KeyEchoModule::new(runtime.config.echo.clone()))];

    let handles = tokio_rt.block_on(async {
        let mut handles = Vec::new();
        for module in modules {
            let name = module.name();
            let enabled = match name {
                // stdout belongs to the terminal viewer while it runs
                "key_echo" => runtime.config.echo.enabled && frontend != Frontend::Terminal,
                _ => false,
            };

            if !is_module_loaded(&runtime.config, name) {
                info!(module = name, "module not loaded");
                continue;
            }

            if !enabled {
                info!(module = name, "module loaded but disabled");
                continue;
            }

            info!(module = name, "starting module");
            handles.push(module.start(ctx.clone()).await?);
        }
        anyhow::Ok(handles)
    })?;

    let shutdown = runtime.shutdown.clone();
    tokio_rt.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received");
                shutdown.request();
            }
            Err(err) => warn!(error = %err, "failed to listen for Ctrl+C"),
        }
    });

    let platform = Platform::new(runtime.bus.clone(), runtime.shutdown.clone());
    let result = platform.run(frontend, &runtime.config);

    runtime.bus.send(AppEvent::ShutdownRequested);
    tokio_rt.block_on(async {
        for handle in handles {
            handle.join().await?;
        }
        anyhow::Ok(())
    })?;

    result.with_context(|| format!("{frontend} viewer"))?;
    info!("keycodes stopped");
    Ok(())
}
