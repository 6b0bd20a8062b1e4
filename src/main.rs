use color_eyre::{eyre::eyre, Result};
use padstate::config::Config;
use padstate::controller::{ControllerPoller, ControllerSnapshot, GilrsDevice, TracingReporter};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = load_config()?;
    setup_logging_env(config.level()?);
    info!("Starting padstate with config: {:?}", config);

    let device = GilrsDevice::create().map_err(|e| eyre!("Failed to open controllers: {}", e))?;

    let mut poller =
        ControllerPoller::create(device, TracingReporter, Some(config.poller_settings()))
            .map_err(|e| eyre!("Failed to create poller: {}", e))?;

    let _reader_handle = tokio::spawn(log_snapshots(poller.subscribe()));

    // gilrs stays on this task, the poller is driven here until Ctrl-C
    poller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Unable to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
        .map_err(|e| eyre!("Poller stopped: {}", e))?;

    info!("padstate stopped");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

fn load_config() -> Result<Config> {
    let path = match std::env::var_os("PADSTATE_CONFIG") {
        Some(path) => PathBuf::from(path),
        None => match Config::default_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };
    Config::load(&path).map_err(|e| eyre!("Failed to load {}: {}", path.display(), e))
}

async fn log_snapshots(mut receiver: watch::Receiver<ControllerSnapshot>) {
    while receiver.changed().await.is_ok() {
        let snapshot = receiver.borrow_and_update().clone();
        for (button, state) in snapshot.edges() {
            info!("Port {}: {:?} {:?}", snapshot.port(), button, state);
        }
        debug!(
            "Axes: {}",
            snapshot
                .axes()
                .map(|(axis, value)| format!("{:?}={:.2}", axis, value))
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
}
