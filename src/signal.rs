use tokio::{
    select,
    signal::unix::{signal, SignalKind},
    sync::watch,
};
use tracing::{error, info};

/// Fires on every SIGTERM or SIGINT.
pub(crate) fn signal_handler() -> watch::Receiver<()> {
    let (stop_tx, stop_rx) = watch::channel(());
    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(source), _) | (_, Err(source)) => {
                    error!(?source, "could not install signal handlers");
                    // keep the sender alive so receivers do not see a closed channel
                    std::future::pending::<()>().await;
                    return;
                }
            };
        loop {
            select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
            };
            if stop_tx.send(()).is_err() {
                break;
            }
        }
    });
    stop_rx
}
