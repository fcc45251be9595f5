use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::{interval, MissedTickBehavior};

use super::MissionStore;

/// Poll the dump every `every` until ctrl-c
pub async fn watch_dump(store: Arc<MissionStore>, every: Duration) {
    watch_dump_until(store, every, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
        }
    })
    .await
}

/// Poll the dump every `every` until `shutdown` resolves.
///
/// Parsing runs on the blocking pool; a failed reload is logged and the
/// previous snapshot keeps serving.
pub async fn watch_dump_until<F>(store: Arc<MissionStore>, every: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    info!(
        "Watching {} every {:?}",
        store.config().dump_path.display(),
        every
    );
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and the dump was just loaded
    ticker.tick().await;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Dump watcher stopped");
                return;
            }
            _ = ticker.tick() => {
                let store = Arc::clone(&store);
                match tokio::task::spawn_blocking(move || store.reload()).await {
                    Ok(Ok(true)) => info!("Published a new snapshot"),
                    Ok(Ok(false)) => debug!("No changes in dump"),
                    Ok(Err(e)) => warn!("Reload failed: {}", e),
                    Err(e) => error!("Reload task failed: {}", e),
                }
            }
        }
    }
}
