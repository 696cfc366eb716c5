use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::state::{Delta, ProviderCommand};
use crate::statsbomb::{self, DataSource};

/// Spawns the loader thread. It runs until the command channel closes or the
/// delta receiver goes away.
pub fn spawn_provider(
    source: DataSource,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!(source = %source.describe(), "provider started");
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = handle_command(&source, cmd);
            if tx.send(delta).is_err() {
                break;
            }
        }
        info!("provider stopped");
    })
}

pub fn handle_command(source: &DataSource, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::LoadMatch {
            competition_id,
            season_id,
            match_id,
        } => match statsbomb::load_match_data(source, competition_id, season_id, match_id) {
            Ok(data) => Delta::MatchLoaded(Arc::new(data)),
            Err(err) => {
                let message = format!("{err:#}");
                error!(match_id, error = %message, "match load failed");
                Delta::LoadFailed {
                    match_id,
                    error: message,
                }
            }
        },
    }
}
