//! Applies transport events to a zone's state
//!
//! Receiver reports are authoritative: they overwrite whatever the store
//! holds, including optimistic writes. A reconnect clears every field so
//! stale values are never shown as current.

use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use onkyo_catalog::{InputTable, Zone};
use onkyo_transport::TransportEvent;

use crate::decoder::{decode_status, PropertyChange};
use crate::error::Result;
use crate::event::ChangeOrigin;
use crate::store::StateStore;

/// Reconciles one zone's state with what the receiver reports
#[derive(Debug)]
pub struct Reconciler {
    zone: Zone,
    inputs: Arc<InputTable>,
    store: StateStore,
    has_connected: bool,
}

impl Reconciler {
    pub fn new(zone: Zone, inputs: Arc<InputTable>, store: StateStore) -> Self {
        Self {
            zone,
            inputs,
            store,
            has_connected: false,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Apply one transport event
    ///
    /// Returns whether the state changed. An input the table does not know
    /// leaves the state untouched and is returned as
    /// [`StateError::UnmappedInput`](crate::StateError::UnmappedInput).
    pub fn apply(&mut self, event: &TransportEvent) -> Result<bool> {
        match event {
            TransportEvent::Connected { host, port } => {
                if self.has_connected {
                    let cleared = self.store.reset(ChangeOrigin::Reset);
                    tracing::info!(
                        "Reconnected to {}:{}, cleared {} known fields",
                        host,
                        port,
                        cleared
                    );
                    self.has_connected = true;
                    return Ok(cleared > 0);
                }
                tracing::info!("Connected to {}:{}", host, port);
                self.has_connected = true;
                Ok(false)
            }
            TransportEvent::Closed { reason } => {
                tracing::info!("Receiver connection closed: {}", reason);
                Ok(false)
            }
            TransportEvent::Debug(message) => {
                tracing::debug!("eiscp: {}", message);
                Ok(false)
            }
            TransportEvent::Error(err) => {
                tracing::error!("eiscp: {}", err);
                Ok(false)
            }
            TransportEvent::Status(status) if status.zone == self.zone => {
                let change = decode_status(status, &self.inputs).inspect_err(|e| {
                    tracing::warn!("{}", e);
                })?;

                Ok(match change {
                    Some(PropertyChange::Power(power)) => self.store.set(power, ChangeOrigin::Receiver),
                    Some(PropertyChange::Mute(mute)) => self.store.set(mute, ChangeOrigin::Receiver),
                    Some(PropertyChange::Volume(volume)) => {
                        self.store.set(volume, ChangeOrigin::Receiver)
                    }
                    Some(PropertyChange::Input(input)) => self.store.set(input, ChangeOrigin::Receiver),
                    None => {
                        tracing::debug!("Ignoring status {:?}", status);
                        false
                    }
                })
            }
            TransportEvent::Status(status) => {
                tracing::debug!("Ignoring status for zone {}", status.zone);
                Ok(false)
            }
        }
    }
}

/// Spawns the reconciler worker thread
///
/// The worker applies every event from `events` until the transport closes
/// the channel.
pub fn spawn_reconciler(
    mut reconciler: Reconciler,
    events: mpsc::Receiver<TransportEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tracing::debug!("Reconciler for zone {} started", reconciler.zone);

        for event in events {
            // Unmapped inputs are already logged by apply
            let _ = reconciler.apply(&event);
        }

        tracing::debug!("Reconciler for zone {} stopped", reconciler.zone);
    })
}
