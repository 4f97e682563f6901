//! Sync handle to one receiver connection

use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use onkyo_catalog::{Catalog, Zone};
use tokio::sync::mpsc::UnboundedSender;

use crate::command::ZoneCommand;
use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::event::TransportEvent;
use crate::worker::{spawn_transport_worker, Command, Completion, WorkerContext};

/// Anything that can deliver zone commands to a receiver
///
/// Implemented by [`Transport`]; tests substitute recording sinks.
pub trait CommandSink: Send + Sync {
    /// Deliver a command; `on_complete` runs exactly once with the outcome
    fn send(&self, command: ZoneCommand, on_complete: Completion);
}

/// Persistent, reconnecting connection to one receiver
///
/// All network work happens on a background worker thread. Methods on this
/// handle never block on the network.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use onkyo_catalog::{Catalog, Zone};
/// use onkyo_transport::{Transport, TransportConfig, ZoneCommand};
///
/// let catalog = Arc::new(Catalog::load()?);
/// let transport = Transport::connect("192.168.1.40", 60128, Zone::Main, catalog, TransportConfig::default());
/// let events = transport.events().unwrap();
///
/// transport.send_command(
///     ZoneCommand::absolute(Zone::Main, "system-power", "on"),
///     Box::new(|result| println!("power on: {:?}", result)),
/// );
///
/// for event in events {
///     println!("{:?}", event);
/// }
/// ```
pub struct Transport {
    host: String,
    port: u16,
    zone: Zone,

    /// Send commands to background worker
    command_tx: UnboundedSender<Command>,

    /// Events from the worker, until someone takes them
    event_rx: Mutex<Option<mpsc::Receiver<TransportEvent>>>,

    /// Background worker handle
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Transport {
    /// Start connecting to a receiver
    ///
    /// Never fails: connection problems are reported as
    /// [`TransportEvent::Error`] and retried according to `config`. The
    /// settings are used as given; call [`TransportConfig::validate`] first.
    pub fn connect(
        host: impl Into<String>,
        port: u16,
        zone: Zone,
        catalog: Arc<Catalog>,
        config: TransportConfig,
    ) -> Self {
        let host = host.into();
        let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = spawn_transport_worker(
            WorkerContext {
                host: host.clone(),
                port,
                zone,
                catalog,
                config,
                event_tx,
            },
            command_rx,
        );

        Self {
            host,
            port,
            zone,
            command_tx,
            event_rx: Mutex::new(Some(event_rx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Zone whose state is queried after each connect
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Take the event channel
    ///
    /// There is a single consumer; returns `None` once taken.
    pub fn events(&self) -> Option<mpsc::Receiver<TransportEvent>> {
        self.event_rx.lock().ok()?.take()
    }

    /// Queue a command for the receiver
    ///
    /// Returns immediately. `on_complete` runs on the worker thread when the
    /// reply arrives, or with an error; if the worker has stopped it runs
    /// right away with [`TransportError::Shutdown`].
    pub fn send_command(&self, command: ZoneCommand, on_complete: Completion) {
        if let Err(err) = self.command_tx.send(Command::Send {
            command,
            on_complete,
        }) {
            if let Command::Send { on_complete, .. } = err.0 {
                on_complete(Err(TransportError::Shutdown));
            }
        }
    }

    /// Whether the worker is still running
    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Close the connection and stop reconnecting
    ///
    /// Waits for the worker to finish unless called from the worker itself
    /// (e.g. inside a completion callback).
    pub fn disconnect(&self) {
        let _ = self.command_tx.send(Command::Shutdown);

        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            if worker.thread().id() != thread::current().id() && worker.join().is_err() {
                tracing::error!("Transport worker for {} panicked", self.host);
            }
        }
    }
}

impl CommandSink for Transport {
    fn send(&self, command: ZoneCommand, on_complete: Completion) {
        self.send_command(command, on_complete);
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }
}
