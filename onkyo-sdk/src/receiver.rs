//! One controllable receiver zone
//!
//! A [`Receiver`] owns everything needed for one configured zone: the input
//! table resolved for its model, a state store, a transport connection, the
//! reconciler thread feeding the store, and the dispatcher for intents.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use onkyo_catalog::{resolve_inputs, Catalog, InputTable, Zone};
use onkyo_state::{spawn_reconciler, ChangeIterator, Reconciler, ReceiverSnapshot, StateStore};
use onkyo_transport::{CommandSink, Transport, TransportConfig, TransportError};

use crate::dispatcher::{Dispatcher, RemoteKey, VolumeDirection};
use crate::error::{DispatchError, SdkError};

/// Identity and address of a receiver zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    /// Model identifier, e.g. `TX-NR686`
    pub model: String,
    pub host: String,
    /// Overrides the transport's port when set
    pub port: Option<u16>,
    pub zone: Zone,
    pub manufacturer: Option<String>,
    pub serial: Option<String>,
}

impl DeviceDescriptor {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        host: impl Into<String>,
        zone: Zone,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            host: host.into(),
            port: None,
            zone,
            manufacturer: None,
            serial: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }
}

/// Handle to a receiver zone
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use onkyo_catalog::{Catalog, Zone};
/// use onkyo_sdk::{DeviceDescriptor, Receiver};
/// use onkyo_transport::TransportConfig;
///
/// let catalog = Arc::new(Catalog::load()?);
/// let descriptor = DeviceDescriptor::new("Living Room", "TX-NR686", "192.168.1.40", Zone::Main);
/// let receiver = Receiver::connect(descriptor, catalog, TransportConfig::default())?;
///
/// let changes = receiver.subscribe();
/// receiver.set_power(true)?;
///
/// for change in changes {
///     println!("{:?} -> {:?}", change.field, change.value);
/// }
/// ```
pub struct Receiver {
    descriptor: DeviceDescriptor,
    inputs: Arc<InputTable>,
    store: StateStore,
    dispatcher: Dispatcher,
    transport: Option<Arc<Transport>>,
    reconciler: Mutex<Option<JoinHandle<()>>>,
}

impl Receiver {
    /// Resolve inputs and start the connection
    ///
    /// Returns once the background workers are running; the receiver is
    /// reached asynchronously and its state fills in as it reports.
    pub fn connect(
        descriptor: DeviceDescriptor,
        catalog: Arc<Catalog>,
        config: TransportConfig,
    ) -> Result<Self, SdkError> {
        config.validate()?;

        let inputs = Arc::new(Self::resolve(&catalog, &descriptor));
        let store = StateStore::new();

        let port = descriptor.port.unwrap_or(config.port);
        let transport = Arc::new(Transport::connect(
            descriptor.host.clone(),
            port,
            descriptor.zone,
            Arc::clone(&catalog),
            config,
        ));
        let events = transport.events().ok_or(TransportError::Shutdown)?;

        let reconciler = spawn_reconciler(
            Reconciler::new(descriptor.zone, Arc::clone(&inputs), store.clone()),
            events,
        );

        let sink: Arc<dyn CommandSink> = transport.clone();
        let dispatcher = Dispatcher::new(
            descriptor.zone,
            sink,
            store.clone(),
            Arc::clone(&inputs),
            &catalog,
        );

        tracing::info!(
            "Receiver '{}' ({} {}) connecting to {}:{}",
            descriptor.name,
            descriptor.model,
            descriptor.zone,
            descriptor.host,
            port
        );

        Ok(Self {
            descriptor,
            inputs,
            store,
            dispatcher,
            transport: Some(transport),
            reconciler: Mutex::new(Some(reconciler)),
        })
    }

    /// Build a receiver that sends through `sink` instead of the network
    ///
    /// No reconciler runs; receiver reports can be applied with a
    /// [`Reconciler`] over [`Receiver::store`].
    pub fn with_sink(descriptor: DeviceDescriptor, catalog: &Catalog, sink: Arc<dyn CommandSink>) -> Self {
        let inputs = Arc::new(Self::resolve(catalog, &descriptor));
        let store = StateStore::new();
        let dispatcher = Dispatcher::new(
            descriptor.zone,
            sink,
            store.clone(),
            Arc::clone(&inputs),
            catalog,
        );

        Self {
            descriptor,
            inputs,
            store,
            dispatcher,
            transport: None,
            reconciler: Mutex::new(None),
        }
    }

    fn resolve(catalog: &Catalog, descriptor: &DeviceDescriptor) -> InputTable {
        let inputs = resolve_inputs(catalog, descriptor.zone, &descriptor.model);
        if inputs.is_empty() {
            tracing::warn!(
                "No inputs found for model '{}' in zone {}",
                descriptor.model,
                descriptor.zone
            );
        }
        inputs
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn zone(&self) -> Zone {
        self.descriptor.zone
    }

    /// Inputs selectable on this zone, indexed from 1
    pub fn inputs(&self) -> &InputTable {
        &self.inputs
    }

    /// Shared state store for this zone
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn snapshot(&self) -> ReceiverSnapshot {
        self.store.snapshot()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> ChangeIterator {
        self.store.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .map(|t| t.is_running())
            .unwrap_or(false)
    }

    pub fn set_power(&self, on: bool) -> Result<(), DispatchError> {
        self.dispatcher.set_power(on)
    }

    pub fn set_mute(&self, on: bool) -> Result<(), DispatchError> {
        self.dispatcher.set_mute(on)
    }

    pub fn set_volume_absolute(&self, level: u8) -> Result<(), DispatchError> {
        self.dispatcher.set_volume_absolute(level)
    }

    pub fn set_volume_relative(&self, direction: VolumeDirection) -> Result<(), DispatchError> {
        self.dispatcher.set_volume_relative(direction)
    }

    pub fn set_input(&self, index: usize) -> Result<(), DispatchError> {
        self.dispatcher.set_input(index)
    }

    pub fn press_remote_key(&self, key: RemoteKey) -> Result<(), DispatchError> {
        self.dispatcher.press_remote_key(key)
    }

    /// Close the connection and wait for the workers to stop
    pub fn disconnect(&self) {
        if let Some(transport) = &self.transport {
            transport.disconnect();
        }

        let reconciler = self.reconciler.lock().ok().and_then(|mut r| r.take());
        if let Some(reconciler) = reconciler {
            if reconciler.join().is_err() {
                tracing::error!("Reconciler for '{}' panicked", self.descriptor.name);
            }
        }

        tracing::info!("Receiver '{}' disconnected", self.descriptor.name);
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("descriptor", &self.descriptor)
            .field("inputs", &self.inputs.len())
            .field("connected", &self.is_connected())
            .finish()
    }
}
