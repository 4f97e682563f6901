//! The set of configured receivers

use std::sync::Arc;

use onkyo_catalog::Catalog;
use onkyo_transport::TransportConfig;

use crate::config::PlatformConfig;
use crate::error::SdkError;
use crate::receiver::Receiver;

/// All receivers of one platform block, sharing a single command catalog
pub struct OnkyoPlatform {
    catalog: Arc<Catalog>,
    receivers: Vec<Receiver>,
}

impl OnkyoPlatform {
    /// Connect every receiver in `config` using the bundled catalog
    pub fn new(config: &PlatformConfig) -> Result<Self, SdkError> {
        Self::with_catalog(config, Arc::new(Catalog::load()?), TransportConfig::default())
    }

    /// Connect every receiver in `config`
    ///
    /// Configuration is validated in full before any connection starts.
    pub fn with_catalog(
        config: &PlatformConfig,
        catalog: Arc<Catalog>,
        transport: TransportConfig,
    ) -> Result<Self, SdkError> {
        let descriptors = config.descriptors()?;

        let receivers = descriptors
            .into_iter()
            .map(|descriptor| {
                Receiver::connect(descriptor, Arc::clone(&catalog), transport.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Platform started with {} receiver(s)", receivers.len());

        Ok(Self { catalog, receivers })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    pub fn receiver(&self, name: &str) -> Option<&Receiver> {
        self.receivers.iter().find(|r| r.name() == name)
    }

    /// Like [`OnkyoPlatform::receiver`], as an error
    pub fn require_receiver(&self, name: &str) -> Result<&Receiver, SdkError> {
        self.receiver(name)
            .ok_or_else(|| SdkError::ReceiverNotFound(name.to_string()))
    }

    pub fn disconnect(&self) {
        for receiver in &self.receivers {
            receiver.disconnect();
        }
    }
}

impl std::fmt::Debug for OnkyoPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnkyoPlatform")
            .field("receivers", &self.receivers)
            .finish()
    }
}
