//! Node configuration.
//!
//! The node has no configuration file: every value is a build-time constant
//! collected here so the controller receives one validated struct. Host
//! harnesses may override individual fields through the builder methods.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use crate::association::AssociationPolicy;
use crate::error::{Error, Result};
use crate::policy::PolicyConfig;
use crate::retry::RetryConfig;

/// Identifier sent in every message.
pub const DEFAULT_NODE_ID: &str = "1";
/// Multicast group readings are sent to.
pub const DEFAULT_MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(239, 0, 10, 1);
/// Destination port.
pub const DEFAULT_MULTICAST_PORT: u16 = 10000;
/// Multicast time-to-live.
pub const DEFAULT_MULTICAST_TTL: u32 = 5;
/// Time between sampling cycles.
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_secs(60);

/// Everything the controller needs to run.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Identifier placed in the `id` field of each message.
    pub node_id: String,
    /// Multicast group.
    pub multicast_group: Ipv4Addr,
    /// Destination port.
    pub multicast_port: u16,
    /// Multicast TTL.
    pub multicast_ttl: u32,
    /// Local interface address the transport binds to.
    pub interface: Ipv4Addr,
    /// Sleep between cycles.
    pub sample_period: Duration,
    /// Transmit policy thresholds.
    pub policy: PolicyConfig,
    /// Association wait inside a transmit cycle.
    pub association: AssociationPolicy,
    /// Association wait at boot.
    pub boot_association: AssociationPolicy,
    /// Sensor probe at boot.
    pub sensor_probe: RetryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: DEFAULT_NODE_ID.to_string(),
            multicast_group: DEFAULT_MULTICAST_GROUP,
            multicast_port: DEFAULT_MULTICAST_PORT,
            multicast_ttl: DEFAULT_MULTICAST_TTL,
            interface: Ipv4Addr::UNSPECIFIED,
            sample_period: DEFAULT_SAMPLE_PERIOD,
            policy: PolicyConfig::default(),
            association: AssociationPolicy::default(),
            boot_association: AssociationPolicy::for_boot(),
            sensor_probe: RetryConfig::for_sensor_probe(),
        }
    }
}

impl NodeConfig {
    /// Destination for broadcast datagrams.
    pub fn target(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.multicast_group, self.multicast_port))
    }

    /// Set the node id.
    #[must_use]
    pub fn node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = id.into();
        self
    }

    /// Set the local interface address.
    #[must_use]
    pub fn interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = interface;
        self
    }

    /// Set the sampling period.
    #[must_use]
    pub fn sample_period(mut self, period: Duration) -> Self {
        self.sample_period = period;
        self
    }

    /// Set the transmit policy.
    #[must_use]
    pub fn policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    /// Set the in-cycle association policy.
    #[must_use]
    pub fn association(mut self, policy: AssociationPolicy) -> Self {
        self.association = policy;
        self
    }

    /// Set the boot association policy.
    #[must_use]
    pub fn boot_association(mut self, policy: AssociationPolicy) -> Self {
        self.boot_association = policy;
        self
    }

    /// Set the boot sensor probe.
    #[must_use]
    pub fn sensor_probe(mut self, config: RetryConfig) -> Self {
        self.sensor_probe = config;
        self
    }

    /// Validate the configuration.
    ///
    /// This checks:
    /// - Node id is non-empty and needs no JSON escaping
    /// - Group is a multicast address, TTL and port are non-zero
    /// - Sample period is non-zero
    /// - Policy, association and probe settings are valid
    ///
    /// # Example
    ///
    /// ```
    /// use hygronode_core::NodeConfig;
    ///
    /// let config = NodeConfig::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.node_id.is_empty() {
            return Err(Error::invalid_config("node_id cannot be empty"));
        }
        if self
            .node_id
            .chars()
            .any(|c| c == '"' || c == '\\' || c.is_control())
        {
            return Err(Error::invalid_config(format!(
                "node_id {:?} contains characters that need escaping",
                self.node_id
            )));
        }
        if !self.multicast_group.is_multicast() {
            return Err(Error::invalid_config(format!(
                "{} is not a multicast address",
                self.multicast_group
            )));
        }
        if self.multicast_port == 0 {
            return Err(Error::invalid_config("multicast_port cannot be 0"));
        }
        if self.multicast_ttl == 0 {
            return Err(Error::invalid_config("multicast_ttl must be > 0"));
        }
        if self.sample_period.is_zero() {
            return Err(Error::invalid_config("sample_period must be > 0"));
        }
        self.policy.validate()?;
        self.association.validate()?;
        self.boot_association.validate()?;
        self.sensor_probe.validate()?;
        Ok(())
    }
}
