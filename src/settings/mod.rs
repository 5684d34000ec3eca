//! Transport settings resolution.
//!
//! # Data Flow
//! ```text
//! Config (akka.remote.dot-netty.diagnostic.tcp)
//!     → SettingsResolver::resolve (parse, default, validate)
//!         → pool.rs (worker pool scaling)
//!         → leak.rs (leak detection level)
//!         → tls.rs (only when an `ssl` section exists)
//!     → TransportSettings (immutable, owned by one transport)
//! ```
//!
//! # Design Decisions
//! - Resolution is a pure transform of the tree; the certificate store is
//!   the only collaborator that touches the filesystem
//! - "Unset" is `None`, never a sentinel number
//! - Every failure is fatal to startup and names the key or value at fault

pub mod error;
pub mod leak;
pub mod pool;
pub mod tls;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::{Config, DIAGNOSTIC_CONFIG_PATH};
use crate::net::certificate::{CertificateStore, PemCertificateStore};

pub use error::SettingsError;
pub use leak::{parse_leak_detection_level, LeakDetectionLevel};
pub use pool::{available_parallelism, scaled_pool_size, scaled_pool_size_with};
pub use tls::{KeyStorageFlags, TlsSettings};

/// Address bound when no hostname is configured.
pub const BIND_ALL_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: i32 = 2552;
pub const DEFAULT_BACKLOG: i32 = 4096;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SOCKET_BUFFER_SIZE: i64 = 256_000;
pub const DEFAULT_MAXIMUM_FRAME_SIZE: i32 = 128_000;
/// Smallest accepted `maximum-frame-size`.
pub const MINIMUM_FRAME_SIZE: i32 = 32_000;

/// Socket type used by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Tcp,
    Udp,
}

impl TransportMode {
    /// Anything other than `tcp` (ignoring case) selects UDP.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("tcp") {
            TransportMode::Tcp
        } else {
            TransportMode::Udp
        }
    }
}

/// Byte order of frame length prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian => "big-endian",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ByteOrder {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "little-endian" => Ok(ByteOrder::LittleEndian),
            "big-endian" => Ok(ByteOrder::BigEndian),
            _ => Err(SettingsError::InvalidArgument(format!(
                "unknown byte-order option `{s}`; supported options are: big-endian, little-endian"
            ))),
        }
    }
}

/// Resolved, validated settings for one transport instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportSettings {
    transport_mode: TransportMode,
    enable_ssl: bool,
    connect_timeout: Duration,
    hostname: String,
    public_hostname: String,
    port: i32,
    public_port: Option<i32>,
    server_socket_worker_pool_size: i32,
    client_socket_worker_pool_size: i32,
    maximum_frame_size: i32,
    tls: TlsSettings,
    dns_use_ipv6: bool,
    enforce_ip_family: bool,
    tcp_reuse_addr: bool,
    tcp_keepalive: bool,
    tcp_nodelay: bool,
    backlog: i32,
    receive_buffer_size: Option<i32>,
    send_buffer_size: Option<i32>,
    write_buffer_high_water_mark: Option<i32>,
    write_buffer_low_water_mark: Option<i32>,
    backwards_compatibility_mode_enabled: bool,
    log_transport: bool,
    byte_order: ByteOrder,
    enable_buffer_pooling: bool,
    resource_leak_detection_level: LeakDetectionLevel,
    enable_buffer_pool_dumps: bool,
    buffer_pool_dump_sample_rate: f64,
    capture_transport_logs: bool,
}

impl TransportSettings {
    /// Resolve the transport section of a root configuration.
    pub fn from_root(root: &Config) -> Result<Self, SettingsError> {
        SettingsResolver::default().resolve_root(root)
    }

    /// Resolve an already-extracted transport section.
    pub fn from_config(config: Option<&Config>) -> Result<Self, SettingsError> {
        SettingsResolver::default().resolve(config)
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    /// Whether `enable-ssl` was set. The TLS material itself is in [`Self::tls`].
    pub fn enable_ssl(&self) -> bool {
        self.enable_ssl
    }

    /// How long an outbound connect may take.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Hostname or IP the transport binds to.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Address advertised to remote systems.
    pub fn public_hostname(&self) -> &str {
        &self.public_hostname
    }

    pub fn port(&self) -> i32 {
        self.port
    }

    /// Advertised port, if different from the bound port.
    pub fn public_port(&self) -> Option<i32> {
        self.public_port
    }

    pub fn server_socket_worker_pool_size(&self) -> i32 {
        self.server_socket_worker_pool_size
    }

    pub fn client_socket_worker_pool_size(&self) -> i32 {
        self.client_socket_worker_pool_size
    }

    pub fn maximum_frame_size(&self) -> i32 {
        self.maximum_frame_size
    }

    pub fn tls(&self) -> &TlsSettings {
        &self.tls
    }

    pub fn dns_use_ipv6(&self) -> bool {
        self.dns_use_ipv6
    }

    pub fn enforce_ip_family(&self) -> bool {
        self.enforce_ip_family
    }

    pub fn tcp_reuse_addr(&self) -> bool {
        self.tcp_reuse_addr
    }

    pub fn tcp_keepalive(&self) -> bool {
        self.tcp_keepalive
    }

    pub fn tcp_nodelay(&self) -> bool {
        self.tcp_nodelay
    }

    pub fn backlog(&self) -> i32 {
        self.backlog
    }

    pub fn receive_buffer_size(&self) -> Option<i32> {
        self.receive_buffer_size
    }

    pub fn send_buffer_size(&self) -> Option<i32> {
        self.send_buffer_size
    }

    pub fn write_buffer_high_water_mark(&self) -> Option<i32> {
        self.write_buffer_high_water_mark
    }

    pub fn write_buffer_low_water_mark(&self) -> Option<i32> {
        self.write_buffer_low_water_mark
    }

    pub fn backwards_compatibility_mode_enabled(&self) -> bool {
        self.backwards_compatibility_mode_enabled
    }

    /// Log every frame passing through the pipeline.
    pub fn log_transport(&self) -> bool {
        self.log_transport
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn enable_buffer_pooling(&self) -> bool {
        self.enable_buffer_pooling
    }

    pub fn resource_leak_detection_level(&self) -> LeakDetectionLevel {
        self.resource_leak_detection_level
    }

    /// Install the allocator dump stage.
    pub fn enable_buffer_pool_dumps(&self) -> bool {
        self.enable_buffer_pool_dumps
    }

    /// Probability that a pipeline event produces an allocator dump.
    pub fn buffer_pool_dump_sample_rate(&self) -> f64 {
        self.buffer_pool_dump_sample_rate
    }

    /// Route the underlying transport framework's logs into ours.
    pub fn capture_transport_logs(&self) -> bool {
        self.capture_transport_logs
    }
}

/// Resolves [`TransportSettings`] from configuration.
///
/// The certificate store and the host parallelism are injectable; the
/// default uses [`PemCertificateStore`] and [`available_parallelism`].
#[derive(Clone)]
pub struct SettingsResolver {
    certificate_store: Arc<dyn CertificateStore>,
    parallelism: usize,
}

impl Default for SettingsResolver {
    fn default() -> Self {
        Self {
            certificate_store: Arc::new(PemCertificateStore),
            parallelism: available_parallelism(),
        }
    }
}

impl SettingsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_certificate_store(mut self, store: Arc<dyn CertificateStore>) -> Self {
        self.certificate_store = store;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Extract [`DIAGNOSTIC_CONFIG_PATH`] from `root` and resolve it.
    pub fn resolve_root(&self, root: &Config) -> Result<TransportSettings, SettingsError> {
        let section = root.get_config(DIAGNOSTIC_CONFIG_PATH)?;
        self.resolve(section.as_ref())
    }

    pub fn resolve(&self, config: Option<&Config>) -> Result<TransportSettings, SettingsError> {
        let config = config.ok_or_else(|| {
            SettingsError::ConfigurationMissing(format!(
                "transport configuration was not found (default path: `{DIAGNOSTIC_CONFIG_PATH}`)"
            ))
        })?;

        let transport_mode = TransportMode::parse(
            config
                .get_string("transport-protocol")?
                .as_deref()
                .unwrap_or("tcp"),
        );

        let hostname = config
            .get_string("hostname")?
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| BIND_ALL_ADDRESS.to_string());
        let public_hostname = config
            .get_string("public-hostname")?
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| hostname.clone());

        let port = match config.get_int("port")? {
            Some(port) => to_i32("port", port)?,
            None => DEFAULT_PORT,
        };
        let public_port = match config.get_int("public-port")? {
            Some(port) if port > 0 => Some(to_i32("public-port", port)?),
            _ => None,
        };

        let byte_order: ByteOrder = config
            .get_string("byte-order")?
            .as_deref()
            .unwrap_or("little-endian")
            .parse()?;

        let resource_leak_detection_level = parse_leak_detection_level(
            config
                .get_string("resource-leak-level")?
                .as_deref()
                .unwrap_or("simple"),
        )?;

        let maximum_frame_size =
            optional_size(config, "maximum-frame-size", None)?.unwrap_or(DEFAULT_MAXIMUM_FRAME_SIZE);
        if maximum_frame_size < MINIMUM_FRAME_SIZE {
            return Err(SettingsError::InvalidArgument(format!(
                "maximum-frame-size must be at least {MINIMUM_FRAME_SIZE} bytes, got {maximum_frame_size}"
            )));
        }

        let tls = if config.has_path("ssl") {
            let section = config.get_config("ssl")?.ok_or_else(|| {
                SettingsError::ConfigurationMissing("ssl section was not found".to_string())
            })?;
            TlsSettings::from_config(&section, self.certificate_store.as_ref())?
        } else {
            TlsSettings::Empty
        };

        let settings = TransportSettings {
            transport_mode,
            enable_ssl: flag(config, "enable-ssl", false)?,
            connect_timeout: config
                .get_duration("connection-timeout")?
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            hostname,
            public_hostname,
            port,
            public_port,
            server_socket_worker_pool_size: pool::worker_pool_size(
                config.get_config("server-socket-worker-pool")?.as_ref(),
                self.parallelism,
            )?,
            client_socket_worker_pool_size: pool::worker_pool_size(
                config.get_config("client-socket-worker-pool")?.as_ref(),
                self.parallelism,
            )?,
            maximum_frame_size,
            tls,
            dns_use_ipv6: flag(config, "dns-use-ipv6", false)?,
            enforce_ip_family: flag(config, "enforce-ip-family", false)?,
            tcp_reuse_addr: flag(config, "tcp-reuse-addr", true)?,
            tcp_keepalive: flag(config, "tcp-keepalive", true)?,
            tcp_nodelay: flag(config, "tcp-nodelay", true)?,
            backlog: match config.get_int("backlog")? {
                Some(backlog) => to_i32("backlog", backlog)?,
                None => DEFAULT_BACKLOG,
            },
            receive_buffer_size: optional_size(
                config,
                "receive-buffer-size",
                Some(DEFAULT_SOCKET_BUFFER_SIZE),
            )?,
            send_buffer_size: optional_size(config, "send-buffer-size", Some(DEFAULT_SOCKET_BUFFER_SIZE))?,
            write_buffer_high_water_mark: optional_size(config, "write-buffer-high-water-mark", None)?,
            write_buffer_low_water_mark: optional_size(config, "write-buffer-low-water-mark", None)?,
            backwards_compatibility_mode_enabled: flag(config, "enable-backwards-compatibility", false)?,
            log_transport: flag(config, "log-transport", false)?,
            byte_order,
            enable_buffer_pooling: flag(config, "enable-pooling", true)?,
            resource_leak_detection_level,
            enable_buffer_pool_dumps: flag(config, "allocator-dumps.enabled", true)?,
            buffer_pool_dump_sample_rate: config
                .get_double("allocator-dumps.sample-rate")?
                .unwrap_or(1.0),
            capture_transport_logs: flag(config, "capture-dotnetty-logs", true)?,
        };

        tracing::debug!(
            mode = ?settings.transport_mode,
            hostname = %settings.hostname,
            port = settings.port,
            server_pool = settings.server_socket_worker_pool_size,
            client_pool = settings.client_socket_worker_pool_size,
            leak_detection = %settings.resource_leak_detection_level,
            tls = settings.tls.is_enabled(),
            "Transport settings resolved"
        );

        Ok(settings)
    }
}

fn flag(config: &Config, path: &str, default: bool) -> Result<bool, SettingsError> {
    Ok(config.get_bool(path)?.unwrap_or(default))
}

pub(crate) fn to_i32(path: &str, value: i64) -> Result<i32, SettingsError> {
    i32::try_from(value).map_err(|_| {
        SettingsError::InvalidArgument(format!("`{path}` value {value} does not fit in 32 bits"))
    })
}

/// Read a byte size, applying `default` only when the key is absent.
/// Zero and negative sizes mean "unset".
fn optional_size(
    config: &Config,
    path: &str,
    default: Option<i64>,
) -> Result<Option<i32>, SettingsError> {
    match config.get_byte_size(path)?.or(default) {
        Some(size) if size > 0 => to_i32(path, size).map(Some),
        _ => Ok(None),
    }
}
