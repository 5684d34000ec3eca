//! TLS sub-settings.

use std::ops::{BitOr, BitOrAssign};
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::net::certificate::{Certificate, CertificateStore};
use crate::settings::error::SettingsError;

/// Storage flags applied when key material is imported.
///
/// Names follow the `certificate.flags` vocabulary. Flags combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct KeyStorageFlags(u32);

impl KeyStorageFlags {
    pub const DEFAULT_KEY_SET: Self = Self(0);
    pub const USER_KEY_SET: Self = Self(1);
    pub const MACHINE_KEY_SET: Self = Self(1 << 1);
    pub const EXPORTABLE: Self = Self(1 << 2);
    pub const USER_PROTECTED: Self = Self(1 << 3);
    pub const PERSIST_KEY_SET: Self = Self(1 << 4);

    /// Accepted `certificate.flags` tokens.
    pub const TOKENS: [&'static str; 6] = [
        "default-key-set",
        "exportable",
        "machine-key-set",
        "persist-key-set",
        "user-key-set",
        "user-protected",
    ];

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a single flag token. Tokens are case-sensitive.
    pub fn parse_token(token: &str) -> Result<Self, SettingsError> {
        match token {
            "default-key-set" => Ok(Self::DEFAULT_KEY_SET),
            "exportable" => Ok(Self::EXPORTABLE),
            "machine-key-set" => Ok(Self::MACHINE_KEY_SET),
            "persist-key-set" => Ok(Self::PERSIST_KEY_SET),
            "user-key-set" => Ok(Self::USER_KEY_SET),
            "user-protected" => Ok(Self::USER_PROTECTED),
            _ => Err(SettingsError::InvalidArgument(format!(
                "unrecognized flag in certificate config `{token}`; available flags: {}",
                Self::TOKENS.join(" | ")
            ))),
        }
    }
}

impl BitOr for KeyStorageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for KeyStorageFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// TLS parameters carried by the transport settings.
///
/// This only carries the material and the validation flag; the handshake
/// itself belongs to the transport.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum TlsSettings {
    /// No certificate configured.
    #[default]
    Empty,
    /// A certificate was loaded from the `ssl` section.
    Enabled {
        certificate: Certificate,
        /// Skip peer certificate validation. Development use only.
        suppress_validation: bool,
    },
}

impl TlsSettings {
    /// Resolve the `ssl` section, loading the certificate through `store`.
    pub fn from_config(config: &Config, store: &dyn CertificateStore) -> Result<Self, SettingsError> {
        let flags = config
            .get_string_list("certificate.flags")?
            .unwrap_or_default()
            .iter()
            .try_fold(KeyStorageFlags::DEFAULT_KEY_SET, |acc, token| {
                KeyStorageFlags::parse_token(token).map(|flag| acc | flag)
            })?;

        let path = config
            .get_string("certificate.path")?
            .filter(|path| !path.is_empty())
            .ok_or_else(|| {
                SettingsError::ConfigurationMissing(
                    "path to TLS certificate was not found (expected at `ssl.certificate.path`)"
                        .to_string(),
                )
            })?;
        let password = config.get_string("certificate.password")?;
        let suppress_validation = config.get_bool("suppress-validation")?.unwrap_or(false);

        let certificate = store.load(Path::new(&path), password.as_deref(), flags)?;
        tracing::info!(
            path = %path,
            flags = flags.bits(),
            suppress_validation,
            "TLS certificate loaded"
        );

        Ok(TlsSettings::Enabled {
            certificate,
            suppress_validation,
        })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, TlsSettings::Enabled { .. })
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            TlsSettings::Empty => None,
            TlsSettings::Enabled { certificate, .. } => Some(certificate),
        }
    }

    pub fn suppress_validation(&self) -> bool {
        match self {
            TlsSettings::Empty => false,
            TlsSettings::Enabled {
                suppress_validation, ..
            } => *suppress_validation,
        }
    }
}
