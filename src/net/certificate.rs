//! Certificate store and loaded key material.
//!
//! Loading is a single fallible call: a store either hands back a complete
//! [`Certificate`] or an error, never a half-initialized credential.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls_pki_types::CertificateDer;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::settings::tls::KeyStorageFlags;

/// Errors produced while loading key material.
#[derive(Debug, Error)]
pub enum CertificateError {
    /// The certificate file could not be read or decoded.
    #[error("failed to read certificate {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was readable but contained no certificate.
    #[error("no certificate found in {0}")]
    NoCertificates(PathBuf),

    /// A password was configured for a store that cannot decrypt keys.
    #[error("encrypted key material is not supported for {0}")]
    EncryptedKeyUnsupported(PathBuf),
}

/// Loads certificates for the transport's TLS settings.
pub trait CertificateStore: Send + Sync {
    fn load(
        &self,
        path: &Path,
        password: Option<&str>,
        flags: KeyStorageFlags,
    ) -> Result<Certificate, CertificateError>;
}

#[derive(PartialEq, Eq)]
struct CertificateMaterial {
    chain: Vec<CertificateDer<'static>>,
    private_key: Option<Vec<u8>>,
    flags: KeyStorageFlags,
}

/// Opaque handle to loaded certificate material.
///
/// Clones share the same material. Equality compares content.
#[derive(Clone)]
pub struct Certificate {
    inner: Arc<CertificateMaterial>,
}

impl Certificate {
    pub fn new(
        chain: Vec<CertificateDer<'static>>,
        private_key: Option<Vec<u8>>,
        flags: KeyStorageFlags,
    ) -> Self {
        Self {
            inner: Arc::new(CertificateMaterial {
                chain,
                private_key,
                flags,
            }),
        }
    }

    /// Certificate chain, end-entity first.
    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.inner.chain
    }

    pub fn end_entity(&self) -> Option<&CertificateDer<'static>> {
        self.inner.chain.first()
    }

    pub fn has_private_key(&self) -> bool {
        self.inner.private_key.is_some()
    }

    /// DER bytes of the private key, if one was loaded.
    pub fn private_key_der(&self) -> Option<&[u8]> {
        self.inner.private_key.as_deref()
    }

    pub fn flags(&self) -> KeyStorageFlags {
        self.inner.flags
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("certificates", &self.inner.chain.len())
            .field("has_private_key", &self.has_private_key())
            .field("flags", &self.inner.flags)
            .finish()
    }
}

impl Serialize for Certificate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Certificate", 3)?;
        state.serialize_field("certificates", &self.inner.chain.len())?;
        state.serialize_field("has_private_key", &self.has_private_key())?;
        state.serialize_field("flags", &self.inner.flags)?;
        state.end()
    }
}

/// Reads PEM files: one or more `CERTIFICATE` blocks and an optional
/// private key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PemCertificateStore;

impl CertificateStore for PemCertificateStore {
    fn load(
        &self,
        path: &Path,
        password: Option<&str>,
        flags: KeyStorageFlags,
    ) -> Result<Certificate, CertificateError> {
        if password.is_some_and(|p| !p.is_empty()) {
            return Err(CertificateError::EncryptedKeyUnsupported(path.to_path_buf()));
        }

        let io_error = |source| CertificateError::Io {
            path: path.to_path_buf(),
            source,
        };

        let pem = fs::read(path).map_err(io_error)?;
        let chain = rustls_pemfile::certs(&mut pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_error)?;
        if chain.is_empty() {
            return Err(CertificateError::NoCertificates(path.to_path_buf()));
        }

        let private_key = rustls_pemfile::private_key(&mut pem.as_slice())
            .map_err(io_error)?
            .map(|key| key.secret_der().to_vec());

        tracing::debug!(
            path = %path.display(),
            certificates = chain.len(),
            has_private_key = private_key.is_some(),
            "Certificate material read"
        );

        Ok(Certificate::new(chain, private_key, flags))
    }
}
