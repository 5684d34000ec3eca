//! Network-facing collaborators.
//!
//! # Data Flow
//! ```text
//! ssl section resolved
//!     → certificate.rs (CertificateStore loads key material once)
//!     → settings::TlsSettings (holds the Certificate handle)
//!     → transport TLS handshake (external)
//! ```
//!
//! # Design Decisions
//! - Key material loading sits behind a trait so tests and hosts can
//!   supply their own store
//! - The default store reads PEM; encrypted keys are rejected up front

pub mod certificate;

pub use certificate::{Certificate, CertificateError, CertificateStore, PemCertificateStore};
