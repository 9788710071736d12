//! Bundle persistence
//!
//! A bundle is written as a JSON envelope:
//!
//! ```json
//! { "format_version": 1, "kind": "risk", "bundle": { ... } }
//! ```
//!
//! The envelope is checked before the payload is decoded, so a file written
//! for another bundle kind or format fails with a clear message instead of a
//! field-level JSON error.

use crate::error::{FlightError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Current envelope format.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    format_version: u32,
    kind: &'a str,
    bundle: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
    kind: String,
    bundle: serde_json::Value,
}

/// A persistable model bundle.
pub trait Bundle: Serialize + DeserializeOwned {
    /// Tag stored in the envelope.
    const KIND: &'static str;

    /// Write the bundle to `path`.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(
            &mut writer,
            &EnvelopeRef {
                format_version: FORMAT_VERSION,
                kind: Self::KIND,
                bundle: self,
            },
        )?;
        writer.flush()?;
        tracing::info!(kind = Self::KIND, path = %path.display(), "bundle saved");
        Ok(())
    }

    /// Read a bundle from `path`.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let envelope: Envelope = serde_json::from_reader(reader)?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(FlightError::UnsupportedBundle(format!(
                "format version {} (expected {})",
                envelope.format_version, FORMAT_VERSION
            )));
        }
        if envelope.kind != Self::KIND {
            return Err(FlightError::UnsupportedBundle(format!(
                "bundle kind '{}' (expected '{}')",
                envelope.kind,
                Self::KIND
            )));
        }

        let bundle = serde_json::from_value(envelope.bundle)?;
        tracing::info!(kind = Self::KIND, path = %path.display(), "bundle loaded");
        Ok(bundle)
    }
}
