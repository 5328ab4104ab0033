//! Random value provider facade w/o async-trait or dynamic trait objects.
//!
//! [`RandomProvider`] is an enum with one concrete implementation per source:
//!
//! - **Quantum**: ANU QRNG over HTTP, bytes batched per call and cut into
//!   fixed-width values.
//! - **Pseudo**: local `StdRng`, optionally seeded.
//!
//! A quantum failure is returned as [`ProviderError`]; the provider never
//! switches source on its own.

pub mod bit_stream;
pub mod config;
pub mod error_handler;
pub mod services;

use tracing::info;

pub use config::{AnuConfig, RandomSourceConfig, SourceKind};
pub use error_handler::{ProviderError, Result};
use services::{AnuQrngService, PseudoRandom};

/// Concrete provider (enum-dispatch).
#[derive(Debug, Clone)]
pub enum RandomProvider {
    Quantum(AnuQrngService),
    Pseudo(PseudoRandom),
}

impl RandomProvider {
    /// Constructs the provider selected by `cfg.kind`.
    pub fn from_config(cfg: RandomSourceConfig) -> Result<Self> {
        Ok(match cfg.kind {
            SourceKind::Quantum => Self::Quantum(AnuQrngService::new(cfg.anu)?),
            SourceKind::Pseudo => Self::Pseudo(PseudoRandom::new(cfg.seed)),
        })
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Quantum(_) => SourceKind::Quantum,
            Self::Pseudo(_) => SourceKind::Pseudo,
        }
    }

    /// Returns exactly `count` values in `[0, 2^bits)`.
    ///
    /// `count == 0` never touches the network.
    pub async fn draw(&mut self, count: usize, bits: u32) -> Result<Vec<u64>> {
        if !(1..=64).contains(&bits) {
            return Err(ProviderError::InvalidBits(bits));
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        info!(source = %self.kind(), count, bits, "drawing random values");
        let values = match self {
            Self::Quantum(s) => s.draw(count, bits).await?,
            Self::Pseudo(p) => p.draw(count, bits),
        };

        if values.len() != count {
            return Err(ProviderError::InvalidResponse(format!(
                "provider returned {} values, expected {count}",
                values.len()
            )));
        }
        Ok(values)
    }
}
