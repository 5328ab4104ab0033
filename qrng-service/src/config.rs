//! Provider configuration, built by the binary and passed in by value.

use std::fmt;

/// Default ANU QRNG API endpoint.
pub const DEFAULT_ANU_ENDPOINT: &str = "https://api.quantumnumbers.anu.edu.au";

/// Maximum bytes the ANU API returns per call.
pub const ANU_MAX_BYTES_PER_CALL: usize = 1024;

/// Which randomness source backs the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// ANU quantum RNG (networked, needs an API key).
    Quantum,
    /// Local `StdRng`.
    Pseudo,
}

impl SourceKind {
    /// Human label used in rendered output ("Quantum" / "Pseudo").
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Quantum => "Quantum",
            SourceKind::Pseudo => "Pseudo",
        }
    }

    pub fn is_quantum(self) -> bool {
        matches!(self, SourceKind::Quantum)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ANU QRNG client settings.
#[derive(Debug, Clone)]
pub struct AnuConfig {
    /// API base, e.g. "https://api.quantumnumbers.anu.edu.au"
    pub endpoint: String,
    /// Value of the `x-api-key` header.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Upper bound of bytes requested per call.
    pub max_bytes_per_call: usize,
}

impl Default for AnuConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ANU_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: 10,
            max_bytes_per_call: ANU_MAX_BYTES_PER_CALL,
        }
    }
}

/// Complete provider configuration.
#[derive(Debug, Clone)]
pub struct RandomSourceConfig {
    pub kind: SourceKind,
    pub anu: AnuConfig,
    /// Seed for the pseudo-random source; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl RandomSourceConfig {
    pub fn pseudo(seed: Option<u64>) -> Self {
        Self {
            kind: SourceKind::Pseudo,
            anu: AnuConfig::default(),
            seed,
        }
    }

    pub fn quantum(anu: AnuConfig) -> Self {
        Self {
            kind: SourceKind::Quantum,
            anu,
            seed: None,
        }
    }
}
