use clap::Parser;

/// Orders Patreon AMA questions by (quantum) random numbers.
#[derive(Debug, Clone, Parser)]
#[command(name = "quantum-ama", version, about)]
pub struct Cli {
    /// Use the ANU quantum RNG (needs ANU_QUANTUM_API_KEY)
    #[arg(long)]
    pub quantum: bool,

    /// Upload the markdown to a GitHub Gist (needs GITHUB_TOKEN)
    #[arg(long)]
    pub gist: bool,

    /// Read Patreon API pages from the disk cache when present
    #[arg(long = "cache-urls", visible_alias = "cache")]
    pub cache_urls: bool,

    /// Seed for the pseudo-random source (ignored with --quantum)
    #[arg(long)]
    pub seed: Option<u64>,
}
