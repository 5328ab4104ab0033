//! One full run: fetch → order → persist → print → (upload).
//!
//! Side effects happen in a fixed order. The value cache is saved before any
//! output, so an ordering whose values were not persisted is never shown or
//! published. A failed upload surfaces after the markdown was printed.

use std::io::Write;

use chrono::Utc;
use gist_publisher::{DEFAULT_REPO_URL, RenderOptions, render_markdown, title};
use qrng_service::RandomProvider;
use question_order::{BITS, OrderedQuestions, Question, RandomCache, finalize, plan};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::errors::AppResult;

/// Builds the configuration from `lookup`, then runs.
pub async fn start<F>(cli: &Cli, lookup: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let cfg = AppConfig::from_lookup(lookup)?;
    run(cli, &cfg).await
}

pub async fn run(cli: &Cli, cfg: &AppConfig) -> AppResult<()> {
    // Built first so a missing API key fails before any network traffic.
    let mut provider =
        RandomProvider::from_config(cfg.random_source_config(cli.quantum, cli.seed))?;
    if cli.quantum && cli.seed.is_some() {
        warn!("--seed is ignored with --quantum");
    }

    let questions = patreon_source::fetch_questions(cfg.source_config(cli.cache_urls)).await?;
    if questions.is_empty() {
        info!("no questions found, nothing to order");
        return Ok(());
    }
    info!(count = questions.len(), "questions fetched");

    let kind = provider.kind();
    let mut cache = RandomCache::load(cfg.value_cache_path(kind), BITS);
    let ordered = order_questions(&questions, &mut provider, &mut cache).await?;

    let markdown = render_markdown(
        &ordered,
        &RenderOptions {
            quantum: kind.is_quantum(),
            bits: BITS,
            post_url: cfg.post_url.clone(),
            repo_url: DEFAULT_REPO_URL.to_string(),
            updated_at: Utc::now(),
        },
    );
    print_markdown(&markdown);

    if cli.gist {
        gist_publisher::publish(
            &cfg.publish_config(),
            &cfg.post_url,
            &title(kind.is_quantum()),
            &markdown,
        )
        .await?;
    }
    Ok(())
}

/// Looks up cached values, draws the missing ones, checks for collisions,
/// sorts, and saves the cache.
pub async fn order_questions(
    questions: &[Question],
    provider: &mut RandomProvider,
    cache: &mut RandomCache,
) -> AppResult<OrderedQuestions> {
    let plan = plan(questions, cache)?;
    info!(
        cached = plan.hits.len(),
        to_draw = plan.draw_count(),
        source = %provider.kind(),
        "value cache lookup"
    );

    let drawn = provider.draw(plan.draw_count(), BITS).await?;
    let ordered = finalize(questions, plan, drawn)?;

    cache.merge_and_save(&ordered.fresh)?;
    info!(
        path = %cache.path().display(),
        entries = cache.len(),
        fresh = ordered.fresh.len(),
        "value cache saved"
    );
    Ok(ordered)
}

fn print_markdown(markdown: &str) {
    let mut out = std::io::stdout().lock();
    if let Err(e) = out.write_all(markdown.as_bytes()).and_then(|_| out.flush()) {
        warn!(error = %e, "could not write markdown to stdout");
    }
}
