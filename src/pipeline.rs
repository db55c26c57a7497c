//! The per-run orchestration: fetch the source page, emit headlines and
//! filtered links, then walk the surviving links sequentially through
//! classify -> extract -> synthesize.
//!
//! Stage one (headline and link emission) needs no network access beyond the
//! initial page fetch. Stage two is gated entirely on the synthesis
//! credential and processes one link at a time; no per-link failure ever
//! aborts the loop. The only failure that ends a run early is the initial
//! page fetch, and even that is logged rather than propagated.

use crate::{
    classifier,
    config::Config,
    extractor, fetcher,
    links::{self, Headline, LinkRecord},
    output::{OutputRecord, RecordSink},
    policy::ExclusionPolicy,
    synthesizer::Synthesizer,
};
use scraper::Html;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use url::Url;

pub const SOURCE_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Run the pipeline with the built-in exclusion lists.
pub async fn run<S: RecordSink>(config: &Config, sink: &mut S) -> anyhow::Result<()> {
    run_with_policy(config, &ExclusionPolicy::builtin(), sink).await
}

/// Run the pipeline with an explicit policy.
#[instrument(skip_all, fields(source = %config.source_url()))]
pub async fn run_with_policy<S: RecordSink>(
    config: &Config,
    policy: &ExclusionPolicy,
    sink: &mut S,
) -> anyhow::Result<()> {
    info!("starting aggregator run");

    let page = match fetcher::fetch(config.source_url(), SOURCE_FETCH_TIMEOUT).await {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "failed to fetch source page, ending run");
            return Ok(());
        }
    };
    info!(status = page.status.as_u16(), "source page fetched");

    // Parse once, take owned results. The parsed document does not cross an
    // await point.
    let (headlines, all_links) = parse_page(&page.body, &page.url_final);

    for headline in &headlines {
        sink.push(OutputRecord::headline(headline)).await?;
    }
    info!(count = headlines.len(), "emitted headlines");
    if headlines.is_empty() {
        warn!("no headlines extracted from source page, check selectors");
    }

    let total = all_links.len();
    let kept: Vec<LinkRecord> = all_links
        .into_iter()
        .filter(|link| !policy.should_exclude(link))
        .collect();
    info!(total, kept = kept.len(), "applied exclusion policy");

    for link in &kept {
        sink.push(OutputRecord::link(link)).await?;
    }

    let Some(api_key) = config.openai_api_key() else {
        warn!("no synthesis credential configured, skipping story synthesis");
        return Ok(());
    };
    let synthesizer = Synthesizer::new(api_key, config.openai_model(), config.openai_base_url())?;

    for link in &kept {
        synthesize_link(link, &synthesizer, sink).await?;
    }

    info!("run complete");
    Ok(())
}

fn parse_page(html: &str, base: &Url) -> (Vec<Headline>, Vec<LinkRecord>) {
    let document = Html::parse_document(html);
    (
        links::collect_headlines(&document),
        links::collect_links(&document, base),
    )
}

/// Classify one link and, when it cannot be embedded, extract its content
/// and emit a generated story. Only sink failures propagate.
#[instrument(skip_all, fields(href = %link.href))]
async fn synthesize_link<S: RecordSink>(
    link: &LinkRecord,
    synthesizer: &Synthesizer,
    sink: &mut S,
) -> anyhow::Result<()> {
    let verdict = classifier::classify(&link.href).await;
    if verdict.is_embeddable() {
        info!("link is embeddable, no story needed");
        return Ok(());
    }

    info!(reason = %verdict.reason, "link not embeddable, generating story");
    let content = extractor::extract(&link.href).await;
    let story = synthesizer.synthesize(&content).await;
    sink.push(OutputRecord::generated_story(link, story.body))
        .await
}
