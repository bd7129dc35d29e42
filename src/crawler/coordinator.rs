//! Crawler coordinator - recursive manifest construction
//!
//! This module drives the crawl phase:
//! - Registering one branch per seed with the quiescence detector
//! - Fanning out one task per discovered reference, without waiting for siblings
//! - Bounding concurrent page fetches with a shared semaphore
//! - Assembling each page node only after all of its children have settled
//! - Cancelling every outstanding branch on a fatal fetch failure

use crate::config::{CrawlerConfig, MissingTitle};
use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::parse_page;
use crate::crawler::quiescence::{QuiescenceDetector, SettleGuard};
use crate::manifest::{Manifest, ManifestNode};
use crate::url::{
    base_location, classify_reference, reference_stem, resolve_reference, ReferenceKind,
    ReferenceRules,
};
use crate::HarvestError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Outcome of one crawl branch: `None` when the branch was dropped
type BranchResult = Result<Option<ManifestNode>, HarvestError>;

/// Shared, read-only state for every crawl branch
struct CrawlContext {
    client: Client,
    rules: ReferenceRules,
    fetch_permits: Semaphore,
    detector: QuiescenceDetector,
    cancel: CancellationToken,
    max_depth: u32,
    request_timeout: Duration,
    missing_title: MissingTitle,
    abort_on_fetch_error: bool,
}

/// One reference waiting to be resolved into a manifest node
struct Branch {
    /// Raw reference token as discovered (or the seed string)
    reference: String,
    location: Url,
    kind: ReferenceKind,
    /// Base location of the seed this branch descends from
    base: Arc<Url>,
    depth: u32,
    /// Page locations on the path from the seed to this branch
    ancestors: Arc<Vec<Url>>,
}

/// Crawls seeds into a settled manifest
pub struct Crawler {
    ctx: Arc<CrawlContext>,
}

impl Crawler {
    /// Creates a crawler around an existing HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `client` - HTTP client used for every page fetch
    /// * `cancel` - Token that aborts the crawl when cancelled
    pub fn new(config: &CrawlerConfig, client: Client, cancel: CancellationToken) -> Self {
        Self {
            ctx: Arc::new(CrawlContext {
                client,
                rules: ReferenceRules::from_config(config),
                fetch_permits: Semaphore::new(config.max_concurrent_fetches.max(1) as usize),
                detector: QuiescenceDetector::new(),
                cancel,
                max_depth: config.max_depth,
                request_timeout: Duration::from_secs(config.request_timeout_secs),
                missing_title: config.missing_title,
                abort_on_fetch_error: config.abort_on_fetch_error,
            }),
        }
    }

    /// The detector tracking this crawler's pending branches
    pub fn detector(&self) -> &QuiescenceDetector {
        &self.ctx.detector
    }

    /// Crawls every seed and returns the settled manifest
    ///
    /// All seeds are issued at once; the method returns only after the
    /// quiescence detector has fired. A crawler instance runs one crawl.
    ///
    /// # Errors
    ///
    /// * `HarvestError::UrlParse` / `HarvestError::Url` - a seed is not a usable location
    /// * `HarvestError::Fetch` / `HarvestError::HttpStatus` - a page fetch failed and
    ///   `abort-on-fetch-error` is set
    /// * `HarvestError::Cancelled` - the cancellation token fired
    pub async fn crawl(&self, seeds: &[String]) -> Result<Manifest, HarvestError> {
        tracing::info!("Starting crawl of {} seed(s)", seeds.len());

        let mut branches = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let location = Url::parse(seed)?;
            let base = base_location(&location)?;
            let kind = match classify_reference(seed, &self.ctx.rules) {
                ReferenceKind::Document => ReferenceKind::Document,
                _ => ReferenceKind::Page,
            };
            tracing::debug!("Seed {} resolves relative references against {}", seed, base);

            branches.push(Branch {
                reference: seed.clone(),
                location,
                kind,
                base: Arc::new(base),
                depth: 0,
                ancestors: Arc::new(Vec::new()),
            });
        }

        let mut tasks = JoinSet::new();
        for branch in branches {
            let guard = self.ctx.detector.register();
            let ctx = Arc::clone(&self.ctx);
            tasks.spawn(async move {
                let seed = branch.reference.clone();
                (seed, crawl_branch(ctx, branch, guard).await)
            });
        }
        let (quiescent_tx, quiescent_rx) = oneshot::channel();
        self.ctx.detector.on_quiescent(move || {
            let _ = quiescent_tx.send(());
        });
        self.ctx.detector.seal();
        if quiescent_rx.await.is_err() {
            return Err(HarvestError::Task("quiescence callback dropped".to_string()));
        }

        let mut manifest = Manifest::new();
        let mut failure: Option<HarvestError> = None;
        while let Some(joined) = tasks.join_next().await {
            let error = match joined {
                Ok((seed, Ok(Some(node)))) => {
                    manifest.insert(seed, node);
                    continue;
                }
                Ok((seed, Ok(None))) => {
                    tracing::warn!("Seed {} produced no manifest entry", seed);
                    continue;
                }
                Ok((seed, Err(e))) => {
                    tracing::error!("Crawl of seed {} failed: {}", seed, e);
                    e
                }
                Err(e) => HarvestError::Task(e.to_string()),
            };

            self.ctx.cancel.cancel();
            keep_root_cause(&mut failure, error);
        }

        if let Some(e) = failure {
            return Err(e);
        }

        tracing::info!(
            "Crawl settled: {} page(s), {} document(s)",
            manifest.page_count(),
            manifest.document_count()
        );

        Ok(manifest)
    }
}

/// Resolves one branch into a manifest node
///
/// The guard is held until the node is complete, so the branch settles only
/// after every child below it has settled.
fn crawl_branch(ctx: Arc<CrawlContext>, branch: Branch, guard: SettleGuard) -> BoxFuture<'static, BranchResult> {
    async move {
        let result = match branch.kind {
            ReferenceKind::Document => {
                tracing::debug!("Document leaf {}", branch.location);
                Ok(Some(ManifestNode::document(branch.location)))
            }
            ReferenceKind::Page => crawl_page(ctx, branch).await,
            ReferenceKind::Ignored => Ok(None),
        };
        guard.settle();
        result
    }
    .boxed()
}

async fn crawl_page(ctx: Arc<CrawlContext>, branch: Branch) -> BranchResult {
    if branch.depth > ctx.max_depth {
        tracing::warn!(
            "Skipping {}: deeper than max depth {}",
            branch.location,
            ctx.max_depth
        );
        return Ok(None);
    }

    if branch.ancestors.contains(&branch.location) {
        tracing::warn!("Skipping {}: page links back to an ancestor", branch.location);
        return Ok(None);
    }

    let body = match fetch_with_permit(&ctx, &branch.location).await {
        Ok(body) => body,
        Err(HarvestError::Cancelled) => return Err(HarvestError::Cancelled),
        Err(e) if ctx.abort_on_fetch_error => {
            tracing::error!("Fetch failed, aborting crawl: {}", e);
            ctx.cancel.cancel();
            return Err(e);
        }
        Err(e) => {
            tracing::warn!("Fetch failed, dropping branch {}: {}", branch.reference, e);
            return Ok(None);
        }
    };

    let parsed = parse_page(&body, &ctx.rules);
    let title = match parsed.title {
        Some(title) => title,
        None => match missing_title_fallback(&ctx, &branch) {
            Some(title) => title,
            None => {
                let e = HarvestError::Parse {
                    url: branch.location.to_string(),
                    message: "page has no <title>".to_string(),
                };
                tracing::warn!("Dropping page: {}", e);
                return Ok(None);
            }
        },
    };

    tracing::info!(
        "Fetched page '{}' ({}) with {} reference(s)",
        title,
        branch.location,
        parsed.references.len()
    );

    let mut ancestors = Vec::with_capacity(branch.ancestors.len() + 1);
    ancestors.extend(branch.ancestors.iter().cloned());
    ancestors.push(branch.location.clone());
    let ancestors = Arc::new(ancestors);

    let mut children = JoinSet::new();
    for reference in parsed.references {
        let location = match resolve_reference(&reference, &branch.base) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("Skipping reference '{}' on {}: {}", reference, branch.location, e);
                continue;
            }
        };

        let child = Branch {
            kind: classify_reference(&reference, &ctx.rules),
            reference,
            location,
            base: Arc::clone(&branch.base),
            depth: branch.depth + 1,
            ancestors: Arc::clone(&ancestors),
        };

        let guard = ctx.detector.register();
        let child_ctx = Arc::clone(&ctx);
        children.spawn(async move {
            let reference = child.reference.clone();
            (reference, crawl_branch(child_ctx, child, guard).await)
        });
    }

    let mut settled = BTreeMap::new();
    let mut failure: Option<HarvestError> = None;
    while let Some(joined) = children.join_next().await {
        let error = match joined {
            Ok((reference, Ok(Some(node)))) => {
                settled.insert(reference, node);
                continue;
            }
            Ok((_, Ok(None))) => continue,
            Ok((_, Err(e))) => e,
            Err(e) if e.is_cancelled() => continue,
            Err(e) => HarvestError::Task(e.to_string()),
        };

        // Siblings observe the token and finish promptly
        ctx.cancel.cancel();
        keep_root_cause(&mut failure, error);
    }

    if let Some(e) = failure {
        return Err(e);
    }

    tracing::debug!(
        "Page '{}' settled with {} child node(s)",
        title,
        settled.len()
    );

    Ok(Some(ManifestNode::page(title, branch.location, settled)))
}

/// Fetches a page while holding one of the bounded fetch permits
async fn fetch_with_permit(ctx: &CrawlContext, location: &Url) -> Result<String, HarvestError> {
    if ctx.cancel.is_cancelled() {
        return Err(HarvestError::Cancelled);
    }

    let _permit = tokio::select! {
        _ = ctx.cancel.cancelled() => return Err(HarvestError::Cancelled),
        permit = ctx.fetch_permits.acquire() => {
            permit.map_err(|e| HarvestError::Task(e.to_string()))?
        }
    };

    tokio::select! {
        _ = ctx.cancel.cancelled() => Err(HarvestError::Cancelled),
        body = fetch_page(&ctx.client, location, ctx.request_timeout) => body,
    }
}

/// Keeps the first real failure, replacing only a recorded cancellation
fn keep_root_cause(slot: &mut Option<HarvestError>, error: HarvestError) {
    if slot
        .as_ref()
        .map_or(true, |current| matches!(current, HarvestError::Cancelled))
    {
        *slot = Some(error);
    }
}

fn missing_title_fallback(ctx: &CrawlContext, branch: &Branch) -> Option<String> {
    match ctx.missing_title {
        MissingTitle::Skip => None,
        MissingTitle::Reference => reference_stem(&branch.reference)
            .or_else(|| branch.location.host_str().map(str::to_string)),
    }
}
