//! Background card generation.
//!
//! [`Dispatcher::submit`] validates the generator, then hands the job to a
//! tokio task and returns immediately. The render runs on the blocking pool,
//! the card is written through the [`CardStore`], and the optional callback
//! URL is notified with the outcome. [`Dispatcher::stream`] runs the same
//! render but forwards each progress event through a bounded channel.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::callback::{CallbackNotifier, CallbackPayload, Url};
use crate::error::{Error, Result};
use crate::formatter::{Formatter, ProgressEvent};
use crate::output::{CardOutput, CardStore};
use crate::registry::FormatterRegistry;
use crate::spell::SpellRecord;

/// Lifecycle of a [`GenerationJob`]. `Queued` moves to exactly one of the
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Ready,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Queued)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to render a card in the background.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    id: Uuid,
    spell: Arc<SpellRecord>,
    generator: String,
    callback_url: Option<Url>,
    created_at: DateTime<Utc>,
    status: JobStatus,
    output: Option<CardOutput>,
    failure: Option<String>,
}

impl GenerationJob {
    pub fn new(
        spell: SpellRecord,
        generator: impl Into<String>,
        callback_url: Option<Url>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            spell: Arc::new(spell),
            generator: generator.into(),
            callback_url,
            created_at: Utc::now(),
            status: JobStatus::Queued,
            output: None,
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn spell(&self) -> &SpellRecord {
        &self.spell
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn callback_url(&self) -> Option<&Url> {
        self.callback_url.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Stored card, once the job is `Ready`.
    pub fn output(&self) -> Option<&CardOutput> {
        self.output.as_ref()
    }

    /// Failure reason, once the job is `Failed`.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Move a queued job to `Ready`. Returns `false` if the job had already
    /// finished.
    pub fn mark_ready(&mut self, output: CardOutput) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Ready;
        self.output = Some(output);
        true
    }

    /// Move a queued job to `Failed`. Returns `false` if the job had already
    /// finished.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.failure = Some(reason.into());
        true
    }

    /// Callback body describing the job's terminal state.
    pub fn callback_payload(&self) -> Option<CallbackPayload> {
        let title = self.spell.title().to_string();
        let level = self.spell.level();
        match self.status {
            JobStatus::Queued => None,
            JobStatus::Ready => self.output.as_ref().map(|output| CallbackPayload::Ready {
                title,
                level,
                filename: output.filename.clone(),
                url: output.url.clone(),
            }),
            JobStatus::Failed => Some(CallbackPayload::Failed {
                title,
                level,
                reason: self.failure.clone().unwrap_or_default(),
            }),
        }
    }
}

/// Returned by [`Dispatcher::submit`]. Dropping it detaches the job.
#[derive(Debug)]
pub struct JobHandle {
    id: Uuid,
    title: String,
    handle: JoinHandle<GenerationJob>,
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Wait for the job (including its callback) to finish.
    pub async fn wait(self) -> std::result::Result<GenerationJob, JoinError> {
        self.handle.await
    }
}

/// Receiving end of a streamed render.
pub type ProgressReceiver = mpsc::Receiver<Result<ProgressEvent>>;

/// Runs generation jobs against a shared registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<FormatterRegistry>,
    store: Arc<CardStore>,
    notifier: Arc<dyn CallbackNotifier>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<FormatterRegistry>,
        store: CardStore,
        notifier: Arc<dyn CallbackNotifier>,
    ) -> Self {
        Self {
            registry,
            store: Arc::new(store),
            notifier,
        }
    }

    pub fn registry(&self) -> &FormatterRegistry {
        &self.registry
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    /// Queue a background render. Fails immediately, before any job exists,
    /// when `generator` is not registered.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        spell: SpellRecord,
        generator: &str,
        callback_url: Option<Url>,
    ) -> Result<JobHandle> {
        let formatter = self.registry.get(generator)?;
        let job = GenerationJob::new(spell, generator, callback_url);
        let id = job.id();
        let title = job.spell().title().to_string();
        info!(
            job_id = %id,
            generator,
            title = %title,
            callback = job.callback_url().is_some(),
            "generation job queued"
        );

        let handle = tokio::spawn(run_job(
            job,
            formatter,
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
        ));
        Ok(JobHandle { id, title, handle })
    }

    /// Render `spell` with progress reporting.
    ///
    /// Events arrive on the returned channel as the formatter produces them.
    /// The channel closes after the 100% event or after the first error. If
    /// the receiver is dropped, rendering stops at the next event.
    pub fn stream(
        &self,
        spell: SpellRecord,
        generator: &str,
        capacity: usize,
    ) -> Result<ProgressReceiver> {
        let formatter = self.registry.get(generator)?;
        let (tx, rx) = mpsc::channel(capacity.max(1));
        metrics::counter!("spellcard_streams_total", "generator" => generator.to_string())
            .increment(1);

        let generator = generator.to_string();
        tokio::task::spawn_blocking(move || {
            for event in formatter.render_stream(&spell) {
                let event = event.and_then(|event| require_final_image(&generator, event));
                let stop = match &event {
                    Ok(event) => event.is_final(),
                    Err(err) => {
                        warn!(generator = %generator, error = %err, "streamed render failed");
                        true
                    }
                };
                if tx.blocking_send(event).is_err() {
                    debug!(generator = %generator, "stream consumer went away");
                    return;
                }
                if stop {
                    return;
                }
            }
        });
        Ok(rx)
    }
}

/// The 100% event must carry the card, whichever formatter produced it.
fn require_final_image(generator: &str, event: ProgressEvent) -> Result<ProgressEvent> {
    if event.is_final() && event.image.is_none() {
        return Err(Error::render(generator, "final progress event carried no image"));
    }
    Ok(event)
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

async fn run_job(
    mut job: GenerationJob,
    formatter: Arc<dyn Formatter>,
    store: Arc<CardStore>,
    notifier: Arc<dyn CallbackNotifier>,
) -> GenerationJob {
    let spell = Arc::clone(&job.spell);
    let generator = job.generator.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        let bytes = formatter.render(&spell)?;
        store.write(&generator, &spell, &bytes)
    })
    .await
    .unwrap_or_else(|join| {
        Err(Error::render(
            job.generator.clone(),
            format!("render task aborted: {}", join),
        ))
    });

    match rendered {
        Ok(output) => {
            info!(
                job_id = %job.id,
                path = %output.path.display(),
                url = %output.url,
                elapsed_ms = (Utc::now() - job.created_at()).num_milliseconds(),
                "card ready"
            );
            job.mark_ready(output);
        }
        Err(err) => {
            error!(
                job_id = %job.id,
                generator = %job.generator,
                error = %err,
                "card generation failed"
            );
            job.mark_failed(err.to_string());
        }
    }
    metrics::counter!(
        "spellcard_jobs_total",
        "generator" => job.generator.clone(),
        "status" => job.status.as_str()
    )
    .increment(1);

    if let (Some(url), Some(payload)) = (job.callback_url.clone(), job.callback_payload()) {
        match notifier.notify(&url, &payload).await {
            Ok(()) => {
                metrics::counter!("spellcard_callbacks_total", "outcome" => "delivered")
                    .increment(1);
            }
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "callback delivery failed");
                metrics::counter!("spellcard_callbacks_total", "outcome" => "failed").increment(1);
            }
        }
    }
    job
}
