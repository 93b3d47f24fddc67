//! End-to-end `generate` pipeline:
//! directory → fragments → grouped choices → selection → document → file.

use std::time::Instant;

use tracing::{info, instrument};

use clinerules_discovery::{list_fragments, load_fragments};
use clinerules_markdown::FrontMatterParser;
use clinerules_shared::{ClineRulesError, Fragment, GenerateConfig, Result};

use crate::assembler::{AssembledDocument, Preview, SectionSummary, assemble};
use crate::selector::{ChoiceSet, Prompter, select};
use crate::writer::{WriteReport, write_document};

/// How a `generate` run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// The fragment directory holds no fragment files. Nothing was shown.
    NoFragments,
    /// The operator checked nothing. Nothing was written.
    NothingSelected,
    /// The operator declined the preview. Nothing was written.
    Cancelled,
    /// The document was written.
    Written {
        report: WriteReport,
        sections: Vec<SectionSummary>,
    },
}

/// How a front end should finish a `generate` run.
#[derive(Debug)]
pub enum RunEnd {
    /// The pipeline reached an outcome.
    Finished(GenerateOutcome),
    /// A non-fatal error stopped the run. Report it and exit normally.
    Stopped(ClineRulesError),
}

/// Map a `generate` result to how the process ends.
///
/// Errors for which [`ClineRulesError::is_fatal`] holds stay errors and
/// should exit non-zero. Every other error becomes [`RunEnd::Stopped`].
pub fn settle(result: Result<GenerateOutcome>) -> Result<RunEnd> {
    match result {
        Ok(outcome) => Ok(RunEnd::Finished(outcome)),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => Ok(RunEnd::Stopped(err)),
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once all fragments are loaded.
    fn fragments_loaded(&self, count: usize);
    /// Called right before the pipeline waits on the operator.
    fn awaiting_operator(&self);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &GenerateOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn fragments_loaded(&self, _count: usize) {}
    fn awaiting_operator(&self) {}
    fn done(&self, _outcome: &GenerateOutcome) {}
}

/// List and load every fragment of `config.source_dir`.
///
/// Fails only when the directory cannot be listed.
#[instrument(skip_all, fields(source = %config.source_dir.display()))]
pub async fn discover(
    config: &GenerateConfig,
    parser: &dyn FrontMatterParser,
    progress: &dyn ProgressReporter,
) -> Result<Vec<Fragment>> {
    progress.phase("Scanning rule directory");
    let files = list_fragments(&config.source_dir, &config.extension).await?;

    progress.phase("Reading rule files");
    let fragments = load_fragments(&config.source_dir, &files, &config.extension, parser).await;
    progress.fragments_loaded(fragments.len());

    Ok(fragments)
}

/// Render the selected fragments under the configured title.
pub fn render(config: &GenerateConfig, selected: &[&Fragment]) -> AssembledDocument {
    assemble(selected, &config.document_title)
}

/// Run the full pipeline.
///
/// 1. Discover and load fragments
/// 2. Present grouped choices and wait for the operator
/// 3. Assemble the selected subset
/// 4. Preview and confirm (when `config.confirm`)
/// 5. Write the document
///
/// Only a directory-listing failure or a write failure is returned as an
/// error; an empty selection or a declined preview are outcomes.
#[instrument(skip_all, fields(source = %config.source_dir.display(), destination = %config.destination.display()))]
pub async fn generate<P: Prompter>(
    config: &GenerateConfig,
    parser: &dyn FrontMatterParser,
    prompter: &mut P,
    progress: &dyn ProgressReporter,
) -> Result<GenerateOutcome> {
    let start = Instant::now();

    let fragments = discover(config, parser, progress).await?;
    if fragments.is_empty() {
        info!("no rule files found");
        let outcome = GenerateOutcome::NoFragments;
        progress.done(&outcome);
        return Ok(outcome);
    }

    progress.phase("Selecting rules");
    let choices = ChoiceSet::build(&fragments, &config.category_order);
    progress.awaiting_operator();
    let selected = select(&fragments, &choices, prompter).await?;

    if selected.is_empty() {
        info!("no rules selected, nothing to write");
        let outcome = GenerateOutcome::NothingSelected;
        progress.done(&outcome);
        return Ok(outcome);
    }

    let document = render(config, &selected);

    if config.confirm {
        let preview = Preview::new(&selected, &document, &config.destination);
        if !prompter.confirm(&preview).await? {
            info!("write declined by operator");
            let outcome = GenerateOutcome::Cancelled;
            progress.done(&outcome);
            return Ok(outcome);
        }
    }

    progress.phase("Writing document");
    let report = write_document(&config.destination, &document.content).await?;

    let outcome = GenerateOutcome::Written {
        report,
        sections: document.sections,
    };
    progress.done(&outcome);

    info!(
        selected = selected.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "generate pipeline complete"
    );

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
