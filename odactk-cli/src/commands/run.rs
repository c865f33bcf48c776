//! `odactk run` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use odactk_cluster::{DiscoverySettings, EndpointDiscovery, HelmCli, KubeComponentApi};
use odactk_core::config::CtkConfig;
use odactk_scenario::{
    FeatureLoader, PayloadStore, ReqwestHttpClient, RunReport, RunSettings, ScenarioRunner,
    Verdict,
};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// # Errors
///
/// - `CliError::Config` when no component is selected
/// - `CliError::ScenarioFailures` when the report contains failed scenarios
pub async fn execute(
    args: RunArgs,
    mut config: CtkConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    apply_overrides(&mut config, args);
    if config.run.component_to_run.trim().is_empty() {
        return Err(CliError::Config(
            "run.component_to_run is not set (use --component or ODACTK_RUN_COMPONENT_TO_RUN)"
                .to_owned(),
        ));
    }

    odactk_core::metrics::describe_all();

    let features = FeatureLoader::load_directory(&config.run.features_dir).await?;
    info!(
        component = %config.run.component_to_run,
        features = features.len(),
        "starting run"
    );

    let discovery = EndpointDiscovery::new(
        KubeComponentApi::new(),
        DiscoverySettings::from_config(&config.cluster),
    );
    let runner = ScenarioRunner::new(
        discovery,
        HelmCli::new(&config.cluster.helm_binary),
        ReqwestHttpClient::new(&config.http)?,
        PayloadStore::from_config(&config.run),
        RunSettings::from_config(&config),
    );

    let report = runner.run_features(&features).await;
    let report_path = report.write_json(&config.run.results_dir).await?;

    writer.render(&RunOutput {
        report_path,
        report: &report,
    })?;

    if !report.passed() {
        return Err(CliError::ScenarioFailures {
            failed: report.summary.failed,
        });
    }
    Ok(())
}

fn apply_overrides(config: &mut CtkConfig, args: RunArgs) {
    if let Some(component) = args.component {
        config.run.component_to_run = component;
    }
    if let Some(features) = args.features {
        config.run.features_dir = features.display().to_string();
    }
    if let Some(results) = args.results {
        config.run.results_dir = results.display().to_string();
    }
}

/// Run summary with the location of the written report.
#[derive(Serialize)]
pub struct RunOutput<'a> {
    pub report_path: PathBuf,
    #[serde(flatten)]
    pub report: &'a RunReport,
}

impl Render for RunOutput<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let report = self.report;
        writeln!(
            w,
            "Run {} (component: {})",
            report.run_id,
            report.component.bold()
        )?;

        for feature in &report.features {
            writeln!(w)?;
            writeln!(w, "{} {}", verdict_label(feature.verdict), feature.name.bold())?;
            for scenario in &feature.scenarios {
                writeln!(
                    w,
                    "  {} {} ({} ms)",
                    verdict_label(scenario.verdict),
                    scenario.name,
                    scenario.duration_ms
                )?;
                if let Some(error) = &scenario.error {
                    writeln!(w, "      {} at {}: {}", "error".red(), scenario.phase, error)?;
                }
                if !scenario.cleanup.is_clean() {
                    writeln!(
                        w,
                        "      {} {}/{} resources deleted",
                        "cleanup".yellow(),
                        scenario.cleanup.deleted(),
                        scenario.cleanup.entries.len()
                    )?;
                }
            }
        }

        let summary = &report.summary;
        writeln!(w)?;
        writeln!(
            w,
            "Scenarios: {} total, {} passed, {} failed, {} skipped",
            summary.total,
            summary.passed.to_string().green(),
            summary.failed.to_string().red(),
            summary.skipped
        )?;
        writeln!(w, "Report: {}", self.report_path.display())?;
        Ok(())
    }
}

fn verdict_label(verdict: Verdict) -> colored::ColoredString {
    use colored::Colorize;

    match verdict {
        Verdict::Passed => "PASS".green().bold(),
        Verdict::Failed => "FAIL".red().bold(),
        Verdict::Skipped => "SKIP".dimmed(),
    }
}
