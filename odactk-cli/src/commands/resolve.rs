//! `odactk resolve` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use odactk_cluster::{DiscoverySettings, EndpointDiscovery, EndpointSource, KubeComponentApi};
use odactk_core::config::CtkConfig;

use crate::cli::ResolveArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `resolve` command.
///
/// Uses the deployment snapshot first and the cluster for anything missing.
pub async fn execute(
    args: ResolveArgs,
    config: &CtkConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let settings = DiscoverySettings::from_config(&config.cluster);
    info!(
        namespace = %settings.namespace,
        exposed = %args.exposed,
        dependent = %args.dependent,
        "resolving api endpoints"
    );

    let discovery = EndpointDiscovery::new(KubeComponentApi::new(), settings);
    let endpoints = discovery.discover(&args.exposed, &args.dependent).await;

    let report = ResolveReport {
        namespace: config.cluster.namespace.clone(),
        exposed_api_id: args.exposed,
        exposed_url: endpoints.exposed,
        dependent_api_id: args.dependent,
        dependent_url: endpoints.dependent,
    };
    writer.render(&report)?;

    let missing = report.missing();
    if !missing.is_empty() {
        return Err(CliError::Command(format!(
            "could not resolve {} in namespace '{}'",
            missing.join(", "),
            report.namespace
        )));
    }
    Ok(())
}

/// Discovered API base URLs.
#[derive(Serialize)]
pub struct ResolveReport {
    pub namespace: String,
    pub exposed_api_id: String,
    pub exposed_url: Option<String>,
    pub dependent_api_id: String,
    pub dependent_url: Option<String>,
}

impl ResolveReport {
    /// Identifiers without a URL.
    fn missing(&self) -> Vec<&str> {
        let mut missing = Vec::new();
        if self.exposed_url.is_none() {
            missing.push(self.exposed_api_id.as_str());
        }
        if self.dependent_url.is_none() {
            missing.push(self.dependent_api_id.as_str());
        }
        missing
    }
}

impl Render for ResolveReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Endpoints (namespace: {})", self.namespace.bold())?;
        for (label, id, url) in [
            ("exposed", &self.exposed_api_id, &self.exposed_url),
            ("dependent", &self.dependent_api_id, &self.dependent_url),
        ] {
            match url {
                Some(url) => writeln!(w, "  {:<10} {:<8} {}", label, id, url)?,
                None => writeln!(w, "  {:<10} {:<8} {}", label, id, "unresolved".red())?,
            }
        }
        Ok(())
    }
}
