//! `odactk stub` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use odactk_cluster::{HelmCli, StubMatcher, StubQuery};
use odactk_core::config::CtkConfig;
use odactk_core::types::{Headers, ResolvedStub};

use crate::cli::StubArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `stub` command.
///
/// # Errors
///
/// - `CliError::Config` when the component has no stub candidates
/// - `CliError::Command` when no candidate serves the URL
pub async fn execute(
    args: StubArgs,
    config: &CtkConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let component = args
        .component
        .unwrap_or_else(|| config.run.component_to_run.clone())
        .trim()
        .to_owned();
    if component.is_empty() {
        return Err(CliError::Config(
            "no component selected (use --component or run.component_to_run)".to_owned(),
        ));
    }

    let candidates = config.stub_candidates(&component);
    if candidates.is_empty() {
        return Err(CliError::Config(format!(
            "No dependent stub mapping found for '{component}'"
        )));
    }

    info!(
        component = %component,
        url = %args.dependent_url,
        candidates = candidates.len(),
        "matching stub releases"
    );

    let matcher = StubMatcher::new(HelmCli::new(&config.cluster.helm_binary));
    let query = StubQuery {
        component_under_test: &component,
        dependent_component: &args.dependent_component,
        dependent_url: &args.dependent_url,
        namespace: &config.cluster.namespace,
    };
    let resolved = matcher
        .resolve(&query, &candidates, &config.http.default_headers)
        .await;

    let report = StubReport::new(
        &component,
        &args.dependent_url,
        candidates.iter().map(|c| c.release_name.clone()).collect(),
        resolved,
    );
    writer.render(&report)?;

    if report.release_name.is_none() {
        return Err(CliError::Command(format!(
            "no stub release serves '{}'",
            args.dependent_url
        )));
    }
    Ok(())
}

/// Stub match result.
#[derive(Serialize)]
pub struct StubReport {
    pub component: String,
    pub dependent_url: String,
    /// Releases tried, in configuration order
    pub candidates: Vec<String>,
    pub release_name: Option<String>,
    /// Header names only; values may carry credentials
    pub header_names: Vec<String>,
}

impl StubReport {
    fn new(
        component: &str,
        dependent_url: &str,
        candidates: Vec<String>,
        resolved: Option<ResolvedStub>,
    ) -> Self {
        let (release_name, headers) = match resolved {
            Some(stub) => (Some(stub.release_name), stub.headers),
            None => (None, Headers::new()),
        };
        Self {
            component: component.to_owned(),
            dependent_url: dependent_url.to_owned(),
            candidates,
            release_name,
            header_names: headers.into_keys().collect(),
        }
    }
}

impl Render for StubReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Stub match for {}", self.dependent_url.bold())?;
        writeln!(w, "  Component:  {}", self.component)?;
        writeln!(w, "  Candidates: {}", self.candidates.join(", "))?;
        match &self.release_name {
            Some(release) => {
                writeln!(w, "  Release:    {}", release.green().bold())?;
                writeln!(w, "  Headers:    {}", self.header_names.join(", "))?;
            }
            None => writeln!(w, "  Release:    {}", "no match".red().bold())?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_hides_header_values() {
        let mut headers = Headers::new();
        headers.insert("Authorization".to_owned(), "Bearer secret".to_owned());
        let report = StubReport::new(
            "tmfc028",
            "https://host/catalog",
            vec!["stub-a".to_owned()],
            Some(ResolvedStub {
                release_name: "stub-a".to_owned(),
                headers,
            }),
        );

        let json = serde_json::to_string(&report).expect("json");
        assert!(json.contains("Authorization"));
        assert!(!json.contains("Bearer secret"));
        assert_eq!(report.release_name.as_deref(), Some("stub-a"));
    }

    #[test]
    fn test_text_output_for_no_match() {
        colored::control::set_override(false);
        let report = StubReport::new(
            "tmfc028",
            "https://host/catalog",
            vec!["stub-a".to_owned(), "stub-b".to_owned()],
            None,
        );
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("stub-a, stub-b"));
        assert!(text.contains("no match"));
    }

    #[tokio::test]
    async fn test_unmapped_component_is_configuration_error() {
        let writer = OutputWriter::new(crate::cli::OutputFormat::Json);
        let args = StubArgs {
            dependent_url: "https://host/catalog".to_owned(),
            component: Some("tmfc099".to_owned()),
            dependent_component: String::new(),
        };
        let err = execute(args, &CtkConfig::default(), &writer).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("tmfc099"));
    }
}
