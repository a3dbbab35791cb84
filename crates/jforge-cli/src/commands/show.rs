use jforge_core::attempt::Attempt;
use jforge_core::config::Settings;
use jforge_core::layout::is_valid_project_slug;
use jforge_store::{BuildRecord, BuiltMarkers, GlobalLedger, LocalLedger, ToolchainDescriptor};

pub struct ShowArgs {
    pub settings: Settings,
    pub project_slug: String,
}

/// What is known about one project, gathered without running a build.
#[derive(Debug, PartialEq, Eq)]
pub struct ProjectReport {
    pub project_slug: String,
    pub built: bool,
    pub descriptor: Option<ToolchainDescriptor>,
    pub local_success: Option<Attempt>,
    pub global: Option<BuildRecord>,
}

impl ProjectReport {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("project={}", self.project_slug),
            format!("built={}", self.built),
        ];
        if let Some(attempt) = self.descriptor.as_ref().and_then(ToolchainDescriptor::attempt) {
            lines.push(format!("marker={}", attempt));
        }
        lines.push(format!("local={}", describe(self.local_success.as_ref())));
        match &self.global {
            Some(record) => lines.push(format!(
                "global={} ({})",
                describe(record.attempt().as_ref()),
                record.status
            )),
            None => lines.push("global=none".to_string()),
        }
        lines
    }
}

fn describe(attempt: Option<&Attempt>) -> String {
    attempt
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

pub fn run(args: ShowArgs) -> Result<ProjectReport, String> {
    let slug = args.project_slug.as_str();
    if !is_valid_project_slug(slug) {
        return Err(format!(
            "invalid project slug '{}': must be a single directory name",
            slug
        ));
    }
    let layout = args.settings.layout();
    let markers = BuiltMarkers::new(layout.clone());
    let descriptor = markers.read(slug).map_err(|err| err.to_string())?;
    let local_success = LocalLedger::new(layout.local_ledger_path())
        .remembered_success(slug)
        .map_err(|err| err.to_string())?;
    let global = GlobalLedger::new(layout.global_ledger_path())
        .get(slug)
        .map_err(|err| err.to_string())?;
    Ok(ProjectReport {
        project_slug: args.project_slug.clone(),
        built: markers.is_built(slug),
        descriptor,
        local_success,
        global,
    })
}
