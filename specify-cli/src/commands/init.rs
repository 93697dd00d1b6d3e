//! Init command - bootstrap a project from the latest template release.

use std::cell::OnceCell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use clap::Args;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use specify::progress::ProgressTracker;
use specify::template::steps;
use specify::template::{
    DeploymentTarget, DownloadProgress, GitOutcome, HttpDownloader, HttpReleaseClient,
    InstallRequest, InstallResult, InterruptFlag, ReportMode, TemplateInstaller,
    ToolAvailabilityChecker,
};
use specify::tools::{self, PathToolChecker};
use specify::variant::{menu_options, parse_variant, AgentVariant};
use specify::vcs::GitInitializer;

use super::probe_tool;
use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui::{self, LineReporter, LiveTree};

/// Arguments for `specify init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Name of the new project directory
    pub project_name: Option<String>,

    /// AI assistant to generate the project for (copilot, claude, gemini)
    #[arg(long = "ai", value_name = "ASSISTANT")]
    pub ai: Option<String>,

    /// Skip checking that the assistant's command-line tool is installed
    #[arg(long)]
    pub ignore_agent_tools: bool,

    /// Do not initialize a git repository
    #[arg(long)]
    pub no_git: bool,

    /// Initialize the project in the current directory
    #[arg(long)]
    pub here: bool,
}

/// Decide where the project goes from the name and `--here`.
///
/// Does no I/O beyond checking whether a named target already exists.
pub fn plan_target(
    project_name: Option<&str>,
    here: bool,
    cwd: &Path,
) -> Result<DeploymentTarget, CliError> {
    match (project_name, here) {
        (Some(_), true) => Err(CliError::Validation(
            "Cannot specify both project name and --here flag".to_string(),
        )),
        (None, false) => Err(CliError::Validation(
            "Must specify either a project name or use --here flag".to_string(),
        )),
        (None, true) => Ok(DeploymentTarget::merge_in_place(cwd)),
        (Some(name), false) => {
            let path = cwd.join(name);
            if path.exists() {
                return Err(CliError::Validation(format!(
                    "Directory '{}' already exists",
                    name
                )));
            }
            Ok(DeploymentTarget::fresh(path))
        }
    }
}

/// Numbered instructions shown after a successful init.
pub fn next_steps(variant: &AgentVariant, project_name: &str, here: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if here {
        lines.push("1. You're already in the project directory!".to_string());
    } else {
        lines.push(format!("1. cd {}", project_name));
    }

    let mut number = 2;
    if let Some((first, rest)) = variant.usage.split_first() {
        lines.push(format!("{}. {}", number, first));
        lines.extend(rest.iter().map(|line| line.to_string()));
        number += 1;
    }
    lines.push(format!(
        "{}. Update CONSTITUTION.md with your project's non-negotiable principles",
        number
    ));
    lines
}

fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Variant from `--ai`, the menu, or the configured default without a terminal.
fn choose_variant(
    ai: Option<&str>,
    default_variant: &str,
) -> Result<&'static AgentVariant, CliError> {
    if let Some(key) = ai {
        return Ok(parse_variant(key)?);
    }
    if !is_interactive() {
        info!(variant = default_variant, "No terminal, using default variant");
        return Ok(parse_variant(default_variant)?);
    }
    let key = ui::select_variant(
        "Choose your AI assistant:",
        menu_options(),
        Some(default_variant),
    )?;
    Ok(parse_variant(&key)?)
}

/// Ask before merging into a non-empty current directory.
fn confirm_merge(path: &Path) -> Result<(), CliError> {
    let count = fs::read_dir(path)?.count();
    if count == 0 {
        return Ok(());
    }

    println!(
        "{}",
        style(format!("Warning: Current directory is not empty ({} items)", count)).yellow()
    );
    println!(
        "{}",
        style("Template files will be merged with existing content and may overwrite existing files")
            .yellow()
    );

    if !is_interactive() {
        return Err(CliError::Validation(
            "Refusing to merge into a non-empty directory without a terminal to confirm".to_string(),
        ));
    }

    let proceed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Do you want to continue?")
        .default(false)
        .interact()
        .map_err(prompt_error)?;

    if proceed {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

/// Ctrl-C at a prompt is an interrupt, not an I/O failure.
fn prompt_error(e: dialoguer::Error) -> CliError {
    match e {
        dialoguer::Error::IO(err) if err.kind() == io::ErrorKind::Interrupted => {
            CliError::Interrupted
        }
        dialoguer::Error::IO(err) => CliError::Io(err),
    }
}

fn print_setup_panel(project_name: &str, here: bool, path: &Path) {
    println!("{}", style("Specify Project Setup").cyan().bold());
    if here {
        println!("Initializing in current directory: {}", style(project_name).green());
    } else {
        println!("Creating new project: {}", style(project_name).green());
    }
    println!("{} {}", style("Path:").dim(), style(path.display()).dim());
    println!();
}

/// Byte progress for line-mode downloads.
#[derive(Default)]
struct DownloadBar {
    bar: OnceCell<ProgressBar>,
}

impl DownloadBar {
    fn update(&self, progress: DownloadProgress) {
        let bar = self.bar.get_or_init(|| match progress {
            DownloadProgress::Determinate { total, .. } => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar().template(
                    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                ) {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            DownloadProgress::Indeterminate { .. } => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {bytes} downloaded") {
                    bar.set_style(style);
                }
                bar
            }
        });
        bar.set_position(progress.written());
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

/// Run the pipeline with the reporter matching `mode`.
fn install_with_reporting(
    request: &InstallRequest,
    variant: &AgentVariant,
    runner: &CliRunner,
    interrupt: InterruptFlag,
) -> Result<InstallResult, CliError> {
    let config = runner.config().to_template_config();
    let mode = runner.report_mode();

    let client = HttpReleaseClient::new(&config)?;
    let downloader = HttpDownloader::new(&config)?.with_interrupt(interrupt.clone());
    let mut installer = TemplateInstaller::new(client, downloader, GitInitializer::new(), &config)
        .with_interrupt(interrupt)
        .with_report_mode(mode);

    let bar = Rc::new(DownloadBar::default());
    if mode == ReportMode::Verbose {
        let callback_bar = Rc::clone(&bar);
        installer = installer.with_download_callback(move |progress| callback_bar.update(progress));
    }

    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);
    steps::register_plan(&mut tracker);

    let live = match mode {
        ReportMode::Structured => Some(LiveTree::attach(&mut tracker)),
        ReportMode::Verbose => {
            LineReporter::attach(&mut tracker);
            None
        }
    };

    tracker.complete(steps::PRECHECK, "ok");
    tracker.complete(steps::AI_SELECT, variant.key);

    let result = installer.install(request, &mut tracker);

    bar.finish();
    match live {
        Some(live) => live.finish(&mut tracker),
        None => {
            tracker.detach_observer();
        }
    }

    Ok(result?)
}

/// Run the init command.
pub fn run(args: InitArgs, runner: &CliRunner) -> Result<(), CliError> {
    ui::print_banner();

    let cwd = std::env::current_dir()?;
    let target = plan_target(args.project_name.as_deref(), args.here, &cwd)?;
    let project_name = match (&args.project_name, target.root_path.file_name()) {
        (Some(name), _) => name.clone(),
        (None, Some(name)) => name.to_string_lossy().to_string(),
        (None, None) => target.root_path.display().to_string(),
    };

    if args.here {
        confirm_merge(&target.root_path)?;
    }

    print_setup_panel(&project_name, args.here, &target.root_path);

    let checker = PathToolChecker::new();
    let git_available = if args.no_git {
        false
    } else {
        let found = checker.is_available(tools::GIT.tool);
        if !found {
            println!(
                "{}",
                style("Git not found - will skip repository initialization").yellow()
            );
        }
        found
    };

    let variant = choose_variant(args.ai.as_deref(), &runner.config().ui.default_variant)?;

    if !args.ignore_agent_tools {
        if let Some(requirement) = variant.required_tool {
            if !probe_tool(&checker, requirement) {
                println!(
                    "{}",
                    style("Tip: Use --ignore-agent-tools to skip this check").dim()
                );
                return Err(CliError::Validation(format!(
                    "{} is required for {} projects",
                    requirement.tool, variant.label
                )));
            }
        }
    }

    info!(
        project = %target.root_path.display(),
        variant = variant.key,
        here = args.here,
        no_git = args.no_git,
        "Initializing project"
    );

    let interrupt = InterruptFlag::new();
    let handler_flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.raise()) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    let request = InstallRequest {
        variant: variant.key.to_string(),
        target,
        init_git: !args.no_git,
        git_available,
    };

    let result = match install_with_reporting(&request, variant, runner, interrupt) {
        Ok(done) => done,
        Err(e) => {
            if !e.is_cancellation() {
                if let Some(log) = runner.log_file() {
                    println!("{} {}", style("Details logged to").dim(), style(log.display()).dim());
                }
            }
            return Err(e);
        }
    };

    println!();
    println!("{}", style("Project ready.").green().bold());
    if let GitOutcome::Failed(reason) = &result.git {
        println!(
            "{} {}",
            style("Warning: git initialization failed:").yellow(),
            reason
        );
    }

    println!();
    println!("{}", style("Next steps").cyan().bold());
    for line in next_steps(variant, &project_name, args.here) {
        println!("  {}", line);
    }
    Ok(())
}
