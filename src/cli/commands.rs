//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, Binding, JsonMix, MixPlan};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings};
use crate::domain::{locate, render, PathExpr, RenderOptions};
use crate::infrastructure::traits::STDIO_PATH;
use crate::infrastructure::{InfraError, ServiceContainer};

/// Options of the `apply` command.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub input: PathBuf,
    pub bindings: Vec<Binding>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub no_tag: bool,
    pub compact: bool,
    pub strict: bool,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".to_string()));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Apply {
            input,
            bindings,
            output,
            format,
            no_tag,
            compact,
            strict,
        } => {
            let opts = ApplyOptions {
                input: input.clone(),
                bindings: bindings.clone(),
                output: output.clone(),
                format: *format,
                no_tag: *no_tag,
                compact: *compact,
                strict: *strict,
            };
            cmd_apply(&container, &opts).map(|_| ())
        }
        Commands::Locate { input, path } => cmd_locate(&container, input, path),
        Commands::Shapes => cmd_shapes(&container),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(&container),
            ConfigCommands::Path => cmd_config_path(),
            ConfigCommands::Init { global, force } => cmd_config_init(&container, *global, *force),
        },
        Commands::Completion { .. } => Ok(()),
    }
}

fn load_document(container: &ServiceContainer, input: &Path) -> CliResult<JsonMix> {
    let text = container
        .fs
        .read_input(input)
        .map_err(|e| InfraError::io(format!("read {}", input.display()), e))?;
    Ok(JsonMix::from_json_str(&text)?)
}

/// Apply the bindings and render the result.
///
/// Returns the rendered document; it is also written to `opts.output` or stdout.
#[instrument(level = "debug", skip(container))]
pub fn cmd_apply(container: &ServiceContainer, opts: &ApplyOptions) -> CliResult<String> {
    let settings = &container.settings;
    let mut mix = load_document(container, &opts.input)?;

    let outcomes = MixPlan::new(opts.bindings.clone()).run(&container.catalog, &mut mix)?;
    let report = mix.report();

    let mut problems = Vec::new();
    for outcome in outcomes.iter().filter(|o| o.mixed == 0) {
        output::warning(&format!("{} matched nothing", outcome.binding));
        problems.push(format!("{} matched nothing", outcome.binding));
    }
    for skipped in &report.skipped {
        output::warning(&format!(
            "{} left unmixed: found {}",
            skipped.location, skipped.found
        ));
        problems.push(format!("{} is {}", skipped.location, skipped.found));
    }
    debug!(
        mixed = report.mixed_count(),
        unresolved = report.unresolved.len(),
        "bindings applied"
    );

    if (opts.strict || settings.strict) && !problems.is_empty() {
        return Err(CliError::StrictViolation(problems.join("; ")));
    }

    let rendered = match opts.format {
        OutputFormat::Json => {
            let tag_key = if opts.no_tag {
                None
            } else {
                settings.effective_tag_key().map(str::to_string)
            };
            let value = render::to_json(mix.tree(), &RenderOptions { tag_key });
            let text = if opts.compact || !settings.pretty {
                serde_json::to_string(&value)
            } else {
                serde_json::to_string_pretty(&value)
            };
            text.map_err(|e| ApplicationError::OperationFailed {
                context: "render JSON".to_string(),
                source: Box::new(e),
            })?
        }
        OutputFormat::Tree => render::to_tree("$", mix.tree()).to_string(),
    };

    match &opts.output {
        Some(path) if path.as_os_str() != STDIO_PATH => {
            container
                .fs
                .ensure_parent(path)
                .and_then(|_| container.fs.write(path, &rendered))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!(
                "{} node(s) mixed, written to {}",
                report.mixed_count(),
                path.display()
            ));
        }
        _ => output::info(rendered.trim_end()),
    }

    Ok(rendered)
}

/// Print the locations `path` addresses in the document.
#[instrument(level = "debug", skip(container))]
pub fn cmd_locate(container: &ServiceContainer, input: &Path, path: &str) -> CliResult<()> {
    let mix = load_document(container, input)?;
    let locations = locate(&PathExpr::parse(path), mix.tree());
    if locations.is_empty() {
        output::warning(&format!("'{}' addresses no object", path));
    }
    for location in &locations {
        output::info(location);
    }
    Ok(())
}

fn cmd_shapes(container: &ServiceContainer) -> CliResult<()> {
    if container.catalog.is_empty() {
        output::warning("no shapes configured, bindings create bare records");
        return Ok(());
    }
    output::header("Shapes:");
    for shape in container.catalog.iter() {
        if shape.defaults().is_empty() {
            output::detail(shape.name());
        } else {
            let defaults = serde_json::Value::Object(shape.defaults().clone());
            output::detail(&format!("{} {}", shape.name(), defaults));
        }
    }
    Ok(())
}

fn cmd_config_show(container: &ServiceContainer) -> CliResult<()> {
    output::info(container.settings.to_toml()?.trim_end());
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    let mark = |p: &Path| if p.exists() { "" } else { " (not found)" };
    match config::global_config_path() {
        Some(global) => output::action("global", &format!("{}{}", global.display(), mark(&global))),
        None => output::action("global", "unavailable (no home directory)"),
    }
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("current dir", e))?;
    let local = config::local_config_path(&cwd);
    output::action("local", &format!("{}{}", local.display(), mark(&local)));
    Ok(())
}

fn cmd_config_init(container: &ServiceContainer, global: bool, force: bool) -> CliResult<()> {
    let target = if global {
        config::global_config_path()
            .ok_or_else(|| CliError::Usage("cannot determine global config directory".into()))?
    } else {
        let cwd = std::env::current_dir().map_err(|e| InfraError::io("current dir", e))?;
        config::local_config_path(&cwd)
    };

    if container.fs.exists(&target) && !force {
        return Err(CliError::Usage(format!(
            "{} already exists, use --force to overwrite",
            target.display()
        )));
    }
    container
        .fs
        .ensure_parent(&target)
        .and_then(|_| container.fs.write(&target, &Settings::template()))
        .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;
    output::success(&format!("created {}", target.display()));
    Ok(())
}
