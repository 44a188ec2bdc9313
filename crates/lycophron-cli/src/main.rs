mod commands;
mod csv_io;
mod logging;
mod workspace;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use lycophron_core::{Error as CoreError, TemplateRequest};
use lycophron_deposit::DepositError;
use thiserror::Error;

use workspace::{ProjectPaths, WorkspaceError};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Deposit(#[from] DepositError),
    #[error("{0} record(s) failed to publish")]
    PublishFailed(usize),
}

#[derive(Parser, Debug)]
#[command(
    name = "lycophron",
    version,
    about = "Prepare, validate and publish research records from CSV files"
)]
struct Cli {
    /// Project directory.
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a project.
    Init(InitArgs),
    /// Update project settings.
    Configure(ConfigureArgs),
    /// Load a CSV file into the local record store.
    Load(LoadArgs),
    /// Export stored records to a CSV file.
    Export(ExportArgs),
    /// Publish pending records; all of them unless a count is given.
    Publish(PublishArgs),
    /// Create a new CSV template.
    NewTemplate(NewTemplateArgs),
    /// Validate the project configuration and the headers of a CSV file.
    Validate(ValidateArgs),
    /// List the custom field namespaces.
    Namespaces,
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Project directory name, created under --project.
    #[arg(value_name = "NAME")]
    name: Option<String>,
    /// Deposition service access token.
    #[arg(long)]
    token: Option<String>,
}

#[derive(Args, Debug)]
struct ConfigureArgs {
    /// Deposition service access token.
    #[arg(long)]
    token: Option<String>,
    /// Deposition service API base URL.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(Args, Debug)]
struct LoadArgs {
    #[arg(long, value_name = "CSV")]
    inputfile: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, value_name = "CSV")]
    outputfile: PathBuf,
}

#[derive(Args, Debug)]
struct PublishArgs {
    /// Number of records to publish.
    #[arg(short = 'n', long = "num-records", value_name = "N")]
    num_records: Option<usize>,
}

#[derive(Args, Debug)]
struct NewTemplateArgs {
    /// Custom field namespaces separated by commas (e.g. dwc,ac,obo).
    #[arg(long, value_name = "NAMESPACES")]
    custom: Option<String>,
    /// Include file access and embargo fields.
    #[arg(long, default_value_t = false)]
    access: bool,
    /// Include all fields.
    #[arg(long, default_value_t = false)]
    all: bool,
    /// Fail on unknown namespaces instead of skipping them.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Output CSV filename.
    #[arg(long, default_value = "data.csv")]
    filename: PathBuf,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// CSV file whose first row is checked.
    #[arg(long, value_name = "CSV")]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let paths = ProjectPaths::new(cli.project.clone());

    let project_log = paths.is_initialized().then(|| paths.log_path());
    if let Err(err) = logging::init_logging(project_log.as_deref()) {
        eprintln!("{}", format!("warning: {err}").yellow());
    }

    match run(cli.command, &paths).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "command_failed", error = %err);
            eprintln!("{}", format!("error: {err}").red());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, paths: &ProjectPaths) -> Result<(), CliError> {
    match command {
        Command::Init(args) => commands::init(paths, args.name.as_deref(), args.token),
        Command::Configure(args) => commands::configure(paths, args.token, args.api_url),
        Command::Load(args) => commands::load(paths, &args.inputfile),
        Command::Export(args) => commands::export(paths, &args.outputfile),
        Command::Publish(args) => commands::publish(paths, args.num_records).await,
        Command::NewTemplate(args) => {
            commands::new_template(&template_request(&args), args.strict, &args.filename)
        }
        Command::Validate(args) => commands::validate(paths, &args.file),
        Command::Namespaces => {
            commands::list_namespaces();
            Ok(())
        }
    }
}

fn template_request(args: &NewTemplateArgs) -> TemplateRequest {
    let request = TemplateRequest {
        include_access: args.access,
        include_all: args.all,
        custom_namespaces: Vec::new(),
    };
    match args.custom.as_deref() {
        Some(list) => request.with_custom_list(list),
        None => request,
    }
}
