use clap::{CommandFactory, Parser, Subcommand};
use gitstage::ui::{self, Outcome};
use gitstage::logging::{self, LogGuard};
use gitstage::{GitCli, Selection, execute_plan, load_files, plan_staging};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "gitstage", version)]
#[command(about = "Interactive line-level git staging tool")]
struct Cli {
    /// Run as if started in <DIR>
    #[arg(short = 'C', value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Log file, or directory to write `gitstage-<pid>.log` into
    #[arg(long, env = "GITSTAGE_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the staging actions instead of applying them
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Man,
}

type RunResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Must outlive the exit report below so it reaches the file
    let _log = start_logging(&cli);
    exit_code(run(cli))
}

/// Subcommands only write to stdout and never log.
fn start_logging(cli: &Cli) -> Option<LogGuard> {
    if cli.command.is_some() {
        return None;
    }
    match logging::init(cli.log_file.clone()) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("gitstage: logging disabled: {err}");
            None
        }
    }
}

fn exit_code(result: RunResult) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "exiting");
            eprintln!("gitstage: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> RunResult {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "gitstage", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Man) => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
            return Ok(());
        }
        None => {}
    }

    let backend = GitCli::open(&cli.dir)?;
    let files = load_files(&backend)?;
    if files.is_empty() {
        println!("No changes to stage.");
        return Ok(());
    }

    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut selection = Selection::new(files, width, height);
    if ui::run(&mut selection)? == Outcome::Abort {
        info!("aborted, index left untouched");
        return Ok(());
    }

    let plan = plan_staging(selection.files());
    if cli.dry_run {
        if plan.is_empty() {
            println!("Nothing to stage.");
        }
        for action in &plan {
            println!("{action}");
        }
        return Ok(());
    }

    execute_plan(&backend, &plan)?;
    Ok(())
}
