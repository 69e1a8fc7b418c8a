use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use handheld::bytecode::{disasm, image};
use handheld::lang::Program;
use handheld::runtime::detector::{self, Outcome, Rendezvous};
use handheld::runtime::{MachineConfig, repair};

#[derive(Parser, Debug)]
#[command(name = "handheld")]
#[command(about = "Run, diagnose and repair handheld boot code")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program until it halts or repeats an instruction
    Run {
        /// Program text or compiled .hhbc image
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Strategy::Visited)]
        strategy: Strategy,

        /// Abort after this many executed instructions
        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Flip one jmp/nop so the program terminates
    Repair {
        file: PathBuf,

        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Print an annotated listing
    Disasm { file: PathBuf },

    /// Parse a program and write it as a compiled image
    Compile {
        file: PathBuf,

        /// Output path (defaults to the input with a .hhbc extension)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    /// Record visited instructions, exact accumulator at loop entry
    Visited,
    /// Floyd's two-pointer scheme, constant memory
    TortoiseHare,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run {
            file,
            strategy,
            max_steps,
        } => run_program(&file, strategy, MachineConfig { max_steps }),
        Command::Repair { file, max_steps } => repair_program(&file, MachineConfig { max_steps }),
        Command::Disasm { file } => load(&file).map(|program| disasm::print_program(&program)),
        Command::Compile { file, output } => compile_program(&file, output),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

fn load(path: &Path) -> handheld::Result<Program> {
    let program = handheld::load_program(path)?;
    info!(path = %path.display(), instructions = program.len(), "loaded program");
    Ok(program)
}

fn run_program(path: &Path, strategy: Strategy, config: MachineConfig) -> handheld::Result<()> {
    let program = load(path)?;

    match strategy {
        Strategy::Visited => match detector::run(&program, &config)? {
            Outcome::LoopDetected {
                accumulator,
                repeated,
                visits,
            } => {
                info!(repeated, visited = visits.len(), "loop detected");
                println!("{}", accumulator);
            }
            Outcome::Halted {
                accumulator,
                pointer,
            } => {
                info!(pointer, len = program.len(), "program halted");
                println!("{}", accumulator);
            }
        },
        Strategy::TortoiseHare => match detector::tortoise_hare(&program, &config)? {
            Rendezvous::Cycle { pointer, rounds } => {
                info!(rounds, "pointers met");
                println!("cycle at {}", pointer);
            }
            Rendezvous::Escaped {
                pointer,
                accumulator,
            } => {
                info!(accumulator, "program escaped");
                println!("halted at {}", pointer);
            }
        },
    }

    Ok(())
}

fn repair_program(path: &Path, config: MachineConfig) -> handheld::Result<()> {
    let program = load(path)?;
    let fix = repair::repair(&program, &config)?;

    info!(attempts = fix.attempts, "repair found");
    println!("{:04}: {} -> {}", fix.index, fix.original, fix.replacement);
    println!("{}", fix.accumulator);
    Ok(())
}

fn compile_program(path: &Path, output: Option<PathBuf>) -> handheld::Result<()> {
    let program = load(path)?;
    let bytes = image::encode(&program)?;
    let output = output.unwrap_or_else(|| path.with_extension(image::EXTENSION));

    fs::write(&output, &bytes).map_err(|source| handheld::Error::Write {
        path: output.clone(),
        source,
    })?;

    info!(output = %output.display(), bytes = bytes.len(), "wrote image");
    Ok(())
}
