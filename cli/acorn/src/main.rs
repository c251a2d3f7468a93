//! Acorn CLI: assemble, build and program SoCs for Acorn CLE-101/215(+) boards.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use acorn_platform::BoardVariant;
use acorn_soc::EthernetMode;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::assemble::ActionOptions;
use commands::TargetOptions;
use manifest::AcornManifest;

#[derive(Parser)]
#[command(name = "acorn", version, about = "SoC assembler for Acorn CLE-101/215(+) boards")]
struct Cli {
    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new Acorn project
    Init {
        /// Project name
        name: String,
        /// Board variant (cle-215+, cle-215, cle-101)
        #[arg(long, default_value = "cle-215+")]
        variant: BoardVariant,
    },
    /// Assemble the SoC and optionally build, load or flash it
    Assemble {
        #[command(flatten)]
        target: TargetArgs,
        /// Output directory (default: build/ in the project)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Artifact base name
        #[arg(long)]
        name: Option<String>,
        /// Run the toolchain
        #[arg(long)]
        build: bool,
        /// Load the bitstream over JTAG
        #[arg(long)]
        load: bool,
        /// Write the bitstream to configuration flash
        #[arg(long)]
        flash: bool,
        /// Flash offset (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_offset)]
        flash_offset: Option<u32>,
        /// Print the assembled SoC as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Derive and print the clock plan only
    Clocks {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List board variants
    Variants,
    /// Show details of a board variant
    Describe {
        /// Variant name
        variant: BoardVariant,
        /// Output format (default: human-readable, "toml" for a board definition)
        #[arg(long)]
        format: Option<String>,
    },
    /// Validate a .board.toml file
    Validate {
        /// Board definition file
        file: PathBuf,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Board variant (cle-215+, cle-215, cle-101)
    #[arg(long)]
    variant: Option<BoardVariant>,
    /// Custom .board.toml instead of the built-in pin table
    #[arg(long)]
    board: Option<PathBuf>,
    /// Use on-chip RAM of this size (bytes) as main memory
    #[arg(long)]
    integrated_main_ram_size: Option<u64>,
    /// System clock frequency in Hz (e.g. 156.25e6)
    #[arg(long)]
    sys_clk_freq: Option<f64>,
    /// Enable Ethernet over the SFP lane
    #[arg(long, conflicts_with = "with_etherbone")]
    with_ethernet: bool,
    /// Enable Etherbone over the SFP lane
    #[arg(long)]
    with_etherbone: bool,
    /// Local IP address
    #[arg(long)]
    eth_ip: Option<String>,
    /// Remote IP address
    #[arg(long)]
    remote_ip: Option<String>,
    /// Allow the Ethernet IP to change at runtime
    #[arg(long)]
    eth_dynamic_ip: bool,
    /// Do not instantiate the SDRAM controller
    #[arg(long)]
    no_memory: bool,
    /// Do not instantiate the LED chaser
    #[arg(long)]
    no_led_chaser: bool,
    /// SoC identification string
    #[arg(long)]
    ident: Option<String>,
}

impl From<TargetArgs> for TargetOptions {
    fn from(args: TargetArgs) -> Self {
        let ethernet = if args.with_ethernet {
            Some(EthernetMode::Ethernet)
        } else if args.with_etherbone {
            Some(EthernetMode::Etherbone)
        } else {
            None
        };
        TargetOptions {
            variant: args.variant,
            board_file: args.board,
            integrated_main_ram_size: args.integrated_main_ram_size,
            sys_clk_freq: args.sys_clk_freq,
            ethernet,
            eth_ip: args.eth_ip,
            remote_ip: args.remote_ip,
            eth_dynamic_ip: args.eth_dynamic_ip,
            no_memory: args.no_memory,
            no_led_chaser: args.no_led_chaser,
            ident: args.ident,
        }
    }
}

fn parse_offset(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{s}': {e}"))
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name, variant } => commands::init::run(&name, variant),

        Commands::Assemble {
            target,
            output_dir,
            name,
            build,
            load,
            flash,
            flash_offset,
            json,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            let actions = ActionOptions {
                output_dir,
                name,
                build,
                load,
                flash,
                flash_offset,
                json,
            };
            commands::assemble::run(&project_dir, manifest.as_ref(), &target.into(), &actions)
        }

        Commands::Clocks { target } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::clocks::run(&project_dir, manifest.as_ref(), &target.into())
        }

        Commands::Variants => commands::board::variants(),

        Commands::Describe { variant, format } => {
            commands::board::describe(variant, format.as_deref())
        }

        Commands::Validate { file } => commands::board::validate(&file),
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<AcornManifest>, Option<PathBuf>)> {
    match AcornManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ethernet_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "acorn",
            "assemble",
            "--with-ethernet",
            "--with-etherbone",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn assemble_flags_parse() {
        let cli = Cli::try_parse_from([
            "acorn",
            "-v",
            "assemble",
            "--variant",
            "cle-215",
            "--with-etherbone",
            "--sys-clk-freq",
            "156.25e6",
            "--flash-offset",
            "0x400000",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Assemble {
            target,
            flash_offset,
            ..
        } = cli.command
        else {
            panic!("expected assemble");
        };
        assert_eq!(flash_offset, Some(0x40_0000));
        let opts: TargetOptions = target.into();
        assert_eq!(opts.variant, Some(BoardVariant::Cle215));
        assert_eq!(opts.ethernet, Some(EthernetMode::Etherbone));
        assert_eq!(opts.sys_clk_freq, Some(156.25e6));
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("4096"), Ok(4096));
        assert_eq!(parse_offset("0x1000"), Ok(4096));
        assert!(parse_offset("0xzz").is_err());
    }

    /// init, then assemble from inside the new project using its manifest.
    #[test]
    fn init_then_assemble() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("bench");
        commands::init::create_project(&project, "bench", BoardVariant::Cle101).unwrap();

        let (manifest, project_dir) = load_manifest_optional(&project).unwrap();
        let manifest = manifest.unwrap();
        let project_dir = project_dir.unwrap();
        let board =
            commands::resolve_board(&project_dir, Some(&manifest), &TargetOptions::default())
                .unwrap();
        assert_eq!(board.variant(), BoardVariant::Cle101);
        let output =
            commands::assemble::assemble(&board, Some(&manifest), &TargetOptions::default())
                .unwrap();
        assert_eq!(output.soc.variant(), BoardVariant::Cle101);
        assert!(output.report.to_string().starts_with("=== Assembly Report ==="));
    }
}
