//! Command line front end of the scheduler.
//!
//! Subcommands:
//! - `chunk`: schedule from a start time for one chunk (or up to an end time)
//! - `nite`: schedule a whole nite in chunks
//! - `survey`: schedule every configured window
//! - `prepare`: build the target catalog from a hex list

use std::fs;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Args, Parser, Subcommand};
use hifitime::Epoch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use obsplan::constants::{HexId, Tiling, BANDS};
use obsplan::ephemeris::LowPrecisionEphemeris;
use obsplan::field::display::FieldsDisplayExt;
use obsplan::field::{io, Field, TargetCatalog};
use obsplan::observatory::Observatory;
use obsplan::scheduler::params::SchedulerParams;
use obsplan::scheduler::Scheduler;
use obsplan::scheduler_errors::SchedulerError;
use obsplan::selection::constraints::PointingLimits;
use obsplan::selection::scoring::ScoringMode;
use obsplan::survey::{prepare_fields, DitherMode, SmcnodSelection};
use obsplan::time::{parse_date, Nite};
use obsplan::windows::ObservationWindows;

/// Greedy field scheduler for wide-field survey telescopes
#[derive(Parser, Debug)]
#[command(name = "obsplan")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// TOML file with scheduler parameters
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Pointing limit table replacing the built-in Blanco one
    #[arg(long, global = true)]
    limits: Option<Utf8PathBuf>,

    /// Scoring mode, overrides the configuration file
    #[arg(long, global = true)]
    mode: Option<ScoringMode>,

    #[command(subcommand)]
    command: Command,
}

/// Inputs and outputs shared by the scheduling subcommands.
#[derive(Args, Debug)]
struct ScheduleArgs {
    /// Target field catalog (CSV)
    #[arg(short, long)]
    fields: Utf8PathBuf,

    /// Observation windows (CSV)
    #[arg(short, long)]
    windows: Option<Utf8PathBuf>,

    /// Already completed fields (CSV), may be repeated
    #[arg(short, long = "complete")]
    complete: Vec<Utf8PathBuf>,

    /// Output file (a directory for `survey`)
    #[arg(short, long)]
    outfile: Option<Utf8PathBuf>,

    /// Make the output read-only
    #[arg(long)]
    write_protect: bool,

    /// Print a table of the scheduled exposures
    #[arg(long)]
    table: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Schedule one chunk starting at a given time
    Chunk {
        #[command(flatten)]
        args: ScheduleArgs,

        /// Start time, UTC "YYYY/MM/DD HH:MM:SS"
        #[arg(long, value_parser = parse_date)]
        utc_start: Epoch,

        /// End time, UTC; defaults to start + chunk
        #[arg(long, value_parser = parse_date)]
        utc_end: Option<Epoch>,

        /// Chunk length in minutes
        #[arg(long)]
        chunk: Option<f64>,

        /// Stop as soon as the clock leaves the observation windows
        #[arg(long)]
        clip: bool,
    },

    /// Schedule one nite
    Nite {
        #[command(flatten)]
        args: ScheduleArgs,

        /// Nite to schedule, YYYYMMDD; defaults to the current one
        #[arg(long)]
        nite: Option<Nite>,

        /// Chunk length in minutes
        #[arg(long)]
        chunk: Option<f64>,

        /// Stop each chunk as soon as the clock leaves the observation windows
        #[arg(long)]
        clip: bool,
    },

    /// Schedule every configured window
    Survey {
        #[command(flatten)]
        args: ScheduleArgs,

        /// Chunk length in minutes
        #[arg(long)]
        chunk: Option<f64>,
    },

    /// Build the target field catalog from a list of hexes
    Prepare {
        /// Hex list (CSV with ID,RA,DEC)
        #[arg(long)]
        hexes: Utf8PathBuf,

        /// Tiling offsets: none, smash, smash_rotate or decam
        #[arg(long, default_value = "smash")]
        dither: DitherMode,

        /// Comma separated hexes kept outside the footprint (SMC northern overdensity)
        #[arg(long, value_delimiter = ',')]
        smcnod: Vec<HexId>,

        /// Tilings the SMCNOD hexes are kept for; all when omitted
        #[arg(long, value_delimiter = ',')]
        smcnod_tilings: Vec<Tiling>,

        /// Comma separated bands
        #[arg(long, value_delimiter = ',', default_values = BANDS)]
        bands: Vec<String>,

        /// Output catalog (CSV)
        #[arg(short, long)]
        outfile: Option<Utf8PathBuf>,

        /// Make the output read-only
        #[arg(long)]
        write_protect: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<(), SchedulerError> {
    let mut params = match &cli.config {
        Some(path) => SchedulerParams::from_toml_file(path)?,
        None => SchedulerParams::default(),
    };
    if let Some(mode) = cli.mode {
        params.mode = mode;
    }
    tracing::debug!("Scheduler parameters:\n{params:#}");

    match cli.command {
        Command::Chunk {
            args,
            utc_start,
            utc_end,
            chunk,
            clip,
        } => {
            let scheduler = build_scheduler(&args, cli.limits.as_deref(), params)?;
            let mut state = scheduler.initial_state(io::read_completed(&args.complete)?);
            let fields = match utc_end {
                Some(_) => scheduler.run(&mut state, utc_start, utc_end, clip)?,
                None => scheduler.schedule_chunk(&mut state, utc_start, chunk, clip)?,
            };
            info!("Scheduled {} exposures, run {:?}", fields.len(), state.status);
            emit(&args, &fields)
        }
        Command::Nite {
            args,
            nite,
            chunk,
            clip,
        } => {
            let scheduler = build_scheduler(&args, cli.limits.as_deref(), params)?;
            let nite = match nite {
                Some(nite) => nite,
                None => {
                    let now = Epoch::now().map_err(|e| SchedulerError::InvalidDate(e.to_string()))?;
                    Nite::from_epoch(&now, scheduler.observatory().longitude)
                }
            };
            let mut state = scheduler.initial_state(io::read_completed(&args.complete)?);
            let chunks = scheduler.schedule_nite(&mut state, &nite, chunk, clip)?;
            let fields: Vec<Field> = chunks.into_iter().flatten().collect();
            info!("Nite {nite}: {} exposures", fields.len());
            emit(&args, &fields)
        }
        Command::Survey { args, chunk } => {
            let scheduler = build_scheduler(&args, cli.limits.as_deref(), params)?;
            let mut state = scheduler.initial_state(io::read_completed(&args.complete)?);
            let nites = scheduler.schedule_survey(&mut state, chunk)?;

            if let Some(dir) = &args.outfile {
                fs::create_dir_all(dir)?;
            }
            for (nite, chunks) in nites {
                let fields: Vec<Field> = chunks.into_iter().flatten().collect();
                info!("Nite {nite}: {} exposures", fields.len());
                if args.table {
                    println!("{}", fields.table());
                }
                if let Some(dir) = &args.outfile {
                    let path = dir.join(format!("{nite}.csv"));
                    io::write_fields(&path, &fields, args.write_protect)?;
                    info!("Wrote {path}");
                }
            }
            Ok(())
        }
        Command::Prepare {
            hexes,
            dither,
            smcnod,
            smcnod_tilings,
            bands,
            outfile,
            write_protect,
        } => {
            let hexes = io::read_hexes(&hexes)?;
            let smcnod = (!smcnod.is_empty()).then(|| SmcnodSelection {
                hexes: smcnod,
                tilings: smcnod_tilings,
            });
            let fields = prepare_fields(
                &hexes,
                dither,
                bands.as_slice(),
                params.southern_reach,
                smcnod.as_ref(),
            );
            match outfile {
                Some(path) => {
                    io::write_fields(&path, &fields, write_protect)?;
                    info!("Wrote {} target fields to {path}", fields.len());
                }
                None => println!("{}", fields.show()),
            }
            Ok(())
        }
    }
}

fn build_scheduler(
    args: &ScheduleArgs,
    limits: Option<&Utf8Path>,
    params: SchedulerParams,
) -> Result<Scheduler<LowPrecisionEphemeris>, SchedulerError> {
    let catalog = TargetCatalog::new(io::read_fields(&args.fields)?);
    let windows = match &args.windows {
        Some(path) => io::read_windows(path)?,
        None => ObservationWindows::default(),
    };

    let limits = match limits {
        Some(path) => Some(PointingLimits::from_table(
            &fs::read_to_string(path)?,
            params.hour_angle_buffer,
        )?),
        None => None,
    };

    let scheduler = Scheduler::new(
        catalog,
        windows,
        Observatory::ctio(),
        LowPrecisionEphemeris::new(),
        params,
    )?;
    Ok(match limits {
        Some(limits) => scheduler.with_limits(limits),
        None => scheduler,
    })
}

fn emit(args: &ScheduleArgs, fields: &[Field]) -> Result<(), SchedulerError> {
    if args.table {
        println!("{}", fields.table());
    }
    match &args.outfile {
        Some(path) => {
            io::write_fields(path, fields, args.write_protect)?;
            info!("Wrote {path}");
        }
        None if !args.table => println!("{}", fields.show()),
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod cli_test {
    use super::*;

    #[test]
    fn test_clip_is_opt_in() {
        let cli = Cli::try_parse_from([
            "obsplan",
            "chunk",
            "-f",
            "fields.csv",
            "--utc-start",
            "2016/02/11 03:00:00",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Chunk { clip: false, .. }));

        let cli =
            Cli::try_parse_from(["obsplan", "nite", "-f", "fields.csv", "--nite", "20160215"])
                .unwrap();
        match cli.command {
            Command::Nite { clip, nite, .. } => {
                assert!(!clip);
                assert_eq!(nite, Some(Nite::new(2016, 2, 15).unwrap()));
            }
            other => panic!("unexpected subcommand {other:?}"),
        }

        let cli = Cli::try_parse_from(["obsplan", "nite", "-f", "fields.csv", "--clip"]).unwrap();
        assert!(matches!(cli.command, Command::Nite { clip: true, .. }));
    }

    #[test]
    fn test_prepare_options() {
        let cli = Cli::try_parse_from([
            "obsplan",
            "prepare",
            "--hexes",
            "hexes.csv",
            "--dither",
            "smash_rotate",
            "--smcnod",
            "12,13",
        ])
        .unwrap();
        match cli.command {
            Command::Prepare {
                dither,
                smcnod,
                smcnod_tilings,
                bands,
                ..
            } => {
                assert_eq!(dither, DitherMode::SmashRotate);
                assert_eq!(smcnod, vec![12, 13]);
                assert!(smcnod_tilings.is_empty());
                assert_eq!(bands, BANDS.map(String::from).to_vec());
            }
            other => panic!("unexpected subcommand {other:?}"),
        }
    }
}
