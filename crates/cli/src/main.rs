use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use elapsed::measure_time;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use sat_nexus_core::miter::{check_equivalence, Verdict};
use sat_nexus_core::netlist::standard_cell_library;
use sat_nexus_core::solver::DimacsProcessEngine;

mod parsing;

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Cli {
    /// First netlist (the "golden" reference, by convention).
    #[clap(value_name = "NETLIST_A")]
    netlist_a: PathBuf,

    /// Second netlist (the one being checked against the first).
    #[clap(value_name = "NETLIST_B")]
    netlist_b: PathBuf,

    /// Leading hierarchical-path component to strip from both netlists
    /// before matching primary inputs/outputs (e.g. differing top-module
    /// instance names between a golden and revised netlist).
    #[clap(long, value_name = "NAME")]
    prefix: Option<String>,

    /// Maximum number of free inputs a single output's logic cone may fan
    /// in to before giving up on it as too large.
    #[clap(long, default_value_t = 64)]
    max_cone_inputs: usize,

    /// External SAT solver binary to invoke (must speak DIMACS in, SAT
    /// competition output format out).
    #[clap(long, default_value = "cadical")]
    solver_cmd: String,
}

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("error: failed to install error hook: {e}");
        return ExitCode::from(2);
    }
    if let Err(e) = TermLogger::init(LevelFilter::Info, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("error: failed to initialize logger: {e}");
        return ExitCode::from(2);
    }

    let args = Cli::parse();
    info!("args = {:?}", args);

    let net_a = match parsing::parse_netlist_file(&args.netlist_a, args.prefix.as_deref()) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.netlist_a.display());
            return ExitCode::from(2);
        }
    };
    let net_b = match parsing::parse_netlist_file(&args.netlist_b, args.prefix.as_deref()) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.netlist_b.display());
            return ExitCode::from(2);
        }
    };

    let lib = standard_cell_library();
    let mut solver = DimacsProcessEngine::new(args.solver_cmd.clone());

    info!("Checking equivalence of {} and {}...", args.netlist_a.display(), args.netlist_b.display());
    let (elapsed, result) = measure_time(|| check_equivalence(&net_a, &lib, &net_b, &lib, &mut solver, args.max_cone_inputs));
    info!("checked in {}", elapsed);

    match result {
        Ok(Verdict::Equivalent) => {
            println!("EQUIVALENT");
            ExitCode::from(0)
        }
        Ok(Verdict::Different { differing_outputs, witness }) => {
            println!("DIFFERENT");
            for path in &differing_outputs {
                println!("  differs at output: {}", path.join("."));
            }
            let mut keys: Vec<&Vec<String>> = witness.keys().collect();
            keys.sort();
            for path in keys {
                println!("  {} = {}", path.join("."), witness[path]);
            }
            ExitCode::from(1)
        }
        Ok(Verdict::NonComparable { reason }) => {
            println!("NON-COMPARABLE: {reason}");
            ExitCode::from(2)
        }
        Ok(Verdict::Unknown) => {
            println!("UNKNOWN");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
