use clap::Parser;
use colored::Colorize;
use log::LevelFilter;
use physolve::{propagate, Equation, Formula, Measurement};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::collections::HashMap;
use std::process;

#[derive(Parser)]
#[command(name = "physolve")]
#[command(about = "Solve physics formulas for one unknown")]
#[command(version)]
struct Args {
    /// Equation ("v = d / t") or, with --propagate, a bare formula ("d / t")
    input: String,

    /// Name of the unknown variable to solve for
    #[arg(long = "for", value_name = "VAR")]
    unknown: Option<String>,

    /// Known values as name=value (name=value+-uncertainty with --propagate)
    #[arg(long = "set", value_name = "BINDING")]
    bindings: Vec<String>,

    /// Propagate measurement uncertainties instead of solving
    #[arg(long)]
    propagate: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = if args.propagate {
        run_propagate(&args)
    } else {
        run_solve(&args)
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .ok();
}

fn run_solve(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let unknown = args
        .unknown
        .as_deref()
        .ok_or("missing --for <VAR>: name the variable to solve for")?;

    let mut bindings = HashMap::new();
    for binding in &args.bindings {
        let (name, value) = parse_binding(binding)?;
        bindings.insert(name.to_string(), value.parse::<f64>()?);
    }

    let equation = Equation::parse(&args.input)?;
    let root = equation.solve(&bindings, unknown)?;
    println!("{} = {}", unknown.cyan(), root);
    Ok(())
}

fn run_propagate(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut measurements = HashMap::new();
    for binding in &args.bindings {
        let (name, value) = parse_binding(binding)?;
        let measurement = match value.split_once("+-") {
            Some((center, uncertainty)) => {
                Measurement::new(center.parse()?, uncertainty.parse()?)
            }
            None => Measurement::exact(value.parse()?),
        };
        measurements.insert(name.to_string(), measurement);
    }

    let formula = Formula::new(args.input.clone())?;
    let result = propagate(&formula, &measurements)?;

    println!(
        "{} = {} +- {}",
        formula.source().cyan(),
        result.value,
        result.uncertainty
    );
    println!("{} {}", "propagation:".cyan(), result.expression);
    Ok(())
}

fn parse_binding(binding: &str) -> Result<(&str, &str), Box<dyn std::error::Error>> {
    binding
        .split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .ok_or_else(|| format!("invalid binding '{binding}', expected name=value").into())
}
