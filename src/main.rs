//! ttcnc - TTCN-3/ASN.1 type checker and class generator

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ttcn_types::backend::{BuildContext, CodeGen, GeneratorOptions, JavaCodeGen};
use ttcn_types::feedback::{CheckFeedback, CheckOptions, CheckStats};
use ttcn_types::frontend::ast::CompilationUnit;
use ttcn_types::frontend::semantic::TypeChecker;
use ttcn_types::utils::{CompilationTimestamp, Diagnostics};

/// TTCN-3 type checker
#[derive(Parser, Debug)]
#[command(name = "ttcnc")]
#[command(version)]
#[command(about = "TTCN-3/ASN.1 type checker and value/template class generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a compilation unit for errors
    Check {
        /// Compilation unit in JSON interchange form
        input: PathBuf,

        /// Print a JSON report instead of plain diagnostics
        #[arg(long)]
        json: bool,

        /// Fail when any warning is reported
        #[arg(long)]
        warnings_as_errors: bool,
    },
    /// Check a compilation unit and generate its classes
    Generate {
        /// Compilation unit in JSON interchange form
        input: PathBuf,

        /// Output file (defaults to <module>.java next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Java package of the generated module
        #[arg(long, default_value = "generated")]
        package: String,

        /// Skip template classes
        #[arg(long)]
        no_templates: bool,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check {
            input,
            json,
            warnings_as_errors,
        } => check_file(&input, json, CheckOptions { warnings_as_errors }),
        Commands::Generate {
            input,
            output,
            package,
            no_templates,
        } => {
            let options = GeneratorOptions {
                package,
                generate_templates: !no_templates,
            };
            generate_file(&input, output, options)
        }
        Commands::Version => {
            println!("ttcnc {}", env!("CARGO_PKG_VERSION"));
            println!("{}", env!("CARGO_PKG_DESCRIPTION"));
            println!("License: {}", env!("CARGO_PKG_LICENSE"));
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

fn load_unit(input: &Path) -> Result<CompilationUnit> {
    let source = fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))?;
    let unit = CompilationUnit::from_json(&source).with_context(|| format!("cannot load {}", input.display()))?;
    Ok(unit)
}

fn run_check(unit: &mut CompilationUnit, timestamp: CompilationTimestamp) -> (Diagnostics, u64) {
    let started = Instant::now();
    let mut diagnostics = Diagnostics::new();
    TypeChecker::new(unit, &mut diagnostics, timestamp).check_unit();
    (diagnostics, started.elapsed().as_millis() as u64)
}

fn print_diagnostics(input: &Path, diagnostics: &Diagnostics) {
    for d in diagnostics.items() {
        eprintln!("{}:{}: {:?}: {}", input.display(), d.location.line, d.severity, d.message);
    }
}

/// Returns whether the unit passed
fn check_file(input: &Path, json: bool, options: CheckOptions) -> Result<bool> {
    let source_file = input.display().to_string();
    let mut unit = match load_unit(input) {
        Ok(unit) => unit,
        Err(e) if json => {
            let error = e.downcast_ref::<ttcn_types::utils::Error>();
            match error {
                Some(error) => {
                    println!("{}", CheckFeedback::failure(&source_file, error).to_json());
                    return Ok(false);
                }
                None => return Err(e),
            }
        }
        Err(e) => return Err(e),
    };

    let (diagnostics, elapsed) = run_check(&mut unit, CompilationTimestamp::first());
    let stats = CheckStats::collect(&unit, &diagnostics, elapsed);
    let feedback = CheckFeedback::new(&source_file, &unit, &diagnostics, stats, options);

    if json {
        println!("{}", feedback.to_json());
    } else {
        print_diagnostics(input, &diagnostics);
        println!(
            "{}: {} error(s), {} warning(s) in module {}",
            if feedback.success { "ok" } else { "failed" },
            feedback.stats.error_count,
            feedback.stats.warning_count,
            feedback.module
        );
    }
    Ok(feedback.success)
}

fn generate_file(input: &Path, output: Option<PathBuf>, options: GeneratorOptions) -> Result<bool> {
    let mut unit = load_unit(input)?;
    let timestamp = CompilationTimestamp::first();
    let (diagnostics, _) = run_check(&mut unit, timestamp);
    if diagnostics.has_errors() {
        print_diagnostics(input, &diagnostics);
        eprintln!("{} error(s), no code generated", diagnostics.error_count());
        return Ok(false);
    }

    let mut codegen = JavaCodeGen::new(BuildContext::new(timestamp, options));
    let text = codegen
        .generate(&mut unit)
        .with_context(|| format!("cannot generate code for module {}", unit.name))?;

    let path = output.unwrap_or_else(|| {
        let file = format!("{}.{}", unit.name.target_name(), codegen.target());
        input.with_file_name(file)
    });
    fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
    println!("Generated {}: {}", codegen.name(), path.display());
    Ok(true)
}
