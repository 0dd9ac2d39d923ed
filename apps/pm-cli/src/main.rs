mod error;

use clap::{Args, Parser, Subcommand, ValueEnum};
use error::{AppError, AppResult};
use pm_core::units::{density_kg_m3, k, pa, pressure_pa, temperature_k};
use pm_fluids::{
    Classifier, CoolPropProvider, DomeOptions, FixedProperty, PropertyProvider, Quantity,
    SaturationEnvelope, Substance, SweepDefinition, SweepType, SweptProperty, Table,
    TvDiagram, TvDiagramOptions, VaporDome, VolumeRange, classify_state, parse_quantity,
    sample_sweep,
};
use pm_study::{Job, JobDef, JobKind, JobStatus, StateDef};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pm-cli")]
#[command(about = "PhaseMap CLI - phase regions and property sweeps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix a state from two properties and report all others plus its phase
    State {
        #[command(flatten)]
        substance: SubstanceArg,
        #[command(flatten)]
        props: StateArgs,
    },
    /// Classify a specific volume against the saturation envelope
    Classify {
        #[command(flatten)]
        substance: SubstanceArg,
        /// Specific volume (e.g. "0.32 m3/kg")
        #[arg(short, long, allow_hyphen_values = true)]
        volume: String,
        #[command(flatten)]
        at: SaturationArgs,
    },
    /// Saturated liquid and vapor volumes at one pressure or temperature
    Saturation {
        #[command(flatten)]
        substance: SubstanceArg,
        #[command(flatten)]
        at: SaturationArgs,
    },
    /// Critical and triple point constants
    Critical {
        #[command(flatten)]
        substance: SubstanceArg,
    },
    /// Vapor dome as CSV
    Dome {
        #[command(flatten)]
        substance: SubstanceArg,
        /// Lowest saturation temperature (defaults to the triple point)
        #[arg(long, allow_hyphen_values = true)]
        t_start: Option<String>,
        /// Samples below the critical point
        #[arg(long, default_value_t = 60)]
        points: usize,
        /// Output CSV file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Vapor dome plus isobars on T-v axes
    TvDiagram {
        #[command(flatten)]
        substance: SubstanceArg,
        /// Isobar pressure; repeat for several isobars
        #[arg(short, long = "pressure", required = true)]
        pressures: Vec<String>,
        #[arg(long, default_value = "0.001 m3/kg")]
        v_min: String,
        #[arg(long, default_value = "100 m3/kg")]
        v_max: String,
        /// Samples per isobar
        #[arg(long, default_value_t = 200)]
        points: usize,
        /// Output directory for one CSV per curve (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Sweep one property at a fixed second property
    Sweep {
        #[command(flatten)]
        substance: SubstanceArg,
        /// Property to sweep
        #[arg(long, value_enum)]
        sweep: SweepArg,
        #[arg(long, allow_hyphen_values = true)]
        start: String,
        #[arg(long, allow_hyphen_values = true)]
        end: String,
        #[arg(long, default_value_t = 50)]
        points: usize,
        /// Logarithmic spacing
        #[arg(long)]
        log: bool,
        #[command(flatten)]
        fixed: FixedArgs,
        /// Output CSV file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run every job of a YAML study file
    Study {
        /// Path to the study YAML file
        study_path: PathBuf,
        /// Output directory (overrides the study's output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SubstanceArg {
    /// Substance name or formula (water, N2, R134a, ...)
    #[arg(short, long, default_value = "water")]
    substance: Substance,
}

#[derive(Args)]
struct StateArgs {
    #[arg(short, long, allow_hyphen_values = true)]
    temperature: Option<String>,
    #[arg(short, long)]
    pressure: Option<String>,
    #[arg(short = 'v', long)]
    specific_volume: Option<String>,
    #[arg(short = 'x', long)]
    quality: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    enthalpy: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    entropy: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SaturationArgs {
    #[arg(short, long)]
    pressure: Option<String>,
    #[arg(short, long, allow_hyphen_values = true)]
    temperature: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct FixedArgs {
    /// Hold pressure fixed
    #[arg(long = "at-pressure")]
    pressure: Option<String>,
    /// Hold temperature fixed
    #[arg(long = "at-temperature", allow_hyphen_values = true)]
    temperature: Option<String>,
    /// Hold specific volume fixed
    #[arg(long = "at-volume")]
    volume: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SweepArg {
    Temperature,
    Pressure,
    Volume,
    Quality,
}

impl From<SweepArg> for SweptProperty {
    fn from(arg: SweepArg) -> Self {
        match arg {
            SweepArg::Temperature => SweptProperty::Temperature,
            SweepArg::Pressure => SweptProperty::Pressure,
            SweepArg::Volume => SweptProperty::SpecificVolume,
            SweepArg::Quality => SweptProperty::Quality,
        }
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::State { substance, props } => cmd_state(substance.substance, props),
        Commands::Classify {
            substance,
            volume,
            at,
        } => cmd_classify(substance.substance, &volume, &at),
        Commands::Saturation { substance, at } => cmd_saturation(substance.substance, &at),
        Commands::Critical { substance } => cmd_critical(substance.substance),
        Commands::Dome {
            substance,
            t_start,
            points,
            output,
        } => cmd_dome(substance.substance, t_start.as_deref(), points, output.as_deref()),
        Commands::TvDiagram {
            substance,
            pressures,
            v_min,
            v_max,
            points,
            output,
        } => cmd_tv_diagram(
            substance.substance,
            &pressures,
            (&v_min, &v_max, points),
            output.as_deref(),
        ),
        Commands::Sweep {
            substance,
            sweep,
            start,
            end,
            points,
            log,
            fixed,
            output,
        } => {
            let sweep_type = if log {
                SweepType::Logarithmic
            } else {
                SweepType::Linear
            };
            let swept = SweptProperty::from(sweep);
            let definition =
                SweepDefinition::from_text(&start, &end, swept.quantity(), points, sweep_type)?;
            cmd_sweep(substance.substance, &definition, &fixed, output.as_deref())
        }
        Commands::Study { study_path, output } => cmd_study(&study_path, output.as_deref()),
    }
}

fn provider(substance: Substance) -> AppResult<CoolPropProvider> {
    Ok(CoolPropProvider::new(substance)?)
}

fn quantity(what: &'static str, text: &str, q: Quantity) -> AppResult<f64> {
    parse_quantity(text, q).map_err(|source| AppError::Unit { what, source })
}

fn cmd_state(substance: Substance, props: StateArgs) -> AppResult<()> {
    let job = JobDef {
        id: "state".to_string(),
        kind: JobKind::State(StateDef {
            temperature: props.temperature,
            pressure: props.pressure,
            specific_volume: props.specific_volume,
            quality: props.quality,
            enthalpy: props.enthalpy,
            entropy: props.entropy,
        }),
    };
    let Job::State(input) = pm_study::resolve_job(&job)? else {
        return Err(AppError::Usage("expected a state definition".to_string()));
    };

    let mut provider = provider(substance)?;
    let state = provider.state(input)?;
    let phase = classify_state(&mut provider, &state)?;

    println!("{} at {}", substance, input);
    println!("  Phase:  {}", phase);
    println!("  T:      {:.3} K", state.temperature_k());
    println!("  P:      {:.1} Pa", state.pressure_pa());
    println!("  v:      {:.6e} m3/kg", state.specific_volume());
    println!("  rho:    {:.4} kg/m3", state.density_kg_m3());
    match state.quality() {
        Some(x) => println!("  x:      {:.4}", x),
        None => println!("  x:      -"),
    }
    println!("  u:      {:.1} J/kg", state.internal_energy());
    println!("  h:      {:.1} J/kg", state.enthalpy());
    println!("  s:      {:.3} J/(kg K)", state.entropy());
    Ok(())
}

fn envelope(
    provider: &mut CoolPropProvider,
    at: &SaturationArgs,
) -> AppResult<SaturationEnvelope> {
    match (&at.pressure, &at.temperature) {
        (Some(p), None) => {
            let p = pa(quantity("pressure", p, Quantity::Pressure)?);
            Ok(SaturationEnvelope::at_pressure(provider, p)?)
        }
        (None, Some(t)) => {
            let t = k(quantity("temperature", t, Quantity::Temperature)?);
            Ok(SaturationEnvelope::at_temperature(provider, t)?)
        }
        _ => Err(AppError::Usage(
            "give exactly one of --pressure or --temperature".to_string(),
        )),
    }
}

fn cmd_classify(substance: Substance, volume: &str, at: &SaturationArgs) -> AppResult<()> {
    let v = quantity("specific volume", volume, Quantity::SpecificVolume)?;
    let mut provider = provider(substance)?;
    let classifier = Classifier::default();

    let phase = match (&at.pressure, &at.temperature) {
        (Some(p), None) => {
            let p = pa(quantity("pressure", p, Quantity::Pressure)?);
            classifier.at_pressure(&mut provider, p, v)?
        }
        (None, Some(t)) => {
            let t = k(quantity("temperature", t, Quantity::Temperature)?);
            classifier.at_temperature(&mut provider, t, v)?
        }
        _ => {
            return Err(AppError::Usage(
                "give exactly one of --pressure or --temperature".to_string(),
            ));
        }
    };

    println!("{}", phase);
    // No envelope exists above the critical temperature or pressure.
    if let Ok(env) = envelope(&mut provider, at) {
        println!("  {}", env);
    }
    Ok(())
}

fn cmd_saturation(substance: Substance, at: &SaturationArgs) -> AppResult<()> {
    let mut provider = provider(substance)?;
    let env = envelope(&mut provider, at)?;
    println!("{} saturation:", substance);
    println!("  T_sat: {:.3} K", env.t_sat_k());
    println!("  P_sat: {:.1} Pa", env.p_sat_pa());
    println!("  v_f:   {:.6e} m3/kg", env.v_f());
    println!("  v_g:   {:.6e} m3/kg", env.v_g());
    Ok(())
}

fn cmd_critical(substance: Substance) -> AppResult<()> {
    let provider = provider(substance)?;
    let cp = provider.critical_point();
    let (t_min, t_max) = provider.temperature_limits();
    println!("{} ({})", substance, provider.name());
    println!("  T_crit:   {:.3} K", temperature_k(cp.temperature));
    println!("  P_crit:   {:.1} Pa", pressure_pa(cp.pressure));
    println!("  rho_crit: {:.3} kg/m3", density_kg_m3(cp.density));
    println!("  v_crit:   {:.6e} m3/kg", cp.specific_volume());
    println!(
        "  T_triple: {:.3} K",
        temperature_k(provider.triple_point_temperature())
    );
    println!(
        "  T range:  {:.2} .. {:.2} K",
        temperature_k(t_min),
        temperature_k(t_max)
    );
    Ok(())
}

fn cmd_dome(
    substance: Substance,
    t_start: Option<&str>,
    points: usize,
    output: Option<&Path>,
) -> AppResult<()> {
    let t_start = t_start
        .map(|t| quantity("start temperature", t, Quantity::Temperature).map(k))
        .transpose()?;
    let mut provider = provider(substance)?;
    let dome = VaporDome::sample(
        &mut provider,
        &DomeOptions {
            t_start,
            num_points: points,
        },
    )?;
    if dome.is_truncated() {
        eprintln!("warning: dome truncated below the critical point");
    }
    emit_table(&Table::from_dome(substance.key(), &dome), output)
}

fn cmd_tv_diagram(
    substance: Substance,
    pressures: &[String],
    (v_min, v_max, points): (&str, &str, usize),
    output: Option<&Path>,
) -> AppResult<()> {
    let isobars = pressures
        .iter()
        .map(|p| quantity("pressure", p, Quantity::Pressure).map(pa))
        .collect::<AppResult<Vec<_>>>()?;
    let options = TvDiagramOptions {
        dome: DomeOptions::default(),
        isobars,
        volumes: VolumeRange {
            v_min: quantity("v_min", v_min, Quantity::SpecificVolume)?,
            v_max: quantity("v_max", v_max, Quantity::SpecificVolume)?,
            num_points: points,
            logarithmic: true,
        },
    };
    let mut provider = provider(substance)?;
    let diagram = TvDiagram::build(&mut provider, &options)?;

    let mut tables = vec![Table::from_dome("dome", &diagram.dome)];
    for isobar in &diagram.isobars {
        let name = format!("isobar_{:.0}pa", isobar.value);
        tables.push(Table::from_sweep(name, &isobar.sweep));
    }

    match output {
        Some(dir) => {
            for table in &tables {
                let path = dir.join(format!("{}.csv", table.name));
                table.save_csv(&path)?;
                info!(path = %path.display(), "wrote table");
            }
            println!("✓ Wrote {} tables to {}", tables.len(), dir.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            for table in &tables {
                writeln!(stdout, "# {}", table.name)?;
                table.write_csv(&mut stdout)?;
            }
        }
    }
    Ok(())
}

fn cmd_sweep(
    substance: Substance,
    sweep: &SweepDefinition,
    fixed: &FixedArgs,
    output: Option<&Path>,
) -> AppResult<()> {
    let fixed = match (&fixed.pressure, &fixed.temperature, &fixed.volume) {
        (Some(p), None, None) => {
            FixedProperty::Pressure(pa(quantity("pressure", p, Quantity::Pressure)?))
        }
        (None, Some(t), None) => {
            FixedProperty::Temperature(k(quantity("temperature", t, Quantity::Temperature)?))
        }
        (None, None, Some(v)) => FixedProperty::SpecificVolume(quantity(
            "specific volume",
            v,
            Quantity::SpecificVolume,
        )?),
        _ => {
            return Err(AppError::Usage(
                "give exactly one of --at-pressure, --at-temperature or --at-volume".to_string(),
            ));
        }
    };

    let mut provider = provider(substance)?;
    let result = sample_sweep(&mut provider, fixed, sweep)?;
    if result.num_failed > 0 {
        eprintln!(
            "warning: {}/{} samples failed (left empty)",
            result.num_failed,
            result.samples.len()
        );
    }
    emit_table(&Table::from_sweep("sweep", &result), output)
}

fn cmd_study(study_path: &Path, output: Option<&Path>) -> AppResult<()> {
    println!("Running study: {}", study_path.display());
    let study = pm_study::load_yaml(study_path)?;
    let substance = pm_study::resolve_substance(&study)?;
    let mut provider = provider(substance)?;
    let run = pm_study::run_study(&study, &mut provider)?;

    for report in &run.reports {
        let mark = match report.status {
            JobStatus::Ok => "✓",
            JobStatus::Failed => "✗",
        };
        println!("  {} {} [{}] {}", mark, report.id, report.kind, report.summary);
        if report.failed_samples > 0 {
            println!("      {} samples failed", report.failed_samples);
        }
    }

    let dir = output
        .map(Path::to_path_buf)
        .or_else(|| study.output_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("out"));
    let written = run.write_outputs(&dir)?;
    println!(
        "✓ {} jobs ({} failed), {} files written to {}",
        run.reports.len(),
        run.num_failed_jobs(),
        written.len(),
        dir.display()
    );
    Ok(())
}

fn emit_table(table: &Table, output: Option<&Path>) -> AppResult<()> {
    match output {
        Some(path) => {
            table.save_csv(path)?;
            println!("✓ Wrote {} rows to {}", table.len(), path.display());
        }
        None => table.write_csv(io::stdout().lock())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sweep_args_parse() {
        let cli = Cli::try_parse_from([
            "pm-cli",
            "sweep",
            "--substance",
            "n2",
            "--sweep",
            "temperature",
            "--start",
            "70 K",
            "--end",
            "300 K",
            "--at-pressure",
            "1 bar",
        ])
        .unwrap();
        let Commands::Sweep {
            substance, fixed, ..
        } = cli.command
        else {
            panic!("expected sweep");
        };
        assert_eq!(substance.substance, Substance::Nitrogen);
        assert_eq!(fixed.pressure.as_deref(), Some("1 bar"));
    }

    #[test]
    fn saturation_needs_one_condition() {
        assert!(Cli::try_parse_from(["pm-cli", "saturation"]).is_err());
        assert!(
            Cli::try_parse_from(["pm-cli", "saturation", "-p", "1 bar", "-t", "300 K"]).is_err()
        );
        assert!(Cli::try_parse_from(["pm-cli", "saturation", "-t", "-10C"]).is_ok());
    }

    #[test]
    fn unknown_substance_is_a_parse_error() {
        assert!(Cli::try_parse_from(["pm-cli", "critical", "-s", "unobtainium"]).is_err());
    }
}
