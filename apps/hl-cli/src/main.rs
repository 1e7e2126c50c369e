mod error;

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use error::{AppError, AppResult};
use hl_core::timing::Timer;
use hl_results::{
    LoopMetrics, RunManifest, RunStore, compute_loop_metrics, compute_run_id, export_csv,
    records_from_sim, sim_from_records,
};
use hl_sim::{SimConfig, SimProgress, run_sim_with_progress};

const DEFAULT_STORE: &str = ".heatloop/runs";

#[derive(Parser)]
#[command(name = "hl-cli")]
#[command(about = "HeatLoop CLI - closed-loop PID temperature simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run(RunArgs),
    /// List cached runs
    Runs {
        /// Run store directory
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Run ID to display
        run_id: String,
        /// Run store directory
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,
    },
    /// Export the time series of a run as CSV
    ExportSeries {
        /// Run ID
        run_id: String,
        /// Run store directory
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// YAML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Proportional gain
    #[arg(long)]
    kp: Option<f64>,
    /// Integral gain
    #[arg(long)]
    ki: Option<f64>,
    /// Derivative gain
    #[arg(long)]
    kd: Option<f64>,
    /// Target temperature
    #[arg(long)]
    target: Option<f64>,
    /// Initial temperature
    #[arg(long)]
    initial: Option<f64>,
    /// Time step in seconds
    #[arg(long)]
    dt: Option<f64>,
    /// Simulated duration in seconds
    #[arg(long)]
    duration: Option<f64>,
    /// Run store directory
    #[arg(long, default_value = DEFAULT_STORE)]
    store: PathBuf,
    /// Also write the time series to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Skip cache and force re-run
    #[arg(long)]
    no_cache: bool,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => cmd_run(&args),
        Commands::Runs { store } => cmd_runs(&store),
        Commands::ShowRun { run_id, store } => cmd_show_run(&store, &run_id),
        Commands::ExportSeries {
            run_id,
            store,
            output,
        } => cmd_export_series(&store, &run_id, output.as_deref()),
    }
}

fn load_config(args: &RunArgs) -> AppResult<SimConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
                path: path.clone(),
                source,
            })?;
            serde_yaml::from_str(&text).map_err(|source| AppError::ConfigParse {
                path: path.clone(),
                source,
            })?
        }
        None => SimConfig::default(),
    };

    if let Some(kp) = args.kp {
        cfg.gains.kp = kp;
    }
    if let Some(ki) = args.ki {
        cfg.gains.ki = ki;
    }
    if let Some(kd) = args.kd {
        cfg.gains.kd = kd;
    }
    if let Some(target) = args.target {
        cfg.target_temperature = target;
    }
    if let Some(initial) = args.initial {
        cfg.initial_temperature = initial;
    }
    if let Some(dt) = args.dt {
        cfg.dt = dt;
    }
    if let Some(duration) = args.duration {
        cfg.total_duration = duration;
    }
    Ok(cfg)
}

fn cmd_run(args: &RunArgs) -> AppResult<()> {
    let cfg = load_config(args)?;
    cfg.validate()?;

    println!(
        "Heating to {:.1}°C from {:.1}°C",
        cfg.target_temperature, cfg.initial_temperature
    );
    println!(
        "  Kp = {}, Ki = {}, Kd = {}, dt = {:.3} s, duration = {:.1} s",
        cfg.gains.kp, cfg.gains.ki, cfg.gains.kd, cfg.dt, cfg.total_duration
    );

    let store = RunStore::new(args.store.clone())?;
    let run_id = compute_run_id(&cfg)?;

    let sim = if !args.no_cache && store.has_run(&run_id) {
        let records = store.load_timeseries(&run_id)?;
        tracing::info!(run_id = %run_id, "using cached run");
        println!("✓ Loaded from cache: {}", run_id);
        sim_from_records(&records)
    } else {
        let timer = Timer::start("simulation");
        let mut last_emit = Instant::now();
        let mut last_fraction = -1.0f64;
        let sim = run_sim_with_progress(
            &cfg,
            Some(&mut |p: SimProgress| {
                let emit_now = (p.fraction_complete - last_fraction).abs() >= 0.05
                    || last_emit.elapsed().as_millis() >= 100;
                if emit_now {
                    render_cli_progress(&p);
                    last_fraction = p.fraction_complete;
                    last_emit = Instant::now();
                }
            }),
        )?;
        clear_progress_line();

        let manifest = RunManifest::new(run_id.clone(), cfg.clone(), &sim);
        store.save_run(&manifest, &records_from_sim(&sim))?;
        println!("✓ Simulation completed: {}", run_id);
        if let Some(elapsed) = timer.stop() {
            println!("  Wall time: {:.3}s", elapsed);
        }
        sim
    };

    let metrics = compute_loop_metrics(&sim, &cfg);
    println!("  Time points: {}", sim.len());
    print_metrics(&metrics);

    if let Some(path) = &args.csv {
        let file = std::fs::File::create(path)?;
        export_csv(&records_from_sim(&sim), io::BufWriter::new(file))?;
        println!("✓ Exported {} data points to {}", sim.len(), path.display());
    }

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(p: &SimProgress) {
    let width = 28usize;
    let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] {:>6.2}%  t={:.1}s  T={:.2}°C  power={:.1}%",
        bar,
        p.fraction_complete * 100.0,
        p.sim_time_s,
        p.temperature,
        p.power
    );
    let _ = io::stdout().flush();
}

fn print_metrics(m: &LoopMetrics) {
    if !m.has_data() {
        println!("  No samples recorded");
        return;
    }
    if let Some(err) = m.steady_state_error {
        println!("  Final error:     {:+.3}°C", err);
    }
    if let Some(peak) = m.peak_temperature {
        println!("  Peak:            {:.3}°C", peak);
    }
    match (m.overshoot, m.overshoot_pct) {
        (Some(o), Some(pct)) => println!("  Overshoot:       {:.3}°C ({:.1}%)", o, pct),
        _ => println!("  Overshoot:       none"),
    }
    if let Some(rise) = m.rise_time_s {
        println!("  Rise time:       {:.2}s", rise);
    }
    match m.settling_time_s {
        Some(t) => println!("  Settling time:   {:.2}s", t),
        None => println!("  Settling time:   not settled"),
    }
    if let (Some(hi), Some(lo)) = (m.saturation_pct_upper, m.saturation_pct_lower) {
        println!("  Saturated:       {:.1}% high, {:.1}% low", hi, lo);
    }
}

fn cmd_runs(store_dir: &Path) -> AppResult<()> {
    let store = RunStore::new(store_dir.to_path_buf())?;
    let runs = store.list_runs()?;

    if runs.is_empty() {
        println!("No cached runs in {}", store_dir.display());
    } else {
        println!("Cached runs in {}:", store_dir.display());
        for manifest in runs {
            println!(
                "  {} ({}) target={:.1} steps={}",
                manifest.run_id,
                manifest.timestamp,
                manifest.config.target_temperature,
                manifest.steps
            );
        }
    }
    Ok(())
}

fn cmd_show_run(store_dir: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let store = RunStore::new(store_dir.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;
    let sim = sim_from_records(&store.load_timeseries(run_id)?);
    let cfg = &manifest.config;

    println!("\nRun Summary:");
    println!("  Created: {}", manifest.timestamp);
    println!(
        "  Gains: Kp = {}, Ki = {}, Kd = {}",
        cfg.gains.kp, cfg.gains.ki, cfg.gains.kd
    );
    println!(
        "  Target: {:.1}°C, initial: {:.1}°C",
        cfg.target_temperature, cfg.initial_temperature
    );
    println!("  Time points: {}", manifest.steps);
    if let (Some(first), Some(last)) = (sim.times.first(), sim.times.last()) {
        println!("  Time range: {:.3} - {:.3} s", first, last);
    }

    let metrics = compute_loop_metrics(&sim, cfg);
    print_metrics(&metrics);
    Ok(())
}

fn cmd_export_series(store_dir: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    let store = RunStore::new(store_dir.to_path_buf())?;
    let records = store.load_timeseries(run_id)?;

    if let Some(path) = output {
        let file = std::fs::File::create(path)?;
        export_csv(&records, io::BufWriter::new(file))?;
        println!(
            "✓ Exported {} data points to {}",
            records.len(),
            path.display()
        );
    } else {
        export_csv(&records, io::stdout().lock())?;
    }

    Ok(())
}
