//! morphoset CLI — Procrustes alignment and landmark subset combination.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use morphoset::{GpaConfig, LandmarkSet, SlideCriterion, SubsetsDocument};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "morphoset")]
#[command(about = "Align landmark configurations and combine separately aligned landmark subsets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generalized Procrustes analysis of a landmark document.
    Gpa(CliGpaArgs),

    /// Combine the subsets of a subsets document.
    Combine(CliCombineArgs),

    /// Print shape and centroid-size summary of a landmark document.
    Info {
        /// Path to a `morphoset.landmarks.v1` document.
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliGpaArgs {
    /// Path to a `morphoset.landmarks.v1` document.
    #[arg(long)]
    input: PathBuf,

    /// Path to write the alignment result (JSON).
    #[arg(long)]
    out: PathBuf,

    /// GPA configuration (JSON); command-line flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of superimposition iterations.
    #[arg(long)]
    max_iter: Option<usize>,

    /// Convergence threshold on the squared consensus change.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Keep the orientation of the first specimen instead of principal axes.
    #[arg(long)]
    no_principal_axes: bool,

    /// Skip the tangent-space projection.
    #[arg(long)]
    no_projection: bool,

    /// Slide semilandmarks by Procrustes distance instead of bending energy.
    #[arg(long)]
    procrustes_distance: bool,
}

#[derive(Debug, Clone, Args)]
struct CliCombineArgs {
    /// Path to a `morphoset.subsets.v1` document.
    #[arg(long)]
    input: PathBuf,

    /// Path to write the combined configuration (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Use raw coordinates without aligning each subset.
    #[arg(long)]
    no_align: bool,

    /// Maximum number of superimposition iterations per subset.
    #[arg(long)]
    max_iter: Option<usize>,

    /// Convergence threshold on the squared consensus change.
    #[arg(long)]
    tolerance: Option<f64>,
}

#[derive(Debug, Clone, Default)]
struct GpaOverrides {
    max_iter: Option<usize>,
    tolerance: Option<f64>,
    principal_axes: Option<bool>,
    project_tangent: Option<bool>,
    slide_criterion: Option<SlideCriterion>,
}

impl GpaOverrides {
    fn apply(&self, config: &mut GpaConfig) {
        if let Some(v) = self.max_iter {
            config.max_iter = v;
        }
        if let Some(v) = self.tolerance {
            config.tolerance = v;
        }
        if let Some(v) = self.principal_axes {
            config.principal_axes = v;
        }
        if let Some(v) = self.project_tangent {
            config.project_tangent = v;
        }
        if let Some(v) = self.slide_criterion {
            config.slide_criterion = v;
        }
    }
}

impl CliGpaArgs {
    fn to_overrides(&self) -> GpaOverrides {
        GpaOverrides {
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            principal_axes: self.no_principal_axes.then_some(false),
            project_tangent: self.no_projection.then_some(false),
            slide_criterion: self
                .procrustes_distance
                .then_some(SlideCriterion::ProcrustesDistance),
        }
    }
}

impl CliCombineArgs {
    fn to_overrides(&self) -> GpaOverrides {
        GpaOverrides {
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            ..GpaOverrides::default()
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Gpa(args) => run_gpa(&args),
        Commands::Combine(args) => run_combine(&args),
        Commands::Info { input } => run_info(&input),
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
        .map_err(|e| -> CliError { format!("Failed to write {}: {}", path.display(), e).into() })
}

// ── gpa ────────────────────────────────────────────────────────────────

fn load_gpa_config(path: Option<&Path>) -> CliResult<GpaConfig> {
    let Some(path) = path else {
        return Ok(GpaConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .map_err(|e| -> CliError { format!("Failed to read {}: {}", path.display(), e).into() })?;
    Ok(serde_json::from_str(&data)?)
}

fn run_gpa(args: &CliGpaArgs) -> CliResult<()> {
    tracing::info!("Loading landmarks: {}", args.input.display());
    let set = LandmarkSet::from_json_file(&args.input)?;
    tracing::info!(
        "{} specimens x {} landmarks x {} dimensions",
        set.n_specimens(),
        set.n_landmarks(),
        set.n_dims()
    );

    let mut config = load_gpa_config(args.config.as_deref())?;
    args.to_overrides().apply(&mut config);

    let result = morphoset::generalized_procrustes(&set, &config)?;
    let mean_distance = result.procrustes_distances.mean().unwrap_or(0.0);
    tracing::info!(
        "GPA: {} iterations, converged={}, mean Procrustes distance={:.4}",
        result.iterations,
        result.converged,
        mean_distance
    );

    write_json(&args.out, &result)?;
    tracing::info!("Results written to {}", args.out.display());
    Ok(())
}

// ── combine ────────────────────────────────────────────────────────────

fn run_combine(args: &CliCombineArgs) -> CliResult<()> {
    tracing::info!("Loading subsets: {}", args.input.display());
    let mut doc = SubsetsDocument::from_json_file(&args.input)?;
    if args.no_align {
        doc.combine.align_first = false;
    }
    args.to_overrides().apply(&mut doc.combine.gpa);

    let combined = doc.combine()?;
    for (name, count) in combined
        .subset_names()
        .iter()
        .zip(combined.landmark_counts_per_subset())
    {
        tracing::info!("  subset '{}': {} landmarks", name, count);
    }

    write_json(&args.out, &combined)?;
    tracing::info!("Results written to {}", args.out.display());
    Ok(())
}

// ── info ───────────────────────────────────────────────────────────────

fn run_info(input: &Path) -> CliResult<()> {
    let set = LandmarkSet::from_json_file(input)?;
    let sizes = set.centroid_sizes();
    let min = sizes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sizes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    println!("{}", input.display());
    println!("  specimens:      {}", set.n_specimens());
    println!("  landmarks:      {}", set.n_landmarks());
    println!("  dimensions:     {}", set.dimension_labels().join(", "));
    println!(
        "  centroid size:  min {:.4}  mean {:.4}  max {:.4}",
        min,
        sizes.mean().unwrap_or(0.0),
        max
    );
    Ok(())
}
