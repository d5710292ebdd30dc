//! Tessera CLI - quality triangle mesh generation.
//!
//! Usage: tessera <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `tessera --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};

use tessera::algo::{
    make_constrained_delaunay, refine_with_progress, relax, smooth_with_progress, triangulate,
    InsertionPoint, Progress, RefineOptions, RelaxOptions, SmoothOptions,
};
use tessera::io::{self, xy};
use tessera::mesh::Mesh;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about = "Quality triangle mesh generator", long_about = None)]
struct Cli {
    /// Log progress details (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh a polygon and save the result
    Mesh {
        /// Input polygon file (.xy)
        input: PathBuf,

        /// Output mesh file (.obj or .eps)
        output: PathBuf,

        /// Maximum face area
        #[arg(short = 'a', long)]
        max_area: Option<f64>,

        /// Minimum angle in degrees (enables refinement)
        #[arg(short = 'q', long)]
        min_angle: Option<f64>,

        /// Insert off-centers instead of circumcenters
        #[arg(long)]
        offcenter: bool,

        /// Relax node degrees after refinement
        #[arg(long)]
        relax: bool,

        /// Smooth interior nodes with this method
        #[arg(short, long, value_enum)]
        smooth: Option<SmoothMethod>,

        /// Number of smoothing passes
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Display polygon and mesh information
    Info {
        /// Input polygon file (.xy)
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SmoothMethod {
    /// Uniform Laplacian smoothing
    Laplacian,
    /// Bossen-Heckbert particle forces
    BossenHeckbert,
    /// Inverse element quality weighting
    ElementQuality,
    /// Target edge length
    EdgeLength,
}

impl From<SmoothMethod> for tessera::algo::SmoothMethod {
    fn from(method: SmoothMethod) -> Self {
        match method {
            SmoothMethod::Laplacian => Self::Laplacian,
            SmoothMethod::BossenHeckbert => Self::BossenHeckbert,
            SmoothMethod::ElementQuality => Self::ElementQuality,
            SmoothMethod::EdgeLength => Self::EdgeLength,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from warnings upwards.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Mesh {
            input,
            output,
            max_area,
            min_angle,
            offcenter,
            relax,
            smooth,
            iterations,
            sequential,
        } => {
            let options = MeshCommand {
                max_area,
                min_angle,
                offcenter,
                relax,
                smooth,
                iterations,
                sequential,
            };
            cmd_mesh(&input, &output, &options)?;
        }

        Commands::Info { input } => {
            cmd_info(&input)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0)); // Track highest percent seen (monotonic)

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // The refinement total is an estimate that grows, so only ever move forward.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }
        let percent = raw_percent;

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

struct MeshCommand {
    max_area: Option<f64>,
    min_angle: Option<f64>,
    offcenter: bool,
    relax: bool,
    smooth: Option<SmoothMethod>,
    iterations: usize,
    sequential: bool,
}

fn cmd_mesh(input: &Path, output: &Path, options: &MeshCommand) -> Result<(), Box<dyn std::error::Error>> {
    let polygon = xy::load_polygon(input)?;
    println!("Loaded: {} vertices", polygon.len());

    let start = Instant::now();
    let mut mesh = triangulate(&polygon)?;
    let swaps = make_constrained_delaunay(&mut mesh)?;
    println!(
        "Triangulated: {} faces, {} swaps ({:.2?})",
        mesh.num_faces(),
        swaps,
        start.elapsed()
    );

    if options.max_area.is_some() || options.min_angle.is_some() {
        let mut refine_options = RefineOptions::default();
        if let Some(max_area) = options.max_area {
            refine_options = refine_options.with_max_area(max_area);
        }
        if let Some(min_angle) = options.min_angle {
            refine_options = refine_options.with_min_angle_degrees(min_angle);
        }
        if options.offcenter {
            refine_options = refine_options.with_insertion(InsertionPoint::OffCenter);
        }

        let start = Instant::now();
        let progress = create_progress();
        let stats = refine_with_progress(&mut mesh, &refine_options, &progress)?;
        progress.report(stats.steiner_points, stats.steiner_points, "refined");
        println!(
            "Refined: {} Steiner points, {} skipped faces ({:.2?})",
            stats.steiner_points,
            stats.skipped_faces,
            start.elapsed()
        );
    }

    if options.relax {
        let start = Instant::now();
        let stats = relax(&mut mesh, &RelaxOptions::default())?;
        println!(
            "Relaxed: {} swaps, {} collapses ({:.2?})",
            stats.swaps,
            stats.collapses,
            start.elapsed()
        );
    }

    if let Some(method) = options.smooth {
        let target_area = options
            .max_area
            .unwrap_or_else(|| mesh.total_area() / mesh.num_faces().max(1) as f64);
        let smooth_options = SmoothOptions::default()
            .with_method(method.into())
            .with_iterations(options.iterations)
            .with_target_area(target_area)
            .with_parallel(!options.sequential);

        let mode = if options.sequential { "sequential" } else { "parallel" };
        info!("smoothing with target area {} ({})", target_area, mode);
        let start = Instant::now();
        smooth_with_progress(&mut mesh, &smooth_options, &create_progress())?;
        println!(
            "Smoothed: {} passes, {} ({:.2?})",
            options.iterations,
            mode,
            start.elapsed()
        );
    }

    print_mesh_stats(&mesh);
    io::save(&mesh, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let polygon = xy::load_polygon(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", polygon.len());
    println!("Area: {:.6}", polygon.signed_area());
    println!("Perimeter: {:.6}", polygon.perimeter());
    if let Some((min, max)) = tessera::geometry::bounding_box(polygon.points()) {
        println!(
            "Bounding box: ({:.3}, {:.3}) to ({:.3}, {:.3})",
            min.x, min.y, max.x, max.y
        );
    }

    let mut mesh = triangulate(&polygon)?;
    println!("\nTriangulation:");
    print_mesh_stats(&mesh);

    let swaps = make_constrained_delaunay(&mut mesh)?;
    println!("\nConstrained Delaunay ({} swaps):", swaps);
    print_mesh_stats(&mesh);

    Ok(())
}

fn print_mesh_stats(mesh: &Mesh) {
    println!("Nodes: {}", mesh.num_nodes());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());

    let (min_area, max_area) = mesh
        .face_ids()
        .map(|f| mesh.face_area(f))
        .fold((f64::MAX, 0.0_f64), |(lo, hi), a| (lo.min(a), hi.max(a)));
    if mesh.num_faces() > 0 {
        println!("Face area range: [{:.6}, {:.6}]", min_area, max_area);
    }
    if let Some(angle) = mesh.smallest_angle() {
        println!("Smallest angle: {:.2} deg", angle.to_degrees());
    }
}
