use aberration_assets::{LayerState, TextureSet};
use aberration_common::{LayerId, LayerVisibility, ObserverVelocity, SkyConfig};
use aberration_geometry::{GridMesh, SphereMesh, grid_line_count};
use aberration_render::aberration::{aberrate, direction_to_texcoord, lorentz_factor};
use aberration_render::{DebugTextRenderer, DrawOutcome, FrameParams, READY_THRESHOLD, Renderer};
use aberration_render_wgpu::SkyCamera;
use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::DVec3;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aberration-cli", about = "Inspect and dry-run the relativistic sky")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the active configuration
    Info,
    /// Build the sphere and grid meshes and report their sizes
    Mesh {
        #[arg(long)]
        n_lon: Option<u32>,
        #[arg(long)]
        n_lat: Option<u32>,
        /// Grid longitude step in degrees
        #[arg(long)]
        lon_step: Option<f64>,
        /// Grid latitude step in degrees
        #[arg(long)]
        lat_step: Option<f64>,
    },
    /// Apparent position of a sky direction for a moving observer
    Aberrate {
        /// Speed as a fraction of c
        #[arg(long, default_value = "0.5")]
        beta: f64,
        /// Longitude of the motion direction in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        motion_lon: f64,
        /// Latitude of the motion direction in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        motion_lat: f64,
        /// Longitude of the observed direction in degrees
        #[arg(long, default_value = "90", allow_hyphen_values = true)]
        lon: f64,
        /// Latitude of the observed direction in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        lat: f64,
    },
    /// Dry-run one frame with a given number of loaded layers
    Plan {
        /// Loaded texture layers
        #[arg(long, default_value = "2")]
        ready: usize,
        #[arg(long, default_value = "0")]
        beta: f64,
        /// Hide the grid layer
        #[arg(long)]
        no_grid: bool,
    },
    /// Decode every configured texture and report which layers load
    Textures {
        /// Directory relative texture paths are resolved against
        #[arg(long, default_value = ".")]
        assets_dir: PathBuf,
        /// Seconds to wait for decoding
        #[arg(long, default_value = "30")]
        timeout: u64,
    },
}

fn unit_direction(lon_deg: f64, lat_deg: f64) -> DVec3 {
    let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
    DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => SkyConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SkyConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("aberration-cli v{}", env!("CARGO_PKG_VERSION"));
            let s = &config.sphere;
            println!(
                "sphere: {}x{} cells, a={:.3} b={:.3}",
                s.n_lon, s.n_lat, s.equatorial_radius, s.polar_radius
            );
            println!(
                "grid: {} x {} degrees, color {:?}",
                config.grid.lon_step_deg, config.grid.lat_step_deg, config.grid.color
            );
            println!("ready threshold: {READY_THRESHOLD} layers");
            for layer in LayerId::ALL {
                println!(
                    "  unit {} {:<15} weight {:.1} visible {:<5} {}",
                    layer.unit(),
                    layer.name(),
                    layer.weight(),
                    config.display.is_visible(layer),
                    config.textures.path(layer).display()
                );
            }
        }
        Commands::Mesh {
            n_lon,
            n_lat,
            lon_step,
            lat_step,
        } => {
            let s = &config.sphere;
            let g = &config.grid;
            let (n_lon, n_lat) = (n_lon.unwrap_or(s.n_lon), n_lat.unwrap_or(s.n_lat));
            let (lon_step, lat_step) = (
                lon_step.unwrap_or(g.lon_step_deg),
                lat_step.unwrap_or(g.lat_step_deg),
            );

            let sphere = SphereMesh::build(n_lon, n_lat, s.equatorial_radius, s.polar_radius)?;
            println!(
                "sphere: {n_lon}x{n_lat} cells, {} vertices ({} triangles)",
                sphere.vertex_count(),
                sphere.vertex_count() / 3
            );

            let lines = grid_line_count(lon_step, lat_step)?;
            let grid = GridMesh::build(
                lon_step,
                lat_step,
                s.equatorial_radius,
                s.polar_radius,
                g.color,
            )?;
            println!(
                "grid: {lon_step} x {lat_step} degrees, {lines} lines, {} vertices",
                grid.vertex_count()
            );
        }
        Commands::Aberrate {
            beta,
            motion_lon,
            motion_lat,
            lon,
            lat,
        } => {
            let velocity = ObserverVelocity::new(beta, motion_lon, motion_lat)?;
            let pu = unit_direction(lon, lat);
            let su = aberrate(pu, velocity.cartesian());
            let apparent_lon = su.y.atan2(su.x).to_degrees();
            let apparent_lat = su.z.clamp(-1.0, 1.0).asin().to_degrees();
            let uv = direction_to_texcoord(su);

            println!("beta={beta} gamma={:.6}", lorentz_factor(beta));
            println!("rest:     lon={lon:.4} lat={lat:.4}");
            println!("apparent: lon={apparent_lon:.4} lat={apparent_lat:.4}");
            println!(
                "shift: {:.4} degrees, texcoord=({:.6}, {:.6})",
                pu.angle_between(su).to_degrees(),
                uv.x,
                uv.y
            );
        }
        Commands::Plan {
            ready,
            beta,
            no_grid,
        } => {
            let s = &config.sphere;
            let g = &config.grid;
            let sphere = SphereMesh::build(s.n_lon, s.n_lat, s.equatorial_radius, s.polar_radius)?;
            let lines = grid_line_count(g.lon_step_deg, g.lat_step_deg)?;

            let mut renderer = DebugTextRenderer::new(sphere.vertex_count(), 2 * lines);
            renderer.set_ready_count(ready);

            let camera = SkyCamera::from_config(&config.camera, 16.0 / 9.0);
            let mut visibility: LayerVisibility = config.display;
            if no_grid {
                visibility.grid = false;
            }
            let frame = FrameParams {
                view_proj: camera.view_projection(),
                velocity: ObserverVelocity::new(beta, camera.lon_deg - 180.0, camera.lat_deg)?,
                visibility,
            };

            let mut out = String::new();
            match renderer.render(&mut out, &frame) {
                DrawOutcome::Drawn => print!("{out}"),
                DrawOutcome::Skipped(reason) => println!("skipped: {reason}"),
            }
        }
        Commands::Textures {
            assets_dir,
            timeout,
        } => {
            let paths = config.textures.rebased(&assets_dir);
            let mut set = TextureSet::new();
            set.request_all(&paths);
            let loaded = set.wait(Duration::from_secs(timeout));
            for image in &loaded {
                println!(
                    "{:<15} {}x{} ({} mips)",
                    image.layer().name(),
                    image.width(),
                    image.height(),
                    image.mip_count()
                );
            }
            for layer in LayerId::ALL {
                if set.state(layer) != LayerState::Loaded {
                    println!("{:<15} pending: {}", layer.name(), paths.path(layer).display());
                }
            }
            println!(
                "ready: {} of {} (draw gate {})",
                set.ready_count(),
                LayerId::ALL.len(),
                if set.is_ready(READY_THRESHOLD) { "open" } else { "closed" }
            );
        }
    }

    Ok(())
}
