use clap::Parser;
use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use roadforge::network::{NetworkBudget, NetworkGenerator};
use roadforge::search::{EdgeKind, SearchEngine, SearchTuning, Waypoint};
use roadforge::terrain::GridPos;
use roadforge::terrain_generation::get_terrain_preset;
use roadforge::{config, RoadforgeError, RoadforgeResult, TerrainData};
use std::path::PathBuf;

/// Generate a road network over procedural terrain and print the routes
#[derive(Parser, Debug)]
#[command(name = "roadforge", version, about)]
struct Args {
    /// Terrain preset: flat, hills, mountains or valleys
    #[arg(long, default_value = "hills")]
    preset: String,

    /// Terrain width in cells
    #[arg(long, default_value_t = 128)]
    width: u32,

    /// Terrain height in cells
    #[arg(long, default_value_t = 128)]
    height: u32,

    /// World units per cell
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Seed for terrain synthesis, site placement and span sampling
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Elevation at or below which cells become open water
    #[arg(long, default_value_t = -3.0, allow_hyphen_values = true)]
    sea_level: f32,

    /// Number of sites to place and connect
    #[arg(long, default_value_t = 5)]
    sites: usize,

    /// Explicit start cell; with --goal, routes one link instead of a network
    #[arg(long, num_args = 2, value_names = ["X", "Z"], allow_hyphen_values = true)]
    start: Option<Vec<i32>>,

    /// Explicit goal cell, paired with --start
    #[arg(long, num_args = 2, value_names = ["X", "Z"], allow_hyphen_values = true)]
    goal: Option<Vec<i32>>,

    /// Priority tier index into the profile set
    #[arg(long, default_value_t = 1)]
    tier: usize,

    /// Search expansions per frontier per tick
    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    /// Tick budget per link before it counts as failed
    #[arg(long, default_value_t = 50_000)]
    max_ticks: usize,

    /// Profiles TOML file; defaults to the user config dir, then built-ins
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Write the synthesized terrain to a file
    #[arg(long)]
    save_terrain: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> RoadforgeResult<()> {
    let profiles = match &args.profiles {
        Some(path) => config::load_profiles_from(path)?,
        None => config::load_profiles(),
    };

    let generator = get_terrain_preset(&args.preset, args.seed as u32, args.sea_level)?;
    let terrain = generator.generate(args.width, args.height, args.scale)?;
    info!(
        "Terrain '{}' generated: {}x{} cells, {} under water",
        args.preset,
        terrain.width,
        terrain.height,
        terrain.water.iter().filter(|&&w| w).count()
    );
    if let Some(path) = &args.save_terrain {
        terrain.save_to_file(path)?;
        println!("Terrain saved to {}", path.display());
    }

    if let (Some(start), Some(goal)) = (&args.start, &args.goal) {
        let start = GridPos::new(start[0], start[1]);
        let goal = GridPos::new(goal[0], goal[1]);
        let mut engine = SearchEngine::new(profiles, SearchTuning::default(), args.seed);
        engine.start_search(&terrain, start, goal, args.tier)?;
        let state = engine.run_to_completion(&terrain, args.batch_size, args.max_ticks);
        match engine.solution() {
            Some(waypoints) => {
                println!("Route: {} waypoints", waypoints.len());
                print_waypoints(&terrain, waypoints);
            }
            None => println!(
                "No route from ({}, {}) to ({}, {}): {state:?}",
                start.x, start.z, goal.x, goal.z
            ),
        }
        return Ok(());
    }

    let sites = place_sites(&terrain, args.sites, args.seed)?;
    let budget = NetworkBudget {
        batch_size: args.batch_size,
        max_ticks: args.max_ticks,
    };
    let network = NetworkGenerator::new(profiles, SearchTuning::default(), budget, args.seed)
        .generate(&terrain, &sites, args.tier)?;

    println!(
        "{} sites, {} routes, {} junctions, {} failed links",
        sites.len(),
        network.routes.len(),
        network.junctions.len(),
        network.failed_links.len()
    );
    for (i, route) in network.routes.iter().enumerate() {
        let bridges = route
            .waypoints
            .iter()
            .filter(|w| w.kind == EdgeKind::Bridge)
            .count();
        let tunnels = route
            .waypoints
            .iter()
            .filter(|w| w.kind == EdgeKind::Tunnel)
            .count();
        println!(
            "Route {i}: {} waypoints ({bridges} bridge, {tunnels} tunnel)",
            route.waypoints.len()
        );
        print_waypoints(&terrain, &route.waypoints);
    }
    for (from, to) in &network.failed_links {
        println!(
            "Failed: ({}, {}) -> ({}, {})",
            from.x, from.z, to.x, to.z
        );
    }
    Ok(())
}

fn print_waypoints(terrain: &TerrainData, waypoints: &[Waypoint]) {
    for waypoint in waypoints {
        let world = waypoint.world_position(terrain);
        println!(
            "  ({:8.2}, {:7.2}, {:8.2}) {:?}",
            world.x, world.y, world.z, waypoint.kind
        );
    }
}

/// Pick distinct dry cells away from the terrain border. Bails out when the
/// terrain is mostly water rather than looping forever.
fn place_sites(terrain: &TerrainData, count: usize, seed: u64) -> RoadforgeResult<Vec<GridPos>> {
    let margin = 4u32.min(terrain.width / 4).min(terrain.height / 4);
    let mut rng = Pcg64::seed_from_u64(seed.wrapping_add(1));
    let mut sites: Vec<GridPos> = Vec::with_capacity(count);
    let mut attempts = 0usize;

    while sites.len() < count {
        attempts += 1;
        if attempts > count * 1000 {
            return Err(RoadforgeError::InvalidTerrainData {
                reason: format!("could not place {count} dry sites"),
            });
        }
        let x = rng.gen_range(margin..terrain.width - margin) as i32;
        let z = rng.gen_range(margin..terrain.height - margin) as i32;
        let site = GridPos::new(x, z);
        let dry = terrain
            .water_at_grid(x as u32, z as u32)
            .is_some_and(|w| !w);
        if dry && !sites.contains(&site) {
            sites.push(site);
        }
    }
    Ok(sites)
}
