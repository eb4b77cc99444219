// Fillet RRT through an ordered list of waypoints
//
// usage: fillet_rrt [scenario.toml] [--plot <file.png|file.svg>] [--show] [--seed <n>]

use std::env;
use std::path::PathBuf;

use log::{error, info};

use fillet_rrt::utils::{LoggingObserver, Visualizer};
use fillet_rrt::{FilletRrt, PlannerError, PlannerResult, Scenario};

struct Args {
    scenario: PathBuf,
    plot: Option<String>,
    show: bool,
    seed: Option<u64>,
}

fn parse_args() -> PlannerResult<Args> {
    let crate_dir = option_env!("CARGO_MANIFEST_DIR").unwrap_or(".");
    let mut args = Args {
        scenario: PathBuf::from(format!("{}/config/scenario.toml", crate_dir)),
        plot: None,
        show: false,
        seed: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plot" => {
                let path = iter
                    .next()
                    .ok_or_else(|| PlannerError::InvalidParameter("--plot needs a file name".to_string()))?;
                args.plot = Some(path);
            }
            "--show" => args.show = true,
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| PlannerError::InvalidParameter("--seed needs a value".to_string()))?;
                let seed = value
                    .parse()
                    .map_err(|_| PlannerError::InvalidParameter(format!("invalid seed: {}", value)))?;
                args.seed = Some(seed);
            }
            _ => args.scenario = PathBuf::from(arg),
        }
    }
    Ok(args)
}

fn run() -> PlannerResult<()> {
    let args = parse_args()?;
    let scenario = Scenario::load(&args.scenario)?;
    info!("loaded scenario {}", args.scenario.display());

    let seed = args.seed.unwrap_or(scenario.seed);
    let mut planner = FilletRrt::new(&scenario.map, scenario.planner.clone(), seed);
    planner.set_observer(Box::new(LoggingObserver::new()));

    let route = planner.solve(scenario.start, scenario.direct_hit)?;
    println!("route ({} points):", route.len());
    for (i, p) in route.iter().enumerate() {
        println!("{:3}: N {:9.2}  E {:9.2}  D {:8.2}", i, p.n, p.e, p.d);
    }

    if args.plot.is_some() || args.show {
        let mut vis = Visualizer::new();
        vis.set_title("Fillet RRT")
            .plot_boundary(&scenario.map.boundary)
            .plot_cylinders(&scenario.map.cylinders)
            .plot_forest(planner.forest())
            .plot_route(&route)
            .plot_start(scenario.start.position)
            .plot_waypoints(&scenario.map.waypoints);
        if let Some(path) = args.plot {
            if path.ends_with(".svg") {
                vis.save_svg(&path)?;
            } else {
                vis.save_png(&path, 800, 800)?;
            }
            info!("plot saved to {}", path);
        }
        if args.show {
            vis.show()?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
