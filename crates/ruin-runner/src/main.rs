use ruin_sim::{SimulationConfig, load_config, run, run_batch};

mod report;

fn print_help() {
    eprintln!(
        r#"Ruin Simulator - traders, exchanges and the risk of ruin

USAGE:
    ruin-sim [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --seed <N>          Override the random seed
    --steps <N>         Override the number of steps
    --batch <N>         Run N seeds (seed, seed+1, ...) and summarise
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run with defaults
    ruin-sim

    # Run with config file
    ruin-sim --config ruin.json

    # Explosion frequencies over 500 seeds
    ruin-sim --batch 500
"#
    );
}

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    config_path: Option<String>,
    seed: Option<u64>,
    steps: Option<u64>,
    batch: Option<u64>,
}

fn parse_args() -> Result<Option<Args>, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(None),
            "--config" | "-c" | "--seed" | "--steps" | "--batch" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires an argument", flag))?;
                match flag {
                    "--config" | "-c" => parsed.config_path = Some(value.clone()),
                    _ => {
                        let n: u64 = value
                            .parse()
                            .map_err(|_| format!("{} expects an integer, got {}", flag, value))?;
                        match flag {
                            "--seed" => parsed.seed = Some(n),
                            "--steps" => parsed.steps = Some(n),
                            _ => parsed.batch = Some(n),
                        }
                    }
                }
            }
            arg => return Err(format!("Unknown argument: {}", arg)),
        }
        i += 1;
    }

    Ok(Some(parsed))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_help();
            return Ok(());
        }
        Err(msg) => {
            eprintln!("Error: {}", msg);
            print_help();
            std::process::exit(1);
        }
    };

    let mut config = match &args.config_path {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(steps) = args.steps {
        config.num_steps = steps;
    }

    match args.batch {
        Some(runs) => {
            let first = config.seed.unwrap_or(0);
            log::info!("Running batch of {} seeds starting at {}", runs, first);
            let summary = run_batch(&config, first..first.saturating_add(runs))?;

            println!("=======================================================");
            println!("  Ruin Simulation - Batch Summary");
            println!("=======================================================");
            println!();
            summary.print();
        }
        None => {
            let history = run(config.clone())?;
            report::print_run(&config, &history);
        }
    }

    Ok(())
}
