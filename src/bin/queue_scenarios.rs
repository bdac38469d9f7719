use queuesim::{run_batch, BatchConfig, ConcurrencyMode, ScenarioConfig};
use std::error::Error;
use std::fs;

fn load_scenarios() -> Result<Vec<ScenarioConfig>, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(ScenarioConfig::reference_batch()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    println!("Fast Food Restaurant Queue Simulation\n");

    let scenarios = load_scenarios()?;
    let mode = match std::env::var("QUEUESIM_PARALLEL").as_deref() {
        Ok("1") => ConcurrencyMode::Rayon,
        _ => ConcurrencyMode::Sequential,
    };
    let batch = BatchConfig::new().with_concurrency(mode);

    let mut results = Vec::new();
    for (config, outcome) in scenarios.iter().zip(run_batch(&scenarios, &batch)) {
        match outcome {
            Ok(result) => {
                println!("{}\n", result);
                results.push(result);
            }
            Err(e) => {
                log::error!("[{}] {}", config.label, e);
                return Err(e.into());
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
