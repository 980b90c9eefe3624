use anyhow::{anyhow, Result};
use log::info;
use pde_image_filter::config::Config;
use pde_image_filter::image_io::{load_image, save_image};
use pde_image_filter::{integrate_image_parallel, integrate_image_with_progress};
use std::env;
use std::time::Instant;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("Usage: pde-image-filter <config.toml>"))?;
    let config = Config::from_file(&config_path)?;
    config.log_summary();

    let input = load_image(&config.input)?;
    let (rows, cols, channels) = input.dim();
    info!("Loaded {}x{} image with {} channels", cols, rows, channels);

    let params = config.integration.params();
    let kind = config.filter.kind;
    let seed = config.filter.seed;
    let start = Instant::now();

    let output = if config.run.parallel_channels {
        info!(
            "Integrating {} channels in parallel, per-step progress is not reported",
            channels
        );
        // Distinct seeds per channel keep seeded runs reproducible.
        integrate_image_parallel(
            |channel| kind.build(seed.map(|s| s.wrapping_add(channel as u64))),
            input.view(),
            params,
        )?
    } else {
        let mut operator = kind.build(seed);
        let report_period = config.run.report_period;
        integrate_image_with_progress(&mut operator, input.view(), params, |p| {
            if p.iteration % report_period == 0 || p.iteration == p.nbiter {
                info!(
                    "Channel {}/{}: step {}/{}",
                    p.channel + 1,
                    p.channels,
                    p.iteration,
                    p.nbiter
                );
            }
        })?
    };

    info!("Filter complete in {:.2?}", start.elapsed());
    save_image(&output, &config.output)?;
    Ok(())
}
