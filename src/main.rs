use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use julia_render::{
    cli::{
        merge_animation, output_path, Cli, Command, DEFAULT_ANIMATION_FILE, DEFAULT_STILL_FILE,
    },
    config, render_animation, render_still,
};

fn run(cli: Cli) -> Result<()> {
    let config = config::load_or_default(cli.config.as_deref())?;
    debug!("config: {:?}", config);

    match cli.command {
        Command::Still { render, output } => {
            let params = render.merge(&config);
            let path = output_path(&config.images_dir, output.as_ref(), DEFAULT_STILL_FILE);
            render_still(&params, &path)
                .with_context(|| format!("Render still image {}", path.display()))?;
            println!("{}", path.display());
        }
        Command::Animate {
            render,
            frames,
            interval,
            frame_size,
            in_flight,
            output,
        } => {
            let params = render.merge(&config);
            let animation = merge_animation(&config, frames, interval, frame_size, in_flight);
            let path = output_path(
                &config.animations_dir,
                output.as_ref(),
                DEFAULT_ANIMATION_FILE,
            );
            render_animation(&params, &animation, &path)
                .with_context(|| format!("Render animation {}", path.display()))?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
