use clap::Parser;
use env_logger::Env;
use interfero::{
    console::{Args, PartialArgs, SceneSource},
    diagnostics::Diagnostics,
    engine::{SolveResult, WaveOpticsEngine},
    error::{OpticsError, OpticsResult},
    network::OpticalNetwork,
    reporter::SolveReport,
    scene::Scene,
};

fn load_scene(args: &Args) -> OpticsResult<Scene> {
    match &args.source {
        SceneSource::Preset(preset) => Ok(preset.scene(&args.config.grid)),
        SceneSource::File(_) => args
            .scene_description()?
            .ok_or_else(|| OpticsError::Console("no scene description loaded".into()))?
            .to_scene(&args.config.grid),
    }
}

fn print_dot(scene: &Scene, args: &Args) {
    let Some(laser) = scene.laser.as_ref() else {
        return;
    };
    let mut diagnostics = Diagnostics::new();
    let network = OpticalNetwork::build(
        laser,
        &scene.components,
        &scene.blocked,
        &args.config,
        &mut diagnostics,
    );
    println!("{}", network.to_dot());
}

fn print_report(result: &SolveResult, engine: &WaveOpticsEngine) -> OpticsResult<()> {
    let report = SolveReport::new(result, engine.ledger());
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| OpticsError::Other(format!("serialization of report failed: {e}")))?;
    println!("{json}");
    Ok(())
}

fn main() -> OpticsResult<()> {
    //parse CLI arguments
    let args = Args::try_from(PartialArgs::parse())?;
    env_logger::init_from_env(Env::default().default_filter_or(if args.verbose {
        "info"
    } else {
        "warn"
    }));

    let mut scene = load_scene(&args)?;
    if args.dot {
        print_dot(&scene, &args);
    }

    //solve the scene once per tick, gold cells are only counted on their first hit
    let mut engine = WaveOpticsEngine::new(args.config.clone())?;
    let mut last = None;
    for _ in 0..args.ticks {
        last = Some(engine.solve_interferometer(&mut scene));
    }
    match last {
        Some(result) => print_report(&result, &engine),
        None => Err(OpticsError::Console("nothing was solved".into())),
    }
}
