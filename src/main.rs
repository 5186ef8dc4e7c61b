use clap::Parser;
use cymatics::{app, config};

fn main() -> eframe::Result<()> {
    let cli = config::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let params = cli.params();
    let flags = cli.flags();
    log::info!(
        "starting in {:?} mode, n={} m={} amplitude={} particles={}",
        params.mode,
        params.frequency_n,
        params.frequency_m,
        params.amplitude,
        params.particle_count
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([900.0, 620.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cymatics",
        options,
        Box::new(move |cc| Ok(Box::new(app::CymaticsApp::new(cc, params, flags, cli.seed)))),
    )
}
