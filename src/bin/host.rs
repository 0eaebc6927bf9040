//! Host renderer: opens the window, runs the widget process and drives the
//! `input poll -> tick -> refresh -> draw` loop.

use std::path::PathBuf;

use clap::Parser;
use macroquad::input::{is_quit_requested, prevent_quit};
use macroquad::window::{next_frame, screen_height, screen_width, Conf};
use tracing::{error, info, warn};

use ply_grid::env::Environment;
use ply_grid::errors::{Error, Result};
use ply_grid::host::Host;
use ply_grid::logging::init_logging;
use ply_grid::math::Vec2i;
use ply_grid::renderer::Renderer;

#[derive(Parser, Debug)]
#[command(name = "ply-grid-host", about = "Renders a ply-grid widget process")]
struct Args {
    /// Widget executable. Defaults to `ply-grid-demo` next to this binary.
    #[arg(long)]
    widget: Option<PathBuf>,
    /// Persisted scroll, resize and dialog state.
    #[arg(long, default_value = "ply-grid-settings.json")]
    settings: PathBuf,
    /// Initial DPI; one cell is `dpi / 2.5` pixels.
    #[arg(long)]
    dpi: Option<i32>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "ply-grid".to_owned(),
        window_width: 1024,
        window_height: 720,
        high_dpi: true,
        window_resizable: true,
        ..Default::default()
    }
}

fn default_widget() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.with_file_name(format!("ply-grid-demo{}", std::env::consts::EXE_SUFFIX)))
}

async fn run(args: Args) -> Result<()> {
    let mut env = Environment::default();
    if let Some(dpi) = args.dpi {
        env.dpi = dpi;
        env.sanitize();
    }
    let widget = match args.widget {
        Some(path) => path,
        None => default_widget()?,
    };
    if !widget.exists() {
        return Err(Error::Process(format!("widget executable {} not found", widget.display())));
    }

    let window = Vec2i::new(screen_width() as i32, screen_height() as i32);
    let mut host = Host::spawn(&widget, Some(args.settings), env, window)?;
    let mut renderer = Renderer::new(None);
    prevent_quit();

    while !is_quit_requested() {
        let cell = host.env.cell_px();
        let raw = renderer.poll_input(&mut host.interaction, cell);
        let out = host.tick(&raw, renderer.measure())?;
        renderer.sync_clipboard(&host.interaction);
        renderer.set_cursor(out.cursor);
        renderer.invalidate(&host.take_damage());

        let (frame, interaction, env) = host.parts_mut();
        renderer.draw(frame, interaction, env, out.tooltip.as_ref()).await;
        next_frame().await;
    }

    info!("window closed");
    if let Err(err) = host.save() {
        warn!(%err, "failed to save");
    }
    let code = host.exit()?;
    info!(?code, "widget process exited");
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    init_logging();
    let args = Args::parse();
    if let Err(err) = run(args).await {
        error!(%err, "host stopped");
        std::process::exit(1);
    }
}
