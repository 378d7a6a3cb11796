use std::time::Duration;

use cli::Command;
use config::AppConfig;
use egui_winit::winit::{
    dpi::PhysicalSize,
    event_loop::{EventLoop, EventLoopBuilder, EventLoopWindowTarget},
    window::{Window, WindowBuilder},
};
use event_loop::EventLoopEx;
use gpu_context::GpuContext;
use samples::{Sample, SampleKind};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

mod cli;
mod color;
mod config;
mod event_loop;
mod gpu_context;
mod gpu_resources;
mod gui;
mod samples;
mod screenshot;

// Samples
use samples::{text_editor::TextEditorSample, texture::TextureSample, triangle::Triangle};

pub(crate) type Result<T> = color_eyre::eyre::Result<T>;
pub(crate) type Error = color_eyre::eyre::Report;

fn main() -> Result<()> {
    let args = cli::ParsedArgs::parse_args();
    setup_tracing(args.log_level.to_string())?;

    let config = match &args.config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match args.command {
        Command::Run { sample } => create_sample(sample, config, Mode::Interactive),
        Command::Benchmark { sample, secs } => {
            create_sample(sample, config, Mode::Benchmark { secs })
        }
        Command::List => {
            for kind in SampleKind::ALL {
                println!("{:<12} {}", kind.cli_name(), kind.name());
            }
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Interactive,
    Benchmark { secs: u32 },
}

/// Picks the concrete sample for `kind` and hands it to the host loop.
fn create_sample(kind: SampleKind, config: AppConfig, mode: Mode) -> Result<()> {
    match kind {
        SampleKind::Triangle => launch::<Triangle>(config, mode),
        SampleKind::Texture => launch::<TextureSample>(config, mode),
        SampleKind::TextEditor => launch::<TextEditorSample>(config, mode),
    }
}

fn launch<S: Sample>(config: AppConfig, mode: Mode) -> Result<()> {
    match mode {
        Mode::Interactive => run::<S>(config),
        Mode::Benchmark { secs } => benchmark::<S>(config, secs),
    }
}

#[derive(Debug, Clone, Copy)]
enum BenchmarkMsg {
    Stop,
}

fn build_window<S: Sample, T>(config: &AppConfig, event_loop: &EventLoop<T>) -> Result<Window> {
    let desired = config.apply_window_override(S::desired_settings(true));
    let mut builder = WindowBuilder::new().with_title(format!("Ming | {}", S::NAME));
    if let (Some(width), Some(height)) = (desired.window_width, desired.window_height) {
        builder = builder.with_inner_size(PhysicalSize::new(width, height));
    }
    Ok(builder.build(event_loop)?)
}

fn benchmark<S: Sample>(mut config: AppConfig, secs: u32) -> Result<()> {
    config.vsync = false;
    let t = Duration::from_secs(secs as u64);

    let event_loop = EventLoopBuilder::<BenchmarkMsg>::with_user_event().build()?;
    let event_loop_proxy = event_loop.create_proxy();
    let window = build_window::<S, _>(&config, &event_loop)?;

    // spawn a thread that will close the window in `t` seconds
    std::thread::spawn(move || {
        std::thread::sleep(t);
        if event_loop_proxy.send_event(BenchmarkMsg::Stop).is_err() {
            tracing::warn!("Event loop closed before the benchmark finished");
        }
    });

    let user_event_handler: fn(BenchmarkMsg, &EventLoopWindowTarget<BenchmarkMsg>) =
        |event, control_flow| match event {
            BenchmarkMsg::Stop => {
                info!("Benchmark finished");
                control_flow.exit();
            }
        };

    let frames = run_with_event_loop::<S, BenchmarkMsg>(window, event_loop, user_event_handler, &config)?;
    info!(
        sample = S::NAME,
        "{} frames in {}s ({:.1} FPS)",
        frames,
        secs,
        frames as f64 / secs.max(1) as f64
    );

    Ok(())
}

fn run<S: Sample>(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::<()>::new()?;
    let window = build_window::<S, _>(&config, &event_loop)?;
    run_with_event_loop::<S, ()>(window, event_loop, |_, _| {}, &config)?;
    Ok(())
}

fn run_with_event_loop<S: Sample, UserEvent: std::fmt::Debug + 'static>(
    window: Window,
    event_loop: EventLoop<UserEvent>,
    user_event_handler: impl FnMut(UserEvent, &EventLoopWindowTarget<UserEvent>),
    config: &AppConfig,
) -> Result<u64> {
    // ctx needs to be independent to be moved into the event loop
    let ctx = pollster::block_on(GpuContext::new(&window, config))?;

    let sample = S::init(&ctx, config)?;
    info!(sample = S::NAME, "Sample initialized");

    let egui = gui::GuiContext::new(
        &ctx.device,               // wgpu Device
        ctx.surface_config.format, // TextureFormat
        None,                      // this can be None
        1,                         // samples
        &window,                   // winit Window
    );

    event_loop.run_sample(ctx, sample, egui, user_event_handler, config)
}

fn setup_tracing(log_level: String) -> Result<()> {
    color_eyre::install()?;
    let s = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or(EnvFilter::new(log_level)),
        )
        .compact()
        .finish()
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(s)?;
    Ok(())
}
