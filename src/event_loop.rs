/// Event loop that handles window events and drives a sample frame by frame
use std::time::{Duration, Instant};

use egui_wgpu::{wgpu, ScreenDescriptor};
use egui_winit::winit::{
    event::*,
    event_loop::{EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::gpu_context::{GpuContext, RenderTarget};
use crate::gui::GuiContext;
use crate::samples::Sample;
use crate::{screenshot, Result};

pub trait EventLoopEx<T: 'static> {
    /// Runs `sample` until the window closes or `user_event_handler` exits the loop. Returns the
    /// number of frames presented.
    fn run_sample<S: Sample>(
        self,
        ctx: GpuContext,
        sample: S,
        gui: GuiContext,
        user_event_handler: impl FnMut(T, &EventLoopWindowTarget<T>),
        config: &AppConfig,
    ) -> Result<u64>;
}

/// Frame timing the host hands to [`Sample::update`]
struct FrameClock {
    start: Instant,
    last_frame: Instant,
    frames: u64,
    frames_since_report: u32,
    last_report: Instant,
}

impl FrameClock {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            frames: 0,
            frames_since_report: 0,
            last_report: now,
        }
    }

    /// Seconds since start and since the previous tick
    fn tick(&mut self) -> (f64, f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        (now.duration_since(self.start).as_secs_f64(), elapsed)
    }

    fn frame_presented(&mut self) {
        self.frames += 1;
        self.frames_since_report += 1;
        let now = Instant::now();
        if now.duration_since(self.last_report) >= Duration::from_secs(1) {
            info!("FPS: {}", self.frames_since_report);
            self.frames_since_report = 0;
            self.last_report = now;
        }
    }
}

fn render_frame<S: Sample>(
    ctx: &GpuContext,
    sample: &mut S,
    gui: &mut GuiContext,
    config: &AppConfig,
    take_screenshot: bool,
) -> std::result::Result<Result<()>, wgpu::SurfaceError> {
    let output = ctx.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let target = RenderTarget {
        color: &view,
        depth: &ctx.depth.view,
    };
    if let Err(e) = sample.render(ctx, &target) {
        return Ok(Err(e));
    }

    if config.show_ui {
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [ctx.surface_config.width, ctx.surface_config.height],
            pixels_per_point: ctx.window().scale_factor() as f32,
        };
        gui.draw(ctx, sample, &view, screen_descriptor);
    }

    if take_screenshot {
        let saved = screenshot::screenshot_path(&config.screenshot_dir).and_then(|path| {
            pollster::block_on(screenshot::save_screenshot(
                &ctx.device,
                &ctx.queue,
                &output.texture,
                &path,
            ))
        });
        if let Err(e) = saved {
            warn!("Screenshot failed: {e:?}");
        }
    }

    ctx.window().pre_present_notify();
    output.present();
    Ok(Ok(()))
}

impl<T: std::fmt::Debug + 'static> EventLoopEx<T> for EventLoop<T> {
    #[tracing::instrument(skip_all, fields(sample = S::NAME))]
    fn run_sample<S: Sample>(
        self,
        mut ctx: GpuContext,
        mut sample: S,
        mut gui: GuiContext,
        mut user_event_handler: impl FnMut(T, &EventLoopWindowTarget<T>),
        config: &AppConfig,
    ) -> Result<u64> {
        let mut clock = FrameClock::new();
        let mut screenshot_requested = false;
        let mut failure: Option<crate::Error> = None;

        self.run(|event, control_flow| {
            debug!(target = "Render loop", "received event {:?}", event);
            match event {
                Event::UserEvent(user_event) => user_event_handler(user_event, control_flow),
                Event::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == ctx.window().id() => {
                    if gui.process_input(ctx.window(), event) {
                        return;
                    }
                    match event {
                        WindowEvent::CloseRequested
                        | WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    state: ElementState::Pressed,
                                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                                    ..
                                },
                            ..
                        } => control_flow.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    state: ElementState::Pressed,
                                    physical_key: PhysicalKey::Code(KeyCode::KeyP),
                                    repeat: false,
                                    ..
                                },
                            ..
                        } => {
                            screenshot_requested = true;
                        }
                        WindowEvent::Resized(physical_size) => {
                            ctx.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            ctx.window().request_redraw();

                            let (current_time, elapsed_time) = clock.tick();
                            sample.update(&ctx, current_time, elapsed_time, config.show_ui);

                            let take_screenshot = std::mem::take(&mut screenshot_requested);
                            match render_frame(&ctx, &mut sample, &mut gui, config, take_screenshot)
                            {
                                Ok(Ok(())) => clock.frame_presented(),
                                Ok(Err(e)) => {
                                    error!("Rendering {} failed: {e:?}", S::NAME);
                                    failure = Some(e);
                                    control_flow.exit();
                                }
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    ctx.resize(ctx.size)
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    error!("Out of memory");
                                    control_flow.exit();
                                }
                                Err(wgpu::SurfaceError::Timeout) => {
                                    warn!("Surface timeout")
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        })?;

        match failure {
            Some(e) => Err(e),
            None => Ok(clock.frames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_reports_monotonic_time() {
        let mut clock = FrameClock::new();
        let (t0, _) = clock.tick();
        std::thread::sleep(Duration::from_millis(5));
        let (t1, elapsed) = clock.tick();
        assert!(t1 > t0);
        assert!(elapsed >= 0.005);
        assert!(elapsed <= t1);
    }

    #[test]
    fn clock_counts_presented_frames() {
        let mut clock = FrameClock::new();
        for _ in 0..3 {
            clock.frame_presented();
        }
        assert_eq!(clock.frames, 3);
    }
}
