use aberration_common::{LayerId, LayerVisibility, MAX_BETA, ObserverConfig, ObserverVelocity, SkyConfig};
use aberration_render::{FrameParams, Renderer, RendererPhase};
use aberration_render_wgpu::{AberrationRenderer, FrameTarget, SkyCamera};
use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "aberration-desktop", about = "Relativistic aberration sky viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory relative texture paths are resolved against
    #[arg(long, default_value = ".")]
    assets_dir: PathBuf,

    /// Initial observer speed as a fraction of c
    #[arg(long)]
    beta: Option<f64>,

    /// Initial field of view in degrees
    #[arg(long)]
    fov: Option<f64>,
}

/// Degrees of camera rotation per pixel of mouse motion at 50 degrees fov.
const LOOK_SENSITIVITY: f64 = 0.1;

/// Control-panel state: everything the user can change between frames.
struct AppState {
    camera: SkyCamera,
    observer: ObserverConfig,
    display: LayerVisibility,
    grid_steps: (f64, f64),
    show_panel: bool,
    mouse_captured: bool,
    phase: RendererPhase,
    ready_count: usize,
    param_error: Option<String>,
}

impl AppState {
    fn new(config: &SkyConfig) -> Self {
        Self {
            camera: SkyCamera::from_config(&config.camera, 16.0 / 9.0),
            observer: config.observer.clone(),
            display: config.display,
            grid_steps: (config.grid.lon_step_deg, config.grid.lat_step_deg),
            show_panel: true,
            mouse_captured: false,
            phase: RendererPhase::Uninitialized,
            ready_count: 0,
            param_error: None,
        }
    }

    /// Parameters for the next draw, or `None` if the observer settings are invalid.
    ///
    /// With the lock on, the motion direction follows the camera. The panel's
    /// longitude is shifted by -180 degrees into the sky-map frame.
    fn frame_params(&mut self) -> Option<FrameParams> {
        if self.observer.lock_to_camera {
            self.observer.lon_deg = self.camera.lon_deg;
            self.observer.lat_deg = self.camera.lat_deg.clamp(-90.0, 90.0);
        }
        let velocity = match ObserverVelocity::new(
            self.observer.beta,
            self.observer.lon_deg - 180.0,
            self.observer.lat_deg,
        ) {
            Ok(v) => v,
            Err(err) => {
                if self.param_error.is_none() {
                    tracing::warn!(error = %err, "observer parameters rejected; frame skipped");
                }
                self.param_error = Some(err.to_string());
                return None;
            }
        };
        self.param_error = None;
        Some(FrameParams {
            view_proj: self.camera.view_projection(),
            velocity,
            visibility: self.display,
        })
    }

    fn look(&mut self, dx: f64, dy: f64) {
        let scale = LOOK_SENSITIVITY * self.camera.fov_deg / 50.0;
        let lon = self.camera.lon_deg - dx * scale;
        self.camera.lon_deg = (lon + 180.0).rem_euclid(360.0) - 180.0;
        self.camera.lat_deg = (self.camera.lat_deg + dy * scale).clamp(-90.0, 90.0);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.show_panel = !self.show_panel,
            KeyCode::KeyG => self.display.grid = !self.display.grid,
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("controls")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Relativistic Sky");
                ui.label(format!("Renderer: {:?}  Layers: {}", self.phase, self.ready_count));
                if let Some(err) = &self.param_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
                ui.separator();

                egui::CollapsingHeader::new("Observer")
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.add(
                            egui::Slider::new(&mut self.observer.beta, 0.0..=MAX_BETA)
                                .step_by(0.001)
                                .text("Beta"),
                        );
                        let locked = self.observer.lock_to_camera;
                        ui.add_enabled(
                            !locked,
                            egui::Slider::new(&mut self.observer.lat_deg, -90.0..=90.0)
                                .step_by(0.1)
                                .text("Latitude"),
                        );
                        ui.add_enabled(
                            !locked,
                            egui::Slider::new(&mut self.observer.lon_deg, -180.0..=180.0)
                                .step_by(0.1)
                                .text("Longitude"),
                        );
                        ui.checkbox(&mut self.observer.lock_to_camera, "Lock to Camera");
                    });

                egui::CollapsingHeader::new("Display")
                    .default_open(true)
                    .show(ui, |ui| {
                        for layer in LayerId::ALL {
                            let mut on = self.display.is_visible(layer);
                            if ui.checkbox(&mut on, layer.name()).changed() {
                                self.display.set(layer, on);
                            }
                        }
                    });

                egui::CollapsingHeader::new("Camera")
                    .default_open(true)
                    .show(ui, |ui| {
                        let cam = &mut self.camera;
                        ui.add(egui::Slider::new(&mut cam.fov_deg, 1.0..=180.0).text("Field of View"));
                        ui.add(
                            egui::Slider::new(&mut cam.lon_deg, -180.0..=180.0)
                                .step_by(0.1)
                                .text("Longitude"),
                        );
                        ui.add(
                            egui::Slider::new(&mut cam.lat_deg, -180.0..=180.0)
                                .step_by(0.1)
                                .text("Latitude"),
                        );
                        ui.add(egui::Slider::new(&mut cam.up_lon_deg, -180.0..=180.0).text("Longitude Up"));
                        ui.add(egui::Slider::new(&mut cam.up_lat_deg, -90.0..=90.0).text("Latitude Up"));
                    });

                egui::CollapsingHeader::new("Grid")
                    .default_open(false)
                    .show(ui, |ui| {
                        ui.add(
                            egui::Slider::new(&mut self.grid_steps.0, 1.0..=90.0)
                                .step_by(1.0)
                                .text("Longitude step"),
                        );
                        ui.add(
                            egui::Slider::new(&mut self.grid_steps.1, 1.0..=90.0)
                                .step_by(1.0)
                                .text("Latitude step"),
                        );
                    });

                ui.separator();
                ui.small("F1: Toggle Panel | G: Grid | RMB: Look");
            });
    }
}

/// Everything that exists once the window and device are up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: AberrationRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    sky: SkyConfig,
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(sky: SkyConfig) -> Self {
        Self {
            state: AppState::new(&sky),
            sky,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Relativistic Sky")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("aberration_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = AberrationRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            &self.sky,
        )?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        gpu.renderer.poll_textures(&gpu.device, &gpu.queue);
        let (lon_step, lat_step) = self.state.grid_steps;
        gpu.renderer.request_grid_resolution(lon_step, lat_step);
        self.state.ready_count = gpu.renderer.ready_count();
        self.state.phase = gpu.renderer.phase();

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let drawn = match self.state.frame_params() {
            Some(frame) => {
                let target = FrameTarget {
                    device: &gpu.device,
                    queue: &gpu.queue,
                    view: &view,
                };
                gpu.renderer.render(target, &frame).is_drawn()
            }
            None => false,
        };

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            // A skipped sky frame left the surface undefined; start from black.
            let load = if drawn {
                wgpu::LoadOp::Load
            } else {
                wgpu::LoadOp::Clear(wgpu::Color::BLACK)
            };
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.camera.set_viewport(size.width, size.height);
                self.gpu = Some(gpu);
            }
            Err(err) => {
                tracing::error!("failed to initialize: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                    self.state
                        .camera
                        .set_viewport(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(!self.state.mouse_captured);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_captured {
                self.state.look(delta.0, delta.1);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn load_config(cli: &Cli) -> Result<SkyConfig> {
    let mut config = match &cli.config {
        Some(path) => SkyConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SkyConfig::default(),
    };
    if let Some(beta) = cli.beta {
        config.observer.beta = beta;
    }
    if let Some(fov) = cli.fov {
        config.camera.fov_deg = fov;
    }
    config.textures = config.textures.rebased(&cli.assets_dir);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug,wgpu=warn,naga=warn"
    } else {
        "info,wgpu=warn,naga=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    tracing::info!("aberration-desktop starting");
    let config = load_config(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_follows_camera_with_longitude_shift() {
        let mut state = AppState::new(&SkyConfig::default());
        state.observer.beta = 0.5;
        state.camera.lon_deg = 30.0;
        state.camera.lat_deg = 20.0;
        let frame = state.frame_params().unwrap();
        assert_eq!(state.observer.lon_deg, 30.0);
        assert_eq!(frame.velocity.lon_deg(), -150.0);
        assert_eq!(frame.velocity.lat_deg(), 20.0);
        assert_eq!(frame.visibility, LayerVisibility::default());
    }

    #[test]
    fn lock_clamps_camera_latitude() {
        let mut state = AppState::new(&SkyConfig::default());
        state.camera.lat_deg = 135.0;
        let frame = state.frame_params().unwrap();
        assert_eq!(frame.velocity.lat_deg(), 90.0);
    }

    #[test]
    fn invalid_observer_skips_frame() {
        let mut state = AppState::new(&SkyConfig::default());
        state.observer.lock_to_camera = false;
        state.observer.beta = 1.0;
        assert!(state.frame_params().is_none());
        assert!(state.param_error.is_some());
        state.observer.beta = 0.2;
        assert!(state.frame_params().is_some());
        assert!(state.param_error.is_none());
    }

    #[test]
    fn look_wraps_longitude() {
        let mut state = AppState::new(&SkyConfig::default());
        state.camera.lon_deg = -179.0;
        state.look(20.0, 0.0);
        assert!((state.camera.lon_deg - 179.0).abs() < 1e-9);
        state.look(0.0, 10_000.0);
        assert_eq!(state.camera.lat_deg, 90.0);
    }
}
