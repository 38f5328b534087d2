use crate::shaders;
use aberration_assets::{LayerImage, PLACEHOLDER_TEXEL, TextureSet};
use aberration_common::{LAYER_COUNT, LayerId, SkyConfig};
use aberration_geometry::{GeometryError, GridMesh, SphereMesh, checked_sphere_vertex_count};
use aberration_render::{
    DrawOutcome, FrameParams, FramePlan, GridUniforms, Lifecycle, Renderer, RendererPhase,
    SkipReason, SkyUniforms, plan_frame,
};
use glam::Mat4;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Errors from setting up or updating the GPU renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{program} program failed to compile: {message}")]
    ShaderCompilation {
        program: &'static str,
        message: String,
    },
    #[error("mesh: {0}")]
    Geometry(#[from] GeometryError),
    #[error("{buffer} buffer needs {size} bytes, device allows {max}")]
    BufferTooLarge {
        buffer: &'static str,
        size: u64,
        max: u64,
    },
}

fn check_buffer_size(device: &wgpu::Device, buffer: &'static str, size: u64) -> Result<(), RenderError> {
    let max = device.limits().max_buffer_size;
    if size > max {
        return Err(RenderError::BufferTooLarge { buffer, size, max });
    }
    Ok(())
}

fn vertex_buffer(
    device: &wgpu::Device,
    label: &'static str,
    contents: &[u8],
) -> Result<wgpu::Buffer, RenderError> {
    check_buffer_size(device, label, contents.len() as u64)?;
    Ok(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::VERTEX,
    }))
}

/// Where one frame is drawn.
#[derive(Clone, Copy)]
pub struct FrameTarget<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

/// Grid position and color buffers, always replaced together.
struct GridBuffers {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    vertex_count: u32,
    steps: (f64, f64),
}

impl GridBuffers {
    fn upload(device: &wgpu::Device, mesh: &GridMesh) -> Result<Self, RenderError> {
        let positions = vertex_buffer(device, "grid_positions", bytemuck::cast_slice(mesh.positions()))?;
        let colors = vertex_buffer(device, "grid_colors", bytemuck::cast_slice(mesh.colors()))?;
        Ok(Self {
            positions,
            colors,
            vertex_count: mesh.vertex_count(),
            steps: mesh.steps(),
        })
    }
}

/// Relativistic sky renderer: the aberrated sphere plus its grid overlay.
pub struct AberrationRenderer {
    lifecycle: Lifecycle,
    textures: TextureSet,
    sphere_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    sky_uniform_buffer: wgpu::Buffer,
    sky_uniform_bind_group: wgpu::BindGroup,
    grid_uniform_buffer: wgpu::Buffer,
    grid_uniform_bind_group: wgpu::BindGroup,
    layer_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    layer_views: [wgpu::TextureView; LAYER_COUNT],
    layer_bind_group: wgpu::BindGroup,
    sphere_positions: wgpu::Buffer,
    sphere_texcoords: wgpu::Buffer,
    sphere_vertex_count: u32,
    grid: GridBuffers,
    pending_grid: Option<(f64, f64)>,
    rejected_grid: Option<(f64, f64)>,
    radii: (f64, f64),
    grid_color: [u8; 3],
    depth_view: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

fn compile(
    device: &wgpu::Device,
    program: &'static str,
    source: &'static str,
) -> Result<wgpu::ShaderModule, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(program),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(RenderError::ShaderCompilation {
            program,
            message: err.to_string(),
        }),
        None => Ok(module),
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn layer_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries: Vec<_> = LayerId::ALL
        .iter()
        .map(|layer| wgpu::BindGroupLayoutEntry {
            binding: layer.unit(),
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: LAYER_COUNT as u32,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("layer_bind_group_layout"),
        entries: &entries,
    })
}

fn placeholder_view(device: &wgpu::Device, queue: &wgpu::Queue, layer: LayerId) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(layer.name()),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &PLACEHOLDER_TEXEL,
    );
    texture.create_view(&Default::default())
}

/// Upload a decoded layer with its mip chain, dropping levels larger than the device allows.
fn upload_layer(device: &wgpu::Device, queue: &wgpu::Queue, image: &LayerImage) -> wgpu::TextureView {
    let max_side = device.limits().max_texture_dimension_2d;
    let mips = image.mips();
    let first = mips
        .iter()
        .position(|m| m.width() <= max_side && m.height() <= max_side)
        .unwrap_or(mips.len() - 1);
    if first > 0 {
        tracing::warn!(
            layer = %image.layer(),
            width = image.width(),
            height = image.height(),
            max_side,
            "layer exceeds device texture limit; uploading from mip {first}"
        );
    }
    let mips = &mips[first..];
    let (base_width, base_height) = mips[0].dimensions();

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(image.layer().name()),
        size: wgpu::Extent3d {
            width: base_width,
            height: base_height,
            depth_or_array_layers: 1,
        },
        mip_level_count: mips.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: LAYER_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (level, mip) in mips.iter().enumerate() {
        let (width, height) = mip.dimensions();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            mip.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
    texture.create_view(&Default::default())
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn depth_state() -> Option<wgpu::DepthStencilState> {
    Some(wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    })
}

impl AberrationRenderer {
    /// Build meshes, compile both programs, bind placeholders and start
    /// loading every configured layer.
    ///
    /// `config` must already be validated; texture paths are used as given.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &SkyConfig,
    ) -> Result<Self, RenderError> {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_init();

        let mut textures = TextureSet::new();
        textures.request_all(&config.textures);

        let sky_shader = compile(device, "sphere", shaders::SKY_SHADER)?;
        let grid_shader = compile(device, "grid", shaders::GRID_SHADER)?;

        let sky_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky_uniforms"),
            contents: bytemuck::bytes_of(&SkyUniforms::new(
                Mat4::IDENTITY,
                glam::DVec3::ZERO,
                &config.display,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let grid_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_uniforms"),
            contents: bytemuck::bytes_of(&GridUniforms::new(Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniforms_layout = uniform_layout(device, "uniform_bind_group_layout");
        let sky_uniform_bind_group =
            uniform_bind_group(device, &uniforms_layout, &sky_uniform_buffer, "sky_uniforms");
        let grid_uniform_bind_group =
            uniform_bind_group(device, &uniforms_layout, &grid_uniform_buffer, "grid_uniforms");

        let layer_layout = layer_layout(device);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sky_sampler"),
            // Aberrated u runs over [0.5, 1.5].
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let layer_views = LayerId::ALL.map(|layer| placeholder_view(device, queue, layer));
        let layer_bind_group = Self::layer_bind_group(device, &layer_layout, &layer_views, &sampler);

        let sphere_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sphere_pipeline_layout"),
            bind_group_layouts: &[&uniforms_layout, &layer_layout],
            push_constant_ranges: &[],
        });
        let grid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grid_pipeline_layout"),
            bind_group_layouts: &[&uniforms_layout],
            push_constant_ranges: &[],
        });

        let color_target = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let sphere_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sphere_pipeline"),
            layout: Some(&sphere_layout),
            vertex: wgpu::VertexState {
                module: &sky_shader,
                entry_point: Some("vs_sphere"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x2],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &sky_shader,
                entry_point: Some("fs_sphere"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Seen from inside or outside.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: depth_state(),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let grid_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grid_pipeline"),
            layout: Some(&grid_layout),
            vertex: wgpu::VertexState {
                module: &grid_shader,
                entry_point: Some("vs_grid"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[u8; 4]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![1 => Unorm8x4],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &grid_shader,
                entry_point: Some("fs_grid"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: depth_state(),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let s = &config.sphere;
        // Positions are the larger of the two sphere buffers.
        let vertices = checked_sphere_vertex_count(s.n_lon, s.n_lat)?;
        check_buffer_size(
            device,
            "sphere_positions",
            u64::from(vertices) * std::mem::size_of::<[f32; 3]>() as u64,
        )?;
        let sphere = SphereMesh::build(s.n_lon, s.n_lat, s.equatorial_radius, s.polar_radius)?;
        let sphere_positions =
            vertex_buffer(device, "sphere_positions", bytemuck::cast_slice(sphere.positions()))?;
        let sphere_texcoords =
            vertex_buffer(device, "sphere_texcoords", bytemuck::cast_slice(sphere.texcoords()))?;

        let radii = (s.equatorial_radius, s.polar_radius);
        let g = &config.grid;
        let grid_mesh = GridMesh::build(g.lon_step_deg, g.lat_step_deg, radii.0, radii.1, g.color)?;
        let grid = GridBuffers::upload(device, &grid_mesh)?;

        tracing::info!(
            sphere_vertices = sphere.vertex_count(),
            grid_vertices = grid.vertex_count,
            ?surface_format,
            "aberration renderer initialized"
        );
        lifecycle.finish_init(textures.ready_count());

        Ok(Self {
            lifecycle,
            textures,
            sphere_pipeline,
            grid_pipeline,
            sky_uniform_buffer,
            sky_uniform_bind_group,
            grid_uniform_buffer,
            grid_uniform_bind_group,
            layer_layout,
            sampler,
            layer_views,
            layer_bind_group,
            sphere_positions,
            sphere_texcoords,
            sphere_vertex_count: sphere.vertex_count(),
            grid,
            pending_grid: None,
            rejected_grid: None,
            radii,
            grid_color: g.color,
            depth_view: create_depth_view(device, width, height),
            surface_format,
        })
    }

    fn layer_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        views: &[wgpu::TextureView; LAYER_COUNT],
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        let mut entries: Vec<_> = LayerId::ALL
            .iter()
            .map(|layer| wgpu::BindGroupEntry {
                binding: layer.unit(),
                resource: wgpu::BindingResource::TextureView(&views[layer.index()]),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: LAYER_COUNT as u32,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("layer_bind_group"),
            layout,
            entries: &entries,
        })
    }

    /// Upload layers that finished decoding since the last call.
    ///
    /// Call once per frame before [`draw`](Self::draw). Returns the ready count.
    pub fn poll_textures(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> usize {
        let loaded = self.textures.poll();
        if !loaded.is_empty() {
            for image in &loaded {
                self.layer_views[image.layer().index()] = upload_layer(device, queue, image);
            }
            self.layer_bind_group =
                Self::layer_bind_group(device, &self.layer_layout, &self.layer_views, &self.sampler);
            self.lifecycle.observe_ready_count(self.textures.ready_count());
        }
        self.textures.ready_count()
    }

    /// Rebuild the grid at new steps, replacing both buffers at once.
    pub fn update_grid(
        &mut self,
        device: &wgpu::Device,
        lon_step: f64,
        lat_step: f64,
    ) -> Result<(), RenderError> {
        let mesh = GridMesh::build(lon_step, lat_step, self.radii.0, self.radii.1, self.grid_color)?;
        self.grid = GridBuffers::upload(device, &mesh)?;
        tracing::debug!(lon_step, lat_step, vertices = self.grid.vertex_count, "grid updated");
        Ok(())
    }

    /// Ask for new grid steps; applied by the next draw that is not skipped.
    ///
    /// Steps equal to the current grid or to the last rejected pair are ignored.
    pub fn request_grid_resolution(&mut self, lon_step: f64, lat_step: f64) {
        let steps = (lon_step, lat_step);
        if steps == self.grid.steps || self.rejected_grid == Some(steps) {
            self.pending_grid = None;
        } else {
            self.pending_grid = Some(steps);
        }
    }

    fn apply_pending_grid(&mut self, device: &wgpu::Device) {
        let Some((lon, lat)) = self.pending_grid.take() else {
            return;
        };
        match self.update_grid(device, lon, lat) {
            Ok(()) => self.rejected_grid = None,
            Err(err) => {
                tracing::warn!(lon, lat, error = %err, "grid resolution rejected");
                self.rejected_grid = Some((lon, lat));
            }
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
    }

    /// Draw one frame into `target`.
    ///
    /// A no-op until enough layers are loaded: a skipped frame touches no GPU
    /// state and leaves any grid request queued.
    pub fn draw(&mut self, target: FrameTarget<'_>, frame: &FrameParams) -> DrawOutcome {
        if let Err(reason) = self.plan(frame) {
            return DrawOutcome::Skipped(reason);
        }
        self.apply_pending_grid(target.device);

        match self.plan(frame) {
            Ok(plan) => {
                self.execute(target, &plan);
                DrawOutcome::Drawn
            }
            Err(reason) => DrawOutcome::Skipped(reason),
        }
    }

    fn plan(&self, frame: &FrameParams) -> Result<FramePlan, SkipReason> {
        plan_frame(
            self.lifecycle.phase(),
            self.textures.ready_count(),
            self.sphere_vertex_count,
            self.grid.vertex_count,
            frame,
        )
    }

    fn execute(&self, target: FrameTarget<'_>, plan: &FramePlan) {
        let FrameTarget { device, queue, view } = target;
        queue.write_buffer(&self.sky_uniform_buffer, 0, bytemuck::bytes_of(&plan.sphere.uniforms));
        if let Some(grid) = &plan.grid {
            queue.write_buffer(&self.grid_uniform_buffer, 0, bytemuck::bytes_of(&grid.uniforms));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sky_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sky_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.sphere_pipeline);
            pass.set_bind_group(0, &self.sky_uniform_bind_group, &[]);
            pass.set_bind_group(1, &self.layer_bind_group, &[]);
            pass.set_vertex_buffer(0, self.sphere_positions.slice(..));
            pass.set_vertex_buffer(1, self.sphere_texcoords.slice(..));
            pass.draw(0..plan.sphere.vertex_count, 0..1);

            if let Some(grid) = &plan.grid {
                pass.set_pipeline(&self.grid_pipeline);
                pass.set_bind_group(0, &self.grid_uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.grid.positions.slice(..));
                pass.set_vertex_buffer(1, self.grid.colors.slice(..));
                pass.draw(0..grid.vertex_count, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn sphere_vertex_count(&self) -> u32 {
        self.sphere_vertex_count
    }

    pub fn grid_vertex_count(&self) -> u32 {
        self.grid.vertex_count
    }

    pub fn grid_steps(&self) -> (f64, f64) {
        self.grid.steps
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }
}

impl Renderer for AberrationRenderer {
    type Target<'a> = FrameTarget<'a>;

    fn ready_count(&self) -> usize {
        self.textures.ready_count()
    }

    fn phase(&self) -> RendererPhase {
        self.lifecycle.phase()
    }

    fn render(&mut self, target: Self::Target<'_>, frame: &FrameParams) -> DrawOutcome {
        self.draw(target, frame)
    }
}
