//! SVG rendering of the double-cone surfaces.
//!
//! Generates self-contained SVG diagrams of the two adiabatic surfaces in
//! the branching plane: a static view from a configurable camera angle, and
//! a rotating animation built from per-frame groups with SMIL opacity
//! cycling.
//!
//! The projection is orthographic. Each axis is normalized to the data
//! bounds before rotation so the cone stays visible regardless of the
//! physical scale of the gradients. Surface cells are drawn as filled quads,
//! depth-sorted back to front, with a separate color ramp per sheet so the
//! upper and lower surfaces remain distinguishable where they interleave.

use crate::surface::SurfaceGrid;
use nalgebra::DMatrix;

/// Display parameters for surface rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Camera elevation above the branching plane, degrees
    pub elev_deg: f64,
    /// Camera azimuth around the energy axis, degrees
    pub azim_deg: f64,
    /// Grid downsampling stride; 0 picks one automatically
    pub stride: usize,
    /// Background fill color
    pub background: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 900,
            height: 720,
            elev_deg: 28.0,
            azim_deg: -133.0,
            stride: 0,
            background: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Vec2 {
    x: f64,
    y: f64,
}

/// One projected quad ready for depth sorting.
struct Quad {
    points: [Vec2; 4],
    depth: f64,
    fill: String,
}

struct Camera {
    sin_a: f64,
    cos_a: f64,
    sin_e: f64,
    cos_e: f64,
}

impl Camera {
    fn new(elev_deg: f64, azim_deg: f64) -> Self {
        let (sin_a, cos_a) = azim_deg.to_radians().sin_cos();
        let (sin_e, cos_e) = elev_deg.to_radians().sin_cos();
        Self {
            sin_a,
            cos_a,
            sin_e,
            cos_e,
        }
    }

    /// Orthographic projection of a normalized scene point.
    /// Returns (screen_u, screen_v, depth), depth increasing away from camera.
    fn project(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let u = -x * self.sin_a + y * self.cos_a;
        let v = -x * self.cos_a * self.sin_e - y * self.sin_a * self.sin_e + z * self.cos_e;
        let depth = x * self.cos_a * self.cos_e + y * self.sin_a * self.cos_e + z * self.sin_e;
        (u, v, -depth)
    }
}

/// Normalization of the raw grids into a [-1, 1] cube.
struct SceneBounds {
    xy_scale: f64,
    e_mid: f64,
    e_half: f64,
}

impl SceneBounds {
    fn from_grid(grid: &SurfaceGrid) -> Self {
        let xy_max = grid
            .x
            .iter()
            .chain(grid.y.iter())
            .fold(0.0f64, |m, v| m.max(v.abs()));
        let (mut e_min, mut e_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in grid.e_upper.iter().chain(grid.e_lower.iter()) {
            e_min = e_min.min(*v);
            e_max = e_max.max(*v);
        }
        let e_mid = 0.5 * (e_min + e_max);
        let e_half = 0.5 * (e_max - e_min);
        Self {
            xy_scale: if xy_max > 0.0 { xy_max } else { 1.0 },
            e_mid,
            e_half: if e_half > 0.0 { e_half } else { 1.0 },
        }
    }

    fn normalize(&self, x: f64, y: f64, e: f64) -> (f64, f64, f64) {
        (
            x / self.xy_scale,
            y / self.xy_scale,
            (e - self.e_mid) / self.e_half,
        )
    }
}

/// Linear ramp between two RGB endpoints, t in [0, 1].
fn ramp(t: f64, low: [u8; 3], high: [u8; 3]) -> String {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(low[0], high[0]),
        mix(low[1], high[1]),
        mix(low[2], high[2])
    )
}

/// Cool ramp for the upper sheet.
fn upper_color(t: f64) -> String {
    ramp(t, [0x44, 0x01, 0x54], [0x7a, 0xd1, 0x51])
}

/// Warm ramp for the lower sheet.
fn lower_color(t: f64) -> String {
    ramp(t, [0x0d, 0x08, 0x87], [0xf0, 0xa8, 0x3c])
}

fn effective_stride(grid: &SurfaceGrid, requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    // Aim for roughly 40 cells along the larger grid dimension
    let largest = grid.x.nrows().max(grid.x.ncols());
    (largest / 40).max(1)
}

fn collect_quads(
    field: &DMatrix<f64>,
    grid: &SurfaceGrid,
    bounds: &SceneBounds,
    camera: &Camera,
    stride: usize,
    color: fn(f64) -> String,
    quads: &mut Vec<Quad>,
) {
    let nt = grid.x.nrows();
    let nr = grid.x.ncols();
    let (mut e_min, mut e_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in field.iter() {
        e_min = e_min.min(*v);
        e_max = e_max.max(*v);
    }
    let e_span = if e_max > e_min { e_max - e_min } else { 1.0 };

    let mut it = 0;
    while it + stride < nt {
        let mut ir = 0;
        while ir + stride < nr {
            let corners = [
                (it, ir),
                (it + stride, ir),
                (it + stride, ir + stride),
                (it, ir + stride),
            ];
            let mut pts = [Vec2 { x: 0.0, y: 0.0 }; 4];
            let mut depth = 0.0;
            let mut e_sum = 0.0;
            for (k, &(i, j)) in corners.iter().enumerate() {
                let (x, y, z) = bounds.normalize(grid.x[(i, j)], grid.y[(i, j)], field[(i, j)]);
                let (u, v, d) = camera.project(x, y, z);
                pts[k] = Vec2 { x: u, y: v };
                depth += d;
                e_sum += field[(i, j)];
            }
            quads.push(Quad {
                points: pts,
                depth: depth / 4.0,
                fill: color((e_sum / 4.0 - e_min) / e_span),
            });
            ir += stride;
        }
        it += stride;
    }
}

/// Maps projected scene coordinates onto the pixel canvas.
struct Screen {
    scale: f64,
    cx: f64,
    cy: f64,
}

impl Screen {
    fn new(width: u32, height: u32) -> Self {
        let margin = 60.0;
        let half = 0.5 * (width.min(height) as f64) - margin;
        Self {
            // Projected coordinates live in roughly [-sqrt(2), sqrt(2)]
            scale: half / 1.5,
            cx: width as f64 / 2.0,
            cy: height as f64 / 2.0,
        }
    }

    fn to_pixels(&self, p: Vec2) -> Vec2 {
        Vec2 {
            x: self.cx + p.x * self.scale,
            y: self.cy - p.y * self.scale,
        }
    }
}

fn scene_group(grid: &SurfaceGrid, options: &RenderOptions, azim_deg: f64) -> String {
    let camera = Camera::new(options.elev_deg, azim_deg);
    let bounds = SceneBounds::from_grid(grid);
    let stride = effective_stride(grid, options.stride);
    let screen = Screen::new(options.width, options.height);

    let mut quads = Vec::new();
    collect_quads(
        &grid.e_upper,
        grid,
        &bounds,
        &camera,
        stride,
        upper_color,
        &mut quads,
    );
    collect_quads(
        &grid.e_lower,
        grid,
        &bounds,
        &camera,
        stride,
        lower_color,
        &mut quads,
    );
    // Painter's algorithm: farthest first
    quads.sort_by(|a, b| b.depth.partial_cmp(&a.depth).unwrap_or(std::cmp::Ordering::Equal));

    let mut svg = String::from("<g stroke='none' fill-opacity='0.85'>");
    for quad in &quads {
        let p: Vec<Vec2> = quad.points.iter().map(|&v| screen.to_pixels(v)).collect();
        svg.push_str(&format!(
            "<polygon points='{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}' fill='{}'/>",
            p[0].x, p[0].y, p[1].x, p[1].y, p[2].x, p[2].y, p[3].x, p[3].y, quad.fill
        ));
    }
    svg.push_str("</g>");
    svg
}

fn svg_open(options: &RenderOptions) -> String {
    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>\
         <rect width='100%' height='100%' fill='{bg}'/>",
        w = options.width,
        h = options.height,
        bg = options.background
    )
}

fn axis_labels(options: &RenderOptions) -> String {
    let w = options.width as f64;
    let h = options.height as f64;
    format!(
        "<g fill='#2b2b2b' font-size='14' font-family='DejaVu Sans, Arial, sans-serif'>\
         <text x='{:.0}' y='{:.0}'>g\u{0303} (a.u.)</text>\
         <text x='{:.0}' y='{:.0}'>h\u{0303} (a.u.)</text>\
         <text x='12' y='{:.0}' transform='rotate(-90 16 {:.0})'>Energy (eV)</text>\
         </g>",
        w * 0.72,
        h - 20.0,
        w * 0.18,
        h - 20.0,
        h / 2.0,
        h / 2.0
    )
}

/// Renders a static view of both surfaces.
pub fn render_surfaces_svg(grid: &SurfaceGrid, options: &RenderOptions) -> String {
    let mut svg = svg_open(options);
    svg.push_str(&scene_group(grid, options, options.azim_deg));
    svg.push_str(&axis_labels(options));
    svg.push_str("</svg>");
    svg
}

/// Renders a rotating animation of both surfaces.
///
/// Emits one scene group per frame, each made visible in turn by a discrete
/// SMIL opacity animation; `period_s` is the duration of one full rotation.
/// Frame counts above ~36 produce large files without much visual gain.
pub fn render_rotation_svg(
    grid: &SurfaceGrid,
    options: &RenderOptions,
    frames: usize,
    period_s: f64,
) -> String {
    let frames = frames.max(1);
    let mut svg = svg_open(options);

    for i in 0..frames {
        let azim = options.azim_deg + 360.0 * i as f64 / frames as f64;
        let t0 = i as f64 / frames as f64;
        let t1 = (i + 1) as f64 / frames as f64;

        let animate = if i == 0 {
            format!(
                "<animate attributeName='opacity' calcMode='discrete' dur='{:.3}s' \
                 repeatCount='indefinite' keyTimes='0;{:.5}' values='1;0'/>",
                period_s, t1
            )
        } else {
            format!(
                "<animate attributeName='opacity' calcMode='discrete' dur='{:.3}s' \
                 repeatCount='indefinite' keyTimes='0;{:.5};{:.5}' values='0;1;0'/>",
                period_s, t0, t1
            )
        };

        svg.push_str(&format!("<g opacity='{}'>", if i == 0 { 1 } else { 0 }));
        svg.push_str(&animate);
        svg.push_str(&scene_group(grid, options, azim));
        svg.push_str("</g>");
    }

    svg.push_str(&axis_labels(options));
    svg.push_str("</svg>");
    svg
}
