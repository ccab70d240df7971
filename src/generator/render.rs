use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut},
    rect::Rect,
};
use qrcode::QrCode;
use tracing::debug;

use super::{Artifact, Logo, OptionsPatch, OutputFormat, RenderOptions, RenderTarget, Renderer};
use crate::{
    error::{Error, Result},
    style::{CornerShape, DotShape},
};

/// Renderer that paints the `qrcode` module matrix with the configured dot and corner shapes.
pub struct StyledRenderer {
    options: RenderOptions,
    artifact: Artifact,
    targets: Vec<Box<dyn RenderTarget>>,
}

impl StyledRenderer {
    pub fn new(options: RenderOptions) -> Result<Self> {
        let artifact = render(&options)?;
        Ok(Self { options, artifact, targets: Vec::new() })
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }
}

impl Renderer for StyledRenderer {
    fn append(&mut self, mut target: Box<dyn RenderTarget>) -> Result<()> {
        target.mount(&self.artifact)?;
        self.targets.push(target);
        Ok(())
    }

    fn update(&mut self, patch: OptionsPatch) -> Result<()> {
        let mut next = self.options.clone();
        next.apply(patch);
        let artifact = render(&next)?;

        self.options = next;
        self.artifact = artifact;
        for target in self.targets.iter_mut() {
            target.mount(&self.artifact)?;
        }
        Ok(())
    }

    fn options(&self) -> &RenderOptions {
        &self.options
    }
}

/// Writes every mounted artifact to a fixed path.
#[derive(Debug, Clone)]
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderTarget for FileTarget {
    fn mount(&mut self, artifact: &Artifact) -> Result<()> {
        std::fs::write(&self.path, artifact.as_bytes())?;
        debug!(path = %self.path.display(), bytes = artifact.as_bytes().len(), "Artifact written");
        Ok(())
    }
}

pub fn render(options: &RenderOptions) -> Result<Artifact> {
    let matrix = Matrix::encode(options)?;
    let layout = Layout::new(options, matrix.count)?;
    let prims = compose(&matrix, &layout, options);
    let logo = options.image.as_ref().zip(layout.logo_box(options.image_options.margin));

    debug!(
        modules = matrix.count,
        dot = layout.dot,
        shapes = prims.len(),
        format = options.format.extension(),
        "Rendering QR"
    );

    match options.format {
        OutputFormat::Svg => to_svg(options, &prims, logo).map(Artifact::Svg),
        OutputFormat::Png => to_png(options, &prims, logo).map(Artifact::Png),
    }
}

pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>> {
    let invalid = || Error::InvalidColor(s.to_string());
    let hex = s.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let hex = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => return Err(invalid()),
    };
    let v = u32::from_str_radix(&hex, 16).map_err(|_| invalid())?;
    Ok(Rgba([(v >> 16) as u8, (v >> 8) as u8, v as u8, 255]))
}

// Matrix & layout
//------------------------------------------------------------------------------

struct Matrix {
    count: usize,
    dark: Vec<bool>,
}

impl Matrix {
    fn encode(options: &RenderOptions) -> Result<Self> {
        let code = QrCode::with_error_correction_level(options.data.as_bytes(), options.ec_level.into())?;
        let count = code.width();
        let dark = code.to_colors().into_iter().map(|c| matches!(c, qrcode::Color::Dark)).collect();
        Ok(Self { count, dark })
    }

    fn is_dark(&self, r: isize, c: isize) -> bool {
        let n = self.count as isize;
        (0..n).contains(&r) && (0..n).contains(&c) && self.dark[(r * n + c) as usize]
    }

    fn in_finder(&self, r: isize, c: isize) -> bool {
        let far = self.count as isize - 7;
        (r < 7 && c < 7) || (r < 7 && c >= far) || (r >= far && c < 7)
    }
}

struct Layout {
    dot: f64,
    x0: f64,
    y0: f64,
    // Module range [start, start + len) cleared for the logo, on both axes
    hidden: Option<(usize, usize)>,
}

impl Layout {
    fn new(options: &RenderOptions, count: usize) -> Result<Self> {
        let size = options.width.min(options.height);
        let dot = size.saturating_sub(2 * options.margin) / count as u32;
        if dot == 0 {
            return Err(Error::CanvasTooSmall {
                width: options.width,
                height: options.height,
                modules: count,
            });
        }

        let span = dot * count as u32;
        Ok(Self {
            dot: dot as f64,
            x0: ((options.width - span) / 2) as f64,
            y0: ((options.height - span) / 2) as f64,
            hidden: Self::hidden_area(options, count),
        })
    }

    fn hidden_area(options: &RenderOptions, count: usize) -> Option<(usize, usize)> {
        options.image.as_ref()?;
        let max_hidden = options.image_options.image_size
            * options.ec_level.recovery_fraction()
            * (count * count) as f32;
        // Keep clear of the finder patterns and stay centred
        let mut len = (max_hidden.sqrt() as usize).min(count.saturating_sub(16));
        if (count - len) % 2 == 1 {
            len = len.saturating_sub(1);
        }
        (len > 0).then(|| ((count - len) / 2, len))
    }

    fn origin(&self, r: usize, c: usize) -> (f64, f64) {
        (self.x0 + c as f64 * self.dot, self.y0 + r as f64 * self.dot)
    }

    fn is_hidden(&self, r: isize, c: isize) -> bool {
        match self.hidden {
            Some((start, len)) => {
                let range = start as isize..(start + len) as isize;
                range.contains(&r) && range.contains(&c)
            }
            None => false,
        }
    }

    // Pixel square (x, y, side) the logo is fitted into
    fn logo_box(&self, margin: u32) -> Option<(f64, f64, f64)> {
        let (start, len) = self.hidden?;
        let (x, y) = self.origin(start, start);
        let margin = margin as f64;
        let side = len as f64 * self.dot - 2.0 * margin;
        (side >= 1.0).then_some((x + margin, y + margin, side))
    }
}

// Shapes
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    // Corner radii in tl, tr, br, bl order
    Rect { x: f64, y: f64, w: f64, h: f64, radii: [f64; 4] },
    Circle { cx: f64, cy: f64, r: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Dots,
    Background,
}

#[derive(Debug, Clone, Copy, Default)]
struct Neighbours {
    top: bool,
    right: bool,
    bottom: bool,
    left: bool,
}

impl Shape {
    fn square(x: f64, y: f64, side: f64, radius: f64) -> Self {
        Self::Rect { x, y, w: side, h: side, radii: [radius; 4] }
    }

    fn module(x: f64, y: f64, d: f64, shape: DotShape, n: Neighbours) -> Self {
        let r = d / 2.0;
        let round = |free: bool| if free { r } else { 0.0 };
        let tl = round(!n.top && !n.left);
        let tr = round(!n.top && !n.right);
        let br = round(!n.bottom && !n.right);
        let bl = round(!n.bottom && !n.left);
        match shape {
            DotShape::Square => Self::square(x, y, d, 0.0),
            DotShape::Dots => Self::Circle { cx: x + r, cy: y + r, r },
            DotShape::Rounded => Self::Rect { x, y, w: d, h: d, radii: [tl, tr, br, bl] },
            DotShape::Classy => Self::Rect { x, y, w: d, h: d, radii: [tl, 0.0, br, 0.0] },
        }
    }

    fn path(&self) -> String {
        match *self {
            Self::Rect { x, y, w, h, radii } if radii.iter().all(|&r| r == 0.0) => {
                format!("M{x} {y}h{w}v{h}h{}Z", -w)
            }
            Self::Rect { x, y, w, h, radii: [tl, tr, br, bl] } => format!(
                "M{} {y}H{}A{tr} {tr} 0 0 1 {} {}V{}A{br} {br} 0 0 1 {} {}H{}A{bl} {bl} 0 0 1 {x} {}V{}A{tl} {tl} 0 0 1 {} {y}Z",
                x + tl,
                x + w - tr,
                x + w,
                y + tr,
                y + h - br,
                x + w - br,
                y + h,
                x + bl,
                y + h - bl,
                y + tl,
                x + tl,
            ),
            Self::Circle { cx, cy, r } => {
                format!("M{} {cy}a{r} {r} 0 1 0 {} 0a{r} {r} 0 1 0 {} 0Z", cx - r, 2.0 * r, -2.0 * r)
            }
        }
    }

    fn contains(&self, px: f64, py: f64) -> bool {
        match *self {
            Self::Circle { cx, cy, r } => (px - cx).powi(2) + (py - cy).powi(2) <= r * r,
            Self::Rect { x, y, w, h, radii: [tl, tr, br, bl] } => {
                if px < x || px >= x + w || py < y || py >= y + h {
                    return false;
                }
                let corners = [
                    (tl, x + tl, y + tl, px < x + tl && py < y + tl),
                    (tr, x + w - tr, y + tr, px > x + w - tr && py < y + tr),
                    (br, x + w - br, y + h - br, px > x + w - br && py > y + h - br),
                    (bl, x + bl, y + h - bl, px < x + bl && py > y + h - bl),
                ];
                corners.iter().all(|&(r, cx, cy, in_corner)| {
                    r == 0.0 || !in_corner || (px - cx).powi(2) + (py - cy).powi(2) <= r * r
                })
            }
        }
    }
}

// Outer ring, light gap and the 3x3 centre drawn as one shape
fn finder(x: f64, y: f64, d: f64, shape: CornerShape) -> [(Shape, Paint); 3] {
    match shape {
        CornerShape::Square => [
            (Shape::square(x, y, 7.0 * d, 0.0), Paint::Dots),
            (Shape::square(x + d, y + d, 5.0 * d, 0.0), Paint::Background),
            (Shape::square(x + 2.0 * d, y + 2.0 * d, 3.0 * d, 0.0), Paint::Dots),
        ],
        CornerShape::ExtraRounded => [
            // Larger radii pull the ring's outer corners in far enough to skew corner fitting
            (Shape::square(x, y, 7.0 * d, 1.5 * d), Paint::Dots),
            (Shape::square(x + d, y + d, 5.0 * d, 0.5 * d), Paint::Background),
            (Shape::square(x + 2.0 * d, y + 2.0 * d, 3.0 * d, 0.5 * d), Paint::Dots),
        ],
        CornerShape::Dot => {
            let (cx, cy) = (x + 3.5 * d, y + 3.5 * d);
            [
                (Shape::Circle { cx, cy, r: 3.5 * d }, Paint::Dots),
                (Shape::Circle { cx, cy, r: 2.5 * d }, Paint::Background),
                (Shape::Circle { cx, cy, r: 1.5 * d }, Paint::Dots),
            ]
        }
    }
}

fn compose(matrix: &Matrix, layout: &Layout, options: &RenderOptions) -> Vec<(Shape, Paint)> {
    let count = matrix.count;
    let d = layout.dot;
    let dot_shape = options.dots.shape;
    let hide = options.image_options.hide_background_dots;
    let mut prims = Vec::new();

    for (r0, c0) in [(0, 0), (0, count - 7), (count - 7, 0)] {
        let (x, y) = layout.origin(r0, c0);
        prims.extend(finder(x, y, d, options.corners));
    }

    let visible = |r: isize, c: isize| {
        matrix.is_dark(r, c) && !matrix.in_finder(r, c) && !(hide && layout.is_hidden(r, c))
    };
    for r in 0..count as isize {
        for c in 0..count as isize {
            if !visible(r, c) {
                continue;
            }
            let n = Neighbours {
                top: visible(r - 1, c),
                right: visible(r, c + 1),
                bottom: visible(r + 1, c),
                left: visible(r, c - 1),
            };
            let (x, y) = layout.origin(r as usize, c as usize);
            prims.push((Shape::module(x, y, d, dot_shape, n), Paint::Dots));
        }
    }

    prims
}

// Output
//------------------------------------------------------------------------------

fn to_svg(
    options: &RenderOptions,
    prims: &[(Shape, Paint)],
    logo: Option<(&Logo, (f64, f64, f64))>,
) -> Result<String> {
    let (w, h) = (options.width, options.height);
    let dots = &options.dots.color;
    let bg = &options.background.color;
    parse_hex_color(dots)?;
    parse_hex_color(bg)?;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    svg.push_str(&format!(r#"<rect width="{w}" height="{h}" fill="{bg}"/>"#));

    for group in prims.chunk_by(|a, b| a.1 == b.1) {
        let fill = match group[0].1 {
            Paint::Dots => dots,
            Paint::Background => bg,
        };
        let d = group.iter().map(|(s, _)| s.path()).collect::<String>();
        svg.push_str(&format!(r#"<path fill="{fill}" d="{d}"/>"#));
    }

    if let Some((logo, (x, y, side))) = logo {
        svg.push_str(&format!(
            r#"<image href="{}" x="{x}" y="{y}" width="{side}" height="{side}" preserveAspectRatio="xMidYMid meet"/>"#,
            escape_attr(&logo.to_data_uri())
        ));
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn to_png(
    options: &RenderOptions,
    prims: &[(Shape, Paint)],
    logo: Option<(&Logo, (f64, f64, f64))>,
) -> Result<Vec<u8>> {
    let fg = parse_hex_color(&options.dots.color)?;
    let bg = parse_hex_color(&options.background.color)?;

    let mut canvas = RgbaImage::from_pixel(options.width, options.height, bg);
    for (shape, paint) in prims {
        let color = match paint {
            Paint::Dots => fg,
            Paint::Background => bg,
        };
        fill(&mut canvas, shape, color);
    }

    if let Some((logo, (x, y, side))) = logo {
        let side = side as u32;
        let scaled = logo.decode()?.resize(side, side, imageops::FilterType::Lanczos3);
        let ox = x as i64 + (side - scaled.width()) as i64 / 2;
        let oy = y as i64 + (side - scaled.height()) as i64 / 2;
        imageops::overlay(&mut canvas, &scaled.to_rgba8(), ox, oy);
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn fill(canvas: &mut RgbaImage, shape: &Shape, color: Rgba<u8>) {
    match *shape {
        Shape::Circle { cx, cy, r } => {
            // Keep the pixel diameter within 2r
            let centre = ((cx - 0.5).round() as i32, (cy - 0.5).round() as i32);
            let radius = ((2.0 * r - 1.0) / 2.0).floor().max(0.0) as i32;
            draw_filled_circle_mut(canvas, centre, radius, color);
        }
        Shape::Rect { x, y, w, h, radii } if radii.iter().all(|&r| r == 0.0) => {
            let (w, h) = (w.round() as u32, h.round() as u32);
            if w > 0 && h > 0 {
                draw_filled_rect_mut(canvas, Rect::at(x.round() as i32, y.round() as i32).of_size(w, h), color);
            }
        }
        Shape::Rect { x, y, w, h, .. } => {
            let (x1, y1) = ((x + w).ceil() as u32, (y + h).ceil() as u32);
            for py in (y.floor() as u32)..y1.min(canvas.height()) {
                for px in (x.floor() as u32)..x1.min(canvas.width()) {
                    if shape.contains(px as f64 + 0.5, py as f64 + 0.5) {
                        canvas.put_pixel(px, py, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod render_tests {
    use std::{
        io::Cursor,
        sync::{Arc, Mutex},
    };

    use image::{ImageFormat, Rgba, RgbaImage};
    use test_case::test_case;

    use super::{parse_hex_color, render, Layout, Matrix, StyledRenderer};
    use crate::{
        config::GeneratorConfig,
        error::Result,
        generator::{Artifact, Logo, OptionsPatch, OutputFormat, RenderOptions, RenderTarget, Renderer},
        style::StyleSelection,
    };

    struct Recorder(Arc<Mutex<Vec<Artifact>>>);

    impl RenderTarget for Recorder {
        fn mount(&mut self, artifact: &Artifact) -> Result<()> {
            self.0.lock().unwrap().push(artifact.clone());
            Ok(())
        }
    }

    fn options(style: StyleSelection, format: OutputFormat) -> RenderOptions {
        let mut opts = RenderOptions::from_config(&GeneratorConfig::default(), style);
        opts.format = format;
        opts
    }

    fn png(artifact: &Artifact) -> RgbaImage {
        match artifact {
            Artifact::Png(bytes) => {
                image::load_from_memory_with_format(bytes, ImageFormat::Png).unwrap().to_rgba8()
            }
            Artifact::Svg(_) => panic!("Expected png artifact"),
        }
    }

    fn transparent_logo() -> Logo {
        let img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        Logo::from_bytes(bytes).unwrap()
    }

    #[test_case("#000000", [0, 0, 0, 255]; "black")]
    #[test_case("#ffffff", [255, 255, 255, 255]; "white")]
    #[test_case("#1a2B3c", [0x1a, 0x2b, 0x3c, 255]; "mixed case")]
    #[test_case("#f00", [255, 0, 0, 255]; "short form")]
    fn test_parse_color(s: &str, exp: [u8; 4]) {
        assert_eq!(parse_hex_color(s).unwrap(), Rgba(exp));
    }

    #[test_case("000000"; "missing hash")]
    #[test_case("#12345"; "bad length")]
    #[test_case("#gg0000"; "not hex")]
    #[test_case("#+12345"; "sign")]
    fn test_parse_color_invalid(s: &str) {
        assert!(parse_hex_color(s).is_err());
    }

    #[test]
    fn test_svg_square() {
        let artifact = render(&options(StyleSelection::Square, OutputFormat::Svg)).unwrap();
        let Artifact::Svg(svg) = artifact else { panic!("Expected svg artifact") };
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="280" height="280""#));
        assert!(svg.contains(r##"<path fill="#000000""##));
        assert!(svg.contains(r##"<path fill="#ffffff""##), "Finder inner ring missing");
        assert!(!svg.contains('A'), "Square style should have no arcs");
        assert!(svg.ends_with("</svg>"));
    }

    #[test_case(StyleSelection::Rounded; "rounded")]
    #[test_case(StyleSelection::Dots; "dots")]
    #[test_case(StyleSelection::Classy; "classy")]
    fn test_svg_curved_styles(style: StyleSelection) {
        let artifact = render(&options(style, OutputFormat::Svg)).unwrap();
        let svg = String::from_utf8(artifact.as_bytes().to_vec()).unwrap();
        assert!(svg.contains('A') || svg.contains('a'), "Expected arcs for {style}");
    }

    #[test]
    fn test_svg_embeds_logo() {
        let mut opts = options(StyleSelection::Square, OutputFormat::Svg);
        opts.image = Some(Logo::new("image/png", vec![1, 2, 3]));
        let svg = String::from_utf8(render(&opts).unwrap().as_bytes().to_vec()).unwrap();
        assert!(svg.contains(r#"<image href="data:image/png;base64,AQID""#));
    }

    #[test]
    fn test_png_finders() {
        let opts = options(StyleSelection::Square, OutputFormat::Png);
        let img = png(&render(&opts).unwrap());
        assert_eq!(img.dimensions(), (280, 280));

        let matrix = Matrix::encode(&opts).unwrap();
        let layout = Layout::new(&opts, matrix.count).unwrap();
        let (x, y) = layout.origin(0, 0);
        assert_eq!(*img.get_pixel(x as u32, y as u32), Rgba([0, 0, 0, 255]));
        // Light ring inside the finder
        let d = layout.dot as u32;
        assert_eq!(*img.get_pixel(x as u32 + d + 1, y as u32 + d + 1), Rgba([255, 255, 255, 255]));
        // Quiet border around the centred symbol
        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_png_dot_corners() {
        let opts = options(StyleSelection::Dots, OutputFormat::Png);
        let img = png(&render(&opts).unwrap());
        let matrix = Matrix::encode(&opts).unwrap();
        let layout = Layout::new(&opts, matrix.count).unwrap();
        let (x, y) = layout.origin(0, 0);
        // Circular finder leaves its bounding corner empty
        assert_eq!(*img.get_pixel(x as u32, y as u32), Rgba([255, 255, 255, 255]));
    }

    #[test_case(StyleSelection::Square; "square")]
    #[test_case(StyleSelection::Rounded; "rounded")]
    #[test_case(StyleSelection::Dots; "dots")]
    #[test_case(StyleSelection::Classy; "classy")]
    fn test_png_finder_centre_is_solid(style: StyleSelection) {
        let opts = options(style, OutputFormat::Png);
        let img = png(&render(&opts).unwrap());
        let matrix = Matrix::encode(&opts).unwrap();
        let layout = Layout::new(&opts, matrix.count).unwrap();
        let d = layout.dot as u32;

        let count = matrix.count;
        for (r0, c0) in [(0, 0), (0, count - 7), (count - 7, 0)] {
            let (x, y) = layout.origin(r0, c0);
            // Where four centre modules meet, separate dots would leave a gap
            for (dx, dy) in [(3 * d, 3 * d), (3 * d, 4 * d - 1), (4 * d - 1, 3 * d)] {
                assert_eq!(*img.get_pixel(x as u32 + dx, y as u32 + dy), Rgba([0, 0, 0, 255]));
            }
        }
    }

    #[test]
    fn test_svg_escapes_logo_attribute() {
        let mut opts = options(StyleSelection::Square, OutputFormat::Svg);
        opts.image = Some(Logo::new(r#"image/png" onload="alert(1)"#, vec![1, 2, 3]));
        let svg = String::from_utf8(render(&opts).unwrap().as_bytes().to_vec()).unwrap();
        assert!(!svg.contains(r#"" onload=""#));
        assert!(svg.contains(r#"href="data:image/png&quot; onload=&quot;alert(1);base64,AQID""#));
    }

    #[test]
    fn test_png_hides_dots_behind_logo() {
        let mut opts = options(StyleSelection::Square, OutputFormat::Png);
        opts.image = Some(transparent_logo());
        let img = png(&render(&opts).unwrap());

        let matrix = Matrix::encode(&opts).unwrap();
        let layout = Layout::new(&opts, matrix.count).unwrap();
        let (start, len) = layout.hidden.expect("Logo area");
        let (x, y) = layout.origin(start, start);
        let side = (len as f64 * layout.dot) as u32;
        for py in y as u32..y as u32 + side {
            for px in x as u32..x as u32 + side {
                assert_eq!(*img.get_pixel(px, py), Rgba([255, 255, 255, 255]), "Dot at {px},{py}");
            }
        }
    }

    #[test]
    fn test_canvas_too_small() {
        let mut opts = options(StyleSelection::Square, OutputFormat::Svg);
        opts.width = 10;
        opts.height = 10;
        assert!(render(&opts).is_err());
    }

    #[test]
    fn test_renderer_update_in_place() {
        let mounted = Arc::new(Mutex::new(Vec::new()));
        let mut renderer = StyledRenderer::new(options(StyleSelection::Square, OutputFormat::Svg)).unwrap();
        renderer.append(Box::new(Recorder(mounted.clone()))).unwrap();
        assert_eq!(mounted.lock().unwrap().len(), 1);

        let first = renderer.artifact().clone();
        renderer.update(OptionsPatch { data: Some("hello".to_string()), ..Default::default() }).unwrap();
        assert_eq!(renderer.options().data, "hello");
        assert_ne!(renderer.artifact(), &first);
        assert_eq!(mounted.lock().unwrap().len(), 2);
        assert_eq!(mounted.lock().unwrap()[1], *renderer.artifact());
    }

    #[test]
    fn test_failed_update_keeps_artifact() {
        let mounted = Arc::new(Mutex::new(Vec::new()));
        let mut renderer = StyledRenderer::new(options(StyleSelection::Square, OutputFormat::Svg)).unwrap();
        renderer.append(Box::new(Recorder(mounted.clone()))).unwrap();
        let before = renderer.artifact().clone();

        let res = renderer.update(OptionsPatch { data: Some("x".repeat(5000)), ..Default::default() });
        assert!(res.is_err());
        assert_eq!(renderer.artifact(), &before);
        assert_eq!(renderer.options().data, "https://visernic.com");
        assert_eq!(mounted.lock().unwrap().len(), 1);
    }
}
