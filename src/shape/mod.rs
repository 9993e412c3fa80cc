//! Clip-path reconstruction from rendered shape rasters.
//!
//! Pipeline: silhouette plane, 3x3 blur, Canny with a morphological close,
//! external contours, area filter, Douglas-Peucker approximation and finally
//! classification by vertex count. The largest qualifying contour decides the
//! result.

mod contour;
mod edges;

use std::path::{Path, PathBuf};

use image::{GrayImage, Rgba, RgbaImage};
use thiserror::Error;
use tracing::{debug, warn};

use crate::assets::sanitize_filename;
use crate::types::{ClipPath, CornerRadii, LayerNode};

pub use contour::{fit_ellipse, EllipseFit};

/// Contours enclosing less than this many square pixels are noise.
pub const MIN_CONTOUR_AREA: f64 = 100.0;
/// Douglas-Peucker tolerance as a fraction of the contour perimeter.
pub const APPROX_EPSILON_RATIO: f64 = 0.005;
/// Lower bound on the tolerance used only to collapse pixel staircases into
/// triangles and rectangles; the curved-outline test never sees it.
pub const MIN_APPROX_EPSILON: f64 = 1.5;
/// Minor/major ratio at or above which a fitted ellipse is a circle.
pub const CIRCLE_ASPECT: f64 = 0.95;
/// Vertices used to approximate a rotated ellipse.
pub const ELLIPSE_SAMPLES: usize = 256;

#[derive(Debug, Error)]
enum ShapeError {
    #[error("no contour encloses the minimum area")]
    NoContour,
    #[error("could not fit an ellipse to the contour")]
    DegenerateEllipse,
    #[error("failed to write debug raster {path}: {source}")]
    Debug {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// How a shape's silhouette should be expressed in CSS.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeStyle {
    /// Vector rounded rectangle: corner radii go straight to `border-radius`.
    BorderRadius(CornerRadii),
    /// Raster-derived clip; `None` means a plain rectangle (no clip needed).
    Clip(Option<ClipPath>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    Triangle,
    Rectangle,
    Circle,
    Ellipse,
    Polygon(usize),
}

/// Runs the contour pipeline, optionally dumping the intermediate edge map
/// and contour overlay into `debug_dir` (removed again before returning).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeExtractor<'a> {
    debug_dir: Option<&'a Path>,
}

impl<'a> ShapeExtractor<'a> {
    pub fn new() -> Self {
        Self { debug_dir: None }
    }

    pub fn with_debug_dir(debug_dir: &'a Path) -> Self {
        Self {
            debug_dir: Some(debug_dir),
        }
    }

    /// Rounded-rectangle descriptors win; otherwise the layer's raster is
    /// traced. A layer without pixels cannot be traced and inherits.
    pub fn style_for_layer(&self, layer: &LayerNode) -> ShapeStyle {
        if let Some(radii) = layer.shape().and_then(|s| s.rounded_rectangle()) {
            return ShapeStyle::BorderRadius(radii);
        }
        match &layer.raster {
            Some(raster) => ShapeStyle::Clip(self.extract(raster, &layer.name)),
            None => {
                warn!(layer = %layer.name, "no raster to trace; clip-path inherits");
                ShapeStyle::Clip(Some(ClipPath::Inherit))
            }
        }
    }

    /// Never fails: problems are logged and yield [`ClipPath::Inherit`].
    pub fn extract(&self, raster: &RgbaImage, name: &str) -> Option<ClipPath> {
        let mut scratch = ScratchFiles::default();
        match self.trace(raster, name, &mut scratch) {
            Ok((class, clip)) => {
                debug!(layer = name, ?class, "derived clip-path");
                clip
            }
            Err(err) => {
                warn!(layer = name, error = %err, "clip-path extraction failed");
                Some(ClipPath::Inherit)
            }
        }
    }

    fn trace(
        &self,
        raster: &RgbaImage,
        name: &str,
        scratch: &mut ScratchFiles,
    ) -> Result<(ShapeClass, Option<ClipPath>), ShapeError> {
        let plane = edges::silhouette_plane(raster);
        let edge_map = edges::edge_map(&plane);
        self.dump(scratch, name, "edges", || edge_map.clone().into())?;

        let contours = contour::external_contours(&edge_map);
        debug!(layer = name, found = contours.len(), "contours traced");

        let outline = contours
            .into_iter()
            .filter(|c| contour::signed_area(c).abs() >= MIN_CONTOUR_AREA)
            .max_by(|a, b| {
                contour::signed_area(a)
                    .abs()
                    .total_cmp(&contour::signed_area(b).abs())
            })
            .ok_or(ShapeError::NoContour)?;

        let pad = edges::PAD as f64;
        let outline: Vec<contour::Point> = outline.iter().map(|(x, y)| (x - pad, y - pad)).collect();
        let epsilon = APPROX_EPSILON_RATIO * contour::perimeter(&outline);
        let approx = contour::approx_polygon(&outline, epsilon);
        let coarse = contour::approx_polygon(&outline, epsilon.max(MIN_APPROX_EPSILON));

        self.dump(scratch, name, "contours", || overlay(raster, &approx).into())?;

        let (class, clip) = match (coarse.len(), approx.len()) {
            (3, _) => (ShapeClass::Triangle, Some(ClipPath::Polygon(coarse))),
            (4, _) => (ShapeClass::Rectangle, None),
            (_, n) if n > 8 => {
                let fit = fit_ellipse(&outline).ok_or(ShapeError::DegenerateEllipse)?;
                if fit.aspect() >= CIRCLE_ASPECT {
                    let clip = ClipPath::Circle {
                        radius: (fit.semi_major + fit.semi_minor) / 2.0,
                        cx: fit.cx,
                        cy: fit.cy,
                    };
                    (ShapeClass::Circle, Some(clip))
                } else {
                    let points = fit.sample(ELLIPSE_SAMPLES);
                    (ShapeClass::Ellipse, Some(ClipPath::Ellipse(points)))
                }
            }
            (n, _) => (ShapeClass::Polygon(n), Some(ClipPath::Polygon(coarse))),
        };
        Ok((class, clip))
    }

    fn dump(
        &self,
        scratch: &mut ScratchFiles,
        name: &str,
        suffix: &str,
        render: impl FnOnce() -> DebugRaster,
    ) -> Result<(), ShapeError> {
        let Some(dir) = self.debug_dir else {
            return Ok(());
        };
        let path = dir.join(format!("{}_{suffix}.png", sanitize_filename(name)));
        let result = match render() {
            DebugRaster::Gray(img) => img.save(&path),
            DebugRaster::Color(img) => img.save(&path),
        };
        scratch.track(path.clone());
        result.map_err(|source| ShapeError::Debug { path, source })
    }
}

enum DebugRaster {
    Gray(GrayImage),
    Color(RgbaImage),
}

impl From<GrayImage> for DebugRaster {
    fn from(img: GrayImage) -> Self {
        DebugRaster::Gray(img)
    }
}

impl From<RgbaImage> for DebugRaster {
    fn from(img: RgbaImage) -> Self {
        DebugRaster::Color(img)
    }
}

/// Copy of `raster` with the approximated polygon's vertices marked.
fn overlay(raster: &RgbaImage, polygon: &[contour::Point]) -> RgbaImage {
    let mut out = raster.clone();
    let (w, h) = out.dimensions();
    for &(x, y) in polygon {
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (px, py) = (cx + dx, cy + dy);
                if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                    out.put_pixel(px as u32, py as u32, Rgba([0, 255, 0, 255]));
                }
            }
        }
    }
    out
}

/// Intermediate files that must not outlive one extraction.
#[derive(Default)]
struct ScratchFiles(Vec<PathBuf>);

impl ScratchFiles {
    fn track(&mut self, path: PathBuf) {
        self.0.push(path);
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.0.drain(..) {
            if let Err(err) = std::fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %err, "failed to remove debug raster");
                }
            }
        }
    }
}
