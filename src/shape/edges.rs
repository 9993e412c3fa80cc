use std::collections::VecDeque;

use image::{GrayImage, Luma, RgbaImage};

/// Transparent margin added around every raster so silhouettes that touch
/// the layer bounds still produce a closed edge.
pub const PAD: u32 = 4;

const CANNY_LOW: f32 = 10.0;
/// Near-black silhouettes on a transparent background (e.g. rgb(3,3,3)) never
/// reach this gradient, so they yield no contour and the clip inherits. This
/// matches the converter this tool replaces.
const CANNY_HIGH: f32 = 50.0;
const EDGE: u8 = 255;

/// Single-channel plane the edge detector runs on.
///
/// Luma of the padded raster; when luma is flat the alpha channel carries the
/// silhouette instead, and when both are flat the plane is min-max normalized.
pub fn silhouette_plane(raster: &RgbaImage) -> GrayImage {
    let (w, h) = raster.dimensions();
    let mut padded = RgbaImage::new(w + 2 * PAD, h + 2 * PAD);
    image::imageops::replace(&mut padded, raster, PAD as i64, PAD as i64);

    let gray = GrayImage::from_fn(padded.width(), padded.height(), |x, y| {
        let [r, g, b, _] = padded.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    });
    if !is_flat(&gray) {
        return gray;
    }

    let alpha = GrayImage::from_fn(padded.width(), padded.height(), |x, y| {
        Luma([padded.get_pixel(x, y).0[3]])
    });
    if !is_flat(&alpha) {
        return alpha;
    }
    normalize(&gray)
}

fn is_flat(plane: &GrayImage) -> bool {
    let mut values = plane.pixels().map(|p| p.0[0]);
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}

fn normalize(plane: &GrayImage) -> GrayImage {
    let (min, max) = plane
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    let range = max.saturating_sub(min);
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        if range == 0 {
            return Luma([0]);
        }
        let v = plane.get_pixel(x, y).0[0] - min;
        Luma([(v as u32 * 255 / range as u32) as u8])
    })
}

/// Dense float plane used between the blur and the edge detector.
struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Plane {
    fn at(&self, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.width + cx]
    }
}

/// 3x3 gaussian (`[1, 2, 1] / 4` in each direction), clamped borders.
fn blur3(plane: &GrayImage) -> Plane {
    let width = plane.width() as usize;
    let height = plane.height() as usize;
    let src = Plane {
        width,
        height,
        data: plane.pixels().map(|p| p.0[0] as f32).collect(),
    };

    let mut temp = Plane {
        width,
        height,
        data: vec![0.0; width * height],
    };
    for y in 0..height {
        for x in 0..width {
            let (xi, yi) = (x as isize, y as isize);
            temp.data[y * width + x] =
                (src.at(xi - 1, yi) + 2.0 * src.at(xi, yi) + src.at(xi + 1, yi)) / 4.0;
        }
    }

    let mut dst = Plane {
        width,
        height,
        data: vec![0.0; width * height],
    };
    for y in 0..height {
        for x in 0..width {
            let (xi, yi) = (x as isize, y as isize);
            dst.data[y * width + x] =
                (temp.at(xi, yi - 1) + 2.0 * temp.at(xi, yi) + temp.at(xi, yi + 1)) / 4.0;
        }
    }
    dst
}

/// Blur, Canny edge detection and a morphological close.
pub fn edge_map(plane: &GrayImage) -> GrayImage {
    let blurred = blur3(plane);
    close(&canny(&blurred))
}

fn canny(src: &Plane) -> GrayImage {
    let (width, height) = (src.width, src.height);
    let mut magnitude = vec![0.0f32; width * height];
    let mut sector = vec![0u8; width * height];

    for y in 0..height {
        for x in 0..width {
            let (xi, yi) = (x as isize, y as isize);
            let p = |dx: isize, dy: isize| src.at(xi + dx, yi + dy);
            let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
            let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
            let idx = y * width + x;
            magnitude[idx] = gx.abs() + gy.abs();
            sector[idx] = gradient_sector(gx, gy);
        }
    }

    let mag_at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0.0
        } else {
            magnitude[y as usize * width + x as usize]
        }
    };

    // Non-maximum suppression: 0 none, 1 weak, 2 strong.
    let mut class = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let m = magnitude[idx];
            if m <= CANNY_LOW {
                continue;
            }
            let (dx, dy) = match sector[idx] {
                0 => (1, 0),
                1 => (1, 1),
                2 => (0, 1),
                _ => (-1, 1),
            };
            let (xi, yi) = (x as isize, y as isize);
            let before = mag_at(xi - dx, yi - dy);
            let after = mag_at(xi + dx, yi + dy);
            if m > before && m >= after {
                class[idx] = if m > CANNY_HIGH { 2 } else { 1 };
            }
        }
    }

    // Hysteresis: weak pixels survive when 8-connected to a strong one.
    let mut edges = GrayImage::new(width as u32, height as u32);
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    for y in 0..height {
        for x in 0..width {
            if class[y * width + x] == 2 {
                edges.put_pixel(x as u32, y as u32, Luma([EDGE]));
                queue.push_back((x, y));
            }
        }
    }
    while let Some((x, y)) = queue.pop_front() {
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                let idx = ny * width + nx;
                if class[idx] == 1 && edges.get_pixel(nx as u32, ny as u32).0[0] == 0 {
                    edges.put_pixel(nx as u32, ny as u32, Luma([EDGE]));
                    queue.push_back((nx, ny));
                }
            }
        }
    }
    edges
}

/// Quantizes the gradient direction into horizontal, the two diagonals and
/// vertical (0..=3).
fn gradient_sector(gx: f32, gy: f32) -> u8 {
    let mut angle = gy.atan2(gx).to_degrees();
    if angle < 0.0 {
        angle += 180.0;
    }
    if !(22.5..157.5).contains(&angle) {
        0
    } else if angle < 67.5 {
        1
    } else if angle < 112.5 {
        2
    } else {
        3
    }
}

const CROSS: [(i32, i32); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];

/// Dilate then erode with a 3x3 elliptical (cross) element.
fn close(edges: &GrayImage) -> GrayImage {
    let dilated = morph(edges, true);
    morph(&dilated, false)
}

fn morph(src: &GrayImage, dilate: bool) -> GrayImage {
    let (w, h) = (src.width() as i32, src.height() as i32);
    GrayImage::from_fn(src.width(), src.height(), |x, y| {
        let mut hits = CROSS.iter().map(|(dx, dy)| {
            let (nx, ny) = (x as i32 + dx, y as i32 + dy);
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                // Out of bounds never grows a dilation nor shrinks an erosion.
                !dilate
            } else {
                src.get_pixel(nx as u32, ny as u32).0[0] == EDGE
            }
        });
        let on = if dilate {
            hits.any(|hit| hit)
        } else {
            hits.all(|hit| hit)
        };
        Luma([if on { EDGE } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn count_edges(edges: &GrayImage) -> usize {
        edges.pixels().filter(|p| p.0[0] == EDGE).count()
    }

    #[test]
    fn flat_luma_falls_back_to_alpha() {
        let mut raster = RgbaImage::from_pixel(6, 6, Rgba([0, 0, 0, 0]));
        raster.put_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let plane = silhouette_plane(&raster);
        assert_eq!(plane.dimensions(), (6 + 2 * PAD, 6 + 2 * PAD));
        assert_eq!(plane.get_pixel(2 + PAD, 2 + PAD).0[0], 255);
        assert_eq!(plane.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn fully_flat_plane_normalizes_to_zero() {
        let raster = RgbaImage::from_pixel(0, 0, Rgba([9, 9, 9, 255]));
        let plane = silhouette_plane(&raster);
        assert!(plane.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn uniform_plane_has_no_edges() {
        let plane = GrayImage::from_pixel(20, 20, Luma([120]));
        assert_eq!(count_edges(&edge_map(&plane)), 0);
    }

    #[test]
    fn square_produces_a_closed_ring() {
        let raster = RgbaImage::from_pixel(20, 20, Rgba([200, 30, 30, 255]));
        let edges = edge_map(&silhouette_plane(&raster));
        assert!(count_edges(&edges) >= 4 * 18, "ring too sparse");
        // interior stays empty
        let c = PAD + 10;
        assert_eq!(edges.get_pixel(c, c).0[0], 0);
    }

    #[test]
    fn close_fills_single_pixel_holes() {
        let mut edges = GrayImage::new(7, 7);
        for y in 1..=5 {
            for x in 1..=5 {
                if (x, y) != (3, 3) {
                    edges.put_pixel(x, y, Luma([EDGE]));
                }
            }
        }
        let closed = close(&edges);
        assert_eq!(closed.get_pixel(3, 3).0[0], EDGE);
        assert_eq!(closed.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn gradient_sectors_cover_axes_and_diagonals() {
        assert_eq!(gradient_sector(1.0, 0.0), 0);
        assert_eq!(gradient_sector(-1.0, 0.0), 0);
        assert_eq!(gradient_sector(1.0, 1.0), 1);
        assert_eq!(gradient_sector(0.0, 1.0), 2);
        assert_eq!(gradient_sector(-1.0, 1.0), 3);
    }
}
