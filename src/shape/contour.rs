use std::collections::{HashMap, VecDeque};

use image::GrayImage;

pub type Point = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct GridPoint {
    x: i32,
    y: i32,
}

impl GridPoint {
    fn new(x: usize, y: usize) -> Self {
        Self {
            x: x as i32,
            y: y as i32,
        }
    }
}

/// Outer boundaries of every region enclosed by edge pixels.
///
/// Background is whatever the image border reaches through non-edge pixels
/// (4-connected); everything else is a filled region. Each region yields its
/// outline as a loop of pixel-corner coordinates without a repeated endpoint.
pub fn external_contours(edges: &GrayImage) -> Vec<Vec<Point>> {
    let width = edges.width() as usize;
    let height = edges.height() as usize;
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let is_edge = |idx: usize| edges.as_raw()[idx] != 0;

    let mut background = vec![false; width * height];
    let mut queue = VecDeque::new();
    for y in 0..height {
        for x in 0..width {
            let on_border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
            let idx = y * width + x;
            if on_border && !is_edge(idx) {
                background[idx] = true;
                queue.push_back(idx);
            }
        }
    }
    while let Some(idx) = queue.pop_front() {
        for next in neighbors4(idx, width, height) {
            if !background[next] && !is_edge(next) {
                background[next] = true;
                queue.push_back(next);
            }
        }
    }

    let mut labels = vec![-1i32; width * height];
    let mut contours = Vec::new();
    for start in 0..labels.len() {
        if background[start] || labels[start] >= 0 {
            continue;
        }
        let id = contours.len() as i32;
        let mut pixels = vec![start];
        labels[start] = id;
        let mut cursor = 0;
        while cursor < pixels.len() {
            let idx = pixels[cursor];
            cursor += 1;
            for next in neighbors4(idx, width, height) {
                if !background[next] && labels[next] < 0 {
                    labels[next] = id;
                    pixels.push(next);
                }
            }
        }

        let outline = component_loops(width, height, &labels, id, &pixels)
            .into_iter()
            .map(|lp| {
                lp.into_iter()
                    .map(|p| (p.x as f64, p.y as f64))
                    .collect::<Vec<_>>()
            })
            .max_by(|a, b| signed_area(a).abs().total_cmp(&signed_area(b).abs()));
        contours.push(outline.unwrap_or_default());
    }
    contours.retain(|c| c.len() >= 3);
    contours
}

fn neighbors4(idx: usize, width: usize, height: usize) -> impl Iterator<Item = usize> {
    let (x, y) = (idx % width, idx / width);
    [
        (x > 0).then(|| idx - 1),
        (x + 1 < width).then(|| idx + 1),
        (y > 0).then(|| idx - width),
        (y + 1 < height).then(|| idx + width),
    ]
    .into_iter()
    .flatten()
}

/// Traces the crack edges of one labeled component into closed loops.
fn component_loops(
    width: usize,
    height: usize,
    labels: &[i32],
    id: i32,
    pixels: &[usize],
) -> Vec<Vec<GridPoint>> {
    let inside = |x: usize, y: usize| labels[y * width + x] == id;
    let mut segments = Vec::<(GridPoint, GridPoint)>::new();

    for &idx in pixels {
        let (x, y) = (idx % width, idx / width);
        if y == 0 || !inside(x, y - 1) {
            segments.push((GridPoint::new(x, y), GridPoint::new(x + 1, y)));
        }
        if x + 1 >= width || !inside(x + 1, y) {
            segments.push((GridPoint::new(x + 1, y), GridPoint::new(x + 1, y + 1)));
        }
        if y + 1 >= height || !inside(x, y + 1) {
            segments.push((GridPoint::new(x + 1, y + 1), GridPoint::new(x, y + 1)));
        }
        if x == 0 || !inside(x - 1, y) {
            segments.push((GridPoint::new(x, y + 1), GridPoint::new(x, y)));
        }
    }
    if segments.is_empty() {
        return Vec::new();
    }

    segments.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then_with(|| direction_rank(a.0, a.1).cmp(&direction_rank(b.0, b.1)))
    });

    let mut starts = HashMap::<GridPoint, Vec<usize>>::new();
    for (idx, segment) in segments.iter().enumerate() {
        starts.entry(segment.0).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();
    for seg_idx in 0..segments.len() {
        if used[seg_idx] {
            continue;
        }
        let loop_start = segments[seg_idx].0;
        let mut current = loop_start;
        let mut points = vec![loop_start];

        for _ in 0..=segments.len() {
            let Some(selected) = starts
                .get(&current)
                .and_then(|out| out.iter().copied().find(|c| !used[*c]))
            else {
                break;
            };
            used[selected] = true;
            current = segments[selected].1;
            points.push(current);
            if current == loop_start {
                break;
            }
        }

        if points.len() >= 4 && points.first() == points.last() {
            let simplified = drop_collinear(points);
            if simplified.len() >= 3 {
                loops.push(simplified);
            }
        }
    }
    loops
}

/// Removes the closing duplicate and every point lying on a straight run.
fn drop_collinear(mut points: Vec<GridPoint>) -> Vec<GridPoint> {
    if points.first() == points.last() {
        points.pop();
    }
    let len = points.len();
    if len < 3 {
        return points;
    }
    (0..len)
        .filter(|&i| {
            let prev = points[(i + len - 1) % len];
            let curr = points[i];
            let next = points[(i + 1) % len];
            !((prev.x == curr.x && curr.x == next.x) || (prev.y == curr.y && curr.y == next.y))
        })
        .map(|i| points[i])
        .collect()
}

fn direction_rank(from: GridPoint, to: GridPoint) -> i32 {
    match (to.x - from.x, to.y - from.y) {
        (1, 0) => 0,
        (0, 1) => 1,
        (-1, 0) => 2,
        (0, -1) => 3,
        _ => 4,
    }
}

pub fn signed_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (ax, ay) = points[i];
            let (bx, by) = points[(i + 1) % n];
            ax * by - bx * ay
        })
        .sum();
    twice * 0.5
}

/// Closed perimeter length.
pub fn perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| distance(points[i], points[(i + 1) % n]))
        .sum()
}

fn distance(a: Point, b: Point) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    if len_sq <= 1e-12 {
        return distance(p, a);
    }
    let t = (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0);
    distance(p, (a.0 + abx * t, a.1 + aby * t))
}

/// Douglas-Peucker simplification of a closed polygon.
///
/// The two anchors are an approximate farthest pair so the result does not
/// depend on where the loop happens to start.
pub fn approx_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }
    let farthest_from = |from: usize| {
        (0..n)
            .max_by(|&a, &b| {
                distance(points[from], points[a]).total_cmp(&distance(points[from], points[b]))
            })
            .unwrap_or(from)
    };
    let first = farthest_from(0);
    let second = farthest_from(first);
    if first == second {
        return points.to_vec();
    }

    // Rotate so the first anchor sits at index 0 and close the ring.
    let ring: Vec<Point> = (0..=n).map(|i| points[(first + i) % n]).collect();
    let split = (second + n - first) % n;
    let mut keep = vec![false; ring.len()];
    keep[0] = true;
    keep[split] = true;
    keep[n] = true;

    let mut stack = vec![(0usize, split), (split, n)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (idx, dist) = (start + 1..end)
            .map(|i| (i, point_to_segment_distance(ring[i], ring[start], ring[end])))
            .fold((start, 0.0f64), |best, cur| if cur.1 > best.1 { cur } else { best });
        if dist > epsilon {
            keep[idx] = true;
            stack.push((start, idx));
            stack.push((idx, end));
        }
    }

    (0..n).filter(|&i| keep[i]).map(|i| ring[i]).collect()
}

/// Ellipse with the same area moments as a polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseFit {
    pub cx: f64,
    pub cy: f64,
    pub semi_major: f64,
    pub semi_minor: f64,
    /// Orientation of the major axis, radians.
    pub angle: f64,
}

impl EllipseFit {
    /// Minor over major axis, in `0.0..=1.0`.
    pub fn aspect(&self) -> f64 {
        if self.semi_major <= 0.0 {
            1.0
        } else {
            self.semi_minor / self.semi_major
        }
    }

    pub fn sample(&self, count: usize) -> Vec<Point> {
        let (sin_a, cos_a) = self.angle.sin_cos();
        (0..count)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / count as f64;
                let (a, b) = (self.semi_major * t.cos(), self.semi_minor * t.sin());
                (
                    self.cx + a * cos_a - b * sin_a,
                    self.cy + a * sin_a + b * cos_a,
                )
            })
            .collect()
    }
}

pub fn fit_ellipse(points: &[Point]) -> Option<EllipseFit> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let (mut a, mut mx, mut my, mut m20, mut m02, mut m11) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for i in 0..n {
        let (xi, yi) = points[i];
        let (xj, yj) = points[(i + 1) % n];
        let c = xi * yj - xj * yi;
        a += c;
        mx += (xi + xj) * c;
        my += (yi + yj) * c;
        m20 += (xi * xi + xi * xj + xj * xj) * c;
        m02 += (yi * yi + yi * yj + yj * yj) * c;
        m11 += (xi * yj + 2.0 * xi * yi + 2.0 * xj * yj + xj * yi) * c;
    }
    let area = a / 2.0;
    if area.abs() < 1e-9 {
        return None;
    }
    let cx = mx / (6.0 * area);
    let cy = my / (6.0 * area);
    let u20 = m20 / (12.0 * area) - cx * cx;
    let u02 = m02 / (12.0 * area) - cy * cy;
    let u11 = m11 / (24.0 * area) - cx * cy;

    let half_sum = (u20 + u02) / 2.0;
    let spread = (((u20 - u02) / 2.0).powi(2) + u11 * u11).sqrt();
    let major = half_sum + spread;
    let minor = (half_sum - spread).max(0.0);
    if major <= 0.0 {
        return None;
    }

    Some(EllipseFit {
        cx,
        cy,
        semi_major: 2.0 * major.sqrt(),
        semi_minor: 2.0 * minor.sqrt(),
        angle: 0.5 * (2.0 * u11).atan2(u20 - u02),
    })
}
