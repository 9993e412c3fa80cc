//! Representative-color sampling over layer rasters.

use std::collections::HashMap;

use image::RgbaImage;

use crate::types::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// Most frequent RGB among pixels with non-zero alpha.
    DominantOpaque,
    /// Per-channel arithmetic mean over every pixel, alpha ignored.
    Mean,
}

pub fn sample_color(raster: &RgbaImage, mode: SampleMode) -> Option<Rgb> {
    match mode {
        SampleMode::DominantOpaque => dominant_opaque(raster),
        SampleMode::Mean => average_rgb(raster),
    }
}

/// Histogram mode. Ties go to the color seen first in row-major order.
fn dominant_opaque(raster: &RgbaImage) -> Option<Rgb> {
    // color -> (count, first-seen index)
    let mut counts: HashMap<[u8; 3], (u32, usize)> = HashMap::new();
    for (order, pixel) in raster.pixels().enumerate() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        counts.entry([r, g, b]).or_insert((0, order)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|([r, g, b], _)| Rgb::new(r, g, b))
}

fn average_rgb(raster: &RgbaImage) -> Option<Rgb> {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for pixel in raster.pixels() {
        let c = pixel.0;
        sum[0] += c[0] as u64;
        sum[1] += c[1] as u64;
        sum[2] += c[2] as u64;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Rgb::new(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ))
}
