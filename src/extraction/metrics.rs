//! Per-image acquisition metrics over an 8-bit grayscale raster.

use image::GrayImage;

/// All four raw metrics of one image, in canonical metric order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetrics {
    pub blur: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub entropy: f64,
}

impl ImageMetrics {
    pub fn compute(img: &GrayImage) -> Self {
        let (brightness, contrast) = mean_and_std(img);
        Self {
            blur: laplacian_variance(img),
            brightness,
            contrast,
            entropy: shannon_entropy(img),
        }
    }
}

/// Reflect-101 border index: `-1 -> 1`, `n -> n - 2`.
fn reflect(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let r = if i < 0 {
        -i
    } else if i >= n {
        2 * (n - 1) - i
    } else {
        i
    };
    r as usize
}

/// Population variance of the 4-neighbour Laplacian.
///
/// Kernel `[[0, 1, 0], [1, -4, 1], [0, 1, 0]]`, evaluated at every pixel with
/// reflect-101 borders so the output has the same size as the input.
pub fn laplacian_variance(img: &GrayImage) -> f64 {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let (w, h) = (width as i64, height as i64);
    let raw = img.as_raw();
    let px = |x: i64, y: i64| -> f64 {
        let idx = reflect(y, h) * width as usize + reflect(x, w);
        raw[idx] as f64
    };

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 0..h {
        for x in 0..w {
            let lap = px(x, y - 1) + px(x, y + 1) + px(x - 1, y) + px(x + 1, y) - 4.0 * px(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let n = (w * h) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Mean and population standard deviation of pixel intensities.
pub fn mean_and_std(img: &GrayImage) -> (f64, f64) {
    let raw = img.as_raw();
    if raw.is_empty() {
        return (0.0, 0.0);
    }

    let n = raw.len() as f64;
    let mean = raw.iter().map(|&p| p as f64).sum::<f64>() / n;
    let variance = raw.iter().map(|&p| (p as f64 - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Shannon entropy in bits of the 256-bin intensity histogram.
pub fn shannon_entropy(img: &GrayImage) -> f64 {
    let raw = img.as_raw();
    if raw.is_empty() {
        return 0.0;
    }

    let mut histogram = [0usize; 256];
    for &p in raw {
        histogram[p as usize] += 1;
    }

    let n = raw.len() as f64;
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum()
}
