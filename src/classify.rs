// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Heuristic essentiality classification.
//!
//! Three independent checks run over the decoded pixels, in priority order:
//! blur (Laplacian variance), screenshot (unique colour count) and document
//! (low saturation with dense edges). The first check to fire decides the
//! rejection reason. All arithmetic on pixel values is integer or sequential
//! floating point, so results are reproducible for the same input.

use std::{collections::HashSet, path::Path};

use image::{
  GrayImage,
  ImageError,
  ImageReader,
  RgbImage,
  imageops::{self, FilterType},
};

use crate::{
  config::ClassifierConfig,
  error::ClassificationError,
  prim::{RejectionReason, Verdict},
};

/// Raw heuristic measurements for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
  /// Variance of the Laplacian of the grayscale image.
  pub sharpness:     f64,
  /// Unique colours after downsampling.
  pub unique_colors: usize,
  /// Mean HSV saturation, 0-255.
  pub saturation:    f64,
  /// Fraction of pixels marked as edges by Canny.
  pub edge_density:  f64,
}

impl Scores {
  /// Applies `config` thresholds in priority order.
  pub fn verdict(&self, config: &ClassifierConfig) -> Verdict {
    if self.sharpness < config.blur_threshold {
      Verdict::Rejected(RejectionReason::Blurry)
    } else if self.unique_colors < config.min_unique_colors {
      Verdict::Rejected(RejectionReason::Screenshot)
    } else if self.saturation < config.document_max_saturation
      && self.edge_density > config.document_min_edge_density
    {
      Verdict::Rejected(RejectionReason::Document)
    } else {
      Verdict::Essential
    }
  }
}

pub struct Classifier {
  config: ClassifierConfig,
}

impl Classifier {
  pub fn new(config: ClassifierConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &ClassifierConfig {
    &self.config
  }

  /// Decodes the image at `path` and classifies it.
  pub fn classify_file(&self, path: impl AsRef<Path>) -> Result<(Verdict, Scores), ClassificationError> {
    let path = path.as_ref();
    let decode_error = |source: ImageError| ClassificationError::Decode {
      path: path.to_path_buf(),
      source,
    };

    let image = ImageReader::open(path)
      .and_then(ImageReader::with_guessed_format)
      .map_err(|e| decode_error(ImageError::IoError(e)))?
      .decode()
      .map_err(decode_error)?
      .to_rgb8();

    if image.width() == 0 || image.height() == 0 {
      return Err(ClassificationError::Empty {
        path:   path.to_path_buf(),
        width:  image.width(),
        height: image.height(),
      });
    }

    let scores = self.measure(&image);
    let verdict = scores.verdict(&self.config);
    log::debug!(
      "{}: {verdict} (sharpness {:.1}, colours {}, saturation {:.1}, edges {:.3}).",
      path.display(),
      scores.sharpness,
      scores.unique_colors,
      scores.saturation,
      scores.edge_density
    );

    Ok((verdict, scores))
  }

  /// Classifies already decoded pixels.
  pub fn classify(&self, image: &RgbImage) -> Verdict {
    self.measure(image).verdict(&self.config)
  }

  /// Computes all heuristic scores for `image`.
  pub fn measure(&self, image: &RgbImage) -> Scores {
    let gray = imageops::grayscale(image);

    Scores {
      sharpness:     laplacian_variance(&gray),
      unique_colors: unique_colors(image, self.config.color_sample_size),
      saturation:    mean_saturation(image),
      edge_density:  edge_density(&gray, self.config.canny_low, self.config.canny_high),
    }
  }
}

/// Index into a dimension of size `n` with reflect-101 borders
/// (`dcb|abcd|cba`), valid for `i` in `-1..=n`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn reflect(i: i64, n: u32) -> u32 {
  let n = i64::from(n);
  if n == 1 {
    return 0;
  }

  let i = if i < 0 { -i } else { i };
  let i = if i >= n { 2 * n - 2 - i } else { i };
  i as u32
}

/// Variance of the 4-neighbour Laplacian.
#[allow(clippy::cast_precision_loss)]
fn laplacian_variance(gray: &GrayImage) -> f64 {
  let (width, height) = gray.dimensions();
  let pixel = |x: i64, y: i64| i64::from(gray.get_pixel(reflect(x, width), reflect(y, height))[0]);

  let mut sum = 0_i64;
  let mut sum_sq = 0_i64;

  for y in 0..i64::from(height) {
    for x in 0..i64::from(width) {
      let laplacian =
        pixel(x - 1, y) + pixel(x + 1, y) + pixel(x, y - 1) + pixel(x, y + 1) - 4 * pixel(x, y);
      sum += laplacian;
      sum_sq += laplacian * laplacian;
    }
  }

  let count = f64::from(width) * f64::from(height);
  let mean = sum as f64 / count;
  sum_sq as f64 / count - mean * mean
}

/// Unique RGB colours after nearest-neighbour downsampling to `size`x`size`.
fn unique_colors(image: &RgbImage, size: u32) -> usize {
  let sample = imageops::resize(image, size, size, FilterType::Nearest);
  sample.pixels().map(|p| p.0).collect::<HashSet<_>>().len()
}

/// Mean HSV saturation scaled to 0-255.
fn mean_saturation(image: &RgbImage) -> f64 {
  let mut sum = 0.0;
  for pixel in image.pixels() {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max > 0 {
      sum += f64::from(max - min) * 255.0 / f64::from(max);
    }
  }

  sum / (f64::from(image.width()) * f64::from(image.height()))
}

/// Gradient direction, quantized for non-maximum suppression.
#[derive(Clone, Copy)]
enum Direction {
  Horizontal,
  Vertical,
  /// Gradient along the main diagonal (top-left to bottom-right).
  Diagonal,
  /// Gradient along the anti-diagonal (top-right to bottom-left).
  AntiDiagonal,
}

/// tan(22.5°) in Q15 fixed point.
const TAN_22_5_Q15: i64 = 13_573;

/// Fraction of pixels marked as edges by Canny: 3x3 Sobel with L1 magnitude,
/// non-maximum suppression, and hysteresis between `low` and `high`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn edge_density(gray: &GrayImage, low: f64, high: f64) -> f64 {
  let (width, height) = gray.dimensions();
  let (w, h) = (width as usize, height as usize);
  let pixel = |x: i64, y: i64| i64::from(gray.get_pixel(reflect(x, width), reflect(y, height))[0]);

  let mut magnitude = vec![0_i64; w * h];
  let mut direction = vec![Direction::Horizontal; w * h];

  for y in 0..i64::from(height) {
    for x in 0..i64::from(width) {
      let gx = pixel(x + 1, y - 1) + 2 * pixel(x + 1, y) + pixel(x + 1, y + 1)
        - pixel(x - 1, y - 1)
        - 2 * pixel(x - 1, y)
        - pixel(x - 1, y + 1);
      let gy = pixel(x - 1, y + 1) + 2 * pixel(x, y + 1) + pixel(x + 1, y + 1)
        - pixel(x - 1, y - 1)
        - 2 * pixel(x, y - 1)
        - pixel(x + 1, y - 1);

      let (ax, ay) = (gx.abs(), gy.abs());
      let tan_22 = ax * TAN_22_5_Q15;
      let tan_67 = tan_22 + (ax << 16);
      let ay_q15 = ay << 15;

      let i = y as usize * w + x as usize;
      magnitude[i] = ax + ay;
      direction[i] = if ay_q15 < tan_22 {
        Direction::Horizontal
      } else if ay_q15 > tan_67 {
        Direction::Vertical
      } else if (gx < 0) == (gy < 0) {
        Direction::Diagonal
      } else {
        Direction::AntiDiagonal
      };
    }
  }

  let at = |x: usize, y: usize, dx: i64, dy: i64| -> i64 {
    let nx = x as i64 + dx;
    let ny = y as i64 + dy;
    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
      0
    } else {
      magnitude[ny as usize * w + nx as usize]
    }
  };

  // 0: not an edge, 1: weak candidate, 2: strong.
  let mut class = vec![0_u8; w * h];
  let mut stack = Vec::new();

  for y in 0..h {
    for x in 0..w {
      let i = y * w + x;
      let m = magnitude[i];
      if (m as f64) <= low {
        continue;
      }

      let is_max = match direction[i] {
        Direction::Horizontal => m > at(x, y, -1, 0) && m >= at(x, y, 1, 0),
        Direction::Vertical => m > at(x, y, 0, -1) && m >= at(x, y, 0, 1),
        Direction::Diagonal => m > at(x, y, -1, -1) && m > at(x, y, 1, 1),
        Direction::AntiDiagonal => m > at(x, y, 1, -1) && m > at(x, y, -1, 1),
      };
      if !is_max {
        continue;
      }

      if (m as f64) > high {
        class[i] = 2;
        stack.push(i);
      } else {
        class[i] = 1;
      }
    }
  }

  // Promote weak candidates connected to strong edges.
  while let Some(i) = stack.pop() {
    let (x, y) = ((i % w) as i64, (i / w) as i64);
    for dy in -1..=1 {
      for dx in -1..=1 {
        let (nx, ny) = (x + dx, y + dy);
        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
          continue;
        }
        let n = ny as usize * w + nx as usize;
        if class[n] == 1 {
          class[n] = 2;
          stack.push(n);
        }
      }
    }
  }

  let edges = class.iter().filter(|&&c| c == 2).count();
  edges as f64 / (w * h) as f64
}
