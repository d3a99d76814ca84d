// Image Augmentation: the standard CIFAR training augmentations
//
// Both transforms treat `Sample::features` as an image in [C, H, W] layout
// (channel-first, row-major). Samples of any other rank, empty images, and
// samples whose feature count disagrees with their shape pass through.

use rand::thread_rng;
use rand::Rng;

use crate::dataset::Sample;
use crate::transform::Transform;

/// `(C, H, W)` of a non-empty image whose features match its shape.
fn chw(sample: &Sample) -> Option<(usize, usize, usize)> {
    match sample.feature_shape.as_slice() {
        &[c, h, w] if c * h * w > 0 && sample.features.len() == c * h * w => Some((c, h, w)),
        _ => None,
    }
}

// RandomHorizontalFlip

/// Mirror an image left-to-right with probability `p`.
#[derive(Debug, Clone)]
pub struct RandomHorizontalFlip {
    pub p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Self {
        Self { p }
    }
}

impl Transform for RandomHorizontalFlip {
    fn apply(&self, mut sample: Sample) -> Sample {
        if thread_rng().gen::<f64>() >= self.p {
            return sample;
        }
        let Some((_, _, w)) = chw(&sample) else {
            return sample;
        };
        for row in sample.features.chunks_mut(w) {
            row.reverse();
        }
        sample
    }
}

// RandomCrop

/// How the border is filled before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Pad with zeros.
    Zero,
    /// Mirror the image across its edge, excluding the edge pixel.
    Reflect,
}

/// Pad an image by `padding` pixels on every side, then cut a random
/// `[crop_h, crop_w]` window out of it.
///
/// `RandomCrop::new(32, 32, 4)` is the usual CIFAR-10 training crop.
#[derive(Debug, Clone)]
pub struct RandomCrop {
    pub crop_h: usize,
    pub crop_w: usize,
    pub padding: usize,
    pub mode: Padding,
}

impl RandomCrop {
    pub fn new(crop_h: usize, crop_w: usize, padding: usize) -> Self {
        Self {
            crop_h,
            crop_w,
            padding,
            mode: Padding::Zero,
        }
    }

    pub fn mode(mut self, mode: Padding) -> Self {
        self.mode = mode;
        self
    }

    /// Crop with the window's top-left corner at `(y0, x0)` in padded
    /// coordinates.
    pub fn crop_at(&self, mut sample: Sample, y0: usize, x0: usize) -> Sample {
        let Some((c, h, w)) = chw(&sample) else {
            return sample;
        };
        let pad = self.padding as isize;
        let mut cropped = Vec::with_capacity(c * self.crop_h * self.crop_w);
        for ch in 0..c {
            let plane = &sample.features[ch * h * w..(ch + 1) * h * w];
            for row in 0..self.crop_h {
                for col in 0..self.crop_w {
                    let y = (y0 + row) as isize - pad;
                    let x = (x0 + col) as isize - pad;
                    let value = match self.mode {
                        Padding::Zero => {
                            if y < 0 || x < 0 || y >= h as isize || x >= w as isize {
                                0.0
                            } else {
                                plane[y as usize * w + x as usize]
                            }
                        }
                        Padding::Reflect => plane[reflect(y, h) * w + reflect(x, w)],
                    };
                    cropped.push(value);
                }
            }
        }
        sample.features = cropped;
        sample.feature_shape = vec![c, self.crop_h, self.crop_w];
        sample
    }
}

/// Map a possibly out-of-bounds coordinate back into `[0, n)` by mirroring.
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m }) as usize
}

impl Transform for RandomCrop {
    fn apply(&self, sample: Sample) -> Sample {
        let Some((_, h, w)) = chw(&sample) else {
            return sample;
        };
        let mut rng = thread_rng();
        let max_y = (h + 2 * self.padding).saturating_sub(self.crop_h);
        let max_x = (w + 2 * self.padding).saturating_sub(self.crop_w);
        let y0 = rng.gen_range(0..=max_y);
        let x0 = rng.gen_range(0..=max_x);
        self.crop_at(sample, y0, x0)
    }
}
