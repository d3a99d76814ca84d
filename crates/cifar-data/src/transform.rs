// Transform: preprocessing applied by a provider on every `get`

use crate::dataset::Sample;

/// A transform applied to each sample as it is read.
pub trait Transform: Send + Sync {
    /// Apply the transform to a sample, returning the modified sample.
    fn apply(&self, sample: Sample) -> Sample;
}

impl<F> Transform for F
where
    F: Fn(Sample) -> Sample + Send + Sync,
{
    fn apply(&self, sample: Sample) -> Sample {
        self(sample)
    }
}

// Built-in transforms

/// Divide every pixel by `scale`.
///
/// `Normalize::new(255.0)` maps raw CIFAR pixels into `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Normalize {
    scale: f64,
}

impl Normalize {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl Transform for Normalize {
    fn apply(&self, mut sample: Sample) -> Sample {
        for v in &mut sample.features {
            *v /= self.scale;
        }
        sample
    }
}

/// Per-channel standardization: `(x - mean[c]) / std[c]`.
///
/// Expects `feature_shape = [C, H, W]` with `C == mean.len()`.  Samples of
/// any other shape, empty images, and samples whose feature count disagrees
/// with their shape pass through unchanged.
#[derive(Debug, Clone)]
pub struct Standardize {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Standardize {
    pub fn new(mean: Vec<f64>, std: Vec<f64>) -> Self {
        assert_eq!(
            mean.len(),
            std.len(),
            "Standardize: mean and std must have one entry per channel"
        );
        Self { mean, std }
    }

    /// Channel statistics of the CIFAR-10 training split, for pixels
    /// already scaled into `[0, 1]`.
    pub fn cifar10() -> Self {
        Self::new(
            vec![0.4914, 0.4822, 0.4465],
            vec![0.2470, 0.2435, 0.2616],
        )
    }
}

impl Transform for Standardize {
    fn apply(&self, mut sample: Sample) -> Sample {
        let shape = &sample.feature_shape;
        if shape.len() != 3 || shape[0] != self.mean.len() {
            return sample;
        }
        let plane = shape[1] * shape[2];
        if plane == 0 || sample.features.len() != shape[0] * plane {
            return sample;
        }
        for (ch, chunk) in sample.features.chunks_mut(plane).enumerate() {
            let (m, s) = (self.mean[ch], self.std[ch]);
            for v in chunk {
                *v = (*v - m) / s;
            }
        }
        sample
    }
}

/// One-hot encode the target label into a vector of size `num_classes`.
#[derive(Debug, Clone)]
pub struct OneHotEncode {
    pub num_classes: usize,
}

impl OneHotEncode {
    pub fn new(num_classes: usize) -> Self {
        Self { num_classes }
    }
}

impl Transform for OneHotEncode {
    fn apply(&self, mut sample: Sample) -> Sample {
        let class_idx = sample.target[0] as usize;
        let mut one_hot = vec![0.0; self.num_classes];
        if class_idx < self.num_classes {
            one_hot[class_idx] = 1.0;
        }
        sample.target = one_hot;
        sample.target_shape = vec![self.num_classes];
        sample
    }
}

/// Chain multiple transforms, applied in order.
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for Compose {
    fn apply(&self, mut sample: Sample) -> Sample {
        for t in &self.transforms {
            sample = t.apply(sample);
        }
        sample
    }
}
