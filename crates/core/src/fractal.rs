use glam::Vec3;
use noise::{NoiseFn, Simplex};

/// Multi-octave simplex noise. Each octave multiplies the frequency by
/// `lacunarity` and the amplitude by `persistence`.
#[derive(Debug, Clone)]
pub struct FractalNoise {
    simplex: Simplex,
    pub octaves: u32,
    pub frequency: f32,
    pub amplitude: f32,
    pub lacunarity: f32,
    pub persistence: f32,
}

impl FractalNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: Simplex::new(seed),
            octaves: 1,
            frequency: 1.0,
            amplitude: 1.0,
            lacunarity: 2.0,
            persistence: 1.0,
        }
    }

    pub fn sample(&self, p: Vec3) -> f32 {
        let mut frequency = self.frequency;
        let mut amplitude = self.amplitude;
        let mut total = 0.0f32;
        for _ in 0..self.octaves {
            let q = p * frequency;
            let value = self
                .simplex
                .get([f64::from(q.x), f64::from(q.y), f64::from(q.z)]);
            total += amplitude * value as f32;
            frequency *= self.lacunarity;
            amplitude *= self.persistence;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deterministic_for_a_seed() {
        let a = FractalNoise::new(7);
        let b = FractalNoise::new(7);
        let p = Vec3::new(0.3, 1.7, -2.1);
        assert_eq!(a.sample(p), b.sample(p));
    }

    #[test]
    fn zero_amplitude_is_flat() {
        let mut noise = FractalNoise::new(0);
        noise.octaves = 4;
        noise.amplitude = 0.0;
        assert_relative_eq!(noise.sample(Vec3::new(0.5, 0.25, 0.125)), 0.0);
    }

    #[test]
    fn octaves_stay_bounded() {
        let mut noise = FractalNoise::new(3);
        noise.octaves = 3;
        noise.persistence = 0.5;
        // 1 + 0.5 + 0.25 with each octave in [-1, 1]
        for i in 0..64 {
            let p = Vec3::splat(i as f32 * 0.37);
            assert!(noise.sample(p).abs() <= 1.75 + 1e-4);
        }
    }
}
