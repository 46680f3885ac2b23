//! Seeded fractal value noise for terrain generators.
//!
//! Lattice values come from an integer hash of the cell and seed, blended
//! with a quintic fade so neighbouring samples stay close. Octaves are summed
//! with falling amplitude and the total is normalized into `[0, 1]`.

/// Octave settings for [`FractalNoise`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Octaves {
    /// Tiles per lattice cell of the first octave.
    pub scale: f32,
    pub count: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FractalNoise {
    seed: u32,
    octaves: Octaves,
}

impl FractalNoise {
    pub(crate) fn new(seed: u32, octaves: Octaves) -> Self {
        Self { seed, octaves }
    }

    /// Sample at tile `(x, y)`, in `[0, 1]`.
    pub(crate) fn sample(&self, x: f32, y: f32) -> f32 {
        let Octaves {
            scale,
            count,
            persistence,
            lacunarity,
        } = self.octaves;
        let mut frequency = 1.0 / scale;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut weight = 0.0;
        for octave in 0..count {
            let seed = self.seed.wrapping_add(octave.wrapping_mul(0x9E37_79B9));
            total += amplitude * value_noise(x * frequency, y * frequency, seed);
            weight += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }
        if weight <= 0.0 {
            return 0.5;
        }
        (total / weight).clamp(0.0, 1.0)
    }
}

fn lattice(x: i32, y: i32, seed: u32) -> f32 {
    let mut h = (x as u32).wrapping_mul(0x27D4_EB2D) ^ (y as u32).wrapping_mul(0x1656_6791);
    h ^= seed.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h = h.wrapping_mul(0x297A_2D39);
    h ^= h >> 15;
    (h >> 8) as f32 / (1u32 << 24) as f32
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Single octave in `[0, 1)`.
fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let (xi, yi) = (x.floor() as i32, y.floor() as i32);
    let (sx, sy) = (fade(x - xi as f32), fade(y - yi as f32));
    let top = lerp(lattice(xi, yi, seed), lattice(xi + 1, yi, seed), sx);
    let bottom = lerp(lattice(xi, yi + 1, seed), lattice(xi + 1, yi + 1, seed), sx);
    lerp(top, bottom, sy)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
