//! sRGB hex ↔ HLS conversions used for the family shade ramps.

/// Channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue, lightness, saturation, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hls {
    pub h: f64,
    pub l: f64,
    pub s: f64,
}

impl Rgb {
    /// Accepts `#rrggbb` or `#rgb`, with or without the leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let s = hex.trim().trim_start_matches('#');
        let channel = |c: &str| u8::from_str_radix(c, 16).ok().map(|v| f64::from(v) / 255.0);
        match s.len() {
            6 => Some(Rgb {
                r: channel(s.get(0..2)?)?,
                g: channel(s.get(2..4)?)?,
                b: channel(s.get(4..6)?)?,
            }),
            3 => {
                let dbl = |i: usize| s.get(i..i + 1).map(|c| c.repeat(2));
                Some(Rgb {
                    r: channel(&dbl(0)?)?,
                    g: channel(&dbl(1)?)?,
                    b: channel(&dbl(2)?)?,
                })
            }
            _ => None,
        }
    }

    /// Lower-case `#rrggbb`; channels are clamped and rounded half-to-even.
    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round_ties_even() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    pub fn to_hls(&self) -> Hls {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let sum = max + min;
        let range = max - min;
        let l = sum / 2.0;
        if range == 0.0 {
            return Hls { h: 0.0, l, s: 0.0 };
        }
        let s = if l <= 0.5 {
            range / sum
        } else {
            range / (2.0 - sum)
        };
        let rc = (max - self.r) / range;
        let gc = (max - self.g) / range;
        let bc = (max - self.b) / range;
        let h = if self.r == max {
            bc - gc
        } else if self.g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };
        Hls {
            h: (h / 6.0).rem_euclid(1.0),
            l,
            s,
        }
    }
}

impl Hls {
    pub fn to_rgb(&self) -> Rgb {
        if self.s == 0.0 {
            return Rgb {
                r: self.l,
                g: self.l,
                b: self.l,
            };
        }
        let m2 = if self.l <= 0.5 {
            self.l * (1.0 + self.s)
        } else {
            self.l + self.s - self.l * self.s
        };
        let m1 = 2.0 * self.l - m2;
        Rgb {
            r: hue_channel(m1, m2, self.h + 1.0 / 3.0),
            g: hue_channel(m1, m2, self.h),
            b: hue_channel(m1, m2, self.h - 1.0 / 3.0),
        }
    }
}

fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

/// `n` evenly spaced points from `start` to `stop`, both ends included.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = stop;
            out
        }
    }
}
