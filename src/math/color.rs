//! Colour arithmetic: RGB distance, blending and CIE Lab conversion

use crate::spatial::buffer::Rgba;

/// An opaque RGB colour
pub type Rgb = [u8; 3];

/// Largest possible Euclidean distance between two RGB colours
pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

/// CIE L*a*b* coordinates (D65 white point)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    /// Lightness in `[0, 100]`
    pub l: f64,
    /// Green-red axis
    pub a: f64,
    /// Blue-yellow axis
    pub b: f64,
}

/// Drop the alpha channel
pub const fn rgb_of(color: Rgba) -> Rgb {
    [color[0], color[1], color[2]]
}

/// Attach an opaque alpha channel
pub const fn opaque(color: Rgb) -> Rgba {
    [color[0], color[1], color[2], 255]
}

/// Euclidean distance in RGB space
pub fn rgb_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = f64::from(a[0]) - f64::from(b[0]);
    let dg = f64::from(a[1]) - f64::from(b[1]);
    let db = f64::from(a[2]) - f64::from(b[2]);
    db.mul_add(db, dr.mul_add(dr, dg * dg)).sqrt()
}

/// Linear blend from `a` (t = 0) to `b` (t = 1)
pub fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| {
        let value = (f64::from(y) - f64::from(x)).mul_add(t, f64::from(x));
        value.round().clamp(0.0, 255.0) as u8
    };
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Average of two colours
pub fn midpoint_rgb(a: Rgb, b: Rgb) -> Rgb {
    lerp_rgb(a, b, 0.5)
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Convert an sRGB colour to CIE Lab
pub fn to_lab(color: Rgb) -> Lab {
    let r = srgb_to_linear(color[0]);
    let g = srgb_to_linear(color[1]);
    let b = srgb_to_linear(color[2]);

    let x = 0.180_480_8f64.mul_add(b, 0.412_456_4f64.mul_add(r, 0.357_576_1 * g));
    let y = 0.072_175_0f64.mul_add(b, 0.212_672_9f64.mul_add(r, 0.715_152_2 * g));
    let z = 0.950_304_1f64.mul_add(b, 0.019_333_9f64.mul_add(r, 0.119_192_0 * g));

    // D65 reference white
    let fx = lab_f(x / 0.950_47);
    let fy = lab_f(y);
    let fz = lab_f(z / 1.088_83);

    Lab {
        l: 116.0f64.mul_add(fy, -16.0),
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// CIE76 colour difference
pub fn delta_e(a: Rgb, b: Rgb) -> f64 {
    let la = to_lab(a);
    let lb = to_lab(b);
    let dl = la.l - lb.l;
    let da = la.a - lb.a;
    let db = la.b - lb.b;
    db.mul_add(db, dl.mul_add(dl, da * da)).sqrt()
}
