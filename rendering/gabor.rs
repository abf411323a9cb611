//! Calibrated Gabor patch renderer.

use crate::calibration::Calibration;
use crate::error::QcsfError;
use crate::rendering::{check_frame_len, write_pixel};

/// Parameters of a single Gabor patch stimulus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaborParams {
    /// Spatial frequency, cycles per degree.
    pub cpd: f64,
    /// Michelson contrast, `(0, 1]`.
    pub contrast: f64,
    /// Grating orientation, radians.
    pub angle_rad: f64,
}

/// Draws a Gabor patch into `frame` (RGBA8, `w * h` pixels), centered at
/// `(w/2, h/2)`.
///
/// Contract: `params.contrast` must be in `(0, 1]` and `params.cpd > 0`;
/// the caller is responsible for clamping before calling (§4.4).
pub fn draw_gabor(
    frame: &mut [u8],
    w: usize,
    h: usize,
    params: GaborParams,
    calibration: &Calibration,
) -> Result<(), QcsfError> {
    check_frame_len(frame, w, h)?;

    let cpp = 2.0 * std::f64::consts::PI * params.cpd / calibration.pix_per_deg();
    let sigma = w as f64 / 7.0;
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;
    let (sin_t, cos_t) = params.angle_rad.sin_cos();
    let mid = calibration.mid_point as f64;

    for y in 0..h {
        let dy = y as f64 - cy;
        for x in 0..w {
            let dx = x as f64 - cx;
            let carrier = (dx * cos_t + dy * sin_t) * cpp;
            let envelope = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            let lum = mid + mid * params.contrast * carrier.sin() * envelope;
            let lum_u8 = lum.round().clamp(0.0, 255.0) as u8;
            write_pixel(frame, w, x, y, lum_u8, calibration.mirror);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_equals_mid_point() {
        let w = 128;
        let h = 128;
        let mut frame = vec![0u8; 4 * w * h];
        let cal = Calibration::new(5.0, 1000.0, 128, false).unwrap();
        let params = GaborParams { cpd: 4.0, contrast: 0.5, angle_rad: 0.0 };
        draw_gabor(&mut frame, w, h, params, &cal).unwrap();

        let idx = ((h / 2) * w + w / 2) * 4;
        let center = frame[idx] as i32;
        assert!((center - 128).abs() <= 1, "center={center}");
    }

    #[test]
    fn max_deviation_matches_contrast() {
        let w = 256;
        let h = 256;
        let mut frame = vec![0u8; 4 * w * h];
        let cal = Calibration::new(5.0, 1000.0, 128, false).unwrap();
        let params = GaborParams { cpd: 4.0, contrast: 0.5, angle_rad: 0.0 };
        draw_gabor(&mut frame, w, h, params, &cal).unwrap();

        let max_dev = (0..w * h)
            .map(|i| (frame[i * 4] as i32 - 128).abs())
            .max()
            .unwrap();
        assert!((max_dev - 64).abs() <= 1, "max_dev={max_dev}");
    }

    #[test]
    fn rejects_wrong_buffer_length() {
        let mut frame = vec![0u8; 10];
        let cal = Calibration::new(5.0, 1000.0, 128, false).unwrap();
        let params = GaborParams { cpd: 4.0, contrast: 0.5, angle_rad: 0.0 };
        assert!(draw_gabor(&mut frame, 16, 16, params, &cal).is_err());
    }

    #[test]
    fn mirror_flips_asymmetric_pattern() {
        let w = 64;
        let h = 64;
        let cal_plain = Calibration::new(5.0, 1000.0, 128, false).unwrap();
        let cal_mirror = Calibration::new(5.0, 1000.0, 128, true).unwrap();
        let params = GaborParams { cpd: 4.0, contrast: 0.8, angle_rad: 0.3 };

        let mut plain = vec![0u8; 4 * w * h];
        let mut mirrored = vec![0u8; 4 * w * h];
        draw_gabor(&mut plain, w, h, params, &cal_plain).unwrap();
        draw_gabor(&mut mirrored, w, h, params, &cal_mirror).unwrap();

        let y = 10;
        let x = 5;
        let plain_px = plain[(y * w + x) * 4];
        let mirrored_px = mirrored[(y * w + (w - 1 - x)) * 4];
        assert_eq!(plain_px, mirrored_px);
    }
}
