//! Filtered-letter renderer: bilinear rescale of a bandpass-filtered
//! template onto a mid-grey canvas at the calibrated letter size.

use crate::calibration::Calibration;
use crate::error::QcsfError;
use crate::optotypes::Template;
use crate::rendering::{check_frame_len, write_pixel};

/// Draws a filtered-letter `template` into `frame` (RGBA8, `w * h`
/// pixels) at the size implied by `f_c` (the template's filter center
/// frequency, cycles/letter), `cpd` (target spatial frequency), and
/// `contrast`.
pub fn draw_filtered_letter(
    frame: &mut [u8],
    w: usize,
    h: usize,
    template: &Template,
    f_c: f64,
    cpd: f64,
    contrast: f64,
    calibration: &Calibration,
) -> Result<(), QcsfError> {
    check_frame_len(frame, w, h)?;

    let letter_deg = f_c / cpd;
    let letter_px = (letter_deg * calibration.pix_per_deg()).min(0.9 * w.min(h) as f64);

    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;
    let half = letter_px / 2.0;
    let left = cx - half;
    let top = cy - half;
    let mid = calibration.mid_point as f64;

    for y in 0..h {
        for x in 0..w {
            let local_x = x as f64 - left;
            let local_y = y as f64 - top;
            let lum_u8 = if local_x >= 0.0 && local_x < letter_px && local_y >= 0.0 && local_y < letter_px {
                let u = local_x / letter_px;
                let v = local_y / letter_px;
                let sampled = template.sample_bilinear(u, v);
                let lum = mid + mid * contrast * sampled;
                lum.round().clamp(0.0, 255.0) as u8
            } else {
                calibration.mid_point
            };
            write_pixel(frame, w, x, y, lum_u8, calibration.mirror);
        }
    }
    Ok(())
}
