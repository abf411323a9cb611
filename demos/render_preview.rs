//! Renders one representative frame per stimulus family to a PNG, so a
//! reviewer can eyeball what the engine's selected stimuli actually look
//! like without wiring up a display. Requires the `visualization` feature.

use image::ColorType;

use qcsf::rendering::filtered_letter::draw_filtered_letter;
use qcsf::rendering::gabor::{draw_gabor, GaborParams};
use qcsf::optotypes::sloan::SloanTemplates;
use qcsf::optotypes::tumbling_e::{Direction, TumblingETemplates};
use qcsf::optotypes::DEFAULT_FC;
use qcsf::Calibration;

const WIDTH: usize = 256;
const HEIGHT: usize = 256;

fn main() -> anyhow::Result<()> {
    let calibration = Calibration::new(5.0, 600.0, 128, false)?;

    let mut gabor_frame = vec![0u8; 4 * WIDTH * HEIGHT];
    draw_gabor(
        &mut gabor_frame,
        WIDTH,
        HEIGHT,
        GaborParams { cpd: 4.0, contrast: 0.5, angle_rad: 0.0 },
        &calibration,
    )?;
    save_png(&gabor_frame, "gabor_preview.png")?;

    let sloan_templates = SloanTemplates::build_default(64)?;
    let mut sloan_frame = vec![0u8; 4 * WIDTH * HEIGHT];
    let letter_template = sloan_templates.get('O').expect("O is a Sloan letter");
    draw_filtered_letter(&mut sloan_frame, WIDTH, HEIGHT, letter_template, DEFAULT_FC, 6.0, 0.5, &calibration)?;
    save_png(&sloan_frame, "sloan_preview.png")?;

    let e_templates = TumblingETemplates::build_default(64)?;
    let mut e_frame = vec![0u8; 4 * WIDTH * HEIGHT];
    let e_template = e_templates.get(Direction::Right);
    draw_filtered_letter(&mut e_frame, WIDTH, HEIGHT, e_template, DEFAULT_FC, 6.0, 0.5, &calibration)?;
    save_png(&e_frame, "tumbling_e_preview.png")?;

    println!("wrote gabor_preview.png, sloan_preview.png, tumbling_e_preview.png");
    Ok(())
}

fn save_png(frame: &[u8], path: &str) -> anyhow::Result<()> {
    image::save_buffer(path, frame, WIDTH as u32, HEIGHT as u32, ColorType::Rgba8)?;
    Ok(())
}
