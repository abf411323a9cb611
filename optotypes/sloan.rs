//! Sloan letter set: C, D, H, K, N, O, R, S, V, Z, each drawn on the
//! shared 5x5 unit stroke grid.

use std::collections::HashMap;

use crate::bandpass::BandpassMask;
use crate::error::QcsfError;
use crate::optotypes::{build_template, Bitmap, Template, DEFAULT_DELTA_OCT, DEFAULT_FC};

const T: bool = true;
const F: bool = false;

/// The ten Sloan letters, in a fixed canonical order.
pub const LETTERS: [char; 10] = ['C', 'D', 'H', 'K', 'N', 'O', 'R', 'S', 'V', 'Z'];

fn bitmap_for(letter: char) -> Bitmap {
    match letter {
        'C' => [
            [F, T, T, T, T],
            [T, F, F, F, F],
            [T, F, F, F, F],
            [T, F, F, F, F],
            [F, T, T, T, T],
        ],
        'D' => [
            [T, T, T, T, F],
            [T, F, F, F, T],
            [T, F, F, F, T],
            [T, F, F, F, T],
            [T, T, T, T, F],
        ],
        'H' => [
            [T, F, F, F, T],
            [T, F, F, F, T],
            [T, T, T, T, T],
            [T, F, F, F, T],
            [T, F, F, F, T],
        ],
        'K' => [
            [T, F, F, F, T],
            [T, F, F, T, F],
            [T, T, T, F, F],
            [T, F, F, T, F],
            [T, F, F, F, T],
        ],
        'N' => [
            [T, F, F, F, T],
            [T, T, F, F, T],
            [T, F, T, F, T],
            [T, F, F, T, T],
            [T, F, F, F, T],
        ],
        'O' => [
            [F, T, T, T, F],
            [T, F, F, F, T],
            [T, F, F, F, T],
            [T, F, F, F, T],
            [F, T, T, T, F],
        ],
        'R' => [
            [T, T, T, T, F],
            [T, F, F, F, T],
            [T, T, T, T, F],
            [T, F, F, T, F],
            [T, F, F, F, T],
        ],
        'S' => [
            [F, T, T, T, T],
            [T, F, F, F, F],
            [F, T, T, T, F],
            [F, F, F, F, T],
            [T, T, T, T, F],
        ],
        'V' => [
            [T, F, F, F, T],
            [T, F, F, F, T],
            [T, F, F, F, T],
            [F, T, F, T, F],
            [F, F, T, F, F],
        ],
        'Z' => [
            [T, T, T, T, T],
            [F, F, F, T, F],
            [F, F, T, F, F],
            [F, T, F, F, F],
            [T, T, T, T, T],
        ],
        other => panic!("not a Sloan letter: {other}"),
    }
}

/// The full filtered Sloan template set, built once per session by
/// `SloanMode::prepare`.
#[derive(Debug, Clone)]
pub struct SloanTemplates {
    templates: HashMap<char, Template>,
}

impl SloanTemplates {
    /// Rasterizes and bandpass-filters all ten letters at resolution `n`.
    pub fn build(n: usize, f_c: f64, delta_oct: f64) -> Result<Self, QcsfError> {
        let mask = BandpassMask::build(n, f_c, delta_oct);
        let mut templates = HashMap::with_capacity(LETTERS.len());
        for &letter in LETTERS.iter() {
            let bitmap = bitmap_for(letter);
            templates.insert(letter, build_template(&bitmap, n, &mask)?);
        }
        Ok(Self { templates })
    }

    /// Builds the template set with the default filter configuration.
    pub fn build_default(n: usize) -> Result<Self, QcsfError> {
        Self::build(n, DEFAULT_FC, DEFAULT_DELTA_OCT)
    }

    pub fn get(&self, letter: char) -> Option<&Template> {
        self.templates.get(&letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_all_ten_letters() {
        let set = SloanTemplates::build_default(32).unwrap();
        for &letter in LETTERS.iter() {
            assert!(set.get(letter).is_some(), "missing template for {letter}");
        }
    }

    #[test]
    fn templates_are_mean_zero_and_bounded() {
        let set = SloanTemplates::build_default(32).unwrap();
        for &letter in LETTERS.iter() {
            let t = set.get(letter).unwrap();
            let mean: f64 = t.pixels.iter().sum::<f64>() / t.pixels.len() as f64;
            assert!(mean.abs() < 1e-6, "{letter} mean={mean}");
            let peak = t.pixels.iter().fold(0.0f64, |a, v| a.max(v.abs()));
            assert!(peak <= 1.0 + 1e-9, "{letter} peak={peak}");
        }
    }
}
