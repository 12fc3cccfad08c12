use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

use crate::config::Region;
use crate::error::FieldError;

/// Upsampling factor applied when `scale` is requested.
pub const SCALE_FACTOR: u32 = 2;

/// Per-field preprocessing switches. Grayscale conversion always happens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreprocessFlags {
    /// Threshold to pure black/white
    pub binarize: bool,
    /// Swap light and dark (light-on-dark glyphs become dark-on-light)
    pub invert: bool,
    /// Upsample by [`SCALE_FACTOR`] to enlarge small glyphs
    pub scale: bool,
}

/// Crops a sub-region from an image using absolute pixel coordinates.
///
/// Unlike a clamped crop, a region that reaches past the image edge (or has
/// no area) is rejected: the layout doesn't match the screenshot, and
/// reading a partial crop would silently produce wrong values.
pub fn extract_region(img: &RgbaImage, region: &Region) -> Result<RgbaImage, FieldError> {
    let (w, h) = img.dimensions();

    let fits_x = region.x.checked_add(region.width).is_some_and(|right| right <= w);
    let fits_y = region.y.checked_add(region.height).is_some_and(|bottom| bottom <= h);
    if region.width == 0 || region.height == 0 || !fits_x || !fits_y {
        return Err(FieldError::Bounds {
            region: *region,
            width: w,
            height: h,
        });
    }

    Ok(imageops::crop_imm(img, region.x, region.y, region.width, region.height).to_image())
}

/// Prepares a cropped field for recognition.
///
/// Order is grayscale → scale → binarize → invert, so thresholding works on
/// the smoothed, enlarged glyph edges rather than the raw pixels.
pub fn preprocess(img: &RgbaImage, flags: PreprocessFlags) -> Result<GrayImage, FieldError> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(FieldError::Preprocess(format!("empty {}x{} image", w, h)));
    }

    let mut gray = imageops::grayscale(img);

    if flags.scale {
        let (sw, sh) = match (w.checked_mul(SCALE_FACTOR), h.checked_mul(SCALE_FACTOR)) {
            (Some(sw), Some(sh)) => (sw, sh),
            _ => {
                return Err(FieldError::Preprocess(format!(
                    "{}x{} image too large to scale",
                    w, h
                )));
            }
        };
        gray = imageops::resize(&gray, sw, sh, FilterType::CatmullRom);
    }

    if flags.binarize {
        let threshold = otsu_threshold(&gray);
        binarize(&mut gray, threshold);
    }

    if flags.invert {
        imageops::invert(&mut gray);
    }

    Ok(gray)
}

/// Pixels brighter than `threshold` become white, everything else black.
fn binarize(img: &mut GrayImage, threshold: u8) {
    for pixel in img.pixels_mut() {
        *pixel = if pixel[0] > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        };
    }
}

/// Picks the threshold that maximizes between-class variance of the
/// histogram (Otsu's method).
fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0.0f64;
    let mut best_threshold = 0u8;
    let mut best_variance = -1.0f64;

    for (value, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += value as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight as f64;
        let diff = background_mean - foreground_mean;
        let variance = background_weight as f64 * foreground_weight as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            best_threshold = value as u8;
        }
    }

    best_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn gradient(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, (x + y) as u8, 255])
        })
    }

    #[test]
    fn test_extract_region_matches_manual_crop() {
        let img = gradient(100, 200);
        let region = Region::new(10, 50, 30, 20);

        let cropped = extract_region(&img, &region).unwrap();

        assert_eq!(cropped.dimensions(), (30, 20));
        for y in 0..20 {
            for x in 0..30 {
                assert_eq!(cropped.get_pixel(x, y), img.get_pixel(x + 10, y + 50));
            }
        }
    }

    #[test]
    fn test_extract_region_is_deterministic() {
        let img = gradient(64, 64);
        let region = Region::new(3, 7, 20, 11);

        let a = extract_region(&img, &region).unwrap();
        let b = extract_region(&img, &region).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_extract_region_full_image() {
        let img = gradient(40, 30);
        let cropped = extract_region(&img, &Region::new(0, 0, 40, 30)).unwrap();
        assert_eq!(cropped.as_raw(), img.as_raw());
    }

    #[test]
    fn test_extract_region_out_of_bounds() {
        let img = gradient(100, 100);

        for region in [
            Region::new(90, 90, 20, 5),
            Region::new(0, 95, 10, 10),
            Region::new(100, 0, 1, 1),
            Region::new(10, 10, 0, 5),
            Region::new(u32::MAX, 0, 2, 2),
        ] {
            match extract_region(&img, &region) {
                Err(FieldError::Bounds { width, height, .. }) => {
                    assert_eq!((width, height), (100, 100));
                }
                other => panic!("expected bounds error for {}, got {:?}", region, other),
            }
        }
    }

    #[test]
    fn test_preprocess_scale_doubles_dimensions() {
        let img = gradient(19, 15);
        let flags = PreprocessFlags {
            scale: true,
            ..PreprocessFlags::default()
        };

        let out = preprocess(&img, flags).unwrap();
        assert_eq!(out.dimensions(), (38, 30));
    }

    #[test]
    fn test_preprocess_without_scale_keeps_dimensions() {
        let img = gradient(48, 20);
        let out = preprocess(&img, PreprocessFlags::default()).unwrap();
        assert_eq!(out.dimensions(), (48, 20));
    }

    #[test]
    fn test_preprocess_rejects_empty_image() {
        let img: RgbaImage = ImageBuffer::new(0, 0);
        assert!(matches!(
            preprocess(&img, PreprocessFlags::default()),
            Err(FieldError::Preprocess(_))
        ));
    }

    #[test]
    fn test_binarize_and_invert_light_text_on_dark() {
        // Left half bright glyph, right half dark background
        let img: RgbaImage = ImageBuffer::from_fn(10, 4, |x, _| {
            if x < 5 {
                Rgba([230, 230, 230, 255])
            } else {
                Rgba([30, 30, 30, 255])
            }
        });

        let flags = PreprocessFlags {
            binarize: true,
            invert: true,
            scale: false,
        };
        let out = preprocess(&img, flags).unwrap();

        assert_eq!(out.get_pixel(0, 0)[0], 0, "Bright text should end up black");
        assert_eq!(out.get_pixel(9, 0)[0], 255, "Dark background should end up white");
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_preprocess_is_pure() {
        let img = gradient(32, 16);
        let flags = PreprocessFlags {
            binarize: true,
            invert: true,
            scale: true,
        };
        let a = preprocess(&img, flags).unwrap();
        let b = preprocess(&img, flags).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_otsu_threshold_splits_two_levels() {
        let img: GrayImage =
            ImageBuffer::from_fn(8, 1, |x, _| if x < 4 { Luma([20]) } else { Luma([200]) });
        let threshold = otsu_threshold(&img);
        assert!((20..200).contains(&threshold));
    }
}
