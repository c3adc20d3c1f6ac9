use crabsnap::filters::{self, adjust_brightness_contrast, apply_filter_by_name, FilterKind};
use crabsnap::{CameraError, PixelBuffer};
use proptest::prelude::*;

fn buffer_from(pixels: &[[u8; 4]]) -> PixelBuffer {
    PixelBuffer::from_rgba(pixels.len() as u32, 1, pixels.concat()).unwrap()
}

fn pixels() -> impl Strategy<Value = Vec<[u8; 4]>> {
    prop::collection::vec(any::<[u8; 4]>(), 1..64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn grayscale_is_rounded_average(input in pixels()) {
        let mut buffer = buffer_from(&input);
        filters::grayscale(&mut buffer);

        for (out, px) in buffer.as_bytes().chunks_exact(4).zip(&input) {
            let sum = px[0] as u32 + px[1] as u32 + px[2] as u32;
            let expected = (sum as f64 / 3.0).round_ties_even() as u8;
            prop_assert_eq!(out, &[expected, expected, expected, px[3]][..]);
        }
    }

    #[test]
    fn cool_dims_red_green_and_boosts_blue(input in pixels()) {
        let mut buffer = buffer_from(&input);
        filters::cool(&mut buffer);

        for (out, px) in buffer.as_bytes().chunks_exact(4).zip(&input) {
            prop_assert!(out[0] <= px[0]);
            prop_assert!(out[1] <= px[1]);
            prop_assert!(out[2] >= px[2]);
            prop_assert_eq!(out[3], px[3]);
        }
    }

    #[test]
    fn neutral_adjustment_is_identity(input in pixels()) {
        let mut buffer = buffer_from(&input);
        adjust_brightness_contrast(&mut buffer, 0.0, 0.0).unwrap();
        let expected = input.concat();
        prop_assert_eq!(buffer.as_bytes(), expected.as_slice());
    }

    #[test]
    fn filters_never_touch_alpha(input in pixels(), index in 0usize..4) {
        let kind = FilterKind::ALL[index];
        let mut buffer = buffer_from(&input);
        kind.apply(&mut buffer);

        for (out, px) in buffer.as_bytes().chunks_exact(4).zip(&input) {
            prop_assert_eq!(out[3], px[3]);
        }
    }

    #[test]
    fn unknown_tag_leaves_buffer_unchanged(input in pixels(), tag in "[a-z]{1,12}") {
        prop_assume!(tag.parse::<FilterKind>().is_err());
        let mut buffer = buffer_from(&input);

        let result = apply_filter_by_name(&mut buffer, &tag);
        prop_assert!(matches!(result, Err(CameraError::UnknownFilter(_))));
        let expected = input.concat();
        prop_assert_eq!(buffer.as_bytes(), expected.as_slice());
    }

    #[test]
    fn out_of_range_adjustment_is_rejected(
        input in pixels(),
        brightness in prop_oneof![-1000.0f32..-100.5, 100.5f32..1000.0],
        contrast in -100.0f32..100.0,
    ) {
        let mut buffer = buffer_from(&input);
        let result = adjust_brightness_contrast(&mut buffer, brightness, contrast);
        prop_assert!(matches!(result, Err(CameraError::InvalidParameter(_))));
        let expected = input.concat();
        prop_assert_eq!(buffer.as_bytes(), expected.as_slice());
    }
}

#[test]
fn grayscale_known_pixel() {
    let mut buffer = buffer_from(&[[200, 150, 100, 255]]);
    filters::grayscale(&mut buffer);
    assert_eq!(buffer.as_bytes(), &[150, 150, 150, 255]);
}

#[test]
fn sepia_of_white_saturates_red_and_green() {
    let mut buffer = buffer_from(&[[255, 255, 255, 255]]);
    filters::sepia(&mut buffer);
    assert_eq!(buffer.as_bytes(), &[255, 255, 239, 255]);
}

#[test]
fn vintage_darkens_corners_only() {
    let frame = vec![[200u8, 200, 200, 255]; 64 * 64];
    let mut sepia_only = PixelBuffer::from_rgba(64, 64, frame.concat()).unwrap();
    let mut vintage = sepia_only.clone();
    filters::sepia(&mut sepia_only);
    FilterKind::Vintage.apply(&mut vintage);

    let at = |buffer: &PixelBuffer, x: usize, y: usize| {
        let i = (y * 64 + x) * 4;
        buffer.as_bytes()[i..i + 3].to_vec()
    };
    assert_eq!(at(&vintage, 32, 32), at(&sepia_only, 32, 32));
    assert!(at(&vintage, 0, 0)[0] < at(&sepia_only, 0, 0)[0]);
}

#[test]
fn filter_tags_parse_from_names() {
    for kind in FilterKind::ALL {
        assert_eq!(kind.as_str().parse::<FilterKind>().unwrap(), kind);
    }
}
