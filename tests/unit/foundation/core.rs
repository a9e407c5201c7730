use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.iter().map(|f| f.0).collect::<Vec<_>>(), vec![2, 3, 4]);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_frame_times_are_exact_for_integral_rates() {
    let fps = Fps::new(60, 1).unwrap();
    assert_eq!(fps.frame_to_ms(FrameIndex(180)), 3000.0);
    assert_eq!(fps.ms_to_frames_ceil(12_000.0), 720);

    let fps = Fps::new(25, 1).unwrap();
    assert_eq!(fps.frame_to_ms(FrameIndex(1)), 40.0);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_validation_and_center() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, MAX_CANVAS_DIM + 1).is_err());
    let c = Canvas::new(640, 360).unwrap();
    assert_eq!(c.center(), Point::new(320.0, 180.0));
    assert_eq!(c.rgba_len(), 640 * 360 * 4);
}

#[test]
fn premul_conversion_scales_color_by_alpha() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::white().to_array(), [255, 255, 255, 255]);
}
