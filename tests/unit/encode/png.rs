use super::*;
use crate::foundation::core::Fps;

fn frame(px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: [px, px].concat(),
        premultiplied: true,
    }
}

#[test]
fn writes_numbered_files_with_straight_alpha() {
    let dir = Path::new("target").join("unit_fixtures").join("png_sink");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = PngSequenceSink::new(&dir).with_prefix("shot");
    sink.begin(SinkConfig {
        width: 2,
        height: 1,
        fps: Fps::new(10, 1).unwrap(),
    })
    .unwrap();
    sink.push_frame(FrameIndex(0), &frame([255, 0, 0, 255])).unwrap();
    sink.push_frame(FrameIndex(7), &frame([64, 0, 0, 128])).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 2);

    let first = image::open(dir.join("shot_00000.png")).unwrap().to_rgba8();
    assert_eq!(first.get_pixel(1, 0).0, [255, 0, 0, 255]);
    let last = image::open(sink.path_for(FrameIndex(7))).unwrap().to_rgba8();
    assert_eq!(last.get_pixel(0, 0).0, [128, 0, 0, 128]);
}

#[test]
fn push_before_begin_fails() {
    let mut sink = PngSequenceSink::new("target/unit_fixtures/png_unstarted");
    assert!(sink.push_frame(FrameIndex(0), &frame([0; 4])).is_err());
}
