use super::*;

fn frame(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![0; (w * h * 4) as usize],
        premultiplied: true,
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
    }
}

#[test]
fn in_memory_sink_captures_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.push_frame(FrameIndex(3), &frame(2, 2)).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config(), Some(cfg()));
    assert!(sink.is_ended());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 3]);
}

#[test]
fn in_memory_sink_rejects_out_of_order_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(5), &frame(2, 2)).unwrap();
    assert!(sink.push_frame(FrameIndex(5), &frame(2, 2)).is_err());
    assert!(sink.push_frame(FrameIndex(4), &frame(2, 2)).is_err());
}

#[test]
fn frame_size_is_checked_against_config() {
    assert!(check_frame_size(&cfg(), &frame(2, 2)).is_ok());
    assert!(check_frame_size(&cfg(), &frame(4, 2)).is_err());

    let mut short = frame(2, 2);
    short.data.pop();
    assert!(check_frame_size(&cfg(), &short).is_err());
}
