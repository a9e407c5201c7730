use super::*;
use std::path::Path;

fn solid(w: u32, h: u32) -> PreparedImage {
    PreparedImage::from_straight_rgba8(w, h, vec![255; (w * h * 4) as usize]).unwrap()
}

fn paths() -> [PathBuf; ASSET_COUNT] {
    ["1.png", "2.png", "3.png"].map(PathBuf::from)
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = Path::new("target").join("unit_fixtures").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn barrier_resolves_only_when_all_slots_ready() {
    let mut b = LoadBarrier::new(paths());
    assert!(matches!(b.status(), BarrierStatus::Waiting { pending: 3 }));

    // Completion order does not matter.
    for index in [2, 0] {
        b.record(LoadEvent {
            index,
            result: Ok(solid(2, 2)),
        });
    }
    assert!(matches!(b.status(), BarrierStatus::Waiting { pending: 1 }));

    b.record(LoadEvent {
        index: 1,
        result: Ok(solid(4, 2)),
    });
    let BarrierStatus::Ready(set) = b.status() else {
        panic!("expected ready");
    };
    assert_eq!(set.sizes(), [(2, 2), (4, 2), (2, 2)]);
}

#[test]
fn failure_wins_over_pending_and_names_the_slot() {
    let mut b = LoadBarrier::new(paths());
    b.record(LoadEvent {
        index: 1,
        result: Err("corrupt".to_owned()),
    });
    let BarrierStatus::Failed(SpindleError::AssetLoad {
        index,
        path,
        reason,
    }) = b.status()
    else {
        panic!("expected asset failure");
    };
    assert_eq!(index, 1);
    assert_eq!(path, PathBuf::from("2.png"));
    assert_eq!(reason, "corrupt");
}

#[test]
fn settled_slots_ignore_later_events() {
    let mut b = LoadBarrier::new(paths());
    b.record(LoadEvent {
        index: 0,
        result: Ok(solid(2, 2)),
    });
    b.record(LoadEvent {
        index: 0,
        result: Err("late".to_owned()),
    });
    b.record(LoadEvent {
        index: 7,
        result: Ok(solid(1, 1)),
    });
    assert!(matches!(b.slots()[0], SlotState::Ready(_)));
    assert_eq!(b.pending(), 2);
}

#[test]
fn load_reads_and_decodes_all_three() {
    let dir = fixture_dir("loader_ok");
    let files = [dir.join("a.png"), dir.join("b.png"), dir.join("c.png")];
    write_png(&files[0], 6, 4);
    write_png(&files[1], 3, 3);
    write_png(&files[2], 1, 5);

    let set = AssetLoad::spawn(files, Duration::from_secs(10))
        .wait()
        .unwrap();
    assert_eq!(set.sizes(), [(6, 4), (3, 3), (1, 5)]);
}

#[test]
fn missing_file_is_reported_not_hung() {
    let dir = fixture_dir("loader_missing");
    let files = [dir.join("a.png"), dir.join("nope.png"), dir.join("c.png")];
    write_png(&files[0], 2, 2);
    write_png(&files[2], 2, 2);

    let err = AssetLoad::spawn(files, Duration::from_secs(10))
        .wait()
        .unwrap_err();
    let SpindleError::AssetLoad { index, .. } = err else {
        panic!("expected asset load error, got {err}");
    };
    assert_eq!(index, 1);
}

#[test]
fn wait_is_bounded_by_timeout() {
    // Keep the sender alive so nothing ever completes.
    let (tx, rx) = mpsc::channel();
    let load = AssetLoad {
        barrier: LoadBarrier::new(paths()),
        rx,
        started: Instant::now(),
        timeout: Duration::from_millis(30),
    };
    let err = load.wait().unwrap_err();
    assert!(matches!(err, SpindleError::AssetTimeout { pending: 3, .. }));
    drop(tx);
}

#[test]
fn poll_is_non_blocking_while_waiting() {
    let (tx, rx) = mpsc::channel();
    let mut load = AssetLoad {
        barrier: LoadBarrier::new(paths()),
        rx,
        started: Instant::now(),
        timeout: Duration::from_secs(60),
    };
    assert!(load.poll().unwrap().is_none());

    for index in 0..ASSET_COUNT {
        tx.send(LoadEvent {
            index,
            result: Ok(solid(2, 2)),
        })
        .unwrap();
    }
    assert!(load.poll().unwrap().is_some());
}
