use super::*;
use crate::foundation::core::Canvas;
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn fixture_dir(name: &str) -> PathBuf {
    let dir = Path::new("target").join("unit_fixtures").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    for (i, px) in [[255, 255, 255, 255], [255, 0, 0, 255], [255, 255, 255, 255]]
        .into_iter()
        .enumerate()
    {
        image::RgbaImage::from_pixel(4, 4, image::Rgba(px))
            .save(dir.join(format!("{}.png", i + 1)))
            .unwrap();
    }
    dir
}

fn small_config() -> SceneConfig {
    SceneConfig {
        canvas: Canvas {
            width: 16,
            height: 16,
        },
        assets: ["1.png".to_owned(), "2.png".to_owned(), "3.png".to_owned()],
        ..SceneConfig::default()
    }
}

fn tick_until_animating(player: &mut Player, start_ms: f64) -> (f64, FrameRGBA) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut now = start_ms;
    loop {
        if let Some(frame) = player.tick(now).unwrap() {
            return (now, frame);
        }
        assert_eq!(player.state(), PlayerState::WaitingForAssets);
        assert!(Instant::now() < deadline, "assets never became ready");
        std::thread::sleep(Duration::from_millis(5));
        now += 16.0;
    }
}

#[test]
fn transitions_once_and_starts_clock_at_ready_tick() {
    let dir = fixture_dir("player_ready");
    let mut player = Player::new(small_config(), &dir).unwrap();
    assert_eq!(player.state(), PlayerState::WaitingForAssets);
    assert!(player.frame_context().is_none());

    let (origin, frame) = tick_until_animating(&mut player, 500.0);
    assert_eq!(player.state(), PlayerState::Animating);
    assert_eq!(player.frame_context().unwrap().origin_ms(), origin);
    assert_eq!((frame.width, frame.height), (16, 16));
    // Red asset multiplied over the white disc; black outside.
    assert_eq!(frame.pixel(8, 8), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));

    // The origin stays fixed on later ticks.
    let later = player.tick(origin + 3000.0).unwrap();
    assert!(later.is_some());
    assert_eq!(player.frame_context().unwrap().origin_ms(), origin);
}

#[test]
fn missing_asset_surfaces_as_error() {
    let dir = fixture_dir("player_missing");
    let mut cfg = small_config();
    cfg.assets[2] = "nope.png".to_owned();
    let mut player = Player::new(cfg, &dir).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let err = loop {
        match player.tick(0.0) {
            Ok(None) => {
                assert!(Instant::now() < deadline, "failure never reported");
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(Some(_)) => panic!("rendered without all assets"),
            Err(e) => break e,
        }
    };
    assert!(matches!(err, crate::SpindleError::AssetLoad { index: 2, .. }));
    assert_eq!(player.state(), PlayerState::WaitingForAssets);
}

#[test]
fn invalid_config_fails_before_loading() {
    let mut cfg = small_config();
    cfg.canvas.width = 0;
    assert!(Player::new(cfg, Path::new(".")).is_err());
}

#[test]
fn non_finite_tick_is_rejected_in_every_state() {
    let dir = fixture_dir("player_non_finite");
    let mut player = Player::new(small_config(), &dir).unwrap();
    assert!(player.tick(f64::NAN).is_err());
    assert_eq!(player.state(), PlayerState::WaitingForAssets);

    let (origin, _) = tick_until_animating(&mut player, 0.0);
    assert!(player.tick(f64::INFINITY).is_err());
    assert_eq!(player.frame_context().unwrap().origin_ms(), origin);
    assert!(player.tick(origin + 16.0).unwrap().is_some());
}
