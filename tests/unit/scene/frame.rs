use super::*;
use crate::assets::PreparedImage;
use std::sync::Arc;

fn image(w: u32, h: u32) -> Arc<PreparedImage> {
    Arc::new(PreparedImage::from_straight_rgba8(w, h, vec![255; (w * h * 4) as usize]).unwrap())
}

fn ctx_with(config: &SceneConfig, sizes: [(u32, u32); 3]) -> FrameContext {
    let mut clock = AnimationClock::new(config.timeline().unwrap());
    clock.start(0.0).unwrap();
    let assets = AssetSet::new(sizes.map(|(w, h)| image(w, h)));
    FrameContext::new(config, &clock, &assets).unwrap()
}

fn ctx() -> FrameContext {
    let config = SceneConfig {
        canvas: Canvas {
            width: 200,
            height: 100,
        },
        ..SceneConfig::default()
    };
    ctx_with(&config, [(40, 30), (20, 20), (10, 10)])
}

fn assert_angles(got: SpinAngles, want: [f64; 3]) {
    for (g, w) in got.0.iter().zip(want) {
        assert!((g - w).abs() < 1e-12, "got {:?}, want {want:?}", got.0);
    }
}

#[test]
fn angle_scenarios_over_one_cycle() {
    let c = ctx();
    assert_angles(c.angles_at(0.0), [0.0, 0.0, 0.0]);
    assert_angles(c.angles_at(3000.0), [PI / 2.0, PI / 4.0, -PI / 4.0]);
    assert_angles(c.angles_at(6000.0), [PI, PI / 2.0, -PI / 2.0]);
    assert_angles(c.angles_at(9000.0), [PI / 2.0, PI / 4.0, -PI / 4.0]);
    assert_angles(c.angles_at(12_000.0), [0.0, 0.0, 0.0]);
}

#[test]
fn angles_scale_with_progress() {
    let spins = [1.0, 0.5, -0.5];
    let mut prev = -1.0;
    for i in 0..=100 {
        let p = f64::from(i) / 100.0;
        let SpinAngles([a1, a2, a3]) = SpinAngles::from_progress(p, spins);
        assert!(a1 > prev);
        assert!((a1 - PI * p).abs() < 1e-12);
        assert!((a2 - PI * p / 2.0).abs() < 1e-12);
        assert!((a3 + PI * p / 2.0).abs() < 1e-12);
        prev = a1;
    }
}

#[test]
fn context_requires_started_clock() {
    let config = SceneConfig::default();
    let clock = AnimationClock::new(config.timeline().unwrap());
    let assets = AssetSet::new([image(1, 1), image(1, 1), image(1, 1)]);
    assert!(FrameContext::new(&config, &clock, &assets).is_err());
}

#[test]
fn origin_offsets_the_clock() {
    let config = SceneConfig::default();
    let mut clock = AnimationClock::new(config.timeline().unwrap());
    clock.start(500.0).unwrap();
    let assets = AssetSet::new([image(1, 1), image(1, 1), image(1, 1)]);
    let c = FrameContext::new(&config, &clock, &assets).unwrap();
    assert_eq!(c.progress_at(500.0), 0.0);
    assert_eq!(c.progress_at(3500.0), 0.5);
}

#[test]
fn disc_radius_uses_first_asset_min_side() {
    assert_eq!(ctx().disc_radius(), 15.0);
}

#[test]
fn display_list_paint_order() {
    let list = compose_frame(0.0, &ctx());
    assert_eq!(list.canvas, Canvas { width: 200, height: 100 });
    let kinds: Vec<&str> = list
        .commands
        .iter()
        .map(|c| match c {
            DrawCommand::Clear { .. } => "clear",
            DrawCommand::FillCircle { .. } => "circle",
            DrawCommand::SetBlend(BlendMode::Multiply) => "multiply",
            DrawCommand::SetBlend(BlendMode::Normal) => "normal",
            DrawCommand::SetBlend(_) => "other-blend",
            DrawCommand::DrawImage { .. } => "image",
        })
        .collect();
    assert_eq!(
        kinds,
        ["clear", "circle", "multiply", "image", "image", "image", "normal"]
    );

    let DrawCommand::FillCircle {
        center,
        radius,
        color,
    } = list.commands[1]
    else {
        unreachable!()
    };
    assert_eq!(center, Point::new(100.0, 50.0));
    assert_eq!(radius, 15.0);
    assert_eq!(color, Rgba8Premul::white());
    assert_eq!(
        list.commands[0],
        DrawCommand::Clear {
            color: Rgba8Premul::black()
        }
    );

    let slots: Vec<usize> = list
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::DrawImage { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    assert_eq!(slots, vec![0, 1, 2]);
}

#[test]
fn images_are_centered_on_the_canvas() {
    let list = compose_frame(3000.0, &ctx());
    let sizes = [(40.0, 30.0), (20.0, 20.0), (10.0, 10.0)];
    let images = list.commands.iter().filter_map(|c| match c {
        DrawCommand::DrawImage { slot, transform } => Some((*slot, *transform)),
        _ => None,
    });
    for (slot, transform) in images {
        let (w, h) = sizes[slot];
        let mid = transform * Point::new(w / 2.0, h / 2.0);
        assert!((mid.x - 100.0).abs() < 1e-9 && (mid.y - 50.0).abs() < 1e-9);
    }
}

#[test]
fn rotation_turns_clockwise_on_y_down_surfaces() {
    let t = rotated_about_center(2, 2, Point::new(10.0, 10.0), PI / 2.0);
    // Top-right corner of the image rotates a quarter turn clockwise to bottom-right.
    let p = t * Point::new(2.0, 0.0);
    assert!((p.x - 11.0).abs() < 1e-9 && (p.y - 11.0).abs() < 1e-9, "{p:?}");
}

#[test]
fn mirrored_times_compose_identical_frames() {
    let c = ctx();
    // Binary-exact fractions of the cycle so the reflected arithmetic matches bit for bit.
    for e in [0.0, 1500.0, 3000.0, 4500.0, 6000.0] {
        assert_eq!(
            compose_frame(e, &c),
            compose_frame(c.timeline().cycle_ms() - e, &c)
        );
    }
}
