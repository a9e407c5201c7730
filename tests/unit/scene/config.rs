use super::*;

#[test]
fn defaults_describe_the_classic_effect() {
    let cfg = SceneConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.duration_ms, 6000.0);
    assert_eq!(cfg.timeline().unwrap().cycle_ms(), 12_000.0);
    assert_eq!(cfg.ease, Ease::InOutCubic);
    assert_eq!(cfg.spins, [1.0, 0.5, -0.5]);
    assert_eq!(cfg.blend, BlendMode::Multiply);
    assert_eq!(cfg.background_premul(), Rgba8Premul::black());
    assert_eq!(cfg.disc_premul(), Rgba8Premul::white());
}

#[test]
fn empty_json_object_is_the_default_scene() {
    let cfg = SceneConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, SceneConfig::default());
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let json = r#"{
        "canvas": { "width": 320, "height": 240 },
        "duration_ms": 1500,
        "ease": "linear",
        "blend": "screen",
        "assets": ["a.png", "b.svg", "/abs/c.png"]
    }"#;
    let cfg = SceneConfig::from_reader(json.as_bytes()).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas, Canvas { width: 320, height: 240 });
    assert_eq!(cfg.duration_ms, 1500.0);
    assert_eq!(cfg.ease, Ease::Linear);
    assert_eq!(cfg.blend, BlendMode::Screen);
    assert_eq!(cfg.fps, Fps { num: 60, den: 1 });

    let paths = cfg.resolve_assets(Path::new("scenes"));
    assert_eq!(paths[0], Path::new("scenes").join("a.png"));
    assert_eq!(paths[1], Path::new("scenes").join("b.svg"));
    assert_eq!(paths[2], PathBuf::from("/abs/c.png"));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = SceneConfig::from_reader(r#"{ "durations": 10 }"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("parse scene JSON"));
}

#[test]
fn validation_catches_bad_values() {
    let bad = [
        SceneConfig {
            duration_ms: 0.0,
            ..SceneConfig::default()
        },
        SceneConfig {
            canvas: Canvas {
                width: 0,
                height: 10,
            },
            ..SceneConfig::default()
        },
        SceneConfig {
            fps: Fps { num: 30, den: 0 },
            ..SceneConfig::default()
        },
        SceneConfig {
            spins: [1.0, f64::NAN, 0.0],
            ..SceneConfig::default()
        },
        SceneConfig {
            assets: ["a.png".to_owned(), " ".to_owned(), "c.png".to_owned()],
            ..SceneConfig::default()
        },
        SceneConfig {
            load_timeout_ms: 0,
            ..SceneConfig::default()
        },
    ];
    for cfg in bad {
        assert!(cfg.validate().is_err(), "{cfg:?}");
    }
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = SceneConfig::from_path("does/not/exist.json").unwrap_err();
    assert!(matches!(err, SpindleError::Validation(_)));
}
