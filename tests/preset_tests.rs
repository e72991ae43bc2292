use cosa_thermostat::{HeatingActivity, Mode, Preset, TargetTemperatures};

#[test]
fn preset_roundtrip() {
    for preset in [
        Preset::Home,
        Preset::Sleep,
        Preset::Away,
        Preset::Custom,
        Preset::Auto,
        Preset::Schedule,
    ] {
        let s = preset.as_cosa_str();
        assert_eq!(Preset::from_cosa_str(s), Some(preset));
    }
}

#[test]
fn mode_roundtrip() {
    for mode in [Mode::Manual, Mode::Auto, Mode::Schedule] {
        let s = mode.as_cosa_str();
        assert_eq!(Mode::from_cosa_str(s), Some(mode));
    }
}

#[test]
fn unknown_wire_strings_rejected() {
    assert_eq!(Preset::from_cosa_str("frozen"), None);
    assert_eq!(Preset::from_cosa_str(""), None);
    assert_eq!(Mode::from_cosa_str("defrost"), None);
}

#[test]
fn only_named_presets_are_settable() {
    assert!(Preset::Home.is_settable());
    assert!(Preset::Sleep.is_settable());
    assert!(Preset::Away.is_settable());
    assert!(Preset::Custom.is_settable());
    assert!(!Preset::Auto.is_settable());
    assert!(!Preset::Schedule.is_settable());
}

#[test]
fn targets_indexed_by_preset() {
    let targets = TargetTemperatures {
        home: Some(22.0),
        away: Some(18.0),
        sleep: Some(19.5),
        custom: None,
    };
    assert_eq!(targets.get(Preset::Home), Some(22.0));
    assert_eq!(targets.get(Preset::Away), Some(18.0));
    assert_eq!(targets.get(Preset::Sleep), Some(19.5));
    assert_eq!(targets.get(Preset::Custom), None);
    assert_eq!(targets.get(Preset::Auto), None);
    assert_eq!(targets.get(Preset::Schedule), None);
}

#[test]
fn with_replaces_a_single_entry() {
    let targets = TargetTemperatures {
        home: Some(22.0),
        away: Some(18.0),
        sleep: Some(19.5),
        custom: Some(20.0),
    };
    let next = targets.with(Preset::Custom, 23.5);
    assert_eq!(next.custom, Some(23.5));
    assert_eq!(next.home, Some(22.0));
    assert_eq!(next.away, Some(18.0));
    assert_eq!(next.sleep, Some(19.5));
}

#[test]
fn with_ignores_rule_driven_presets() {
    let targets = TargetTemperatures::default();
    assert_eq!(targets.with(Preset::Auto, 21.0), targets);
    assert_eq!(targets.with(Preset::Schedule, 21.0), targets);
}

#[test]
fn activity_strings() {
    assert_eq!(HeatingActivity::Heating.as_str(), "heating");
    assert_eq!(HeatingActivity::Idle.as_str(), "idle");
    assert_eq!(HeatingActivity::Off.as_str(), "off");
}

#[test]
fn preset_display_matches_wire_name() {
    assert_eq!(format!("{}", Preset::Sleep), "sleep");
    assert_eq!(format!("{}", Preset::Schedule), "schedule");
}
