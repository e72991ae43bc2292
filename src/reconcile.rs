use crate::protocol::{OPTION_FROZEN, RawSnapshot};
use crate::types::{DeviceState, Event, HeatingActivity, Mode, PowerMode, Preset, TargetTemperatures};

/// Reconcile a raw snapshot into the normalized device state.
///
/// Pure and total: any snapshot, including an entirely empty one,
/// produces a valid state. `prior` is the previously published state;
/// it is consulted only where the snapshot gives no usable preset
/// signal, so an unrecognized manual option carries the last known
/// preset forward instead of resetting it to a default.
pub fn reconcile(raw: &RawSnapshot, prior: Option<&DeviceState>) -> DeviceState {
    let power = power_from(raw.option.as_deref());

    let carried = prior.map(|s| s.preset).unwrap_or(Preset::Home);
    let preset = match power {
        PowerMode::Off => carried,
        PowerMode::On => preset_from(raw.mode.as_deref(), raw.option.as_deref(), carried),
    };

    // Mirror of the derivation over the stashed previous fields, used
    // to restore the device when powering back on. Absent previous
    // data defaults to on/home, not off.
    let previous_power = match raw.previous_option.as_deref() {
        Some(OPTION_FROZEN) => PowerMode::Off,
        _ => PowerMode::On,
    };
    let carried_previous = prior.map(|s| s.previous_preset).unwrap_or(Preset::Home);
    let previous_preset = preset_from(
        raw.previous_mode.as_deref(),
        raw.previous_option.as_deref(),
        carried_previous,
    );

    let activity = if power == PowerMode::Off {
        HeatingActivity::Off
    } else if raw.operation_mode.as_deref() == Some("heating")
        && raw.combi_state.as_deref() == Some("on")
    {
        HeatingActivity::Heating
    } else {
        HeatingActivity::Idle
    };

    DeviceState {
        name: raw
            .name
            .clone()
            .or_else(|| prior.map(|s| s.name.clone()))
            .unwrap_or_default(),
        current_temperature: raw.temperature,
        current_humidity: raw.humidity,
        power,
        preset,
        targets: TargetTemperatures {
            home: raw.home_temperature,
            away: raw.away_temperature,
            sleep: raw.sleep_temperature,
            custom: raw.custom_temperature,
        },
        activity,
        previous_power,
        previous_preset,
    }
}

fn power_from(option: Option<&str>) -> PowerMode {
    match option {
        // no option at all means no heating signal, not "on with an
        // unknown preset"
        Some(OPTION_FROZEN) | None => PowerMode::Off,
        Some(_) => PowerMode::On,
    }
}

fn preset_from(mode: Option<&str>, option: Option<&str>, carried: Preset) -> Preset {
    match mode.and_then(Mode::from_cosa_str) {
        Some(Mode::Auto) => Preset::Auto,
        Some(Mode::Schedule) => Preset::Schedule,
        Some(Mode::Manual) => match option.and_then(Preset::from_cosa_str) {
            Some(p) if p.is_settable() => p,
            _ => carried,
        },
        None => carried,
    }
}

/// Field-by-field comparison of the old and new published state. With
/// no previous state, every populated field fires once.
pub(crate) fn state_events(previous: Option<&DeviceState>, current: &DeviceState) -> Vec<Event> {
    let mut events = Vec::new();

    if previous.map(|p| p.power) != Some(current.power) {
        events.push(Event::PowerChanged {
            power: current.power,
        });
    }
    if current.power == PowerMode::On && previous.map(|p| p.preset) != Some(current.preset) {
        events.push(Event::PresetChanged {
            preset: current.preset,
        });
    }
    if let Some(celsius) = current.current_temperature
        && previous.and_then(|p| p.current_temperature) != Some(celsius)
    {
        events.push(Event::TemperatureChanged { celsius });
    }
    if let Some(percent) = current.current_humidity
        && previous.and_then(|p| p.current_humidity) != Some(percent)
    {
        events.push(Event::HumidityChanged { percent });
    }
    if previous.map(|p| p.activity) != Some(current.activity) {
        events.push(Event::ActivityChanged {
            activity: current.activity,
        });
    }
    for preset in [Preset::Home, Preset::Away, Preset::Sleep, Preset::Custom] {
        if let Some(celsius) = current.targets.get(preset)
            && previous.map(|p| p.targets.get(preset)) != Some(Some(celsius))
        {
            events.push(Event::TargetChanged { preset, celsius });
        }
    }

    events
}
