use std::fmt;

use serde::Deserialize;

/// A named thermal profile (home/sleep/away/custom) or a rule-driven
/// mode (auto/schedule) that determines the active target temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Home,
    Sleep,
    Away,
    Custom,
    Auto,
    Schedule,
}

impl Preset {
    pub fn as_cosa_str(&self) -> &'static str {
        match self {
            Preset::Home => "home",
            Preset::Sleep => "sleep",
            Preset::Away => "away",
            Preset::Custom => "custom",
            Preset::Auto => "auto",
            Preset::Schedule => "schedule",
        }
    }

    pub fn from_cosa_str(s: &str) -> Option<Self> {
        match s {
            "home" => Some(Preset::Home),
            "sleep" => Some(Preset::Sleep),
            "away" => Some(Preset::Away),
            "custom" => Some(Preset::Custom),
            "auto" => Some(Preset::Auto),
            "schedule" => Some(Preset::Schedule),
            _ => None,
        }
    }

    /// The four presets with a directly writable target temperature.
    pub fn is_settable(&self) -> bool {
        matches!(
            self,
            Preset::Home | Preset::Sleep | Preset::Away | Preset::Custom
        )
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cosa_str())
    }
}

/// Control strategy governing how the device interprets its option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Manual,
    Auto,
    Schedule,
}

impl Mode {
    pub fn as_cosa_str(&self) -> &'static str {
        match self {
            Mode::Manual => "manual",
            Mode::Auto => "auto",
            Mode::Schedule => "schedule",
        }
    }

    pub fn from_cosa_str(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Mode::Manual),
            "auto" => Some(Mode::Auto),
            "schedule" => Some(Mode::Schedule),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatingActivity {
    Heating,
    Idle,
    Off,
}

impl HeatingActivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatingActivity::Heating => "heating",
            HeatingActivity::Idle => "idle",
            HeatingActivity::Off => "off",
        }
    }
}

/// Per-preset target temperatures. The API only accepts writes of the
/// whole four-entry map, never a single field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetTemperatures {
    pub home: Option<f64>,
    pub away: Option<f64>,
    pub sleep: Option<f64>,
    pub custom: Option<f64>,
}

impl TargetTemperatures {
    /// Target for a preset; `None` for auto/schedule, which have no
    /// directly settable target.
    pub fn get(&self, preset: Preset) -> Option<f64> {
        match preset {
            Preset::Home => self.home,
            Preset::Away => self.away,
            Preset::Sleep => self.sleep,
            Preset::Custom => self.custom,
            Preset::Auto | Preset::Schedule => None,
        }
    }

    /// Copy of the map with one settable preset's entry replaced.
    pub fn with(&self, preset: Preset, celsius: f64) -> Self {
        let mut next = *self;
        match preset {
            Preset::Home => next.home = Some(celsius),
            Preset::Away => next.away = Some(celsius),
            Preset::Sleep => next.sleep = Some(celsius),
            Preset::Custom => next.custom = Some(celsius),
            Preset::Auto | Preset::Schedule => {}
        }
        next
    }
}

/// Normalized view of one thermostat, rebuilt wholesale from each
/// successful poll. Never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub name: String,
    pub current_temperature: Option<f64>,
    pub current_humidity: Option<f64>,
    pub power: PowerMode,
    /// Meaningful only while `power` is `On`; carries the last known
    /// value while the device is off.
    pub preset: Preset,
    pub targets: TargetTemperatures,
    pub activity: HeatingActivity,
    pub previous_power: PowerMode,
    pub previous_preset: Preset,
}

impl DeviceState {
    /// Target of the active preset; absent for auto/schedule.
    pub fn target_temperature(&self) -> Option<f64> {
        self.targets.get(self.preset)
    }
}

/// Device record returned by discovery.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Events emitted when a refresh changes the published state.
#[derive(Debug, Clone)]
pub enum Event {
    PowerChanged { power: PowerMode },
    PresetChanged { preset: Preset },
    TemperatureChanged { celsius: f64 },
    HumidityChanged { percent: f64 },
    ActivityChanged { activity: HeatingActivity },
    TargetChanged { preset: Preset, celsius: f64 },
}
