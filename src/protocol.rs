use serde::Deserialize;
use serde_json::{Value, json};

use crate::types::{Endpoint, TargetTemperatures};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://kiwi.cosa.com.tr";

/// Header carrying the session token on every authenticated call.
pub const AUTH_HEADER: &str = "authToken";

pub const LOGIN_PATH: &str = "/api/users/login";
pub const GET_ENDPOINTS_PATH: &str = "/api/endpoints/getEndpoints/";
pub const GET_ENDPOINT_PATH: &str = "/api/endpoints/getEndpoint";

/// Option value meaning "powered off". Not a preset; the device models
/// off as a special option rather than a boolean.
pub const OPTION_FROZEN: &str = "frozen";

/// Write endpoint reached by one step of a command sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStep {
    SetMode,
    SetOption,
    SetTargetTemperatures,
}

impl CommandStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStep::SetMode => "setMode",
            CommandStep::SetOption => "setOption",
            CommandStep::SetTargetTemperatures => "setTargetTemperatures",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            CommandStep::SetMode => "/api/endpoints/setMode",
            CommandStep::SetOption => "/api/endpoints/setOption",
            CommandStep::SetTargetTemperatures => "/api/endpoints/setTargetTemperatures",
        }
    }
}

pub fn login_payload(email: &str, password: &str) -> Value {
    json!({
        "email": email,
        "password": password,
    })
}

pub fn get_endpoint_payload(endpoint: &str) -> Value {
    json!({ "endpoint": endpoint })
}

pub fn set_mode_payload(endpoint: &str, mode: &str) -> Value {
    json!({
        "endpoint": endpoint,
        "mode": mode,
    })
}

pub fn set_option_payload(endpoint: &str, option: &str) -> Value {
    json!({
        "endpoint": endpoint,
        "option": option,
    })
}

/// The endpoint is whole-map: all four entries are sent every time,
/// absent ones as null.
pub fn set_target_temperatures_payload(endpoint: &str, targets: &TargetTemperatures) -> Value {
    json!({
        "endpoint": endpoint,
        "targetTemperatures": {
            "home": targets.home,
            "away": targets.away,
            "sleep": targets.sleep,
            "custom": targets.custom,
        }
    })
}

/// Raw device snapshot as returned by `getEndpoint`. All fields are
/// optional; the producer enforces nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSnapshot {
    pub name: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub option: Option<String>,
    pub mode: Option<String>,
    pub previous_option: Option<String>,
    pub previous_mode: Option<String>,
    pub combi_state: Option<String>,
    pub operation_mode: Option<String>,
    pub home_temperature: Option<f64>,
    pub away_temperature: Option<f64>,
    pub sleep_temperature: Option<f64>,
    pub custom_temperature: Option<f64>,
}

impl RawSnapshot {
    /// Field-by-field extraction. Missing or wrongly typed fields
    /// degrade to `None`; this never fails.
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: str_field(value, "name"),
            temperature: num_field(value, "temperature"),
            humidity: num_field(value, "humidity"),
            option: str_field(value, "option"),
            mode: str_field(value, "mode"),
            previous_option: str_field(value, "previousOption"),
            previous_mode: str_field(value, "previousMode"),
            combi_state: str_field(value, "combiState"),
            operation_mode: str_field(value, "operationMode"),
            home_temperature: num_field(value, "homeTemperature"),
            away_temperature: num_field(value, "awayTemperature"),
            sleep_temperature: num_field(value, "sleepTemperature"),
            custom_temperature: num_field(value, "customTemperature"),
        }
    }
}

fn num_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// The snapshot payload is keyed by `endpoint`. A missing key yields an
/// all-absent snapshot; only unparseable JSON is an error.
pub fn parse_endpoint_response(body: &str) -> Result<RawSnapshot> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| Error::Protocol(format!("malformed snapshot body: {e}")))?;
    let endpoint = parsed.get("endpoint").unwrap_or(&Value::Null);
    Ok(RawSnapshot::from_value(endpoint))
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(rename = "authToken")]
    auth_token: String,
}

pub fn parse_login_response(body: &str) -> Result<String> {
    serde_json::from_str::<LoginResponse>(body)
        .map(|r| r.auth_token)
        .map_err(|_| Error::Protocol("login response missing authToken".to_string()))
}

#[derive(Deserialize)]
struct EndpointsResponse {
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

pub fn parse_endpoints_response(body: &str) -> Result<Vec<Endpoint>> {
    serde_json::from_str::<EndpointsResponse>(body)
        .map(|r| r.endpoints)
        .map_err(|e| Error::Protocol(format!("malformed endpoint list: {e}")))
}
