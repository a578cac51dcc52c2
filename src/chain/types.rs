//! Typed views over chain responses
//!
//! Move `u64`/`u128` values arrive as JSON strings (occasionally numbers),
//! and view functions wrap vector results in an extra array. The parsers here
//! turn those raw shapes into explicit types or an explicit `Malformed` result.

use super::ChainError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Field names that may carry a share balance inside a position resource,
/// in the order they are tried.
pub const SHARE_FIELD_ALIASES: &[&str] = &["shares", "share_amount", "balance"];

/// Case-insensitive substrings that mark a resource type as vault-related.
pub const POSITION_TYPE_MARKERS: &[&str] = &["vault", "position"];

/// Outcome of decoding a view function result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewResult<T> {
    Parsed(T),
    Malformed(String),
}

impl<T> ViewResult<T> {
    pub fn into_result(self) -> Result<T, ChainError> {
        match self {
            ViewResult::Parsed(value) => Ok(value),
            ViewResult::Malformed(reason) => Err(ChainError::malformed(reason)),
        }
    }
}

/// Strip exactly one level of nesting when the first element is itself an array.
pub fn unwrap_view(values: Vec<Value>) -> Vec<Value> {
    match values.first() {
        Some(Value::Array(inner)) => inner.clone(),
        _ => values,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// Code outside the known range, kept as its raw label
    Other(String),
}

impl RiskLevel {
    pub fn from_code(raw: &str) -> Self {
        match raw {
            "0" => RiskLevel::Low,
            "1" => RiskLevel::Medium,
            "2" => RiskLevel::High,
            other => RiskLevel::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("Low"),
            RiskLevel::Medium => f.write_str("Medium"),
            RiskLevel::High => f.write_str("High"),
            RiskLevel::Other(raw) => f.write_str(raw),
        }
    }
}

/// A strategy as listed by the vault. `index` is its position in the
/// fetched list and is what the user selects by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    pub index: usize,
    pub name: String,
    pub risk_level: Option<RiskLevel>,
    pub description: String,
    pub management_fee_bps: u64,
    pub performance_fee_bps: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveStrategy {
    StableSafe,
    MoveLong,
    Unknown(String),
}

impl ActiveStrategy {
    pub fn from_id(raw: &str) -> Self {
        match raw {
            "0" => ActiveStrategy::StableSafe,
            "1" => ActiveStrategy::MoveLong,
            other => ActiveStrategy::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ActiveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveStrategy::StableSafe => f.write_str("Stable Safe"),
            ActiveStrategy::MoveLong => f.write_str("MOVE Long"),
            ActiveStrategy::Unknown(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultState {
    pub total_assets: String,
    pub total_shares: String,
    pub active_strategy: ActiveStrategy,
}

/// Entry from `GET /accounts/<address>/resources`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub data: Value,
}

/// A user's share balance located inside one of their account resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub resource_type: String,
    pub field: &'static str,
    pub shares: String,
}

/// Move integer: JSON string or number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MoveInt {
    Number(u64),
    Text(String),
}

impl MoveInt {
    fn into_label(self) -> String {
        match self {
            MoveInt::Number(n) => n.to_string(),
            MoveInt::Text(s) => s,
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match self {
            MoveInt::Number(n) => Some(*n),
            MoveInt::Text(s) => s.parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStrategy {
    Positional(String, MoveInt, String, MoveInt, MoveInt),
    Record {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        risk_level: Option<MoveInt>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        management_fee_bps: Option<MoveInt>,
        #[serde(default)]
        performance_fee_bps: Option<MoveInt>,
    },
}

fn fee_bps(raw: Option<&MoveInt>, index: usize, field: &str) -> Result<u64, String> {
    match raw {
        None => Ok(0),
        Some(value) => value
            .to_u64()
            .ok_or_else(|| format!("strategy {index}: {field} is not an integer")),
    }
}

fn strategy_from_raw(index: usize, raw: RawStrategy) -> Result<Strategy, String> {
    let (name, risk, description, mgmt, perf) = match raw {
        RawStrategy::Positional(name, risk, description, mgmt, perf) => {
            (Some(name), Some(risk), Some(description), Some(mgmt), Some(perf))
        }
        RawStrategy::Record {
            name,
            risk_level,
            description,
            management_fee_bps,
            performance_fee_bps,
        } => (
            name,
            risk_level,
            description,
            management_fee_bps,
            performance_fee_bps,
        ),
    };

    Ok(Strategy {
        index,
        name: name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Strategy {index}")),
        risk_level: risk.map(|r| RiskLevel::from_code(&r.into_label())),
        description: description.unwrap_or_default(),
        management_fee_bps: fee_bps(mgmt.as_ref(), index, "management_fee_bps")?,
        performance_fee_bps: fee_bps(perf.as_ref(), index, "performance_fee_bps")?,
    })
}

/// Decode the result of `vault::get_strategies`.
///
/// An empty list is a valid result; callers decide what "no strategies" means.
pub fn parse_strategies(values: Vec<Value>) -> ViewResult<Vec<Strategy>> {
    let mut strategies = Vec::new();
    for (index, value) in unwrap_view(values).into_iter().enumerate() {
        let raw: RawStrategy = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => return ViewResult::Malformed(format!("strategy {index}: {e}")),
        };
        match strategy_from_raw(index, raw) {
            Ok(strategy) => strategies.push(strategy),
            Err(reason) => return ViewResult::Malformed(reason),
        }
    }
    ViewResult::Parsed(strategies)
}

fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode the result of `vault::get_vault_state`: `(total_assets, total_shares, active_strategy)`.
pub fn parse_vault_state(values: Vec<Value>) -> ViewResult<VaultState> {
    let values = unwrap_view(values);
    if values.len() < 3 {
        return ViewResult::Malformed(format!(
            "expected 3 vault state fields, got {}",
            values.len()
        ));
    }
    let (Some(total_assets), Some(total_shares), Some(active)) = (
        scalar_label(&values[0]),
        scalar_label(&values[1]),
        scalar_label(&values[2]),
    ) else {
        return ViewResult::Malformed("vault state fields must be scalars".to_string());
    };

    ViewResult::Parsed(VaultState {
        total_assets,
        total_shares,
        active_strategy: ActiveStrategy::from_id(&active),
    })
}

/// Locate the user's vault position among their account resources.
///
/// Takes the first resource whose type mentions a position marker and whose
/// data holds a non-empty scalar under one of `SHARE_FIELD_ALIASES`.
/// `None` means "no position", not an error.
pub fn find_position(resources: &[Resource]) -> Option<Position> {
    resources.iter().find_map(|resource| {
        let type_name = resource.type_name.to_lowercase();
        if !POSITION_TYPE_MARKERS.iter().any(|m| type_name.contains(m)) {
            return None;
        }
        SHARE_FIELD_ALIASES.iter().find_map(|field| {
            let shares = scalar_label(resource.data.get(*field)?)?;
            if shares.is_empty() {
                return None;
            }
            Some(Position {
                resource_type: resource.type_name.clone(),
                field,
                shares,
            })
        })
    })
}
