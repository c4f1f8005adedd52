use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{InstrumentId, InstrumentKind, InstrumentRecord};
use crate::error::CatalogError;
use crate::maya::DetailsApi;

pub const IMITATING_KEY: &str = "ImitatingFund";

/// Outcome of one endpoint attempt for one id.
#[derive(Debug)]
pub enum Lookup {
    Resolved(InstrumentRecord),
    NotFound,
    Failed(CatalogError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FundDetails {
    #[serde(default)]
    fund_long_name: Option<String>,
    #[serde(default)]
    fund_short_name: Option<String>,
    #[serde(default)]
    fund_id: Value,
    #[serde(default)]
    fund_indicators: Option<Vec<Indicator>>,
    #[serde(default)]
    main_classification: Option<String>,
    #[serde(default)]
    secondary_classification: Option<String>,
    #[serde(default)]
    sub_classification: Option<String>,
    management_fee: Option<f64>,
    #[serde(default)]
    variable_fee: Option<f64>,
    trustee_fee: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Indicator {
    key: String,
    #[serde(default)]
    value: Value,
}

/// Resolves `id` as a fund, falling back to the ETF endpoint when the fund
/// endpoint does not know it. Failures are logged and yield `None`.
pub fn fetch_instrument<A: DetailsApi + ?Sized>(
    api: &A,
    id: &InstrumentId,
) -> Option<InstrumentRecord> {
    let outcome = match lookup(api, InstrumentKind::Fund, id) {
        Lookup::NotFound => {
            debug!(%id, "not a fund, trying etf");
            lookup(api, InstrumentKind::Etf, id)
        }
        other => other,
    };

    match outcome {
        Lookup::Resolved(record) => Some(record),
        Lookup::NotFound => {
            warn!(%id, "neither fund nor etf details exist, dropping");
            None
        }
        Lookup::Failed(err) => {
            warn!(%id, error = %err, "fetch failed, dropping");
            None
        }
    }
}

pub fn lookup<A: DetailsApi + ?Sized>(api: &A, kind: InstrumentKind, id: &InstrumentId) -> Lookup {
    match api.details(kind, id) {
        Ok(Some(payload)) => match map_details(kind, id, &payload) {
            Ok(record) => Lookup::Resolved(record),
            Err(err) => Lookup::Failed(err),
        },
        Ok(None) => Lookup::NotFound,
        Err(err) => Lookup::Failed(err),
    }
}

/// Maps an endpoint payload to a record. ETF payloads nest the fund fields
/// under `ETFDetails.FundDetails`.
pub fn map_details(
    kind: InstrumentKind,
    id: &InstrumentId,
    payload: &Value,
) -> Result<InstrumentRecord, CatalogError> {
    let details = match kind {
        InstrumentKind::Fund => payload,
        InstrumentKind::Etf => payload
            .get("ETFDetails")
            .and_then(|value| value.get("FundDetails"))
            .ok_or_else(|| mapping_error(id, "missing ETFDetails.FundDetails"))?,
    };
    let details: FundDetails = serde_json::from_value(details.clone())
        .map_err(|err| mapping_error(id, &err.to_string()))?;

    let imitating_target = details
        .fund_indicators
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|indicator| indicator.key == IMITATING_KEY)
        .map(|indicator| scalar_text(&indicator.value))
        .ok_or_else(|| CatalogError::MissingIndicator {
            id: id.to_string(),
            key: IMITATING_KEY.to_string(),
        })?;

    let management_fee = details
        .management_fee
        .ok_or_else(|| mapping_error(id, "ManagementFee is missing"))?;
    let trustee_fee = details
        .trustee_fee
        .ok_or_else(|| mapping_error(id, "TrusteeFee is missing"))?;

    let record = InstrumentRecord {
        kind,
        name: details.fund_long_name.unwrap_or_default(),
        short_name: details.fund_short_name.unwrap_or_default(),
        id: scalar_text(&details.fund_id).unwrap_or_else(|| id.to_string()),
        imitating_target,
        classification: details.main_classification,
        secondary_classification: details.secondary_classification,
        sub_classification: details.sub_classification,
        management_fee,
        trustee_fee,
        variable_fee: details.variable_fee.unwrap_or(0.0),
    };

    let total = record.total_fee();
    if !total.is_finite() || total < 0.0 {
        return Err(mapping_error(id, &format!("total fee {total} is not a valid cost")));
    }
    Ok(record)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn mapping_error(id: &InstrumentId, reason: &str) -> CatalogError {
    CatalogError::Mapping {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
