#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use serde_json::{Value, json};

use fund_catalog::browser::Browser;
use fund_catalog::domain::{InstrumentId, InstrumentKind, InstrumentRecord};
use fund_catalog::error::CatalogError;
use fund_catalog::maya::DetailsApi;

pub enum Reply {
    Found(Value),
    NotFound,
    Status(u16),
}

/// Canned endpoint answers keyed by kind and id; anything unknown is a 404.
#[derive(Default)]
pub struct MockApi {
    replies: HashMap<(InstrumentKind, String), Reply>,
    pub calls: RefCell<Vec<(InstrumentKind, String)>>,
}

impl MockApi {
    pub fn with(mut self, kind: InstrumentKind, id: &str, reply: Reply) -> Self {
        self.replies.insert((kind, id.to_string()), reply);
        self
    }
}

impl DetailsApi for MockApi {
    fn details(
        &self,
        kind: InstrumentKind,
        id: &InstrumentId,
    ) -> Result<Option<Value>, CatalogError> {
        self.calls.borrow_mut().push((kind, id.to_string()));
        match self.replies.get(&(kind, id.to_string())) {
            Some(Reply::Found(value)) => Ok(Some(value.clone())),
            Some(Reply::Status(status)) => Err(CatalogError::EndpointStatus {
                status: *status,
                message: "mock".to_string(),
            }),
            Some(Reply::NotFound) | None => Ok(None),
        }
    }
}

pub fn fixture(name: &str) -> Value {
    let raw = fs::read_to_string(format!("tests/fixtures/{name}")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

pub fn fund_payload(fund_id: &str, management: f64, trustee: f64) -> Value {
    json!({
        "FundId": fund_id,
        "FundLongName": format!("Fund {fund_id}"),
        "FundShortName": fund_id,
        "FundIndicators": [{ "Key": "ImitatingFund", "Value": "TA-125" }],
        "MainClassification": "Bonds",
        "SecondaryClassification": "Government",
        "SubClassification": "CPI linked",
        "ManagementFee": management,
        "TrusteeFee": trustee
    })
}

pub fn etf_payload(fund_id: &str, management: f64, trustee: f64, variable: f64) -> Value {
    let mut details = fund_payload(fund_id, management, trustee);
    details["VariableFee"] = json!(variable);
    json!({ "ETFDetails": { "FundDetails": details } })
}

pub fn ids(values: &[&str]) -> Vec<InstrumentId> {
    values.iter().map(|value| value.parse().unwrap()).collect()
}

pub fn record(
    id: &str,
    kind: InstrumentKind,
    management: f64,
    trustee: f64,
    variable: f64,
) -> InstrumentRecord {
    InstrumentRecord {
        kind,
        name: format!("Fund {id}"),
        short_name: id.to_string(),
        id: id.to_string(),
        imitating_target: Some("TA-125".to_string()),
        classification: None,
        secondary_classification: None,
        sub_classification: None,
        management_fee: management,
        trustee_fee: trustee,
        variable_fee: variable,
    }
}

/// Scripted search page: the listing link appears only after the category click.
#[derive(Default)]
pub struct MockBrowser {
    pub steps: Vec<String>,
    pub listing: Vec<String>,
    pub category_selected: bool,
    pub fail_listing: bool,
    pub closed: bool,
}

impl Browser for MockBrowser {
    fn open(&mut self, url: &str) -> Result<(), CatalogError> {
        self.steps.push(format!("open {url}"));
        Ok(())
    }

    fn click(&mut self, href_fragment: &str) -> Result<(), CatalogError> {
        self.steps.push(format!("click {href_fragment}"));
        match href_fragment {
            "'2')" => {
                self.category_selected = true;
                Ok(())
            }
            "submitall" if self.category_selected && !self.fail_listing => Ok(()),
            other => Err(CatalogError::MissingControl(other.to_string())),
        }
    }

    fn anchor_hrefs(&self, href_fragment: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .listing
            .iter()
            .filter(|href| href.contains(href_fragment))
            .cloned()
            .collect())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
