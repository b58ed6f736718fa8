//! `get`, `set`, `walk` and `table` against the configured endpoint

use anyhow::Result;
use serde::Serialize;
use snmp_testenv_core::{parse_varbinds, Config, SetType, SnmpClient, VarBind};

use super::blocking;
use crate::cli::output::emit;

#[derive(Debug, Serialize)]
struct GetOutput {
    oid: String,
    value: String,
    value_type: String,
}

#[derive(Debug, Serialize)]
struct RawOutput {
    oid: String,
    output: String,
}

#[derive(Debug, Serialize)]
struct WalkOutput {
    oid: String,
    varbinds: Vec<VarBind>,
}

pub async fn get(config: Config, oid: String, json: bool) -> Result<()> {
    let client = SnmpClient::from_config(&config);
    let target = oid.clone();
    let value = blocking(move || client.get(&target)).await?;

    let out = GetOutput {
        oid,
        value: value.value,
        value_type: value.value_type,
    };
    emit(json, &out, || format!("{}: {}", out.value_type, out.value))
}

pub async fn set(
    config: Config,
    oid: String,
    value_type: String,
    value: String,
    json: bool,
) -> Result<()> {
    let client = SnmpClient::from_config(&config);
    let value_type = value_type
        .parse::<SetType>()
        .unwrap_or_else(|never| match never {});
    let target = oid.clone();
    let output = blocking(move || client.set(&target, &value, &value_type)).await?;
    raw(json, oid, output)
}

pub async fn walk(config: Config, oid: String, json: bool) -> Result<()> {
    let client = SnmpClient::from_config(&config);
    let target = oid.clone();
    let output = blocking(move || client.walk(&target)).await?;

    if json {
        let out = WalkOutput {
            oid,
            varbinds: parse_varbinds(&output),
        };
        emit(true, &out, String::new)
    } else {
        emit(false, &(), || output)
    }
}

pub async fn table(config: Config, oid: String, json: bool) -> Result<()> {
    let client = SnmpClient::from_config(&config);
    let target = oid.clone();
    let output = blocking(move || client.table(&target)).await?;
    raw(json, oid, output)
}

fn raw(json: bool, oid: String, output: String) -> Result<()> {
    let out = RawOutput { oid, output };
    emit(json, &out, || out.output.clone())
}
