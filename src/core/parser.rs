use crate::domain::model::{Product, Service};
use crate::utils::error::{LandedCostError, RecordKind, Result};
use csv::{ReaderBuilder, StringRecord, Trim};

const FIELDS_PER_RECORD: usize = 4;

pub const PRODUCT_FIELDS: [&str; FIELDS_PER_RECORD] = ["name", "unit_cost", "quantity", "tariff_rate"];
pub const SERVICE_FIELDS: [&str; FIELDS_PER_RECORD] =
    ["provider_name", "service_name", "cost", "distribution_rule"];

/// Parses product lines: `name, unit_cost, quantity, tariff_rate`.
///
/// Each line's `unit_cost * quantity`, and the running total over all lines,
/// must stay finite so the allocation weights are well defined.
pub fn parse_products(input: &str) -> Result<Vec<Product>> {
    let mut total_value = 0.0_f64;
    read_records(input, RecordKind::Product, &PRODUCT_FIELDS)?
        .into_iter()
        .map(|(line, record)| -> Result<Product> {
            let product = Product {
                name: required_text(&record, line, RecordKind::Product, &PRODUCT_FIELDS, 0)?,
                unit_cost: non_negative_amount(&record, line, RecordKind::Product, &PRODUCT_FIELDS, 1)?,
                quantity: whole_quantity(&record, line, 2)?,
                tariff_rate: required_text(&record, line, RecordKind::Product, &PRODUCT_FIELDS, 3)?,
            };

            let initial_cost = product.initial_cost();
            if !initial_cost.is_finite() {
                return Err(LandedCostError::parse(
                    RecordKind::Product,
                    line,
                    PRODUCT_FIELDS[2],
                    format!(
                        "unit_cost {} times quantity {} is too large",
                        product.unit_cost, product.quantity
                    ),
                ));
            }
            total_value += initial_cost;
            if !total_value.is_finite() {
                return Err(LandedCostError::parse(
                    RecordKind::Product,
                    line,
                    PRODUCT_FIELDS[2],
                    "total product value is too large",
                ));
            }

            Ok(product)
        })
        .collect()
}

/// Parses service lines: `provider_name, service_name, cost, distribution_rule`.
pub fn parse_services(input: &str) -> Result<Vec<Service>> {
    read_records(input, RecordKind::Service, &SERVICE_FIELDS)?
        .into_iter()
        .map(|(line, record)| -> Result<Service> {
            Ok(Service {
                provider_name: required_text(&record, line, RecordKind::Service, &SERVICE_FIELDS, 0)?,
                service_name: required_text(&record, line, RecordKind::Service, &SERVICE_FIELDS, 1)?,
                cost: non_negative_amount(&record, line, RecordKind::Service, &SERVICE_FIELDS, 2)?,
                distribution_rule: required_text(&record, line, RecordKind::Service, &SERVICE_FIELDS, 3)?,
            })
        })
        .collect()
}

/// Reads non-blank lines as records, paired with their 1-based line numbers.
/// Each line is one record; there is no header row.
fn read_records(
    input: &str,
    kind: RecordKind,
    fields: &[&str; FIELDS_PER_RECORD],
) -> Result<Vec<(u64, StringRecord)>> {
    let mut records = Vec::new();

    for (index, text) in input.lines().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        let line = index as u64 + 1;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());
        let record = match reader.records().next() {
            Some(record) => record?,
            None => continue,
        };

        if record.len() != FIELDS_PER_RECORD {
            let field = fields.get(record.len()).copied().unwrap_or("record");
            return Err(LandedCostError::parse(
                kind,
                line,
                field,
                format!(
                    "expected {} comma-separated fields ({}), found {}",
                    FIELDS_PER_RECORD,
                    fields.join(", "),
                    record.len()
                ),
            ));
        }

        records.push((line, record));
    }

    tracing::debug!("Read {} {} record(s)", records.len(), kind);
    Ok(records)
}

fn required_text(
    record: &StringRecord,
    line: u64,
    kind: RecordKind,
    fields: &[&str; FIELDS_PER_RECORD],
    index: usize,
) -> Result<String> {
    let value = record.get(index).unwrap_or_default();
    if value.is_empty() {
        return Err(LandedCostError::parse(kind, line, fields[index], "value is required"));
    }
    Ok(value.to_string())
}

fn non_negative_amount(
    record: &StringRecord,
    line: u64,
    kind: RecordKind,
    fields: &[&str; FIELDS_PER_RECORD],
    index: usize,
) -> Result<f64> {
    let raw = record.get(index).unwrap_or_default();
    let amount: f64 = raw.parse().map_err(|_| {
        LandedCostError::parse(kind, line, fields[index], format!("'{}' is not a number", raw))
    })?;

    if !amount.is_finite() {
        return Err(LandedCostError::parse(
            kind,
            line,
            fields[index],
            format!("'{}' is not a finite number", raw),
        ));
    }
    if amount < 0.0 {
        return Err(LandedCostError::parse(
            kind,
            line,
            fields[index],
            format!("'{}' must not be negative", raw),
        ));
    }
    Ok(amount)
}

fn whole_quantity(record: &StringRecord, line: u64, index: usize) -> Result<u64> {
    let raw = record.get(index).unwrap_or_default();
    raw.parse().map_err(|_| {
        LandedCostError::parse(
            RecordKind::Product,
            line,
            PRODUCT_FIELDS[index],
            format!("'{}' is not a non-negative whole number", raw),
        )
    })
}
