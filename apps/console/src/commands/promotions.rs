//! `promotions`: counts per lifecycle status, or with `--offerable` the
//! promotions the product form may offer right now.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use optica_api::{ApiClient, Endpoint};
use optica_core::promotion::{offerable_promotions, Promotion};
use optica_core::stats::promotion_stats;
use serde_json::json;

use crate::error::ConsoleResult;
use crate::render::table;
use crate::PromotionArgs;

pub async fn run(api: &ApiClient, args: &PromotionArgs, json: bool) -> ConsoleResult<String> {
    let promotions: Vec<Promotion> = api.fetch_list(Endpoint::Promociones).await?;
    let now = Utc::now();
    match (args.offerable, json) {
        (true, false) => Ok(offerable_report(&promotions, now)),
        (true, true) => offerable_json(&promotions, now),
        (false, false) => Ok(status_report(&promotions, now)),
        (false, true) => status_json(&promotions, now),
    }
}

fn offerable<'a>(promotions: &'a [Promotion], now: DateTime<Utc>) -> Vec<&'a Promotion> {
    let ids: HashSet<String> = offerable_promotions(promotions, now)
        .into_iter()
        .map(|descriptor| descriptor.id)
        .collect();
    promotions.iter().filter(|p| ids.contains(&p.id)).collect()
}

pub fn offerable_report(promotions: &[Promotion], now: DateTime<Utc>) -> String {
    let rows: Vec<Vec<String>> = offerable(promotions, now)
        .into_iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.label(),
                p.fecha_fin
                    .map(|end| end.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "sin fecha".to_string()),
            ]
        })
        .collect();
    if rows.is_empty() {
        return "no promotions on offer".to_string();
    }
    table(&["ID", "PROMOCION", "HASTA"], &rows).trim_end().to_string()
}

fn offerable_json(promotions: &[Promotion], now: DateTime<Utc>) -> ConsoleResult<String> {
    Ok(serde_json::to_string_pretty(&offerable(promotions, now))?)
}

pub fn status_report(promotions: &[Promotion], now: DateTime<Utc>) -> String {
    let rows: Vec<Vec<String>> = promotion_stats(promotions, now)
        .into_iter()
        .map(|(status, count)| vec![status.label().to_string(), count.to_string()])
        .collect();
    let mut out = table(&["ESTADO", "PROMOCIONES"], &rows);
    out.push_str(&format!("total: {}", promotions.len()));
    out
}

fn status_json(promotions: &[Promotion], now: DateTime<Utc>) -> ConsoleResult<String> {
    let counts: serde_json::Map<String, serde_json::Value> = promotion_stats(promotions, now)
        .into_iter()
        .map(|(status, count)| (status.as_str().to_string(), json!(count)))
        .collect();
    Ok(serde_json::to_string_pretty(&counts)?)
}
