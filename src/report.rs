use crate::category::CategoryCounts;
use crate::project::{ProjectAnalysis, ProjectTotals};
use crate::sprite::SpriteRecord;
use anyhow::Result;
use serde_json::{json, Map, Value};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub fn render(analysis: &ProjectAnalysis, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(analysis)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&report_json(analysis))?),
    }
}

pub fn report_json(analysis: &ProjectAnalysis) -> Value {
    json!({
        "stage": record_json(&analysis.stage),
        "sprites": analysis.sprites.iter().map(record_json).collect::<Vec<_>>(),
        "totals": totals_json(&analysis.totals()),
    })
}

fn record_json(record: &SpriteRecord) -> Value {
    json!({
        "name": record.name(),
        "scripts": record.script_count(),
        "variables": usage_json(record.variables(), |name| record.variable_usage_count(name)),
        "lists": usage_json(record.lists(), |name| record.list_usage_count(name)),
        "script_comments": record.script_comment_count(),
        "sounds": record.sound_count(),
        "costumes": record.costume_count(),
        "blocks": categories_json(record.category_counts()),
    })
}

fn usage_json(names: &[String], count: impl Fn(&str) -> usize) -> Vec<Value> {
    names
        .iter()
        .map(|name| json!({ "name": name, "usage": count(name) }))
        .collect()
}

fn totals_json(totals: &ProjectTotals) -> Value {
    json!({
        "targets": totals.targets,
        "scripts": totals.scripts,
        "variables": totals.variables,
        "lists": totals.lists,
        "script_comments": totals.script_comments,
        "sounds": totals.sounds,
        "costumes": totals.costumes,
        "blocks": categories_json(&totals.categories),
    })
}

fn categories_json(counts: &CategoryCounts) -> Value {
    let mut out = Map::new();
    for (category, count) in counts.iter() {
        out.insert(category.label().to_string(), json!(count));
    }
    out.insert("total".to_string(), json!(counts.total()));
    Value::Object(out)
}

pub fn render_text(analysis: &ProjectAnalysis) -> String {
    let mut out = String::new();
    for record in analysis.records() {
        write_record(&mut out, record);
        out.push('\n');
    }
    write_totals(&mut out, &analysis.totals());
    out
}

fn write_record(out: &mut String, record: &SpriteRecord) {
    let _ = writeln!(out, "== {} ==", record.name());
    let _ = writeln!(out, "  scripts:         {}", record.script_count());
    let _ = writeln!(out, "  script comments: {}", record.script_comment_count());
    let _ = writeln!(out, "  sounds:          {}", record.sound_count());
    let _ = writeln!(out, "  costumes:        {}", record.costume_count());
    let _ = writeln!(out, "  variables:       {}", record.variable_count());
    for name in record.variables() {
        let _ = writeln!(out, "    {} (used {})", name, record.variable_usage_count(name));
    }
    let _ = writeln!(out, "  lists:           {}", record.list_count());
    for name in record.lists() {
        let _ = writeln!(out, "    {} (used {})", name, record.list_usage_count(name));
    }
    write_categories(out, record.category_counts());
}

fn write_totals(out: &mut String, totals: &ProjectTotals) {
    let _ = writeln!(out, "== Totals ({} targets) ==", totals.targets);
    let _ = writeln!(out, "  scripts:         {}", totals.scripts);
    let _ = writeln!(out, "  script comments: {}", totals.script_comments);
    let _ = writeln!(out, "  sounds:          {}", totals.sounds);
    let _ = writeln!(out, "  costumes:        {}", totals.costumes);
    let _ = writeln!(out, "  variables:       {}", totals.variables);
    let _ = writeln!(out, "  lists:           {}", totals.lists);
    write_categories(out, &totals.categories);
}

fn write_categories(out: &mut String, counts: &CategoryCounts) {
    let _ = writeln!(out, "  blocks:          {}", counts.total());
    for (category, count) in counts.iter() {
        let _ = writeln!(out, "    {:<12} {}", category.label(), count);
    }
}
