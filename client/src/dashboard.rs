use leptos::prelude::*;
use serde_json::Value;

use nortus_shared::DashboardResponse;

use crate::card::Card;

const MAX_SUMMARY_ENTRIES: usize = 8;

/// One labelled figure pulled out of the dashboard payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub label: String,
    pub value: String,
}

/// Scalar fields of the dashboard payload, one level of nesting deep. A
/// top-level `data` object is looked through.
pub fn summary_entries(payload: &Value) -> Vec<SummaryEntry> {
    let root = match payload.get("data") {
        Some(data @ Value::Object(_)) => data,
        _ => payload,
    };
    let Value::Object(fields) = root else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (key, value) in fields {
        match value {
            Value::Object(inner) => {
                for (inner_key, inner_value) in inner {
                    if let Some(text) = scalar_text(inner_value) {
                        entries.push(SummaryEntry {
                            label: format!("{} · {}", humanize(key), humanize(inner_key)),
                            value: text,
                        });
                    }
                }
            }
            Value::Array(items) => entries.push(SummaryEntry {
                label: humanize(key),
                value: format!("{} itens", items.len()),
            }),
            other => {
                if let Some(text) = scalar_text(other) {
                    entries.push(SummaryEntry {
                        label: humanize(key),
                        value: text,
                    });
                }
            }
        }
    }
    entries.truncate(MAX_SUMMARY_ENTRIES);
    entries
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(format_number),
        Value::Bool(true) => Some("Sim".to_owned()),
        Value::Bool(false) => Some("Não".to_owned()),
        _ => None,
    }
}

/// Brazilian number formatting: `.` groups thousands, `,` marks decimals.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let negative = n < 0.0;
    let rounded = (n.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative && (whole > 0 || cents > 0) { "-" } else { "" };
    if cents == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{cents:02}")
    }
}

/// `activeClients` / `active_clients` -> `Active clients`.
fn humanize(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.extend(ch.to_lowercase());
        } else {
            current.extend(ch.to_lowercase());
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut label = words.join(" ");
    if let Some(first) = label.chars().next() {
        let upper: String = first.to_uppercase().collect();
        label.replace_range(..first.len_utf8(), &upper);
    }
    label
}

/// Card listing the headline figures of the dashboard payload.
#[component]
pub fn DashboardSummary(
    #[prop(into)] is_loading: Signal<bool>,
    #[prop(into)] data: Signal<Option<DashboardResponse>>,
) -> impl IntoView {
    let entries = Memo::new(move |_| {
        data.with(|d| d.as_ref().map(summary_entries).unwrap_or_default())
    });

    view! {
        <Card title="Resumo">
            {move || {
                if is_loading.get() && entries.with(Vec::is_empty) {
                    return view! {
                        <div style="color: #7f8aa6; font-size: 0.85rem;">"Carregando..."</div>
                    }
                    .into_any();
                }
                if entries.with(Vec::is_empty) {
                    return view! {
                        <div style="color: #7f8aa6; font-size: 0.85rem;">"Sem dados do dashboard"</div>
                    }
                    .into_any();
                }
                view! {
                    <div style="display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 12px;">
                        <For
                            each=move || entries.get()
                            key=|entry| (entry.label.clone(), entry.value.clone())
                            children=move |entry| {
                                view! {
                                    <div style="background: #111b36; border: 1px solid #1a2544; border-radius: 16px; padding: 10px 12px;">
                                        <div style="font-size: 0.72rem; color: #7f8aa6; margin-bottom: 4px;">{entry.label}</div>
                                        <div style="font-size: 1.1rem; font-weight: 600; color: #e8ecf6; font-variant-numeric: tabular-nums;">{entry.value}</div>
                                    </div>
                                }
                            }
                        />
                    </div>
                }
                .into_any()
            }}
        </Card>
    }
}
