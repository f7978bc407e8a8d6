//! Account transaction list for staff, mounted at `/accounts/:id/transactions`.
//!
//! SYSTEM CONTEXT
//! ==============
//! The enclosing `RequireRole` admits employee roles only. Rows are fetched
//! once per account id and filtered locally by type and free text.

#[cfg(test)]
#[path = "transactions_test.rs"]
mod transactions_test;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use serde_json::Value;

use crate::app::use_api;
use crate::components::user_bar::UserBar;
use crate::net::types::{Transaction, TransactionType};
use crate::util::url::encode_component;

/// Type selector value; `None` shows every type.
pub fn parse_type_filter(raw: &str) -> Option<TransactionType> {
    TransactionType::parse(raw)
}

/// Rows matching the type filter whose label or description contains `query`
/// (case-insensitive).
pub fn filter_transactions<'a>(
    rows: &'a [Transaction],
    kind: Option<TransactionType>,
    query: &str,
) -> Vec<&'a Transaction> {
    let needle = query.trim().to_lowercase();
    rows.iter()
        .filter(|t| kind.is_none_or(|k| t.kind == k))
        .filter(|t| {
            needle.is_empty()
                || format!("{} {}", t.kind.label(), t.description.as_deref().unwrap_or_default())
                    .to_lowercase()
                    .contains(&needle)
        })
        .collect()
}

/// `YYYY-MM-DD HH:MM` from an ISO string or a `[y, m, d, h, min, ...]` array.
pub fn created_at_label(raw: &Value) -> String {
    match raw {
        Value::String(text) => {
            let text = text.trim().replacen('T', " ", 1);
            text.chars().take(16).collect()
        }
        Value::Array(parts) => {
            let nums: Vec<i64> = parts.iter().filter_map(Value::as_i64).collect();
            match nums.as_slice() {
                [y, mo, d, h, mi, ..] => format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}"),
                [y, mo, d] => format!("{y:04}-{mo:02}-{d:02}"),
                _ => "-".to_owned(),
            }
        }
        _ => "-".to_owned(),
    }
}

pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 { format!("-${:.2}", -amount) } else { format!("${amount:.2}") }
}

/// Route to an account's transactions, or `None` for a blank id.
pub fn transactions_path(account_id: &str) -> Option<String> {
    let account_id = account_id.trim();
    (!account_id.is_empty()).then(|| format!("/accounts/{}/transactions", encode_component(account_id)))
}

fn id_label(raw: &Value) -> String {
    match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Load {
    Loading,
    Failed(String),
    Ready(Vec<Transaction>),
}

#[component]
pub fn TransactionsPage() -> impl IntoView {
    let api = use_api();
    let params = use_params_map();
    let account_id = Memo::new(move |_| params.with(|p| p.get("id").unwrap_or_default()));

    let load = RwSignal::new(Load::Loading);
    let kind = RwSignal::new(None::<TransactionType>);
    let query = RwSignal::new(String::new());

    Effect::new(move || {
        let id = account_id.get();
        load.set(Load::Loading);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let result = crate::net::api::account_transactions(&api.get_value(), &id).await;
            // A newer account id owns the page now.
            if account_id.get_untracked() != id {
                return;
            }
            match result {
                Ok(rows) => load.set(Load::Ready(rows)),
                Err(e) => {
                    log::warn!("transactions for {id} failed: {e}");
                    load.set(Load::Failed(e.message));
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (id, api);
    });

    let rows_view = move || match load.get() {
        Load::Loading => view! { <p class="transactions__status">"Loading transactions..."</p> }.into_any(),
        Load::Failed(reason) => {
            view! { <p class="transactions__status transactions__status--error">{reason}</p> }.into_any()
        }
        Load::Ready(rows) => {
            let kind = kind.get();
            let query = query.get();
            let visible = filter_transactions(&rows, kind, &query);
            if visible.is_empty() {
                return view! { <p class="transactions__status">"No transactions match."</p> }.into_any();
            }
            let body = visible
                .into_iter()
                .map(|t| {
                    view! {
                        <tr>
                            <td>{created_at_label(&t.created_at)}</td>
                            <td>{t.kind.label()}</td>
                            <td class="transactions__amount">{format_amount(t.amount)}</td>
                            <td class="transactions__amount">{format_amount(t.balance_after)}</td>
                            <td>{t.description.clone().unwrap_or_default()}</td>
                            <td class="transactions__id">{id_label(&t.transaction_id)}</td>
                        </tr>
                    }
                })
                .collect_view();
            view! {
                <table class="transactions__table">
                    <thead>
                        <tr>
                            <th>"Date"</th>
                            <th>"Type"</th>
                            <th>"Amount"</th>
                            <th>"Balance"</th>
                            <th>"Description"</th>
                            <th>"Reference"</th>
                        </tr>
                    </thead>
                    <tbody>{body}</tbody>
                </table>
            }
                .into_any()
        }
    };

    view! {
        <div class="transactions-page">
            <UserBar/>
            <main class="transactions-page__body">
                <h2>"Account " {move || account_id.get()}</h2>
                <div class="transactions__filters">
                    <select on:change=move |ev| kind.set(parse_type_filter(&event_target_value(&ev)))>
                        <option value="ALL">"All types"</option>
                        {TransactionType::ALL
                            .into_iter()
                            .map(|t| view! { <option value=t.as_str()>{t.label()}</option> })
                            .collect_view()}
                    </select>
                    <input
                        class="transactions__search"
                        type="search"
                        placeholder="Search description"
                        prop:value=move || query.get()
                        on:input=move |ev| query.set(event_target_value(&ev))
                    />
                </div>
                {rows_view}
            </main>
        </div>
    }
}
