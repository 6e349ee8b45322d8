//! HTML summary of a paid order, for the operator mailbox.
//!
//! Rendering is pure: the output depends only on the order and the brand settings. Every value that came from a
//! customer or the payment provider is HTML-escaped.
use std::{collections::BTreeMap, fmt::Write};

use checkout_engine::db_types::{CartItem, MinorUnits, Order};
use chrono::Datelike;

use crate::config::BrandConfig;

/// Known component slots, in display order. Unknown slots are shown after these, by name.
const SLOT_LABELS: [(&str, &str); 6] = [
    ("carrure", "Carrure"),
    ("cadran", "Cadran"),
    ("aiguilles", "Aiguilles"),
    ("bracelet", "Bracelet"),
    ("fond", "Fond"),
    ("remontoir", "Remontoir"),
];

const TITLE: &str = "Nouvelle commande payée";
const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// French-style amount: `1 234,56 €`. Currencies other than the euro are suffixed with their code.
pub fn format_amount(amount: MinorUnits, currency: &str) -> String {
    let formatted = amount.to_string();
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", int_part),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    let symbol = match currency.to_lowercase().as_str() {
        "eur" => "€".to_string(),
        other => other.to_uppercase(),
    };
    format!("{sign}{grouped},{frac_part} {symbol}")
}

fn slot_label(slot: &str) -> Option<&'static str> {
    SLOT_LABELS.iter().find(|(key, _)| *key == slot).map(|(_, label)| *label)
}

/// Known slots first, in their fixed order, then the rest alphabetically.
pub fn ordered_elements(elements: &BTreeMap<String, String>) -> Vec<(String, &str)> {
    let known = SLOT_LABELS
        .iter()
        .filter_map(|(key, label)| elements.get(*key).map(|v| (label.to_string(), v.as_str())));
    let unknown = elements.iter().filter(|(k, _)| slot_label(k).is_none()).map(|(k, v)| (k.clone(), v.as_str()));
    known.chain(unknown).collect()
}

fn render_elements(elements: &BTreeMap<String, String>) -> String {
    let rows = ordered_elements(elements);
    if rows.is_empty() {
        return r#"<tr><td style="padding:8px 0;color:#6b7280;font-size:14px;">Aucune pièce</td></tr>"#.to_string();
    }
    rows.iter().fold(String::new(), |mut html, (label, value)| {
        let _ = write!(
            html,
            r#"<tr><td style="padding:8px 0;color:#6b7280;font-size:14px;width:160px;">{}</td><td style="padding:8px 0;color:#111827;font-size:14px;font-weight:600;">{}</td></tr>"#,
            escape_html(label),
            escape_html(value)
        );
        html
    })
}

fn render_item(index: usize, item: &CartItem, currency: &str) -> String {
    let model = if item.model_type.trim().is_empty() { "Modèle" } else { item.model_type.as_str() };
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<tr><td style="padding:16px;border:1px solid #e5e7eb;border-radius:14px;"><table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="border-collapse:collapse;"><tr><td style="padding-bottom:10px;"><span style="display:inline-block;background:#111827;color:#ffffff;font-size:12px;font-weight:700;padding:6px 10px;border-radius:999px;">ARTICLE #{}</span></td></tr><tr><td style="padding:0 0 12px 0;"><div style="font-size:18px;font-weight:800;color:#111827;margin-bottom:4px;">{}</div>"#,
        index + 1,
        escape_html(&model.to_uppercase())
    );
    if let Ok(subtotal) = MinorUnits::from_major(item.total) {
        if subtotal.value() > 0 {
            let _ = write!(
                html,
                r#"<div style="color:#6b7280;font-size:14px;">Sous-total : <strong style="color:#111827;">{}</strong></div>"#,
                format_amount(subtotal, currency)
            );
        }
    }
    html.push_str("</td></tr>");
    if let Some(image) = item.image.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = write!(
            html,
            r#"<tr><td style="padding:0 0 12px 0;"><img src="{}" alt="Montre" width="520" style="width:100%;max-width:520px;border-radius:12px;display:block;border:1px solid #e5e7eb;" /></td></tr>"#,
            escape_html(image)
        );
    }
    let _ = write!(
        html,
        r#"<tr><td style="padding-top:4px;"><div style="font-size:14px;font-weight:800;color:#111827;margin-bottom:8px;">Détails des pièces</div><table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="border-collapse:collapse;">{}</table></td></tr></table></td></tr><tr><td style="height:14px;line-height:14px;">&nbsp;</td></tr>"#,
        render_elements(&item.elements)
    );
    html
}

fn summary_row(label: &str, value: &str) -> String {
    format!(
        r#"<tr><td style="color:#6b7280;font-size:13px;padding-top:8px;">{label}</td><td align="right" style="color:#111827;font-size:13px;font-weight:700;padding-top:8px;">{value}</td></tr>"#
    )
}

pub fn subject(order: &Order) -> String {
    format!("Nouvelle commande – {}", format_amount(order.amount_total, &order.currency))
}

/// Renders the operator summary for a paid order.
pub fn render_order_paid(order: &Order, brand: &BrandConfig) -> RenderedEmail {
    let brand_name = escape_html(&brand.name);
    let header = match brand.logo_url.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(logo) => format!(
            r#"<img src="{}" alt="{brand_name}" height="34" style="height:34px;display:block;" />"#,
            escape_html(logo)
        ),
        None => format!(r#"<div style="color:#fff;font-weight:800;font-size:18px;">{brand_name}</div>"#),
    };
    let email = order.customer_email.as_deref().map(escape_html).unwrap_or_else(|| PLACEHOLDER.to_string());
    let session = order.external_session_id.as_deref().map(escape_html).unwrap_or_else(|| PLACEHOLDER.to_string());
    let items = order
        .cart()
        .iter()
        .enumerate()
        .map(|(i, item)| render_item(i, item, &order.currency))
        .collect::<String>();
    let items = if items.is_empty() {
        r#"<tr><td style="padding:16px;border:1px solid #e5e7eb;border-radius:14px;color:#6b7280;">Aucun article</td></tr>"#
            .to_string()
    } else {
        items
    };
    let total = format_amount(order.amount_total, &order.currency);
    let summary = [
        summary_row("Email client", &email),
        summary_row("Commande", &format!("#{}", order.id)),
        summary_row("Session Stripe", &session),
    ]
    .concat();
    let year = order.updated_at.year();

    let html = format!(
        r#"<!doctype html>
<html lang="fr">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width" />
    <title>{TITLE}</title>
  </head>
  <body style="margin:0;padding:0;background:#f6f7fb;">
    <center style="width:100%;background:#f6f7fb;">
      <table role="presentation" width="640" cellpadding="0" cellspacing="0" style="border-collapse:collapse;max-width:640px;width:100%;background:#ffffff;border-radius:18px;border:1px solid #e5e7eb;">
        <tr><td style="padding:22px 24px;background:#0b0b0d;"><table role="presentation" width="100%" cellpadding="0" cellspacing="0"><tr><td align="left">{header}</td><td align="right" style="color:#fff;font-size:12px;">Paiement confirmé</td></tr></table></td></tr>
        <tr><td style="padding:22px 24px 8px 24px;"><div style="font-size:22px;font-weight:900;color:#111827;">{TITLE}</div><div style="margin-top:6px;color:#6b7280;font-size:14px;">Une commande vient d’être payée via Stripe Checkout.</div></td></tr>
        <tr><td style="padding:10px 24px 16px 24px;"><table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="border:1px solid #e5e7eb;border-radius:14px;"><tr><td style="padding:14px 16px;"><table role="presentation" width="100%" cellpadding="0" cellspacing="0">{summary}<tr><td style="color:#6b7280;font-size:13px;padding-top:12px;">Total</td><td align="right" style="color:#111827;font-size:18px;font-weight:900;padding-top:12px;">{total}</td></tr></table></td></tr></table></td></tr>
        <tr><td style="padding:0 24px 10px 24px;"><div style="font-size:14px;font-weight:900;color:#111827;margin:8px 0 10px 0;">Récap des pièces</div></td></tr>
        <tr><td style="padding:0 24px 22px 24px;"><table role="presentation" width="100%" cellpadding="0" cellspacing="0">{items}</table></td></tr>
        <tr><td style="padding:18px 24px;background:#f9fafb;border-top:1px solid #e5e7eb;"><div style="color:#6b7280;font-size:12px;">Cet email a été envoyé automatiquement par {brand_name}.</div></td></tr>
      </table>
      <div style="color:#9ca3af;font-size:11px;margin-top:10px;">© {year} {brand_name}</div>
    </center>
  </body>
</html>
"#
    );
    RenderedEmail { subject: subject(order), html }
}
