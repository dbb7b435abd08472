//! Email templates
//!
//! Every template is a pure function of its inputs. Anything that came from
//! a customer or an admin goes through [`escape_html`] before it reaches the
//! HTML body; the plain-text body carries it verbatim.

use super::message::{escape_html, EmailMessage};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Money, OrderSummary};
use std::fmt::Write as _;

/// Store identity used in every email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreBranding {
    pub store_name: String,
    /// Public storefront URL, no trailing slash.
    pub site_url: String,
    pub support_email: Option<String>,
}

impl Default for StoreBranding {
    fn default() -> Self {
        Self {
            store_name: "Aurelia".to_string(),
            site_url: "http://localhost:3000".to_string(),
            support_email: None,
        }
    }
}

impl StoreBranding {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), path)
    }
}

fn layout(branding: &StoreBranding, heading: &str, body: &str) -> String {
    let store = escape_html(&branding.store_name);
    let mut footer = format!(
        r#"<p style="color:#888;font-size:12px">{store} &middot; <a href="{}">{}</a></p>"#,
        escape_html(&branding.site_url),
        escape_html(&branding.site_url),
    );
    if let Some(support) = &branding.support_email {
        let support = escape_html(support);
        let _ = write!(
            footer,
            r#"<p style="color:#888;font-size:12px">Questions? <a href="mailto:{support}">{support}</a></p>"#
        );
    }
    format!(
        r#"<!doctype html><html><body style="font-family:Georgia,serif;color:#222"><h1 style="font-weight:normal">{}</h1>{body}{footer}</body></html>"#,
        escape_html(heading)
    )
}

fn address_html(address: &Address) -> String {
    let mut parts = vec![escape_html(&address.line1)];
    if let Some(line2) = &address.line2 {
        parts.push(escape_html(line2));
    }
    let region = match &address.state {
        Some(state) => format!("{}, {} {}", address.city, state, address.postal_code),
        None => format!("{} {}", address.city, address.postal_code),
    };
    parts.push(escape_html(&region));
    parts.push(escape_html(&address.country));
    parts.join("<br>")
}

fn address_text(address: &Address) -> String {
    let mut lines = vec![address.line1.clone()];
    lines.extend(address.line2.clone());
    match &address.state {
        Some(state) => lines.push(format!("{}, {} {}", address.city, state, address.postal_code)),
        None => lines.push(format!("{} {}", address.city, address.postal_code)),
    }
    lines.push(address.country.clone());
    lines.join("\n")
}

fn line_total(unit: &Money, quantity: u32) -> String {
    unit.checked_mul(quantity)
        .map(|m| m.format())
        .unwrap_or_else(|_| "-".to_string())
}

fn order_table_html(summary: &OrderSummary) -> String {
    let mut rows = String::new();
    for line in &summary.lines {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td align=\"center\">{}</td><td align=\"right\">{}</td></tr>",
            escape_html(&line.name),
            line.quantity,
            line_total(&line.unit_price, line.quantity)
        );
    }
    format!(
        "<table width=\"100%\" cellpadding=\"4\">\
         <tr><th align=\"left\">Item</th><th>Qty</th><th align=\"right\">Price</th></tr>\
         {rows}\
         <tr><td colspan=\"2\">Subtotal</td><td align=\"right\">{}</td></tr>\
         <tr><td colspan=\"2\">Shipping</td><td align=\"right\">{}</td></tr>\
         <tr><td colspan=\"2\"><strong>Total</strong></td><td align=\"right\"><strong>{}</strong></td></tr>\
         </table>",
        summary.subtotal, summary.shipping, summary.total
    )
}

fn order_table_text(summary: &OrderSummary) -> String {
    let mut out = String::new();
    for line in &summary.lines {
        let _ = writeln!(
            out,
            "{} x{}  {}",
            line.name,
            line.quantity,
            line_total(&line.unit_price, line.quantity)
        );
    }
    let _ = write!(
        out,
        "Subtotal: {}\nShipping: {}\nTotal: {}",
        summary.subtotal, summary.shipping, summary.total
    );
    out
}

fn reply_to(branding: &StoreBranding) -> Option<String> {
    branding.support_email.clone()
}

/// Customer confirmation once an order is paid.
pub fn order_confirmation(branding: &StoreBranding, summary: &OrderSummary) -> EmailMessage {
    let number = escape_html(&summary.order_number);
    let body = format!(
        "<p>Dear {},</p><p>Thank you for your order <strong>{number}</strong>. \
         We are preparing it with care.</p>{}<h3>Shipping to</h3><p>{}</p>",
        escape_html(&summary.customer.name),
        order_table_html(summary),
        address_html(&summary.shipping_address),
    );
    let text = format!(
        "Dear {},\n\nThank you for your order {}.\n\n{}\n\nShipping to:\n{}\n",
        summary.customer.name,
        summary.order_number,
        order_table_text(summary),
        address_text(&summary.shipping_address),
    );
    EmailMessage {
        to: vec![summary.customer.email.clone()],
        subject: format!(
            "Your {} order {} is confirmed",
            branding.store_name, summary.order_number
        ),
        html: layout(branding, "Order confirmed", &body),
        text,
        reply_to: reply_to(branding),
    }
}

/// Back-office alert for a newly paid order.
pub fn admin_new_order(
    branding: &StoreBranding,
    summary: &OrderSummary,
    admins: &[String],
) -> EmailMessage {
    let body = format!(
        "<p>Order <strong>{}</strong> from {} &lt;{}&gt; was paid.</p>{}",
        escape_html(&summary.order_number),
        escape_html(&summary.customer.name),
        escape_html(&summary.customer.email),
        order_table_html(summary),
    );
    let text = format!(
        "Order {} from {} <{}> was paid.\n\n{}\n",
        summary.order_number,
        summary.customer.name,
        summary.customer.email,
        order_table_text(summary),
    );
    EmailMessage {
        to: admins.to_vec(),
        subject: format!(
            "New order {} ({}, {} items)",
            summary.order_number,
            summary.total,
            summary.item_count()
        ),
        html: layout(branding, "New order", &body),
        text,
        reply_to: Some(summary.customer.email.clone()),
    }
}

pub fn payment_failed(
    branding: &StoreBranding,
    order_number: &str,
    customer_email: &str,
    reason: &str,
) -> EmailMessage {
    let body = format!(
        "<p>We could not process the payment for order <strong>{}</strong>.</p>\
         <p>Reason: {}</p><p>No charge was made. You are welcome to <a href=\"{}\">try again</a>.</p>",
        escape_html(order_number),
        escape_html(reason),
        escape_html(&branding.url("/cart")),
    );
    let text = format!(
        "We could not process the payment for order {order_number}.\nReason: {reason}\n\
         No charge was made. You are welcome to try again: {}\n",
        branding.url("/cart")
    );
    EmailMessage {
        to: vec![customer_email.to_string()],
        subject: format!("Payment for order {order_number} did not go through"),
        html: layout(branding, "Payment unsuccessful", &body),
        text,
        reply_to: reply_to(branding),
    }
}

pub fn order_shipped(
    branding: &StoreBranding,
    order_number: &str,
    customer_email: &str,
    tracking_number: Option<&str>,
) -> EmailMessage {
    let tracking_html = tracking_number
        .map(|t| format!("<p>Tracking number: <strong>{}</strong></p>", escape_html(t)))
        .unwrap_or_default();
    let tracking_text = tracking_number
        .map(|t| format!("Tracking number: {t}\n"))
        .unwrap_or_default();
    let body = format!(
        "<p>Good news: order <strong>{}</strong> is on its way.</p>{tracking_html}",
        escape_html(order_number)
    );
    EmailMessage {
        to: vec![customer_email.to_string()],
        subject: format!("Order {order_number} has shipped"),
        html: layout(branding, "Your order has shipped", &body),
        text: format!("Good news: order {order_number} is on its way.\n{tracking_text}"),
        reply_to: reply_to(branding),
    }
}

pub fn order_delivered(
    branding: &StoreBranding,
    order_number: &str,
    customer_email: &str,
) -> EmailMessage {
    let body = format!(
        "<p>Order <strong>{}</strong> has been delivered. We hope you love it.</p>\
         <p>We would be grateful for a <a href=\"{}\">review</a>.</p>",
        escape_html(order_number),
        escape_html(&branding.url("/shop")),
    );
    EmailMessage {
        to: vec![customer_email.to_string()],
        subject: format!("Order {order_number} was delivered"),
        html: layout(branding, "Delivered", &body),
        text: format!(
            "Order {order_number} has been delivered. We hope you love it.\nReviews: {}\n",
            branding.url("/shop")
        ),
        reply_to: reply_to(branding),
    }
}

pub fn refund_confirmation(branding: &StoreBranding, summary: &OrderSummary) -> EmailMessage {
    let body = format!(
        "<p>Dear {},</p><p>Your refund of <strong>{}</strong> for order <strong>{}</strong> \
         has been issued. It may take 5-10 business days to appear on your statement.</p>",
        escape_html(&summary.customer.name),
        summary.total,
        escape_html(&summary.order_number),
    );
    EmailMessage {
        to: vec![summary.customer.email.clone()],
        subject: format!("Refund issued for order {}", summary.order_number),
        html: layout(branding, "Refund issued", &body),
        text: format!(
            "Dear {},\n\nYour refund of {} for order {} has been issued. \
             It may take 5-10 business days to appear on your statement.\n",
            summary.customer.name, summary.total, summary.order_number
        ),
        reply_to: reply_to(branding),
    }
}

pub fn low_stock_alert(
    branding: &StoreBranding,
    admins: &[String],
    product: &str,
    level: i64,
    threshold: i64,
) -> EmailMessage {
    let body = format!(
        "<p><strong>{}</strong> is down to <strong>{level}</strong> in stock \
         (alert threshold {threshold}).</p>",
        escape_html(product)
    );
    EmailMessage {
        to: admins.to_vec(),
        subject: format!("Low stock: {product} ({level} left)"),
        html: layout(branding, "Low stock", &body),
        text: format!("{product} is down to {level} in stock (alert threshold {threshold}).\n"),
        reply_to: None,
    }
}

pub fn amount_mismatch_alert(
    branding: &StoreBranding,
    admins: &[String],
    order_number: &str,
    expected: &Money,
    received: &Money,
) -> EmailMessage {
    let body = format!(
        "<p>The processor captured <strong>{received}</strong> for order <strong>{}</strong>, \
         but the order total is <strong>{expected}</strong>. The order was marked paid; \
         please review it.</p>",
        escape_html(order_number)
    );
    EmailMessage {
        to: admins.to_vec(),
        subject: format!("Payment amount mismatch on {order_number}"),
        html: layout(branding, "Payment amount mismatch", &body),
        text: format!(
            "The processor captured {received} for order {order_number}, but the order total \
             is {expected}. The order was marked paid; please review it.\n"
        ),
        reply_to: None,
    }
}

pub fn newsletter_welcome(branding: &StoreBranding, email: &str, unsubscribe_token: &str) -> EmailMessage {
    let unsubscribe = branding.url(&format!("/newsletter/unsubscribe?token={unsubscribe_token}"));
    let body = format!(
        "<p>Welcome to the {} journal: new collections, atelier stories and early access.</p>\
         <p style=\"font-size:12px\"><a href=\"{}\">Unsubscribe</a></p>",
        escape_html(&branding.store_name),
        escape_html(&unsubscribe),
    );
    EmailMessage {
        to: vec![email.to_string()],
        subject: format!("Welcome to {}", branding.store_name),
        html: layout(branding, "Welcome", &body),
        text: format!(
            "Welcome to the {} journal: new collections, atelier stories and early access.\n\n\
             Unsubscribe: {unsubscribe}\n",
            branding.store_name
        ),
        reply_to: reply_to(branding),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{CustomerInfo, OrderId, OrderLine, ProductId};

    fn summary() -> OrderSummary {
        OrderSummary {
            order_id: OrderId::new(),
            order_number: "AU-20261019-Q7XK2M".into(),
            customer: CustomerInfo {
                email: "mira@example.com".into(),
                name: "Mira <script>".into(),
                phone: None,
            },
            lines: vec![OrderLine {
                product_id: ProductId::new(),
                name: "Pearl & Gold Drop Earrings".into(),
                sku: Some("EAR-001".into()),
                unit_price: Money::usd(12_500),
                quantity: 2,
            }],
            subtotal: Money::usd(25_000),
            shipping: Money::usd(0),
            total: Money::usd(25_000),
            shipping_address: Address {
                line1: "1 Rue de la Paix".into(),
                line2: None,
                city: "Paris".into(),
                state: None,
                postal_code: "75002".into(),
                country: "FR".into(),
            },
        }
    }

    #[test]
    fn test_order_confirmation_escapes_customer_text() {
        let message = order_confirmation(&StoreBranding::default(), &summary());
        assert_eq!(message.to, vec!["mira@example.com".to_string()]);
        assert!(message.subject.contains("AU-20261019-Q7XK2M"));
        assert!(message.html.contains("Mira &lt;script&gt;"));
        assert!(!message.html.contains("<script>"));
        assert!(message.html.contains("Pearl &amp; Gold Drop Earrings"));
        assert!(message.html.contains("$250.00"));
        assert!(message.text.contains("Pearl & Gold Drop Earrings x2"));
        assert!(message.text.contains("75002"));
    }

    #[test]
    fn test_admin_alert_goes_to_all_admins() {
        let admins = vec!["ops@aurelia.test".to_string(), "owner@aurelia.test".to_string()];
        let message = admin_new_order(&StoreBranding::default(), &summary(), &admins);
        assert_eq!(message.to, admins);
        assert_eq!(message.reply_to.as_deref(), Some("mira@example.com"));
        assert!(message.subject.contains("2 items"));
    }

    #[test]
    fn test_shipped_with_and_without_tracking() {
        let branding = StoreBranding::default();
        let tracked = order_shipped(&branding, "AU-1", "a@example.com", Some("1Z<999>"));
        assert!(tracked.html.contains("1Z&lt;999&gt;"));
        assert!(tracked.text.contains("Tracking number: 1Z<999>"));

        let untracked = order_shipped(&branding, "AU-1", "a@example.com", None);
        assert!(!untracked.text.contains("Tracking"));
    }

    #[test]
    fn test_newsletter_welcome_has_unsubscribe_link() {
        let branding = StoreBranding {
            site_url: "https://aurelia.test/".into(),
            ..StoreBranding::default()
        };
        let message = newsletter_welcome(&branding, "n@example.com", "tok123");
        assert!(message
            .text
            .contains("https://aurelia.test/newsletter/unsubscribe?token=tok123"));
        assert!(message.html.contains("Unsubscribe"));
    }

    #[test]
    fn test_support_email_sets_reply_to() {
        let branding = StoreBranding {
            support_email: Some("care@aurelia.test".into()),
            ..StoreBranding::default()
        };
        let message = order_delivered(&branding, "AU-1", "a@example.com");
        assert_eq!(message.reply_to.as_deref(), Some("care@aurelia.test"));
        assert!(message.html.contains("mailto:care@aurelia.test"));
    }

    #[test]
    fn test_mismatch_alert_mentions_both_amounts() {
        let message = amount_mismatch_alert(
            &StoreBranding::default(),
            &["ops@aurelia.test".to_string()],
            "AU-1",
            &Money::usd(9_000),
            &Money::usd(100),
        );
        assert!(message.text.contains("$90.00"));
        assert!(message.text.contains("$1.00"));
    }
}
