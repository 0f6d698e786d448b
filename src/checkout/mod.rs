//! WhatsApp checkout hand-off: price formatting, order messages and deep links.

use crate::errors::AppError;
use crate::models::{CartItem, Product, Settings};

const WHATSAPP_BASE: &str = "https://wa.me";

/// Why checkout cannot be offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No settings row exists
    NotConfigured,
    /// Settings exist but carry no usable phone number
    MissingNumber,
}

impl UnavailableReason {
    pub fn message(&self) -> &'static str {
        match self {
            UnavailableReason::NotConfigured => "Checkout is unavailable: the shop is not configured",
            UnavailableReason::MissingNumber => {
                "Checkout is unavailable: no WhatsApp number is configured"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Digits-only WhatsApp number
    Ready(String),
    Unavailable(UnavailableReason),
}

/// The number to hand off to, or `Unavailable` explaining why checkout is off.
pub fn require_number(settings: Option<&Settings>) -> Result<String, AppError> {
    match availability(settings) {
        Availability::Ready(number) => Ok(number),
        Availability::Unavailable(reason) => Err(AppError::Unavailable(reason.message().to_string())),
    }
}

/// Keep only ASCII digits of a phone number, as `wa.me` expects.
pub fn normalize_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn availability(settings: Option<&Settings>) -> Availability {
    match settings {
        None => Availability::Unavailable(UnavailableReason::NotConfigured),
        Some(s) => {
            let digits = normalize_number(&s.whatsapp_number);
            if digits.is_empty() {
                Availability::Unavailable(UnavailableReason::MissingNumber)
            } else {
                Availability::Ready(digits)
            }
        }
    }
}

/// Group thousands with a narrow no-break space: `format_price(15000, "FCFA") == "15 000 FCFA"`.
pub fn format_price(amount: i64, currency: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\u{202F}');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{} {}", sign, grouped, currency)
}

/// Order summary sent to the merchant.
pub fn cart_order_message(shop_name: &str, items: &[CartItem], total: i64, currency: &str) -> String {
    let mut message = format!(
        "🎉 *Nouvelle Commande {}* 🎉\n\nBonjour! Je souhaite valider ma commande:\n\n",
        shop_name
    );
    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "*{}*\n  - Quantité: {}\n  - Prix unitaire: {}\n",
                item.name,
                item.quantity,
                format_price(item.unit_price(), currency)
            )
        })
        .collect();
    message.push_str(&lines.join("\n"));
    message.push_str(&format!(
        "\n----------------------\n*Total de la commande: {}*\n\nMerci de confirmer la disponibilité et la livraison.",
        format_price(total, currency)
    ));
    message
}

/// Single-product enquiry.
pub fn product_message(product: &Product, currency: &str) -> String {
    format!(
        "🏆 Bonjour! Je suis intéressé(e) par:\n\n📦 *{}*\n💰 Prix: {}\n\nPouvez-vous me donner plus d'informations?",
        product.name,
        format_price(product.effective_price(), currency)
    )
}

pub fn whatsapp_link(number: &str, message: &str) -> String {
    format!(
        "{}/{}?text={}",
        WHATSAPP_BASE,
        normalize_number(number),
        urlencoding::encode(message)
    )
}

pub fn cart_link(
    number: &str,
    shop_name: &str,
    items: &[CartItem],
    total: i64,
    currency: &str,
) -> String {
    whatsapp_link(number, &cart_order_message(shop_name, items, total, currency))
}

pub fn product_link(number: &str, product: &Product, currency: &str) -> String {
    whatsapp_link(number, &product_message(product, currency))
}
