//! Terminal rendering of product cards, sale banners and order summaries.
//!
//! ```text
//! Dhakai Jamdani Saree                 SR-JAM-001
//!   ৳12,500.00 → ৳10,000.00  [-20%]  Saree Week · ends in 2d 21:59:59
//! ```
//!
//! In the Bangla locale names, titles, digits and labels switch to Bangla.

use chrono::{DateTime, Duration, Utc};
use dokan_core::money::to_bangla_digits;
use dokan_core::{Locale, Money, Order, OrderItem, PriceResult, Sale};
use dokan_db::PricedProduct;

/// `৳1,000.00 → ৳800.00  [-20%]`, or just the price when nothing is on sale.
pub fn price_line(price: &PriceResult, locale: Locale) -> String {
    if !price.is_sale {
        return price.final_price.format(locale);
    }
    format!(
        "{} → {}  [{}]",
        strike(&price.original_price.format(locale)),
        price.final_price.format(locale),
        localize_digits(&format!("-{}", price.discount), locale)
    )
}

/// Countdown as `HH:MM:SS`, with a day prefix past 24 hours.
pub fn countdown(remaining: Duration, locale: Locale) -> String {
    let total = remaining.num_seconds().max(0);
    let days = total / 86_400;
    let clock = format!(
        "{:02}:{:02}:{:02}",
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60
    );

    let text = match (days, locale) {
        (0, _) => clock,
        (d, Locale::En) => format!("{d}d {clock}"),
        (d, Locale::Bn) => format!("{d} দিন {clock}"),
    };
    localize_digits(&text, locale)
}

/// Two-line product card.
pub fn product_card(card: &PricedProduct, locale: Locale, now: DateTime<Utc>) -> String {
    let product = &card.product;
    let mut out = format!(
        "{:<40} {}\n  {}",
        product.display_name(locale),
        product.sku,
        price_line(&card.price, locale)
    );

    if let Some(sale) = &card.price.sale {
        out.push_str("  ");
        out.push_str(sale.title(locale));
        if let Some(remaining) = sale.time_remaining(now) {
            out.push_str(&format!(
                " · {} {}",
                label(Label::EndsIn, locale),
                countdown(remaining, locale)
            ));
        }
    }

    if product.stock <= 0 {
        out.push_str(&format!("  ({})", label(Label::OutOfStock, locale)));
    }
    out
}

/// Product page: the card plus the description.
pub fn product_page(card: &PricedProduct, locale: Locale, now: DateTime<Utc>) -> String {
    let mut out = product_card(card, locale, now);
    if let Some(description) = card.product.description(locale) {
        out.push_str("\n\n  ");
        out.push_str(description);
    }
    if card.price.is_sale {
        out.push_str(&format!(
            "\n\n  {} {}",
            label(Label::YouSave, locale),
            card.price.savings().format(locale)
        ));
    }
    out
}

/// One line per running sale.
pub fn sale_line(sale: &Sale, locale: Locale, now: DateTime<Utc>) -> String {
    let discount = localize_digits(&format!("-{}", sale.discount()), locale);
    match sale.time_remaining(now) {
        Some(remaining) => format!(
            "{:<32} {:>6}  {} {}",
            sale.title(locale),
            discount,
            label(Label::EndsIn, locale),
            countdown(remaining, locale)
        ),
        None => format!("{:<32} {:>6}", sale.title(locale), discount),
    }
}

/// Receipt for a placed order.
pub fn order_summary(order: &Order, items: &[OrderItem], locale: Locale) -> String {
    let money = |poisha: i64| Money::from_poisha(poisha).format(locale);
    let mut out = format!("{} {}\n", label(Label::Order, locale), order.id);

    for item in items {
        let unit = if item.unit_price_poisha < item.original_price_poisha {
            format!(
                "{} → {}",
                strike(&money(item.original_price_poisha)),
                money(item.unit_price_poisha)
            )
        } else {
            money(item.unit_price_poisha)
        };
        out.push_str(&format!(
            "  {} × {:<32} {:>24}  {}\n",
            localize_digits(&item.quantity.to_string(), locale),
            item.display_name(locale),
            unit,
            money(item.line_total_poisha)
        ));
    }

    let row = |name: &str, amount: String| format!("  {name:<20} {amount}\n");
    out.push_str(&row(label(Label::Subtotal, locale), money(order.subtotal_poisha)));
    if order.savings_poisha > 0 {
        out.push_str(&row(label(Label::YouSave, locale), money(order.savings_poisha)));
    }
    if let Some(code) = &order.coupon_code {
        out.push_str(&row(
            &format!("{} {code}", label(Label::Coupon, locale)),
            format!("-{}", money(order.coupon_discount_poisha)),
        ));
    }
    out.push_str(&row(label(Label::Delivery, locale), money(order.shipping_poisha)));
    out.push_str(&row(label(Label::Total, locale), money(order.total_poisha)));
    out.truncate(out.trim_end().len());
    out
}

/// Strike-through via U+0336 combining overlay, one per character.
fn strike(text: &str) -> String {
    text.chars().flat_map(|c| [c, '\u{0336}']).collect()
}

fn localize_digits(text: &str, locale: Locale) -> String {
    match locale {
        Locale::En => text.to_string(),
        Locale::Bn => to_bangla_digits(text),
    }
}

#[derive(Debug, Clone, Copy)]
enum Label {
    EndsIn,
    OutOfStock,
    YouSave,
    Order,
    Subtotal,
    Coupon,
    Delivery,
    Total,
}

fn label(which: Label, locale: Locale) -> &'static str {
    match (which, locale) {
        (Label::EndsIn, Locale::En) => "ends in",
        (Label::EndsIn, Locale::Bn) => "শেষ হবে",
        (Label::OutOfStock, Locale::En) => "out of stock",
        (Label::OutOfStock, Locale::Bn) => "স্টক নেই",
        (Label::YouSave, Locale::En) => "You save",
        (Label::YouSave, Locale::Bn) => "সাশ্রয়",
        (Label::Order, Locale::En) => "Order",
        (Label::Order, Locale::Bn) => "অর্ডার",
        (Label::Subtotal, Locale::En) => "Subtotal",
        (Label::Subtotal, Locale::Bn) => "উপমোট",
        (Label::Coupon, Locale::En) => "Coupon",
        (Label::Coupon, Locale::Bn) => "কুপন",
        (Label::Delivery, Locale::En) => "Delivery",
        (Label::Delivery, Locale::Bn) => "ডেলিভারি",
        (Label::Total, Locale::En) => "Total",
        (Label::Total, Locale::Bn) => "সর্বমোট",
    }
}
