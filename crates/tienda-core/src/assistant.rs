//! # Assistant
//!
//! Keyword intent matching and reply text for `POST /chat`.
//!
//! ## Priority (first match wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  message.to_lowercase()                                                 │
//! │     │                                                                   │
//! │     ├── contains "impuesto" | "cuanto pago" ──► TaxEstimate             │
//! │     ├── contains "stock"                    ──► Stock { query }         │
//! │     ├── contains "deuda"                    ──► Debt                    │
//! │     ├── contains "ventas"                   ──► DailySales              │
//! │     └── otherwise                           ──► Help                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A message such as "stock y deuda" is a stock question. Matching is plain
//! substring on the lowercased text, so "restock" also counts as "stock".
//!
//! The stock query is what remains after removing the filler words
//! `stock`, `alerta`, `ver`, `de`, `del` as whole words. "ver stock de
//! detergente" searches for "detergente", not "tergente".

use crate::money::Money;
use crate::report::estimate_tax_bracket;
use crate::types::{CompanyProfile, Product};

const STOCK_FILLER_WORDS: [&str; 5] = ["stock", "alerta", "ver", "de", "del"];

/// What the user is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    TaxEstimate,
    /// `query` is `None` when the message had no product words left.
    Stock { query: Option<String> },
    Debt,
    DailySales,
    Help,
}

/// Classifies a free-text message.
pub fn classify(message: &str) -> Intent {
    let text = message.to_lowercase();

    if text.contains("impuesto") || text.contains("cuanto pago") || text.contains("cuánto pago") {
        Intent::TaxEstimate
    } else if text.contains("stock") {
        Intent::Stock {
            query: extract_stock_query(&text),
        }
    } else if text.contains("deuda") {
        Intent::Debt
    } else if text.contains("ventas") {
        Intent::DailySales
    } else {
        Intent::Help
    }
}

fn extract_stock_query(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty() && !STOCK_FILLER_WORDS.contains(w))
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

// =============================================================================
// Replies
// =============================================================================

pub const HELP_TEXT: &str =
    "🤖 Soy TaxBot. Pregúntame: 'impuesto hoy', 'deuda', 'ventas' o 'stock <producto>'.";

pub const NO_COMPANY_TEXT: &str =
    "⚠️ Aún no hay datos de la empresa. Regístralos en /empresa para consultar la deuda.";

/// Tax estimate for today's sales. Zero sales gets its own message.
pub fn tax_reply(today_total: Money) -> String {
    if today_total.is_zero() {
        return "📉 Aún no tienes ventas hoy para calcular impuestos. ¡Vende algo primero!"
            .to_string();
    }

    let bracket = estimate_tax_bracket(today_total);
    format!(
        "📊 Análisis fiscal de hoy:\n\
         Ventas del día: {}\n\
         Régimen: Nuevo RUS (Categoría {})\n\
         Pago estimado SUNAT: {}\n\
         {}",
        today_total,
        bracket.category,
        bracket.fee,
        bracket.status.label()
    )
}

/// Result of a product-name lookup.
///
/// `matches` holds at most three products, `query` is the search term.
pub fn stock_lookup_reply(query: &str, matches: &[Product]) -> String {
    if matches.is_empty() {
        return format!("🚫 No encontré productos llamados '{}'.", query);
    }

    let mut reply = format!("🔍 Stock de '{}':", query);
    for p in matches {
        let flag = if p.is_low_stock() { "⚠️ Bajo" } else { "✅" };
        reply.push_str(&format!("\n📦 {}: {} ({})", p.name, p.current_stock, flag));
    }
    reply
}

/// General stock health when no product was named.
pub fn stock_overview_reply(low_stock_count: i64) -> String {
    if low_stock_count > 0 {
        format!(
            "⚠️ ALERTA: Tienes {} productos con stock crítico.",
            low_stock_count
        )
    } else {
        "✅ Todo tu inventario tiene stock suficiente.".to_string()
    }
}

pub fn debt_reply(profile: Option<&CompanyProfile>) -> String {
    match profile {
        None => NO_COMPANY_TEXT.to_string(),
        Some(c) if c.historical_tax_debt.is_positive() => format!(
            "🚨 ALERTA: Tienes una deuda coactiva de {}.\nRUC: {}",
            c.historical_tax_debt, c.tax_id
        ),
        Some(_) => "✅ Estás 100% limpio con la SUNAT.".to_string(),
    }
}

pub fn sales_reply(today_total: Money) -> String {
    format!("💰 Has vendido {} hoy.", today_total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, stock: i64, min: i64) -> Product {
        Product {
            id: name.to_string(),
            erp_id: None,
            name: name.to_string(),
            unit_cost: Money::ZERO,
            sale_price: Money::ZERO,
            current_stock: stock,
            min_stock: min,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(classify("¿Cuánto impuesto pago?"), Intent::TaxEstimate);
        assert_eq!(classify("cuanto pago hoy"), Intent::TaxEstimate);
        assert_eq!(classify("impuesto y stock"), Intent::TaxEstimate);
        assert!(matches!(classify("stock y deuda"), Intent::Stock { .. }));
        assert_eq!(classify("mi deuda y ventas"), Intent::Debt);
        assert_eq!(classify("VENTAS de hoy"), Intent::DailySales);
        assert_eq!(classify("hola"), Intent::Help);
    }

    #[test]
    fn test_stock_query_extraction() {
        assert_eq!(
            classify("ver stock de detergente"),
            Intent::Stock {
                query: Some("detergente".to_string())
            }
        );
        assert_eq!(
            classify("Stock del Arroz?"),
            Intent::Stock {
                query: Some("arroz".to_string())
            }
        );
        assert_eq!(classify("alerta stock"), Intent::Stock { query: None });
        assert_eq!(classify("stock"), Intent::Stock { query: None });
    }

    #[test]
    fn test_tax_reply_without_sales() {
        assert!(tax_reply(Money::ZERO).contains("Aún no tienes ventas"));
    }

    #[test]
    fn test_tax_reply_brackets() {
        let low = tax_reply(Money::parse("120.50").unwrap());
        assert!(low.contains("S/ 120.50"));
        assert!(low.contains("Categoría 1"));
        assert!(low.contains("S/ 20.00"));

        let high = tax_reply(Money::parse("5000.01").unwrap());
        assert!(high.contains("Categoría 2"));
        assert!(high.contains("S/ 50.00"));
    }

    #[test]
    fn test_stock_lookup_reply_flags_low_stock() {
        let reply = stock_lookup_reply(
            "arroz",
            &[product("Arroz Costeño", 2, 5), product("Arroz Faraón", 30, 5)],
        );
        assert!(reply.contains("Arroz Costeño: 2 (⚠️ Bajo)"));
        assert!(reply.contains("Arroz Faraón: 30 (✅)"));

        assert!(stock_lookup_reply("quinua", &[]).contains("No encontré"));
    }

    #[test]
    fn test_debt_reply() {
        let mut profile = CompanyProfile {
            tax_id: "20123456789".to_string(),
            business_name: "Bodega Don Lucho".to_string(),
            historical_tax_debt: Money::parse("1350.00").unwrap(),
            updated_at: Utc::now(),
        };
        let reply = debt_reply(Some(&profile));
        assert!(reply.contains("S/ 1350.00"));
        assert!(reply.contains("20123456789"));

        profile.historical_tax_debt = Money::ZERO;
        assert!(debt_reply(Some(&profile)).contains("limpio"));
        assert_eq!(debt_reply(None), NO_COMPANY_TEXT);
    }
}
