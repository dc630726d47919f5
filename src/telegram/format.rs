//! HTML rendering of token pairs
//!
//! Provider-supplied strings are escaped; missing numeric fields render
//! as "-" rather than being dropped, so the layout stays stable.

use teloxide::utils::html::escape;

use crate::dex::types::{Token, TokenPair};

/// Render a pair as a Telegram HTML message.
///
/// The compact form carries identity, prices, and liquidity; `verbose`
/// adds FDV, creation time, and the transactions/volume/price-change
/// breakdowns.
pub fn format_token(pair: &TokenPair, verbose: bool) -> String {
    let mut text = format!(
        "Chain ID: {}\nDex ID: {}\nPair Address: {}\n",
        escape(&pair.chain_id),
        escape(&pair.dex_id),
        escape(&pair.pair_address),
    );
    if verbose {
        text.push_str(&format!("FDV: {}\n", opt_num(pair.fdv)));
    }

    text.push_str(&format!(
        "\nUSD Price: {}\nNative Price: {}\n",
        opt_text(&pair.price_usd),
        opt_text(&pair.price_native),
    ));
    if verbose {
        if let Some(created) = pair.created_at() {
            text.push_str(&format!("Created: {}\n", created.to_rfc3339()));
        }
    }

    text.push('\n');
    text.push_str(&token_block("Base Token", &pair.base_token));
    text.push_str(&token_block("Quote Token", &pair.quote_token));

    text.push_str("<b>Liquidity</b>\n");
    let (base, usd, quote) = match &pair.liquidity {
        Some(liq) => (opt_num(liq.base), opt_num(liq.usd), opt_num(liq.quote)),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };
    text.push_str(&format!("Base: {}\nUSD: {}\nQuote: {}\n\n", base, usd, quote));

    if verbose {
        let txns = &pair.txns;
        text.push_str(&format!(
            "<b>Transactions</b>\n\
             5m: {} bought, {} sold\n\
             1h: {} bought, {} sold\n\
             6h: {} bought, {} sold\n\
             24h: {} bought, {} sold\n\n",
            txns.m5.buys,
            txns.m5.sells,
            txns.h1.buys,
            txns.h1.sells,
            txns.h6.buys,
            txns.h6.sells,
            txns.h24.buys,
            txns.h24.sells,
        ));

        text.push_str(&format!(
            "<b>Volume</b>\n5m: {}\n1h: {}\n6h: {}\n24h: {}\n\n",
            opt_num(pair.volume.m5),
            opt_num(pair.volume.h1),
            opt_num(pair.volume.h6),
            opt_num(pair.volume.h24),
        ));

        text.push_str(&format!(
            "<b>Price Change</b>\n5m: {}\n1h: {}\n6h: {}\n24h: {}\n\n",
            opt_num(pair.price_change.m5),
            opt_num(pair.price_change.h1),
            opt_num(pair.price_change.h6),
            opt_num(pair.price_change.h24),
        ));
    }

    text.push_str(&format!("URL: {}", escape(&pair.url)));
    text
}

fn token_block(title: &str, token: &Token) -> String {
    format!(
        "<b>{}</b>\nSymbol: {}\nName: {}\nAddress: {}\n\n",
        title,
        escape(&token.symbol),
        escape(&token.name),
        escape(&token.address),
    )
}

fn opt_text(value: &Option<String>) -> String {
    value.as_deref().map(escape).unwrap_or_else(|| "-".to_string())
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::types::sample_pair;

    #[test]
    fn test_compact_skips_detail_sections() {
        let text = format_token(&sample_pair(), false);
        assert!(text.contains("Chain ID: ethereum"));
        assert!(text.contains("<b>Base Token</b>"));
        assert!(text.contains("<b>Liquidity</b>"));
        assert!(!text.contains("<b>Transactions</b>"));
        assert!(!text.contains("FDV:"));
    }

    #[test]
    fn test_verbose_includes_detail_sections() {
        let text = format_token(&sample_pair(), true);
        assert!(text.contains("FDV: 9999999"));
        assert!(text.contains("<b>Transactions</b>"));
        assert!(text.contains("100 bought, 90 sold"));
        assert!(text.contains("<b>Volume</b>"));
        assert!(text.contains("<b>Price Change</b>"));
        assert!(text.contains("Created: 2021-05-03"));
    }

    #[test]
    fn test_provider_strings_are_html_escaped() {
        let mut pair = sample_pair();
        pair.base_token.name = "Pump & <Dump>".to_string();
        let text = format_token(&pair, false);
        assert!(text.contains("Pump &amp; &lt;Dump&gt;"));
    }

    #[test]
    fn test_missing_numbers_render_as_dash() {
        let mut pair = sample_pair();
        pair.price_usd = None;
        pair.liquidity = None;
        let text = format_token(&pair, false);
        assert!(text.contains("USD Price: -"));
        assert!(text.contains("Base: -\nUSD: -\nQuote: -"));
    }
}
