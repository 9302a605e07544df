//! HTML reply formatting
//!
//! Every dynamic value goes through [`html_escape`] before it is embedded.

use crate::apis::stonfi::Pool;
use crate::database::WatchlistEntry;
use crate::metrics::TvlSource;
use crate::reports::{format_decimal, format_usd, short_address, PoolReport};

pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn welcome_message() -> String {
    "👋 <b>Pools Alerter</b>\n\n\
     Track STON.fi liquidity pools.\n\n\
     /get_info_by_pool - pool details by address\n\
     /top10_pools - largest pools by liquidity\n\
     /show_watchlist - your saved pools\n\
     /get_quantity_pools - pools known to the bot\n\
     /about - about this bot"
        .to_string()
}

pub fn format_pool_count(count: u64) -> String {
    format!("📦 Pools stored: <b>{}</b>", count)
}

pub fn format_pool_info(report: &PoolReport) -> String {
    let pool = &report.pool;
    let mut lines = vec![
        format!("💧 <b>{}</b>", html_escape(&report.pair_label())),
        String::new(),
        format!("<b>Address:</b> <code>{}</code>", html_escape(&pool.address)),
        format!(
            "<b>{}:</b> reserve {}",
            html_escape(report.token0_name()),
            html_escape(&pool.reserve0)
        ),
        format!(
            "<b>{}:</b> reserve {}",
            html_escape(report.token1_name()),
            html_escape(&pool.reserve1)
        ),
        format!(
            "<b>Fees:</b> LP {} · protocol {}{}",
            html_escape(&pool.lp_fee),
            html_escape(&pool.protocol_fee),
            pool.ref_fee
                .as_deref()
                .map(|f| format!(" · referral {}", html_escape(f)))
                .unwrap_or_default()
        ),
        format!(
            "<b>Collected fees:</b> {} / {}",
            html_escape(&pool.collected_token0_protocol_fee),
            html_escape(&pool.collected_token1_protocol_fee)
        ),
        format!(
            "<b>Total fees:</b> {}",
            report
                .metrics
                .total_collected_fees
                .map(|fees| format_decimal(fees, 0))
                .unwrap_or_else(|| "n/a".to_string())
        ),
    ];

    match report.metrics.estimated_price {
        Some(price) => lines.push(format!(
            "<b>Estimated price:</b> {}",
            format_decimal(price, 9)
        )),
        None => lines.push("<b>Estimated price:</b> n/a (empty pool)".to_string()),
    }

    match report.metrics.tvl_usd {
        Some((tvl, TvlSource::Reserves)) => {
            lines.push(format!("<b>TVL:</b> {}", format_usd(tvl)))
        }
        Some((tvl, TvlSource::Reported)) => {
            lines.push(format!("<b>TVL:</b> {} (reported)", format_usd(tvl)))
        }
        None => lines.push("<b>TVL:</b> unknown".to_string()),
    }

    let apy: Vec<String> = [
        ("1d", pool.apy_1d.as_deref()),
        ("7d", pool.apy_7d.as_deref()),
        ("30d", pool.apy_30d.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| format!("{} {}", label, html_escape(v))))
    .collect();
    if !apy.is_empty() {
        lines.push(format!("<b>APY:</b> {}", apy.join(" · ")));
    }
    if pool.deprecated {
        lines.push("⚠️ This pool is deprecated".to_string());
    }

    lines.join("\n")
}

pub fn format_top_pools(pools: &[Pool]) -> String {
    if pools.is_empty() {
        return "No pools with reported liquidity.".to_string();
    }
    let mut text = format!("🏆 <b>Top {} pools by liquidity</b>\n\n", pools.len());
    for (i, pool) in pools.iter().enumerate() {
        let tvl = pool
            .reported_tvl_usd()
            .map(format_usd)
            .unwrap_or_else(|| "?".to_string());
        text.push_str(&format!(
            "{}. <code>{}</code> - {}\n",
            i + 1,
            html_escape(&short_address(&pool.address)),
            tvl
        ));
    }
    text
}

pub fn format_watchlist(entries: &[WatchlistEntry]) -> String {
    if entries.is_empty() {
        return "Your watchlist is empty. Look up a pool with /get_info_by_pool and add it."
            .to_string();
    }
    format!(
        "⭐ <b>Your watchlist</b> ({} pool{})\n\nTap a pool for details.",
        entries.len(),
        if entries.len() == 1 { "" } else { "s" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> PoolReport {
        let pool: Pool = serde_json::from_value(serde_json::json!({
            "address": "EQpool<1>",
            "apy_7d": "12.5",
            "collected_token0_protocol_fee": "100",
            "collected_token1_protocol_fee": "23",
            "deprecated": false,
            "lp_fee": "20",
            "lp_total_supply": "1000",
            "lp_total_supply_usd": "1234567.891",
            "protocol_fee": "10",
            "protocol_fee_address": "EQfee",
            "reserve0": "4000",
            "reserve1": "1000",
            "router_address": "EQrouter",
            "token0_address": "EQa",
            "token1_address": "EQb"
        }))
        .unwrap();
        PoolReport::from_parts(pool, None, None).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn test_pool_info_contents() {
        let text = format_pool_info(&report());
        assert!(text.contains("<code>EQpool&lt;1&gt;</code>"));
        assert!(text.contains("<b>Estimated price:</b> 0.25"));
        assert!(text.contains("<b>Total fees:</b> 123"));
        assert!(text.contains("$1,234,567.89 (reported)"));
        assert!(text.contains("7d 12.5"));
        assert!(!text.contains("deprecated"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_top_pools(&[]), "No pools with reported liquidity.");
        assert!(format_watchlist(&[]).contains("empty"));
    }
}
