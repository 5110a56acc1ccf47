use crate::domain::price::PriceRecord;

/// Market choices for the filter selector: configured presets first, then
/// markets seen in price history, de-duplicated case-insensitively.
pub fn known_markets(presets: &[String], prices: &[PriceRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut markets = Vec::new();

    let candidates =
        presets.iter().map(String::as_str).chain(prices.iter().map(|price| price.market.as_str()));
    for candidate in candidates {
        let market = candidate.trim();
        if market.is_empty() {
            continue;
        }
        let key = market.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        markets.push(market.to_string());
    }

    markets
}
