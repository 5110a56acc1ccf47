use pricebook_core::config::LoadOptions;
use pricebook_core::known_markets;

use crate::commands::{open_session, prepare, CommandResult};

const COMMAND: &str = "markets";

/// Preset markets followed by any others seen in the price history.
pub fn run(options: &LoadOptions) -> CommandResult {
    let (config, runtime) = match prepare(COMMAND, options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let session = match open_session(&config).await {
            Ok(session) => session,
            Err(error) => return CommandResult::from_catalog_error(COMMAND, &error),
        };
        let markets = known_markets(&config.catalog.markets, session.store().prices());
        CommandResult::success_with(COMMAND, format!("{} market(s)", markets.len()), &markets)
    })
}
