use pricebook_core::config::LoadOptions;
use pricebook_core::{CatalogError, ProductId};

use crate::commands::{open_session, prepare, CommandResult};
use crate::render::PriceRow;

const COMMAND: &str = "add-price";

#[derive(Clone, Debug)]
pub struct AddPriceArgs {
    pub product_id: String,
    pub market: String,
    pub price: String,
}

/// Selects the product, then registers the price against that selection.
pub fn run(options: &LoadOptions, args: &AddPriceArgs) -> CommandResult {
    let (config, runtime) = match prepare(COMMAND, options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let mut session = match open_session(&config).await {
            Ok(session) => session,
            Err(error) => return CommandResult::from_catalog_error(COMMAND, &error),
        };
        let product_id = ProductId(args.product_id.trim().to_string());
        if let Err(error) = session.select_product(&product_id) {
            return CommandResult::from_catalog_error(COMMAND, &CatalogError::from(error));
        }

        match session.submit_price_for_selection(&args.market, &args.price).await {
            Ok(record) => CommandResult::success_with(
                COMMAND,
                format!("registered {} at `{}`", record.price, record.market),
                PriceRow::from(&record),
            ),
            Err(error) => CommandResult::from_catalog_error(COMMAND, &error),
        }
    })
}
