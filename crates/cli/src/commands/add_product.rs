use pricebook_core::config::LoadOptions;

use crate::commands::{open_session, prepare, CommandResult};
use crate::render::ProductRow;

const COMMAND: &str = "add-product";

#[derive(Clone, Debug)]
pub struct AddProductArgs {
    pub name: String,
    pub brand: String,
    pub weight: String,
    pub active: bool,
}

pub fn run(options: &LoadOptions, args: &AddProductArgs) -> CommandResult {
    let (config, runtime) = match prepare(COMMAND, options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let mut session = match open_session(&config).await {
            Ok(session) => session,
            Err(error) => return CommandResult::from_catalog_error(COMMAND, &error),
        };
        match session.submit_product(&args.name, &args.brand, &args.weight, args.active).await {
            Ok(record) => CommandResult::success_with(
                COMMAND,
                format!("registered `{}` ({})", record.product_name, record.id),
                ProductRow::from(&record),
            ),
            Err(error) => CommandResult::from_catalog_error(COMMAND, &error),
        }
    })
}
