use pricebook_core::config::LoadOptions;
use pricebook_core::ProductId;

use crate::commands::{open_session, prepare, CommandResult};

const COMMAND: &str = "delete-product";

pub fn run(options: &LoadOptions, id: &str) -> CommandResult {
    let (config, runtime) = match prepare(COMMAND, options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let mut session = match open_session(&config).await {
            Ok(session) => session,
            Err(error) => return CommandResult::from_catalog_error(COMMAND, &error),
        };
        let id = ProductId(id.trim().to_string());
        match session.delete_product(&id).await {
            Ok(()) => CommandResult::success(COMMAND, format!("removed product `{id}`")),
            Err(error) => CommandResult::from_catalog_error(COMMAND, &error),
        }
    })
}
