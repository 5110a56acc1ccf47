use pricebook_core::config::LoadOptions;
use pricebook_core::{FilterSpec, PriceSortField};

use crate::commands::{open_session, prepare, sort_spec, CommandResult};
use crate::render::PriceRow;

const COMMAND: &str = "prices";

#[derive(Clone, Debug, Default)]
pub struct ListPricesArgs {
    pub name: Option<String>,
    pub market: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

pub fn run(options: &LoadOptions, args: &ListPricesArgs) -> CommandResult {
    let sort = match sort_spec::<PriceSortField>(args.sort.as_deref(), args.direction.as_deref()) {
        Ok(sort) => sort,
        Err(error) => return CommandResult::from_catalog_error(COMMAND, &error.into()),
    };
    let (config, runtime) = match prepare(COMMAND, options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let mut session = match open_session(&config).await {
            Ok(session) => session,
            Err(error) => return CommandResult::from_catalog_error(COMMAND, &error),
        };
        session.price_filter = FilterSpec::new(
            args.name.clone().unwrap_or_default(),
            args.market.clone().unwrap_or_default(),
        );
        session.price_sort = sort;

        let rows: Vec<PriceRow<'_>> =
            session.visible_prices().into_iter().map(PriceRow::from).collect();
        let message = format!(
            "{} of {} price(s) by {} {:?}",
            rows.len(),
            session.store().prices().len(),
            sort.field,
            sort.direction
        );
        CommandResult::success_with(COMMAND, message, &rows)
    })
}
