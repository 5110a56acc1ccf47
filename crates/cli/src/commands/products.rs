use pricebook_core::config::LoadOptions;
use pricebook_core::{FilterSpec, ProductSortField};

use crate::commands::{open_session, prepare, sort_spec, CommandResult};
use crate::render::ProductRow;

const COMMAND: &str = "products";

#[derive(Clone, Debug, Default)]
pub struct ListProductsArgs {
    pub name: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

pub fn run(options: &LoadOptions, args: &ListProductsArgs) -> CommandResult {
    let sort = match sort_spec::<ProductSortField>(args.sort.as_deref(), args.direction.as_deref())
    {
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
        session.product_filter = FilterSpec::new(args.name.clone().unwrap_or_default(), "");
        session.product_sort = sort;

        let rows: Vec<ProductRow<'_>> =
            session.visible_products().into_iter().map(ProductRow::from).collect();
        let message = format!(
            "{} of {} product(s) by {} {:?}",
            rows.len(),
            session.store().products().len(),
            sort.field,
            sort.direction
        );
        CommandResult::success_with(COMMAND, message, &rows)
    })
}

