use anyhow::{bail, Result};
use clap::Args;
use marginkit_core::choose_selection;
use marginkit_report::{json as jreport, terminal};

use super::{Context, OutputFormat};

#[derive(Args)]
pub struct ModelsArgs {
    /// Include advanced / extended models
    #[arg(long)]
    pub advanced: bool,

    /// Output format: table, json
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn run(args: ModelsArgs, ctx: &Context) -> Result<()> {
    let presets = ctx.catalog.list_presets(args.advanced || ctx.show_advanced);

    match args.format {
        OutputFormat::Json => println!("{}", jreport::render_preset_list(&presets)?),
        OutputFormat::Html => bail!("`models` supports --format table or json"),
        OutputFormat::Table => {
            // mark the model `calc` would use without --model
            let default = choose_selection(&presets, None, &ctx.default_model);
            terminal::print_preset_list(&presets, default.map(|p| p.id.as_str()), ctx.nf);
        }
    }
    Ok(())
}
