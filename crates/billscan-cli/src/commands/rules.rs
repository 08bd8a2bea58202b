//! Rules command - show the active field rules and table signatures.

use clap::Args;
use console::style;

use billscan_core::TextStructurer;

use super::config::load_config;

#[derive(Args)]
pub struct RulesArgs {
    /// Print the rules as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: RulesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    // Compiling catches invalid rules before they are shown as active.
    let structurer = TextStructurer::new(&config.extraction)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config.extraction)?);
        return Ok(());
    }

    println!("{}", style("Fields").bold());
    for rule in structurer.field_rules() {
        println!(
            "  {} {}",
            style(&rule.name).cyan(),
            style(format!("({:?})", rule.pattern)).dim()
        );
        println!("    {}", rule.aliases.join(", "));
    }

    for spec in structurer.table_specs() {
        println!();
        println!(
            "{} {}",
            style(format!("Table {:?}", spec.kind)).bold(),
            style(format!(
                "({} numeric columns, at least {} per row)",
                spec.numeric_columns, spec.min_columns
            ))
            .dim()
        );
        for column in &spec.columns {
            let marker = if column.required { "" } else { " (optional)" };
            println!("  {}{}: {}", style(&column.key).cyan(), marker, column.aliases.join(", "));
        }
    }

    Ok(())
}
