//! Status command - row counts per resource table

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let counts = ctx.meta_service.row_counts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    println!("{}", "Hain.co Database Status".bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Table", "Rows"]);
    for count in &counts {
        table.add_row(vec![count.table_name().to_string(), count.row_count().to_string()]);
    }
    println!("{}", table);

    if let Some(dir) = &ctx.data_dir {
        println!();
        println!(
            "Database: {}",
            dir.join(&ctx.config.database_file).display()
        );
    }

    Ok(())
}
