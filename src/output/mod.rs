//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use nessop::Result;

pub mod formatters;
pub mod json;
pub mod table;

/// Print rows as a table or the raw data as JSON
pub fn print_list<T, R>(data: &[T], format: OutputFormat) -> Result<()>
where
    T: Serialize + Clone + Into<R>,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().cloned().map(Into::into).collect();
            println!("{}", table::format_table(&rows));
        }
        OutputFormat::Json => println!("{}", json::format_json(data)?),
    }
    Ok(())
}
