//! `options` command: list the exports offered for a data type.

use coverage_client::{DataType, ExportFilters};
use coverage_export::export_options;

pub fn run(data_type: DataType, filters: &ExportFilters) {
    for option in export_options(data_type, filters) {
        println!("{}\t{}", option.id, option.filename);
        println!("    {}", option.description);
    }
}
