//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Render a list of items as a string
pub fn render_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Plain => items
            .iter()
            .map(|item| {
                T::headers()
                    .iter()
                    .zip(item.row())
                    .map(|(header, value)| format!("{}: {}", header, value))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n---\n"),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }
    println!("{}", render_list(items, format));
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        flag: &'static str,
        value: bool,
    }

    impl TableDisplay for Row {
        fn headers() -> Vec<&'static str> {
            vec!["Flag", "Value"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.flag.to_string(), self.value.to_string()]
        }
    }

    #[test]
    fn test_render_plain_and_json() {
        let rows = [
            Row { flag: "GECKO", value: true },
            Row { flag: "OSX", value: false },
        ];

        assert_eq!(
            render_list(&rows, OutputFormat::Plain),
            "Flag: GECKO\nValue: true\n---\nFlag: OSX\nValue: false"
        );
        let json: serde_json::Value =
            serde_json::from_str(&render_list(&rows, OutputFormat::Json)).unwrap();
        assert_eq!(json[0]["flag"], "GECKO");
    }

    #[test]
    fn test_render_table_has_headers() {
        let rows = [Row { flag: "MSIE", value: true }];
        let table = render_list(&rows, OutputFormat::Table);
        assert!(table.contains("Flag"));
        assert!(table.contains("MSIE"));
    }
}
