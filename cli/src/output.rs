//! Output formatting

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// A value that renders as one table row
pub trait Row {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl OutputFormat {
    pub fn print_list<T: Serialize + Row>(&self, items: &[T]) {
        match self {
            OutputFormat::Table => println!("{}", render_table(items)),
            _ => self.print(&items),
        }
    }

    pub fn print_one<T: Serialize + Row>(&self, item: &T) {
        match self {
            OutputFormat::Table => println!("{}", render_table(std::slice::from_ref(item))),
            _ => self.print(item),
        }
    }

    fn print<T: Serialize + ?Sized>(&self, data: &T) {
        match self {
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            _ => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
        }
    }
}

pub fn render_table<T: Row>(items: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::headers().into_iter().map(String::from));
    for item in items {
        builder.push_record(item.row());
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
