//! Schema command - print the expected invoice input format

use crate::invoice::{Field, InvoiceDocument};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the invoice document
    JsonSchema,
    /// Line item fields and their editor aliases
    Fields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::Fields => self.print_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(InvoiceDocument);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_fields(&self) -> anyhow::Result<()> {
        println!("Line Item Fields");
        println!("================");
        println!();
        for field in Field::ALL {
            let kind = if field.is_numeric() { "number" } else { "text" };
            println!(
                "{:20} {:6} ({:6})  {}",
                field.name(),
                field.alias(),
                kind,
                field_description(field)
            );
        }
        println!();
        println!("Numeric input that cannot be read counts as 0.");
        println!("Editing rate derives the total; editing total derives the rate.");
        Ok(())
    }
}

fn field_description(field: Field) -> &'static str {
    match field {
        Field::Description => "Item label shown on the invoice",
        Field::GstRate => "GST percentage (used in individual mode)",
        Field::Quantity => "Number of units",
        Field::RateExcludingTax => "Unit price before tax",
        Field::TotalIncludingTax => "Row total including tax",
    }
}
