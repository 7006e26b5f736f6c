mod cmd;
mod invoice;

use clap::{Parser, Subcommand};
use cmd::{
    edit::EditCommand, html::HtmlCommand, preview::PreviewCommand, schema::SchemaCommand,
};

#[derive(Parser, Debug)]
#[command(
    name = "billmaker",
    version,
    about = "Build GST invoices with CGST/SGST breakdowns"
)]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the invoice preview: items, CGST/SGST split and totals
    Preview(PreviewCommand),
    /// Generate a printable HTML invoice
    Html(HtmlCommand),
    /// Edit line items interactively (commands on stdin)
    Edit(EditCommand),
    /// Print the expected invoice input format
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    log::debug!("{:?}", opts);

    match opts.command {
        Command::Preview(preview) => preview.exec(),
        Command::Html(html) => html.exec(),
        Command::Edit(edit) => edit.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
