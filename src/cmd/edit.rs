//! Edit command - line-oriented editor session over the invoice's line items
//!
//! Every ledger change is followed by display reconciliation and a full
//! re-render of the editor rows and totals.

use crate::cmd::preview::{totals_line, write_preview};
use crate::cmd::{load_invoice, TaxArgs};
use crate::invoice::{
    compute_totals, format_fixed, format_plain, parse_numeric_or_zero, Field, GstMode,
    InvoiceDocument, Ledger, LineItem,
};
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct EditCommand {
    /// JSON invoice file to start from; starts from the sample items when omitted
    #[arg(short, long)]
    invoice: Option<PathBuf>,

    #[command(flatten)]
    tax: TaxArgs,
}

impl EditCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        if self.invoice.as_ref().is_some_and(|p| p.as_os_str() == "-") {
            anyhow::bail!("stdin carries editor commands; pass the invoice as a file");
        }
        let (document, ledger) = load_invoice(self.invoice.as_deref(), &self.tax)?;
        let stdin = io::stdin();
        let stdout = io::stdout();
        Session::new(document, ledger).run(stdin.lock(), stdout.lock())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("invalid row number '{0}'")]
    InvalidRow(String),
    #[error("unknown field '{0}' (desc, gst, qty, rate, total)")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Add,
    Remove(usize),
    Clear,
    Set {
        index: usize,
        field: Field,
        value: String,
    },
    Mode(GstMode),
    Gst(String),
    Discount(String),
    Show,
    Preview,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  add                      append a new item
  rm N                     remove row N
  clear                    remove every item
  set N FIELD VALUE        set a field on row N (desc, gst, qty, rate, total)
  mode individual|global   choose per-item or global GST
  gst VALUE                set the global GST rate
  discount VALUE           set the flat discount
  show                     show the editor rows
  preview                  show the full invoice preview
  quit                     leave the editor";

/// Parse one input line. Blank lines parse to `None`.
fn parse_command(line: &str) -> Result<Option<SessionCommand>, CommandError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "" => return Ok(None),
        "add" => SessionCommand::Add,
        "rm" | "remove" => SessionCommand::Remove(parse_row(rest)?),
        "clear" => SessionCommand::Clear,
        "set" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let row = parts.next().filter(|s| !s.is_empty());
            let index = parse_row(row.ok_or(CommandError::MissingArgument("row number"))?)?;
            let field_name = parts
                .next()
                .filter(|s| !s.is_empty())
                .ok_or(CommandError::MissingArgument("field"))?;
            let field = Field::from_name(field_name)
                .ok_or_else(|| CommandError::UnknownField(field_name.to_string()))?;
            // A missing value is an empty form input
            let value = parts.next().unwrap_or("").trim_start().to_string();
            SessionCommand::Set { index, field, value }
        }
        "mode" if rest.is_empty() => return Err(CommandError::MissingArgument("mode")),
        "mode" => SessionCommand::Mode(GstMode::from_form_value(rest)),
        "gst" => SessionCommand::Gst(rest.to_string()),
        "discount" => SessionCommand::Discount(rest.to_string()),
        "show" => SessionCommand::Show,
        "preview" => SessionCommand::Preview,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Parse a 1-based row number into a ledger index
fn parse_row(s: &str) -> Result<usize, CommandError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CommandError::MissingArgument("row number"));
    }
    match s.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row - 1),
        _ => Err(CommandError::InvalidRow(s.to_string())),
    }
}

/// Row for the editor table output
#[derive(Debug, Clone, Tabled)]
struct EditorRow {
    #[tabled(rename = "#")]
    row_num: usize,

    #[tabled(rename = "Description")]
    description: String,

    #[tabled(rename = "GST %")]
    gst_rate: String,

    #[tabled(rename = "Qty")]
    quantity: String,

    #[tabled(rename = "Rate (excl)")]
    rate: String,

    #[tabled(rename = "Total (incl)")]
    total: String,
}

impl EditorRow {
    fn new(index: usize, item: &LineItem) -> Self {
        EditorRow {
            row_num: index + 1,
            description: item.description.clone(),
            gst_rate: format_plain(item.gst_rate),
            quantity: format_plain(item.quantity),
            rate: format_fixed(item.rate_excluding_tax),
            total: format_fixed(item.total_including_tax),
        }
    }
}

/// Editor state: the form plus the ledger it owns
pub struct Session {
    document: InvoiceDocument,
    ledger: Ledger,
}

impl Session {
    pub fn new(document: InvoiceDocument, ledger: Ledger) -> Self {
        Session { document, ledger }
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> anyhow::Result<()> {
        self.ledger.reconcile_for_display();
        self.render(&mut out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line?;

            match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(SessionCommand::Quit)) => break,
                Ok(Some(SessionCommand::Clear)) => {
                    write!(out, "Clear all items? [y/N] ")?;
                    out.flush()?;
                    let answer = lines.next().transpose()?.unwrap_or_default();
                    if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                        self.ledger.clear_all();
                        self.ledger.reconcile_for_display();
                        self.render(&mut out)?;
                    } else {
                        writeln!(out, "Cancelled")?;
                    }
                }
                Ok(Some(command)) => self.execute(command, &mut out)?,
                Err(e) => writeln!(out, "error: {}", e)?,
            }
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> anyhow::Result<()> {
        let result = match command {
            SessionCommand::Add => {
                self.ledger.add_item();
                Ok(())
            }
            SessionCommand::Remove(index) => self.ledger.remove_item(index).map(|_| ()),
            SessionCommand::Set { index, field, value } => {
                self.ledger.set_field(index, field, &value)
            }
            SessionCommand::Mode(mode) => {
                self.document.tax.mode = mode;
                return self.render_totals(out);
            }
            SessionCommand::Gst(value) => {
                self.document.tax.global_gst_rate = parse_numeric_or_zero(&value);
                return self.render_totals(out);
            }
            SessionCommand::Discount(value) => {
                self.document.tax.discount = parse_numeric_or_zero(&value);
                return self.render_totals(out);
            }
            SessionCommand::Show => return self.render(out),
            SessionCommand::Preview => {
                match compute_totals(self.ledger.items(), &self.document.tax) {
                    Ok(totals) => write_preview(out, &self.document, &totals)?,
                    Err(e) => writeln!(out, "error: {}", e)?,
                }
                return Ok(());
            }
            SessionCommand::Help => {
                writeln!(out, "{}", HELP)?;
                return Ok(());
            }
            SessionCommand::Clear | SessionCommand::Quit => return Ok(()),
        };

        match result {
            Ok(()) => {
                self.ledger.reconcile_for_display();
                self.render(out)
            }
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                Ok(())
            }
        }
    }

    /// Full re-render of the editor rows followed by the totals
    fn render<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        if self.ledger.is_empty() {
            writeln!(out, "No items")?;
        } else {
            let rows: Vec<EditorRow> = self
                .ledger
                .items()
                .iter()
                .enumerate()
                .map(|(i, item)| EditorRow::new(i, item))
                .collect();
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
                .to_string();
            writeln!(out, "{}", table)?;
        }
        self.render_totals(out)
    }

    fn render_totals<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        match compute_totals(self.ledger.items(), &self.document.tax) {
            Ok(totals) => writeln!(out, "{}", totals_line(&totals))?,
            Err(e) => writeln!(out, "error: {}", e)?,
        }
        Ok(())
    }
}
