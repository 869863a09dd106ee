use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use excursio_booking::{BookingDraft, BookingStore};
use excursio_client::{BookingApp, ClientConfig, Navigation, Route};
use excursio_core::{BookingId, ServiceId};
use excursio_invoicing::{AutoExportOutcome, InvoiceView};
use excursio_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "booking-client", about = "Book activities and export invoices")]
struct Cli {
    /// Log output: json or pretty.
    #[arg(
        long,
        env = "EXCURSIO_LOG_FORMAT",
        default_value = "json",
        value_parser = parse_log_format
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Book a service and export the invoice.
    Book {
        #[arg(long)]
        service: String,
        /// Activity date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Start time, HH:MM.
        #[arg(long)]
        time: String,
        #[arg(long, default_value_t = 1)]
        people: u32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        requests: Option<String>,
    },
    /// Export the invoice of a stored booking.
    Invoice { booking_id: String },
    /// Print the invoice of a stored booking as text.
    Show { booking_id: String },
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    LogFormat::parse(value).ok_or_else(|| format!("unknown log format '{value}'"))
}

fn parse_booking_id(value: &str) -> anyhow::Result<BookingId> {
    value
        .parse()
        .with_context(|| format!("'{value}' is not a booking id"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    excursio_observability::init(cli.log_format);

    let config = ClientConfig::from_env().context("loading configuration")?;
    let app = BookingApp::from_config(config)?;

    match cli.command {
        Command::Book {
            service,
            date,
            time,
            people,
            name,
            email,
            phone,
            requests,
        } => {
            let service_id: ServiceId = service.parse().context("service id")?;
            let mut wizard = match app.start_booking(&service_id).await? {
                Navigation::Render(wizard) => wizard,
                Navigation::Redirect(route) => {
                    bail!("service {service_id} not found; browse {route}")
                }
            };

            *wizard.draft_mut()? = BookingDraft {
                date,
                time,
                people_count: people,
                special_requests: requests,
                customer_name: name,
                customer_email: email,
                customer_phone: phone,
            };
            wizard.advance()?;
            println!(
                "{}: {} x {} = {}",
                wizard.service().title,
                people,
                wizard.service().unit_price,
                wizard.quote()?
            );

            let booking_id = match app.submit(&mut wizard)? {
                Route::Confirmation { booking_id } => booking_id,
                other => bail!("unexpected route after submission: {other}"),
            };
            println!("booking confirmed: {booking_id}");

            let mut page = match app.open_confirmation(booking_id)? {
                Navigation::Render(page) => page,
                Navigation::Redirect(route) => {
                    bail!("booking {booking_id} vanished; browse {route}")
                }
            };
            print!("{}", page.view().to_plain_text());
            match page.wait_for_auto_export().await {
                Some(AutoExportOutcome::Exported(exported)) => {
                    println!("{}", serde_json::to_string_pretty(&exported)?);
                }
                Some(AutoExportOutcome::Failed(err)) => {
                    return Err(err).context("exporting invoice");
                }
                Some(AutoExportOutcome::Cancelled) | None => bail!("invoice export was cancelled"),
            }
        }
        Command::Invoice { booking_id } => {
            let booking_id = parse_booking_id(&booking_id)?;
            let Some(record) = app.store().get(booking_id)? else {
                bail!("booking {booking_id} not found; browse {}", Route::Catalog);
            };
            let exported = app.exporter().export(&record).await?;
            println!("{}", serde_json::to_string_pretty(&exported)?);
        }
        Command::Show { booking_id } => {
            let booking_id = parse_booking_id(&booking_id)?;
            let Some(record) = app.store().get(booking_id)? else {
                bail!("booking {booking_id} not found; browse {}", Route::Catalog);
            };
            print!("{}", InvoiceView::from_record(&record).to_plain_text());
        }
    }
    Ok(())
}
