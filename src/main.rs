pub mod config;
pub mod data;
pub mod geometry;
pub mod notify;
pub mod persist;
pub mod pricing;
pub mod render;
pub mod server;
pub mod session;
pub mod types;

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Parser, Subcommand};
use geo::Coord;
use std::fs;
use std::path::PathBuf;

use crate::pricing::format_usd;
use crate::render::{DocumentVariant, EstimateView};
use crate::session::{MeasurementSession, Mode};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a job file and render the PDF estimate
    Estimate {
        /// Estimate job file (customer, services, traced boundary)
        #[arg(short, long, value_name = "FILE")]
        job: PathBuf,
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Directory the rendered PDFs land in
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Also write the customer copy (rate details and subtotal omitted)
        #[arg(long)]
        customer_copy: bool,
        /// Store the finalized estimate in the remote table
        #[arg(long)]
        save: bool,
        /// Email the customer copy to the customer
        #[arg(long)]
        email: bool,
    },
    /// Trace polygons interactively and watch the running total area
    Measure,
    /// Serve the estimate email endpoint
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Estimate {
            job,
            config,
            out_dir,
            customer_copy,
            save,
            email,
        } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            run_estimate(app_config, job, out_dir, *customer_copy, *save, *email).await?;
        }
        Commands::Measure => {
            run_measure()?;
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            server::start_server(app_config).await?;
        }
    }

    Ok(())
}

async fn run_estimate(
    config: config::AppConfig,
    job_path: &PathBuf,
    out_dir: &PathBuf,
    customer_copy: bool,
    save: bool,
    email: bool,
) -> Result<()> {
    let job = data::load_job(job_path)?;

    // 1. Measure
    let rings = data::job_rings(&job, job_path)?;
    let session = data::session_from_rings(rings)?;
    let area = session.total_area_sq_ft();
    println!(
        "Measured {} polygon(s) totalling {} sq ft",
        session.finished_polygons().len(),
        area
    );

    // 2. Price
    let rate = job
        .pricing
        .rate_per_sq_ft
        .unwrap_or(config.pricing.default_rate_per_sq_ft);
    let flat_fees = job.services.flat_fees();
    let quote = pricing::price_quote(
        area,
        rate,
        job.services.mowing,
        &flat_fees,
        config.pricing.minimum_charge,
    );
    if quote.minimum_applied {
        println!(
            "Minimum charge applied: area cost {} billed as {}",
            format_usd(quote.raw_area_cost),
            format_usd(quote.billed_area_cost)
        );
    }
    println!("Quoted total: {}", format_usd(quote.total));

    // 3. Render
    let view = EstimateView {
        company: &config.company,
        customer: &job.customer,
        mowing: job.services.mowing,
        flat_fees: &flat_fees,
        quote: &quote,
    };
    let internal_pdf = render::render_estimate_pdf(&view, DocumentVariant::Internal)?;
    let customer_pdf = render::render_estimate_pdf(&view, DocumentVariant::Customer)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;
    let internal_path =
        out_dir.join(render::estimate_file_name(&job.customer.name, DocumentVariant::Internal));
    fs::write(&internal_path, &internal_pdf)
        .with_context(|| format!("Failed to write {:?}", internal_path))?;
    println!("Wrote {:?}", internal_path);

    if customer_copy {
        let customer_path =
            out_dir.join(render::estimate_file_name(&job.customer.name, DocumentVariant::Customer));
        fs::write(&customer_path, &customer_pdf)
            .with_context(|| format!("Failed to write {:?}", customer_path))?;
        println!("Wrote {:?}", customer_path);
    }

    // 4. Store
    if save {
        if job.services.mowing && area == 0 {
            bail!("Please measure an area first.");
        }
        let record = types::EstimateRecord::new(&job.customer, &job.services, area, rate, &quote);
        persist::EstimateStore::new(&config.store)
            .insert(&record)
            .await?;
        println!("Success! Estimate stored.");
    }

    // 5. Notify
    if email {
        if job.customer.email.is_empty() {
            bail!("The job has no customer email address to send to.");
        }
        let message = notify::EstimateEmail {
            to: &job.customer.email,
            customer_name: &job.customer.name,
            address: &job.customer.address,
            pdf_base64: &BASE64.encode(&customer_pdf),
        };
        notify::Mailer::new(&config.email)
            .send_estimate(&message)
            .await?;
        println!("Estimate emailed to {}", job.customer.email);
    }

    Ok(())
}

/// Stdin-driven measuring session: the command-line stand-in for clicking
/// the map. Polygons and vertices are numbered from 1.
fn run_measure() -> Result<()> {
    use std::io::{BufRead, Write};

    let mut session = MeasurementSession::new();
    println!("Interactive measuring session. Commands:");
    println!("  draw | edit | view                     switch mode");
    println!("  point <lat> <lng>                      place a vertex (draw mode)");
    println!("  finish                                 commit the traced polygon");
    println!("  move <polygon> <vertex> <lat> <lng>    drag a vertex (edit mode)");
    println!("  clear | status | done");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let outcome = match tokens.as_slice() {
            [] => continue,
            ["done"] => break,
            ["draw"] => {
                session.set_mode(Mode::Draw);
                Ok(())
            }
            ["edit"] => {
                session.set_mode(Mode::Edit);
                Ok(())
            }
            ["view"] => {
                session.set_mode(Mode::View);
                Ok(())
            }
            ["point", lat, lng] => parse_coord(lat, lng)
                .and_then(|point| session.append_point(point).map_err(Into::into)),
            ["finish"] => session.finish_polygon().map_err(Into::into),
            ["move", polygon, vertex, lat, lng] => {
                parse_index(polygon, "polygon").and_then(|p| {
                    parse_index(vertex, "vertex").and_then(|v| {
                        parse_coord(lat, lng)
                            .and_then(|to| session.move_vertex(p, v, to).map_err(Into::into))
                    })
                })
            }
            ["clear"] => {
                session.clear();
                Ok(())
            }
            ["status"] => {
                println!(
                    "Mode: {:?}; {} finished polygon(s); {} point(s) in the active trace",
                    session.mode(),
                    session.finished_polygons().len(),
                    session.active_polygon().len()
                );
                Ok(())
            }
            _ => Err(anyhow!("Unrecognized command: {}", line.trim())),
        };

        match outcome {
            Ok(()) => println!("Total area: {} sq ft", session.total_area_sq_ft()),
            Err(err) => println!("{}", err),
        }
    }

    println!(
        "Session finished: {} polygon(s), {} sq ft total",
        session.finished_polygons().len(),
        session.total_area_sq_ft()
    );
    Ok(())
}

fn parse_coord(lat: &str, lng: &str) -> Result<Coord<f64>> {
    let lat: f64 = lat
        .parse()
        .map_err(|_| anyhow!("Latitude must be a number, got {:?}", lat))?;
    let lng: f64 = lng
        .parse()
        .map_err(|_| anyhow!("Longitude must be a number, got {:?}", lng))?;
    Ok(Coord { x: lng, y: lat })
}

fn parse_index(token: &str, what: &str) -> Result<usize> {
    let number: usize = token
        .parse()
        .map_err(|_| anyhow!("{} must be a number, got {:?}", what, token))?;
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Polygons and vertices are numbered from 1"))
}
