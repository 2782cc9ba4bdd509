//! CSV export for hourly results and the yearly financial projection.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::finance::projection::YearlyProjection;
use crate::sim::driver::HourlyResult;

/// Column header for the hourly dispatch CSV.
const HOURLY_HEADER: &str = "hour,load_kwh,solar_kwh,grid_import_kwh,grid_export_kwh,\
                             solar_used_kwh,battery_charge_kwh,battery_discharge_kwh,\
                             soc_kwh,net_load_kwh,unmet_kwh,curtailed_kwh";

/// Column header for the yearly projection CSV.
const PROJECTION_HEADER: &str = "year,panel_efficiency,battery_capacity_fraction,\
                                 generation_kwh,load_kwh,energy_income,demand_income,\
                                 om_cost,insurance_cost,replacement_cost,\
                                 net_cash_flow,cumulative_cash_flow,discounted_cash_flow";

/// Exports hourly dispatch results to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_hourly_csv(results: &[HourlyResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_hourly_csv(results, io::BufWriter::new(file))
}

/// Writes hourly dispatch results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_hourly_csv(results: &[HourlyResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HOURLY_HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            r.hour.to_string(),
            format!("{:.4}", r.load),
            format!("{:.4}", r.solar),
            format!("{:.4}", r.grid_import),
            format!("{:.4}", r.grid_export),
            format!("{:.4}", r.solar_used),
            format!("{:.4}", r.battery_charge),
            format!("{:.4}", r.battery_discharge),
            format!("{:.4}", r.soc_kwh),
            format!("{:.4}", r.net_load),
            format!("{:.4}", r.unmet_load),
            format!("{:.4}", r.curtailed_solar),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the yearly financial projection to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_projection_csv(projection: &[YearlyProjection], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_projection_csv(projection, io::BufWriter::new(file))
}

/// Writes the yearly financial projection as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_projection_csv(
    projection: &[YearlyProjection],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(PROJECTION_HEADER.split(',').map(str::trim))?;

    for y in projection {
        wtr.write_record(&[
            y.year.to_string(),
            format!("{:.4}", y.panel_efficiency),
            format!("{:.4}", y.battery_capacity_fraction),
            format!("{:.2}", y.generation_kwh),
            format!("{:.2}", y.load_kwh),
            format!("{:.2}", y.energy_income),
            format!("{:.2}", y.demand_income),
            format!("{:.2}", y.om_cost),
            format!("{:.2}", y.insurance_cost),
            format!("{:.2}", y.replacement_cost),
            format!("{:.2}", y.net_cash_flow),
            format!("{:.2}", y.cumulative_cash_flow),
            format!("{:.2}", y.discounted_cash_flow),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
