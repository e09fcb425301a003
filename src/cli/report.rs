use std::path::PathBuf;

use ansi_term::Style;
use anyhow::Result;
use clap::Parser;

use crate::{
    analysis::{list_users, mean_by_weekday, start_end_by_weekday, total_by_weekday},
    error::AnalyzerError,
    storage::{
        entities::{PresenceData, UserId},
        presence_source::{CsvPresenceSource, PresenceSource},
    },
    utils::time::{format_duration, format_time_of_day},
};

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(long, help = "CSV file with presence data. Rows are user_id,date,start,end")]
    data: PathBuf,
    #[arg(short, long, help = "Id of the user to report on")]
    user: UserId,
}

const REPORT_HEADER: [&str; 5] = ["Weekday", "Mean", "Total", "Start", "End"];

/// Rows of a weekday report, one per weekday, tab separated.
fn report_rows(data: &PresenceData, user_id: UserId) -> Result<Vec<String>, AnalyzerError> {
    let means = mean_by_weekday(data, user_id)?;
    let totals = total_by_weekday(data, user_id)?;
    let start_end = start_end_by_weekday(data, user_id)?;

    Ok(means
        .into_iter()
        .zip(totals)
        .zip(start_end)
        .map(|(((label, mean), (_, total)), (_, start, end))| {
            format!(
                "{label}\t{}\t{}\t{}\t{}",
                format_duration(mean as i64),
                format_duration(total),
                format_time_of_day(start),
                format_time_of_day(end),
            )
        })
        .collect())
}

pub async fn process_report_command(ReportCommand { data, user }: ReportCommand) -> Result<()> {
    let data = CsvPresenceSource::new(data).load().await?;
    let rows = report_rows(&data, user)?;

    println!("{}", Style::new().bold().paint(REPORT_HEADER.join("\t")));
    for row in rows {
        println!("{row}");
    }
    Ok(())
}

pub async fn process_users_command(data: PathBuf) -> Result<()> {
    let data = CsvPresenceSource::new(data).load().await?;
    for user in list_users(&data) {
        println!("{}\t{}", user.user_id, user.name);
    }
    Ok(())
}
