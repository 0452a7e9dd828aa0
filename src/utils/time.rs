use chrono::{DateTime, Local, TimeZone};

const HUMAN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_human_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(HUMAN_FORMAT).to_string()
}

pub fn current_human_timestamp() -> String {
    format_human_timestamp(&Local::now())
}
