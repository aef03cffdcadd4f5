//! `%`-token date formatting for date marker elements.
//!
//! The format language is the one template authors already use in their
//! markup, not chrono's: `%Y-%m-%d` style tokens with English month and
//! weekday names, `%D`/`%r` shorthands, and `%%` for a literal percent.
//! Unrecognized tokens pass through unchanged. `%y` keeps the inherited
//! years-since-1900 behavior (2024 yields `124`) and `%I` is unpadded.

use chrono::{Datelike, NaiveDateTime, Timelike};

const DAYS_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const DAYS_LONG: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Renders `fmt` against `timestamp` in a single left-to-right scan.
pub fn format_datetime(fmt: &str, timestamp: &NaiveDateTime) -> String {
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => out.push('%'),
            Some('Y') => out.push_str(&timestamp.year().to_string()),
            Some('y') => out.push_str(&(timestamp.year() - 1900).to_string()),
            Some('m') => out.push_str(&format!("{:02}", timestamp.month())),
            Some('d') => out.push_str(&format!("{:02}", timestamp.day())),
            Some('H') => out.push_str(&format!("{:02}", timestamp.hour())),
            Some('M') => out.push_str(&format!("{:02}", timestamp.minute())),
            Some('S') => out.push_str(&format!("{:02}", timestamp.second())),
            Some('I') => out.push_str(&((timestamp.hour() + 11) % 12 + 1).to_string()),
            Some('p') => out.push_str(if timestamp.hour() < 12 { "AM" } else { "PM" }),
            Some('B') => out.push_str(MONTHS_LONG[timestamp.month0() as usize]),
            Some('b') => out.push_str(MONTHS_SHORT[timestamp.month0() as usize]),
            Some('A') => {
                out.push_str(DAYS_LONG[timestamp.weekday().num_days_from_sunday() as usize])
            }
            Some('a') => {
                out.push_str(DAYS_SHORT[timestamp.weekday().num_days_from_sunday() as usize])
            }
            Some('D') => out.push_str(&format_datetime("%m/%d/%Y", timestamp)),
            Some('r') => out.push_str(&format_datetime("%I:%M:%S %p", timestamp)),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
        }
    }
    out
}
