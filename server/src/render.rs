//! Plain-text rendering of the employee list.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use entity::Employee;
use products_hr::{FilterState, PageMeta, Summary};

const HEADERS: [&str; 7] = [
    "ID",
    "Profile",
    "Full Name",
    "Gender",
    "Date of Birth",
    "State",
    "Status",
];

fn status_label(active: bool) -> &'static str {
    if active { "Active" } else { "Inactive" }
}

fn cells(employee: &Employee) -> [String; 7] {
    let profile = &employee.profile;
    [
        employee.id.to_string(),
        if profile.image.is_some() { "photo" } else { "-" }.to_string(),
        profile.full_name.clone(),
        profile.gender.to_string(),
        profile.dob.format("%Y-%m-%d").to_string(),
        profile.state.to_string(),
        status_label(profile.active).to_string(),
    ]
}

pub fn employee_table(rows: &[&Employee]) -> String {
    let body: Vec<[String; 7]> = rows.iter().map(|employee| cells(employee)).collect();
    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    if body.is_empty() {
        out.push_str("No employees found\n");
    }
    for row in &body {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, row: &[String; 7], widths: &[usize; 7]) {
    let padded: Vec<String> = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

/// "Showing 6 to 10 of 12" plus page buttons; single pages get no buttons.
pub fn page_footer(meta: &PageMeta) -> String {
    if meta.total_count == 0 {
        return String::from("Showing 0 of 0 employees");
    }
    let mut out = format!(
        "Showing {} to {} of {} employees",
        meta.window_start, meta.window_end, meta.total_count
    );
    if meta.total_pages > 1 {
        let pages: Vec<String> = (1..=meta.total_pages)
            .map(|page| {
                if page == meta.current_page {
                    format!("[{page}]")
                } else {
                    page.to_string()
                }
            })
            .collect();
        let _ = write!(
            out,
            "  {} {} {}",
            if meta.has_previous() { "<" } else { " " },
            pages.join(" "),
            if meta.has_next() { ">" } else { " " },
        );
    }
    out.trim_end().to_string()
}

pub fn describe_filter(filter: &FilterState) -> String {
    if filter.is_empty() {
        return String::from("all employees");
    }
    let mut parts = Vec::new();
    if !filter.search.is_empty() {
        parts.push(format!("name contains \"{}\"", filter.search));
    }
    if let Some(gender) = filter.gender {
        parts.push(format!("gender {gender}"));
    }
    if let Some(status) = filter.status {
        parts.push(format!("status {status}"));
    }
    parts.join(", ")
}

pub fn summary(summary: &Summary) -> String {
    format!(
        "Active    {:>4}  ({:.1}%)\nInactive  {:>4}  ({:.1}%)\nTotal     {:>4}\n",
        summary.active,
        summary.active_percent(),
        summary.inactive,
        summary.inactive_percent(),
        summary.total,
    )
}

pub fn employee_detail(employee: &Employee) -> String {
    let profile = &employee.profile;
    let picture = match &profile.image {
        Some(uri) => format!("{} bytes", uri.len()),
        None => String::from("none"),
    };
    format!(
        "ID:            {}\nFull name:     {}\nGender:        {}\nDate of birth: {}\nState:         {}\nStatus:        {}\nPicture:       {}\n",
        employee.id,
        profile.full_name,
        profile.gender,
        profile.dob.format("%Y-%m-%d"),
        profile.state,
        status_label(profile.active),
        picture,
    )
}

/// Printable report: no paging controls, every matching row.
pub fn print_view(rows: &[&Employee], filter: &FilterState, printed_at: DateTime<Local>) -> String {
    let mut out = String::from("Employee Management\n");
    let _ = writeln!(out, "Employee list: {}", describe_filter(filter));
    let _ = writeln!(out, "Printed {}", printed_at.format("%Y-%m-%d %H:%M"));
    out.push('\n');
    out.push_str(&employee_table(rows));
    let _ = writeln!(out, "\n{} employee(s)", rows.len());
    out
}
