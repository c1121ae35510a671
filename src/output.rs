//! Plain text and CSV rendering for the command line.

use std::io::{self, Write};

use crate::scanner::{InactivityReport, MembershipListing};
use crate::types::Group;

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Writes the groups the caller can see, one `name: id` line each.
pub fn write_group_list<W: Write>(out: &mut W, groups: &[Group]) -> io::Result<()> {
    writeln!(out, "Groups you can see:")?;
    writeln!(out, "Group Name: Group ID")?;
    for group in groups {
        writeln!(out, "{}: {}", group.name, group.id)?;
    }
    Ok(())
}

pub fn write_membership<W: Write>(out: &mut W, listing: &MembershipListing) -> io::Result<()> {
    writeln!(out, "{},{}", quoted("GroupMe ID"), quoted("GroupMe Nickname"))?;
    for row in &listing.rows {
        writeln!(out, "{},{}", quoted(&row.member_id), quoted(&row.nickname))?;
    }
    Ok(())
}

pub fn write_inactivity_report<W: Write>(out: &mut W, report: &InactivityReport) -> io::Result<()> {
    writeln!(out, "Group: {}", report.group_name)?;
    writeln!(out, "NickName,Last Activity Days Ago")?;
    for row in &report.rows {
        writeln!(
            out,
            "{},{}",
            quoted(&row.nickname),
            quoted(&row.last_activity.to_string())
        )?;
    }
    Ok(())
}
