use crate::core_fs::{DirEntry, FileKind, FileStat};
use crate::core_perm::{Capability, Permissions};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt::Display;
use std::time::SystemTime;

/// Directory listing formats served over the data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// `ls -l` style lines (LIST, STAT <path>).
    Long,
    /// Bare names (NLST).
    Names,
    /// RFC 3659 machine-readable facts (MLSD).
    Machine,
}

/// Renders `entries` in `format`, each line terminated by CRLF.
pub fn render_listing<Tz>(
    format: ListFormat,
    entries: &[DirEntry],
    permissions: Permissions,
    now: &DateTime<Tz>,
) -> Vec<u8>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    for entry in entries {
        let line = match format {
            ListFormat::Long => format_long_line(entry, now),
            ListFormat::Names => entry.name.clone(),
            ListFormat::Machine => format_facts(&entry.name, &entry.stat, permissions),
        };
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out.into_bytes()
}

/// One `ls -l` line, without the line terminator.
///
/// Entries modified within the last six months show the time of day,
/// older ones the year, as `ls` does.
pub fn format_long_line<Tz>(entry: &DirEntry, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stat = &entry.stat;
    let modified = stat
        .modified
        .map(|t| DateTime::<Utc>::from(t).with_timezone(&now.timezone()))
        .unwrap_or_else(|| now.clone());

    let six_months = Duration::days(180);
    let date = if now.clone() - modified.clone() > six_months {
        modified.format("%b %d  %Y").to_string()
    } else {
        modified.format("%b %d %H:%M").to_string()
    };

    format!(
        "{}{} {:>3} {:<8} {:<8} {:>8} {} {}",
        type_char(stat.kind),
        mode_string(stat.mode),
        if stat.is_dir() { 2 } else { 1 },
        "ftp",
        "ftp",
        stat.size,
        date,
        entry.name
    )
}

/// MLSD/MLST fact line: `type=file;size=3;modify=...;perm=...; name`.
pub fn format_facts(name: &str, stat: &FileStat, permissions: Permissions) -> String {
    let kind = if stat.is_dir() { "dir" } else { "file" };
    let mut facts = format!("type={};size={};", kind, stat.size);
    if let Some(modified) = stat.modified {
        facts.push_str(&format!("modify={};", format_mdtm(modified)));
    }
    facts.push_str(&format!(
        "perm={};unix.mode=0{:o};",
        fact_permissions(stat, permissions),
        stat.mode
    ));
    format!("{} {}", facts, name)
}

/// Timestamp as used by MDTM and the `modify` fact: `YYYYMMDDHHMMSS`, UTC.
pub fn format_mdtm(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format("%Y%m%d%H%M%S").to_string()
}

fn fact_permissions(stat: &FileStat, permissions: Permissions) -> String {
    let letters: &[(Capability, char)] = if stat.is_dir() {
        &[
            (Capability::ChangeDir, 'e'),
            (Capability::List, 'l'),
            (Capability::Store, 'c'),
            (Capability::Delete, 'p'),
            (Capability::MakeDir, 'm'),
            (Capability::Rename, 'f'),
        ]
    } else {
        &[
            (Capability::Retrieve, 'r'),
            (Capability::Append, 'a'),
            (Capability::Store, 'w'),
            (Capability::Delete, 'd'),
            (Capability::Rename, 'f'),
        ]
    };
    letters
        .iter()
        .filter(|(cap, _)| permissions.contains(*cap))
        .map(|(_, letter)| *letter)
        .collect()
}

fn type_char(kind: FileKind) -> char {
    match kind {
        FileKind::Dir => 'd',
        FileKind::Symlink => 'l',
        FileKind::File => '-',
    }
}

fn mode_string(mode: u32) -> String {
    let mut out = String::with_capacity(9);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}
