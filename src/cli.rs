use std::path::{Path, PathBuf};

use crate::config::{parse_count, Settings};
use crate::error::LookupError;
use crate::lookup::{DetailTable, Session};
use crate::server;
use crate::sheet::export::{export_file_name, write_csv, write_xlsx};
use crate::sheet::{Sheet, SheetRole, WorkbookCache};

const USAGE: &str = "usage: wall_details <sheets|provinces|cities|details|dump|serve> [args] \
[--source PATH] [--json] [--province-sheet NAME] [--city-sheet NAME] [--detail-sheet NAME]";
const DEFAULT_DUMP_ROWS: usize = 20;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NO_PROVINCES: i32 = 3;
pub const EXIT_NO_CITIES: i32 = 4;
pub const EXIT_NO_DETAILS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Sheets,
    Provinces,
    Cities,
    Details,
    Dump,
    Serve,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("sheets") => Some(Command::Sheets),
        Some("provinces") => Some(Command::Provinces),
        Some("cities") => Some(Command::Cities),
        Some("details") => Some(Command::Details),
        Some("dump") => Some(Command::Dump),
        Some("serve") => Some(Command::Serve),
        _ => None,
    }
}

/// Flags shared by every command, split from the positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub positional: Vec<String>,
    pub json: bool,
    pub export: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

/// Split `args[2..]` into positionals and flags, applying setting flags on
/// top of `settings`.
pub fn parse_flags(args: &[String], settings: &mut Settings) -> Result<Invocation, String> {
    let mut invocation = Invocation::default();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match arg.as_str() {
            "--json" => invocation.json = true,
            "--source" => settings.source = PathBuf::from(value("--source")?),
            "--bind" => settings.bind_addr = value("--bind")?,
            "--province-sheet" => settings.sheets.province = Some(value("--province-sheet")?),
            "--city-sheet" => settings.sheets.city = Some(value("--city-sheet")?),
            "--detail-sheet" => settings.sheets.detail = Some(value("--detail-sheet")?),
            "--export" => invocation.export = Some(PathBuf::from(value("--export")?)),
            "--csv" => invocation.csv = Some(PathBuf::from(value("--csv")?)),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ => invocation.positional.push(arg.clone()),
        }
    }
    Ok(invocation)
}

pub fn exit_code(err: &LookupError) -> i32 {
    match err {
        LookupError::SourceMissing { .. }
        | LookupError::SourceUnreadable { .. }
        | LookupError::Export(_) => EXIT_FATAL,
        LookupError::NoProvincesDerived { .. } => EXIT_NO_PROVINCES,
        LookupError::NoCitiesDerived { .. } => EXIT_NO_CITIES,
        LookupError::NoDetailsFound { .. } => EXIT_NO_DETAILS,
        LookupError::UnknownSheet(_)
        | LookupError::UnknownProvince(_)
        | LookupError::UnknownCity(_)
        | LookupError::NoProvinceSelected
        | LookupError::NoCitySelected => EXIT_USAGE,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return EXIT_USAGE;
    };
    let mut settings = Settings::from_env();
    let invocation = match parse_flags(args, &mut settings) {
        Ok(invocation) => invocation,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            return EXIT_USAGE;
        }
    };

    if command == Command::Serve {
        return handle_serve(settings);
    }

    let mut cache = WorkbookCache::new();
    let result = cache
        .get_or_load(&settings.source)
        .and_then(|workbook| Session::open(workbook, &settings))
        .and_then(|mut session| match command {
            Command::Sheets => handle_sheets(&session, &invocation),
            Command::Provinces => handle_provinces(&session, &invocation),
            Command::Cities => handle_cities(&mut session, &invocation),
            Command::Details => handle_details(&mut session, &invocation),
            Command::Dump => handle_dump(&session, &invocation),
            Command::Serve => Ok(EXIT_OK),
        });

    match result {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            exit_code(&err)
        }
    }
}

fn report_error(err: &LookupError) {
    if err.is_fatal() {
        eprintln!("error: {err}");
    } else {
        eprintln!("warning: {err}");
    }
    match err {
        LookupError::NoCitiesDerived { .. } => {
            eprintln!("hint: inspect the raw city sheet with `wall_details dump city`");
        }
        LookupError::NoDetailsFound { .. } => {
            eprintln!("hint: check that the detail sheet has a column with the city code (e.g. C-01-01) or name");
            eprintln!("hint: matching ignores case but the text must otherwise be identical");
        }
        _ => {}
    }
}

fn handle_serve(settings: Settings) -> i32 {
    match server::run_server(settings) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            eprintln!("server error: {err}");
            EXIT_FATAL
        }
    }
}

fn handle_sheets(session: &Session, invocation: &Invocation) -> Result<i32, LookupError> {
    let roles = session.sheet_roles();
    let sheets = &session.workbook().sheets;
    if invocation.json {
        let listing: Vec<serde_json::Value> = sheets
            .iter()
            .enumerate()
            .map(|(i, sheet)| {
                serde_json::json!({
                    "name": sheet.name,
                    "rows": sheet.height(),
                    "columns": sheet.width(),
                    "roles": roles.roles_of(i),
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "sheets": listing,
            "city_columns": session.column_roles(),
        }));
    } else {
        println!("name\trows\tcolumns\troles");
        for (i, sheet) in sheets.iter().enumerate() {
            let role_names: Vec<&str> = roles.roles_of(i).into_iter().map(SheetRole::as_str).collect();
            println!(
                "{}\t{}\t{}\t{}",
                sheet.name,
                sheet.height(),
                sheet.width(),
                role_names.join(",")
            );
        }
    }
    Ok(EXIT_OK)
}

fn handle_provinces(session: &Session, invocation: &Invocation) -> Result<i32, LookupError> {
    let provinces = session.provinces()?;
    if invocation.json {
        print_json(&serde_json::json!({ "provinces": provinces }));
    } else {
        for province in provinces {
            println!("{}\t{}\t{}", province.code, province.name, province.label());
        }
    }
    Ok(EXIT_OK)
}

fn handle_cities(session: &mut Session, invocation: &Invocation) -> Result<i32, LookupError> {
    let Some(province) = invocation.positional.first() else {
        eprintln!("usage: wall_details cities <province-code|name>");
        return Ok(EXIT_USAGE);
    };
    let cities = session.select_province(province)?;
    if invocation.json {
        print_json(&serde_json::json!({ "province": province, "cities": cities }));
    } else {
        for city in cities {
            println!("{}\t{}", city.code, city.name);
        }
    }
    Ok(EXIT_OK)
}

fn handle_details(session: &mut Session, invocation: &Invocation) -> Result<i32, LookupError> {
    let (Some(province), Some(city)) = (invocation.positional.first(), invocation.positional.get(1))
    else {
        eprintln!("usage: wall_details details <province> <city> [--export PATH] [--csv PATH]");
        return Ok(EXIT_USAGE);
    };

    session.select_province(province)?;
    session.select_city(city)?;
    let city = session
        .state()
        .city()
        .map(str::to_string)
        .ok_or(LookupError::NoCitySelected)?;
    let table = session.request_details()?.clone();

    if let Some(target) = &invocation.export {
        let path = export_target(target, &city, "xlsx");
        write_xlsx(&table, &path)?;
        eprintln!("exported {} row(s) to {}", table.len(), path.display());
    }
    if let Some(target) = &invocation.csv {
        let path = export_target(target, &city, "csv");
        let file = std::fs::File::create(&path).map_err(|e| LookupError::Export(e.to_string()))?;
        write_csv(&table, file)?;
        eprintln!("exported {} row(s) to {}", table.len(), path.display());
    }

    if invocation.json {
        print_json(&serde_json::json!({
            "province": province,
            "city": city,
            "count": table.len(),
            "table": table,
        }));
    } else {
        print_table(&table);
    }
    Ok(EXIT_OK)
}

fn handle_dump(session: &Session, invocation: &Invocation) -> Result<i32, LookupError> {
    let Some(which) = invocation.positional.first() else {
        eprintln!("usage: wall_details dump <province|city|detail|SHEET_NAME> [rows]");
        return Ok(EXIT_USAGE);
    };
    let rows = parse_count(invocation.positional.get(1).cloned(), "rows", DEFAULT_DUMP_ROWS);
    let sheet = resolve_sheet(session, which)?;

    if invocation.json {
        print_json(&serde_json::json!({
            "sheet": sheet.name,
            "rows": sheet.height(),
            "columns": sheet.width(),
            "preview": sheet.preview(rows),
        }));
    } else {
        println!("{}: {} rows x {} cols", sheet.name, sheet.height(), sheet.width());
        for (i, row) in sheet.rows().take(rows).enumerate() {
            println!("  {}: {}", i, row.join(" | "));
        }
    }
    Ok(EXIT_OK)
}

/// A role name (`province`, `city`, `detail`) or an exact sheet name.
pub fn resolve_sheet<'a>(session: &'a Session, which: &str) -> Result<&'a Sheet, LookupError> {
    if let Some(role) = SheetRole::parse(which) {
        return Ok(session.sheet(role));
    }
    session
        .workbook()
        .sheet_by_name(which)
        .ok_or_else(|| LookupError::UnknownSheet(which.to_string()))
}

/// A directory target (existing, or written with a trailing separator) gets
/// the default file name for `city`.
fn export_target(target: &Path, city: &str, extension: &str) -> PathBuf {
    let raw = target.to_string_lossy();
    if target.is_dir() || raw.ends_with('/') || raw.ends_with('\\') {
        target.join(export_file_name(city, extension))
    } else {
        target.to_path_buf()
    }
}

fn print_table(table: &DetailTable) {
    println!("row\t{}", table.columns.join("\t"));
    for row in &table.rows {
        println!("{}\t{}", row.source_row + 1, row.cells.join("\t"));
    }
    println!("{} row(s)", table.len());
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => println!("{payload}"),
        Err(err) => eprintln!("failed to serialize output: {err}"),
    }
}
