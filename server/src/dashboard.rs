//! Interactive dashboard: one roster, one command per line.

use std::{io::Write as _, path::PathBuf};

use anyhow::Result;
use chrono::Local;
use entity::{Gender, RecordId, State};
use products_hr::{EmployeeDraft, HrResult, ImageInput, Roster, StatusFilter, form::load_image};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{console::Console, render};

const HELP: &str = "\
Commands:
  search [text]                 filter by name (no text clears)
  gender <male|female|all>      filter by gender
  status <active|inactive|all>  filter by status
  page <n> | next | prev        move between pages
  show <id>                     employee details
  add <field>...                add an employee
  edit <id> <field>...          change only the given fields
  toggle <id>                   flip active/inactive
  delete <id>                   delete after confirmation
  print                         printable list of every matching employee
  stats                         active/inactive breakdown
  refresh                       reload from the record store
  help | quit

Fields: name=\"Full Name\" gender=<male|female> dob=YYYY-MM-DD
        state=\"Tamil Nadu\" active | inactive image=<file> | remove-image";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Gender(Option<Gender>),
    Status(Option<StatusFilter>),
    Page(usize),
    Next,
    Prev,
    Show(RecordId),
    Add(Form),
    Edit(RecordId, Form),
    Toggle(RecordId),
    Delete(RecordId),
    Print,
    Stats,
    Refresh,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "search" => Command::Search(rest.to_string()),
        "gender" => Command::Gender(optional(rest, "gender")?),
        "status" => Command::Status(optional(rest, "status")?),
        "page" => Command::Page(
            rest.parse()
                .map_err(|_| format!("page needs a number, got {rest:?}"))?,
        ),
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "show" => Command::Show(id(rest, "show")?),
        "add" => Command::Add(Form::parse(rest)?),
        "edit" => {
            let (raw, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Command::Edit(id(raw, "edit")?, Form::parse(fields)?)
        }
        "toggle" => Command::Toggle(id(rest, "toggle")?),
        "delete" => Command::Delete(id(rest, "delete")?),
        "print" => Command::Print,
        "stats" => Command::Stats,
        "refresh" => Command::Refresh,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command {other:?}; type help")),
    };
    Ok(Some(command))
}

/// "all" (or nothing) clears the filter.
fn optional<T>(raw: &str, what: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr<Err = String>,
{
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|err| format!("{what}: {err}"))
}

fn id(raw: &str, command: &str) -> Result<RecordId, String> {
    if raw.is_empty() {
        return Err(format!("{command} needs an employee id"));
    }
    let Ok(id) = raw.parse::<RecordId>();
    Ok(id)
}

/// Field assignments typed after `add` or `edit`. The picture is only read
/// from disk when the command runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Form {
    draft: EmployeeDraft,
    image: Option<PathBuf>,
}

impl Form {
    fn parse(text: &str) -> Result<Self, String> {
        let mut form = Form::default();
        for token in tokens(text)? {
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key.to_ascii_lowercase(), Some(value)),
                None => (token.to_ascii_lowercase(), None),
            };
            let draft = &mut form.draft;
            match (key.as_str(), value) {
                ("name", Some(value)) => draft.full_name = Some(value.to_string()),
                ("gender", Some(value)) => {
                    let gender = value.parse::<Gender>().map_err(|err| format!("gender: {err}"))?;
                    draft.gender = Some(gender);
                }
                ("dob", Some(value)) => draft.dob = Some(value.to_string()),
                ("state", Some(value)) => {
                    let state = value.parse::<State>().map_err(|err| format!("state: {err}"))?;
                    draft.state = Some(state);
                }
                ("active", None) => draft.active = Some(true),
                ("inactive", None) => draft.active = Some(false),
                ("image", Some(value)) if !value.is_empty() => {
                    form.image = Some(PathBuf::from(value));
                    draft.image = ImageInput::Unchanged;
                }
                ("remove-image", None) => {
                    form.image = None;
                    draft.image = ImageInput::Remove;
                }
                _ => return Err(format!("unknown field {token:?}; type help")),
            }
        }
        Ok(form)
    }

    fn into_draft(self) -> HrResult<EmployeeDraft> {
        let mut draft = self.draft;
        if let Some(path) = self.image {
            draft.image = ImageInput::Replace(load_image(&path)?);
        }
        Ok(draft)
    }
}

/// Splits on whitespace; double quotes keep a value with spaces in one token.
fn tokens(text: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut quoted = false;
    for ch in text.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            ch => {
                current.push(ch);
                started = true;
            }
        }
    }
    if quoted {
        return Err(String::from("unterminated quote"));
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

pub(crate) fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn prompt(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

fn show_page(roster: &Roster) {
    let view = roster.view();
    println!("Filter: {}", render::describe_filter(roster.filter()));
    print!("{}", render::employee_table(&view.rows));
    println!("{}", render::page_footer(&view.meta));
}

fn notify(result: Result<String>) {
    match result {
        Ok(message) => println!("{message}"),
        Err(err) => eprintln!("{err}"),
    }
}

pub async fn run(console: &Console) -> Result<()> {
    let mut roster = console.load_roster().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type help for commands.");
    show_page(&roster);

    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            Command::Search(text) => {
                roster.set_search(text);
                show_page(&roster);
            }
            Command::Gender(gender) => {
                roster.set_gender(gender);
                show_page(&roster);
            }
            Command::Status(status) => {
                roster.set_status(status);
                show_page(&roster);
            }
            Command::Page(page) => {
                roster.set_page(page);
                show_page(&roster);
            }
            Command::Next => {
                roster.next_page();
                show_page(&roster);
            }
            Command::Prev => {
                roster.previous_page();
                show_page(&roster);
            }
            Command::Show(id) => match roster.find(&id) {
                Some(employee) => print!("{}", render::employee_detail(employee)),
                None => eprintln!("employee {id} is not in the current list"),
            },
            Command::Add(form) => {
                let added = match form.into_draft() {
                    Ok(draft) => console.add(&mut roster, draft).await,
                    Err(err) => Err(err.into()),
                };
                notify(added.map(|employee| format!("Employee added (id {})", employee.id)));
                show_page(&roster);
            }
            Command::Edit(id, form) => {
                let updated = match form.into_draft() {
                    Ok(draft) => console.edit(&mut roster, &id, draft).await,
                    Err(err) => Err(err.into()),
                };
                notify(updated.map(|employee| format!("Employee updated (id {})", employee.id)));
                show_page(&roster);
            }
            Command::Toggle(id) => {
                notify(console.toggle(&mut roster, &id).await);
                show_page(&roster);
            }
            Command::Delete(id) => {
                prompt("Are you sure you want to delete this employee? [y/N] ")?;
                let answer = lines.next_line().await?.unwrap_or_default();
                if !confirmed(&answer) {
                    println!("Cancelled");
                    continue;
                }
                notify(console.delete(&mut roster, &id).await);
                show_page(&roster);
            }
            Command::Print => print!(
                "{}",
                render::print_view(&roster.filtered(), roster.filter(), Local::now())
            ),
            Command::Stats => print!("{}", render::summary(&roster.summary())),
            Command::Refresh => {
                notify(console.refresh(&mut roster).await);
                show_page(&roster);
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filters() {
        assert_eq!(
            parse("search  Anu Sharma ").unwrap(),
            Some(Command::Search("Anu Sharma".into()))
        );
        assert_eq!(parse("search").unwrap(), Some(Command::Search(String::new())));
        assert_eq!(
            parse("GENDER female").unwrap(),
            Some(Command::Gender(Some(Gender::Female)))
        );
        assert_eq!(parse("gender all").unwrap(), Some(Command::Gender(None)));
        assert_eq!(
            parse("status inactive").unwrap(),
            Some(Command::Status(Some(StatusFilter::Inactive)))
        );
        assert!(parse("status maybe").is_err());
    }

    #[test]
    fn parses_record_commands() {
        assert_eq!(
            parse("toggle 12").unwrap(),
            Some(Command::Toggle(RecordId::Number(12)))
        );
        assert_eq!(
            parse("delete a1b2").unwrap(),
            Some(Command::Delete(RecordId::Text("a1b2".into())))
        );
        assert!(parse("delete").is_err());
        assert_eq!(parse("page 3").unwrap(), Some(Command::Page(3)));
        assert!(parse("page three").is_err());
    }

    #[test]
    fn parses_add_fields() {
        let Some(Command::Add(form)) =
            parse(r#"add name="Dev Patel" GENDER=male dob=1988-11-02 state="tamil nadu" inactive"#)
                .unwrap()
        else {
            panic!("expected add");
        };
        assert_eq!(
            form.draft,
            EmployeeDraft {
                full_name: Some("Dev Patel".into()),
                gender: Some(Gender::Male),
                dob: Some("1988-11-02".into()),
                state: Some(State::TamilNadu),
                active: Some(false),
                image: ImageInput::Unchanged,
            }
        );
        assert_eq!(form.image, None);

        let Some(Command::Add(form)) = parse("add image=faces/dev.png").unwrap() else {
            panic!("expected add");
        };
        assert_eq!(form.image, Some(PathBuf::from("faces/dev.png")));

        assert!(parse("add gender=robot").unwrap_err().starts_with("gender:"));
        assert!(parse("add salary=10").unwrap_err().contains("salary"));
        assert_eq!(parse(r#"add name="Dev"#).unwrap_err(), "unterminated quote");
    }

    #[test]
    fn parses_edit_with_only_the_given_fields() {
        assert_eq!(
            parse("edit 4 remove-image active").unwrap(),
            Some(Command::Edit(
                RecordId::Number(4),
                Form {
                    draft: EmployeeDraft {
                        active: Some(true),
                        image: ImageInput::Remove,
                        ..EmployeeDraft::default()
                    },
                    image: None,
                },
            ))
        );
        assert_eq!(
            parse("edit e-9").unwrap(),
            Some(Command::Edit(RecordId::from("e-9"), Form::default()))
        );
        assert!(parse("edit").unwrap_err().contains("needs an employee id"));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("q").unwrap(), Some(Command::Quit));
        assert!(parse("launch").unwrap_err().contains("help"));
    }

    #[test]
    fn only_yes_confirms() {
        assert!(confirmed("y"));
        assert!(confirmed(" YES\n"));
        assert!(!confirmed(""));
        assert!(!confirmed("no"));
    }
}
