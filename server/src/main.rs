mod config;
mod console;
mod dashboard;
mod render;

use std::{
    io::{BufRead as _, Write as _},
    path::PathBuf,
};

use anyhow::{Result, anyhow};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use entity::{Gender, RecordId, State};
use platform_authn::{Credentials, Guard};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use products_hr::{
    EmployeeDraft, FilterState, HrResult, ImageInput, Roster, StatusFilter, form::load_image,
};
use tracing::debug;

use crate::{config::ConsoleConfig, console::Console};

#[derive(Parser, Debug)]
#[command(name = "staff-console", version, about = "Employee management console")]
struct Cli {
    /// Base URL of the record store.
    #[arg(long, env = "RECORD_STORE_URL", global = true)]
    store_url: Option<String>,
    /// File holding the session token.
    #[arg(long, value_name = "FILE", env = "CONSOLE_STORAGE_PATH", global = true)]
    storage: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account.
    Register(CredentialArgs),
    /// Sign in and keep the session token.
    Login(CredentialArgs),
    /// Forget the session token.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Manage employees.
    #[command(subcommand)]
    Employees(EmployeeCommand),
    /// Interactive employee dashboard.
    Dashboard,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, env = "CONSOLE_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,
}

impl From<CredentialArgs> for Credentials {
    fn from(value: CredentialArgs) -> Self {
        Credentials::new(value.email, value.password)
    }
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    /// One page of the employee list.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Details of one employee.
    Show { id: RecordId },
    /// Add an employee.
    Add(FormArgs),
    /// Edit an employee; omitted fields keep their current value.
    Edit {
        id: RecordId,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Flip an employee between active and inactive.
    Toggle { id: RecordId },
    /// Delete an employee.
    Delete {
        id: RecordId,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Printable list of every matching employee.
    Print {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Active/inactive breakdown.
    Stats,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long)]
    gender: Option<Gender>,
    #[arg(long)]
    status: Option<StatusFilter>,
}

impl From<FilterArgs> for FilterState {
    fn from(value: FilterArgs) -> Self {
        FilterState {
            search: value.search,
            gender: value.gender,
            status: value.status,
        }
    }
}

#[derive(Args, Debug, Default)]
struct FormArgs {
    #[arg(long = "name", value_name = "FULL_NAME")]
    full_name: Option<String>,
    #[arg(long)]
    gender: Option<Gender>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    dob: Option<String>,
    #[arg(long)]
    state: Option<State>,
    #[arg(long, conflicts_with = "inactive")]
    active: bool,
    #[arg(long)]
    inactive: bool,
    #[arg(long, value_name = "FILE", help = "PNG, JPEG or WEBP picture")]
    image: Option<PathBuf>,
    #[arg(long, conflicts_with = "image")]
    remove_image: bool,
}

impl FormArgs {
    fn into_draft(self) -> HrResult<EmployeeDraft> {
        let image = match (self.image, self.remove_image) {
            (Some(path), _) => ImageInput::Replace(load_image(&path)?),
            (None, true) => ImageInput::Remove,
            (None, false) => ImageInput::Unchanged,
        };
        let active = match (self.active, self.inactive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Ok(EmployeeDraft {
            full_name: self.full_name,
            gender: self.gender,
            dob: self.dob,
            state: self.state,
            active,
            image,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let config = ConsoleConfig::load(cli.store_url, cli.storage)?;
    debug!(store = %config.store.base_url, storage = %config.storage_path.display(), "console configured");
    let result = run(cli.command, &config).await;
    shutdown_tracing();
    result
}

async fn run(command: Command, config: &ConsoleConfig) -> Result<()> {
    let console = Console::connect(config)?;
    match command {
        Command::Register(args) => println!("{}", console.register(&args.into()).await?),
        Command::Login(args) => println!("{}", console.login(&args.into()).await?),
        Command::Logout => println!("{}", console.logout()?),
        Command::Whoami => {
            let identity = console.whoami()?;
            println!("{} (user {})", identity.email, identity.user_id);
            if let Some(issued_at) = identity.issued_at() {
                println!("signed in {}", issued_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
            }
        }
        Command::Employees(command) => {
            console.require(Guard::Protected)?;
            run_employees(&console, command).await?;
        }
        Command::Dashboard => {
            console.require(Guard::Protected)?;
            dashboard::run(&console).await?;
        }
    }
    Ok(())
}

async fn run_employees(console: &Console, command: EmployeeCommand) -> Result<()> {
    match command {
        EmployeeCommand::List { filter, page } => {
            let mut roster = console.load_roster().await?;
            roster.set_filter(filter.into());
            roster.set_page(page);
            let view = roster.view();
            print!("{}", render::employee_table(&view.rows));
            println!("{}", render::page_footer(&view.meta));
        }
        EmployeeCommand::Show { id } => {
            print!("{}", render::employee_detail(&console.show(&id).await?));
        }
        EmployeeCommand::Add(form) => {
            let created = console.add(&mut Roster::default(), form.into_draft()?).await?;
            println!("Employee added (id {})", created.id);
        }
        EmployeeCommand::Edit { id, form } => {
            let draft = form.into_draft()?;
            let mut roster = console.roster_for(&id).await?;
            let updated = console.edit(&mut roster, &id, draft).await?;
            println!("Employee updated (id {})", updated.id);
        }
        EmployeeCommand::Toggle { id } => {
            let mut roster = console.roster_for(&id).await?;
            println!("{}", console.toggle(&mut roster, &id).await?);
        }
        EmployeeCommand::Delete { id, yes } => {
            if !yes && !confirm_delete()? {
                println!("Cancelled");
                return Ok(());
            }
            println!("{}", console.delete(&mut Roster::default(), &id).await?);
        }
        EmployeeCommand::Print { filter } => {
            let mut roster = console.load_roster().await?;
            roster.set_filter(filter.into());
            print!(
                "{}",
                render::print_view(&roster.filtered(), roster.filter(), Local::now())
            );
        }
        EmployeeCommand::Stats => {
            let roster = console.load_roster().await?;
            print!("{}", render::summary(&roster.summary()));
        }
    }
    Ok(())
}

fn confirm_delete() -> Result<bool> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Are you sure you want to delete this employee? [y/N] ")?;
    stdout.flush()?;
    let mut answer = String::new();
    let read = std::io::stdin().lock().read_line(&mut answer)?;
    if read == 0 {
        return Err(anyhow!("no confirmation given; pass --yes to delete without a prompt"));
    }
    Ok(dashboard::confirmed(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_employee_filters() {
        let cli = Cli::try_parse_from([
            "staff-console",
            "employees",
            "list",
            "--search",
            "an",
            "--status",
            "active",
            "--page",
            "2",
        ])
        .unwrap();
        let Command::Employees(EmployeeCommand::List { filter, page }) = cli.command else {
            panic!("expected employees list");
        };
        assert_eq!(page, 2);
        let filter = FilterState::from(filter);
        assert_eq!(filter.search, "an");
        assert_eq!(filter.status, Some(StatusFilter::Active));
        assert_eq!(filter.gender, None);
    }

    #[test]
    fn form_flags_become_a_draft() {
        let cli = Cli::try_parse_from([
            "staff-console",
            "employees",
            "edit",
            "4",
            "--state",
            "tamil nadu",
            "--inactive",
            "--remove-image",
        ])
        .unwrap();
        let Command::Employees(EmployeeCommand::Edit { id, form }) = cli.command else {
            panic!("expected employees edit");
        };
        assert_eq!(id, RecordId::Number(4));
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.state, Some(State::TamilNadu));
        assert_eq!(draft.active, Some(false));
        assert_eq!(draft.image, ImageInput::Remove);
        assert_eq!(draft.full_name, None);
    }

    #[test]
    fn conflicting_flags_are_rejected() {
        assert!(
            Cli::try_parse_from(["staff-console", "employees", "add", "--active", "--inactive"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "staff-console",
                "employees",
                "edit",
                "1",
                "--image",
                "a.png",
                "--remove-image"
            ])
            .is_err()
        );
    }
}
