//! CLI module for the studentdesk command-line interface.
//!
//! Every subcommand drives one page controller against the backend:
//! - `login` / `logout` / `whoami` - Session management
//! - `register` / `account` - Create an account or edit your own
//! - `students list|show|create|edit|delete` - Student records
//! - `photos show|upload` - Student profile photos

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::effects::EffectOutcome;
use crate::pages::{LoginPage, Outcome, PhotosPage, RegisterPage, StudentPage, StudentsPage};
use crate::store::{AuthAction, SessionPhase};
use crate::AppState;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "studentdesk")]
#[command(author, version, about = "Student management from the terminal", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "studentdesk.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API URL to connect to (overrides the config file)
    #[arg(long, env = "STUDENTDESK_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and keep the session for later commands
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (can also be set via STUDENTDESK_PASSWORD env var)
        #[arg(short, long, env = "STUDENTDESK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Location to continue to after logging in
        #[arg(long, default_value = "/")]
        return_path: String,
    },

    /// Forget the saved session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Create a new account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "STUDENTDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Update the logged-in account
    Account {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// New password (leave out to keep the current one)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Student management commands
    #[command(subcommand)]
    Students(StudentsCommands),

    /// Student photo commands
    #[command(subcommand)]
    Photos(PhotosCommands),
}

/// Students subcommands
#[derive(Subcommand, Debug)]
pub enum StudentsCommands {
    /// List all students
    List,
    /// Show details for a student
    Show { id: i64 },
    /// Create a student
    Create(StudentFields),
    /// Edit a student (only the given fields change)
    Edit {
        id: i64,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Delete a student
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Photos subcommands
#[derive(Subcommand, Debug)]
pub enum PhotosCommands {
    /// Show the current photo URL of a student
    Show { student_id: i64 },
    /// Upload a new photo for a student
    Upload { student_id: i64, file: PathBuf },
}

#[derive(Args, Debug, Default)]
pub struct StudentFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub surname: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub weight: Option<String>,
    #[arg(long)]
    pub height: Option<String>,
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, app: Arc<AppState>) -> Result<()> {
    match &cli.command {
        Commands::Login {
            email,
            password,
            return_path,
        } => cmd_login(app, email, password, return_path).await,
        Commands::Logout => cmd_logout(&app).await,
        Commands::Whoami => cmd_whoami(&app),
        Commands::Register {
            name,
            email,
            password,
        } => cmd_register(app, name, email, password).await,
        Commands::Account {
            name,
            email,
            password,
        } => cmd_account(app, name.as_deref(), email.as_deref(), password.as_deref()).await,
        Commands::Students(StudentsCommands::List) => cmd_students_list(app).await,
        Commands::Students(StudentsCommands::Show { id }) => cmd_students_show(app, *id).await,
        Commands::Students(StudentsCommands::Create(fields)) => {
            cmd_students_save(app, None, fields).await
        }
        Commands::Students(StudentsCommands::Edit { id, fields }) => {
            cmd_students_save(app, Some(*id), fields).await
        }
        Commands::Students(StudentsCommands::Delete { id, yes }) => {
            cmd_students_delete(app, *id, *yes).await
        }
        Commands::Photos(PhotosCommands::Show { student_id }) => {
            cmd_photos_show(app, *student_id).await
        }
        Commands::Photos(PhotosCommands::Upload { student_id, file }) => {
            cmd_photos_upload(app, *student_id, file).await
        }
    }
}

/// Map a page outcome to the process result. Details were already printed.
fn finish(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Done | Outcome::Skipped => Ok(()),
        Outcome::Invalid(errors) => anyhow::bail!("Invalid input ({} problem(s))", errors.len()),
        Outcome::Failed => anyhow::bail!("Request failed"),
        Outcome::Superseded => anyhow::bail!("Request was superseded"),
    }
}

fn require_login(app: &AppState) -> Result<()> {
    if !app.session.is_logged_in() {
        anyhow::bail!("Not logged in. Run 'studentdesk login' first.");
    }
    Ok(())
}

async fn cmd_login(app: Arc<AppState>, email: &str, password: &str, return_path: &str) -> Result<()> {
    let mut page = LoginPage::new(app.clone()).with_return_path(return_path);
    page.email = email.to_string();
    page.password = password.to_string();

    finish(page.submit().await)?;
    println!("Continue at: {}", app.navigator.current());
    Ok(())
}

async fn cmd_logout(app: &AppState) -> Result<()> {
    if app.dispatch(AuthAction::Logout).await == EffectOutcome::Skipped {
        println!("Not logged in.");
    }
    Ok(())
}

fn cmd_whoami(app: &AppState) -> Result<()> {
    let state = app.session.snapshot();
    match (state.phase(), state.user) {
        (SessionPhase::Authenticated, Some(user)) => {
            println!();
            println!("ID:     {}", user.id);
            println!("Name:   {}", user.name);
            println!("Email:  {}", user.email);
            println!("Server: {}", app.client().base_url());
            println!();
        }
        _ => println!("Not logged in."),
    }
    Ok(())
}

async fn cmd_register(app: Arc<AppState>, name: &str, email: &str, password: &str) -> Result<()> {
    let mut page = RegisterPage::new(app);
    if page.is_editing() {
        anyhow::bail!("Already logged in. Use 'studentdesk account' to edit your account.");
    }
    page.name = name.to_string();
    page.email = email.to_string();
    page.password = password.to_string();

    finish(page.submit().await)
}

async fn cmd_account(
    app: Arc<AppState>,
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    require_login(&app)?;

    let mut page = RegisterPage::new(app);
    if let Some(name) = name {
        page.name = name.to_string();
    }
    if let Some(email) = email {
        page.email = email.to_string();
    }
    if let Some(password) = password {
        page.password = password.to_string();
    }

    finish(page.submit().await)
}

async fn cmd_students_list(app: Arc<AppState>) -> Result<()> {
    let mut page = StudentsPage::new(app);
    finish(page.load().await)?;

    if page.students().is_empty() {
        println!("No students found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6}  {:<20}  {:<20}  {:<30}  {:<5}  {:<6}",
        "ID", "NAME", "SURNAME", "EMAIL", "AGE", "PHOTO"
    );
    println!("{}", "-".repeat(96));

    for student in page.students() {
        println!(
            "{:<6}  {:<20}  {:<20}  {:<30}  {:<5}  {:<6}",
            student.id,
            truncate(&student.name, 20),
            truncate(&student.surname, 20),
            truncate(&student.email, 30),
            student.age,
            if student.photo_url().is_some() { "yes" } else { "-" }
        );
    }

    println!();
    Ok(())
}

async fn cmd_students_show(app: Arc<AppState>, id: i64) -> Result<()> {
    let mut page = StudentPage::edit(app, id);
    finish(page.load().await)?;

    let form = &page.form;
    println!();
    println!("=== Student: {} {} ===", form.name, form.surname);
    println!();
    println!("ID:       {}", id);
    println!("Email:    {}", form.email);
    println!("Age:      {}", form.age);
    println!("Weight:   {}", form.weight);
    println!("Height:   {}", form.height);
    println!("Photo:    {}", page.photo().unwrap_or("-"));
    println!();
    Ok(())
}

async fn cmd_students_save(app: Arc<AppState>, id: Option<i64>, fields: &StudentFields) -> Result<()> {
    let mut page = match id {
        Some(id) => {
            let mut page = StudentPage::edit(app.clone(), id);
            finish(page.load().await)?;
            page
        }
        None => StudentPage::new(app.clone()),
    };

    let form = &mut page.form;
    let updates = [
        (&mut form.name, &fields.name),
        (&mut form.surname, &fields.surname),
        (&mut form.email, &fields.email),
        (&mut form.age, &fields.age),
        (&mut form.weight, &fields.weight),
        (&mut form.height, &fields.height),
    ];
    for (field, value) in updates {
        if let Some(value) = value {
            *field = value.clone();
        }
    }

    finish(page.submit().await)?;
    if let Some(id) = page.id() {
        println!("Student ID: {}", id);
    }
    Ok(())
}

async fn cmd_students_delete(app: Arc<AppState>, id: i64, yes: bool) -> Result<()> {
    let mut page = StudentsPage::new(app);
    finish(page.load().await)?;

    let index = page
        .students()
        .iter()
        .position(|s| s.id == id)
        .with_context(|| format!("Student {} not found", id))?;
    page.ask_delete(index);

    if !yes {
        let Some(student) = page.pending_delete() else {
            return Ok(());
        };
        if !confirm(&format!(
            "Delete {} {} <{}>?",
            student.name, student.surname, student.email
        ))? {
            page.cancel_delete();
            println!("Cancelled.");
            return Ok(());
        }
    }

    finish(page.confirm_delete().await)?;
    println!("[OK] Student {} deleted", id);
    Ok(())
}

async fn cmd_photos_show(app: Arc<AppState>, student_id: i64) -> Result<()> {
    let mut page = PhotosPage::new(app, student_id);
    finish(page.load().await)?;
    println!("{}", page.photo().unwrap_or("No photo"));
    Ok(())
}

async fn cmd_photos_upload(app: Arc<AppState>, student_id: i64, file: &Path) -> Result<()> {
    let mut page = PhotosPage::new(app, student_id);
    finish(page.upload(file).await)?;
    if let Some(url) = page.photo() {
        println!("Photo URL: {}", url);
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
