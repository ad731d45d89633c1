//! Terminal front end for the member portal.
//!
//! Thin presentation over `portal-app`: forms are validated before anything
//! touches the network, destructive actions walk through the same
//! confirmation prompt the web UI uses, and the session persists in a
//! file-backed store between invocations.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_app::{
    is_form_valid, AuthSession, Config, FileStore, FormErrors, LoginForm, MemberDirectory,
    MemberForm, ProfileForm, RegisterForm,
};
use portal_client::{Gender, PortalClient, User, GENERIC_FAILURE};

#[derive(Parser)]
#[command(name = "portal", about = "Member portal client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new account and log in
    Register,
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Show the current user
    Me {
        /// Re-fetch the profile from the server first
        #[arg(long)]
        refresh: bool,
    },
    /// Update profile details
    Profile,
    /// Member directory
    #[command(subcommand)]
    Members(MembersCommand),
}

#[derive(Subcommand)]
enum MembersCommand {
    /// List members
    List {
        /// Client-side substring filter over name, email and phone
        #[arg(long)]
        search: Option<String>,
    },
    /// Register a new member
    Add,
    /// Delete one member (admin only)
    Delete { id: String },
    /// Delete every member (admin only)
    DeleteAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,portal_client=info,portal_app=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let store = Arc::new(FileStore::new(&config.data_dir));
    let client = PortalClient::new(config.api_url.as_str(), store.clone()).with_unauthorized_handler(
        Arc::new(|| {
            eprintln!("{}", "Sesi berakhir, silakan login kembali.".red());
        }),
    );
    let mut session = AuthSession::new(client.clone(), store).with_login_redirect(Arc::new(|| {
        println!("{}", "Silakan login kembali dengan `portal login`.".yellow());
    }));

    match cli.command {
        Command::Register => register(&mut session).await,
        Command::Login { email } => login(&mut session, email).await,
        Command::Logout => {
            session.logout();
            println!("{}", "Berhasil logout.".green());
            Ok(())
        }
        Command::Me { refresh } => me(&mut session, refresh).await,
        Command::Profile => profile(&mut session).await,
        Command::Members(command) => members(&mut session, client, command).await,
    }
}

async fn register(session: &mut AuthSession<FileStore>) -> Result<()> {
    let form = prompt_register_form()?;
    ensure_valid(&form.validate());

    if session.register(&form).await {
        println!("{}", "Registrasi berhasil, Anda sudah login.".green());
        Ok(())
    } else {
        fail(session.state().error.as_deref())
    }
}

async fn login(session: &mut AuthSession<FileStore>, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let form = LoginForm { email, password };
    ensure_valid(&form.validate());

    if session.login(&form).await {
        println!("{}", "Login berhasil.".green());
        Ok(())
    } else {
        fail(session.state().error.as_deref())
    }
}

async fn me(session: &mut AuthSession<FileStore>, refresh: bool) -> Result<()> {
    if !session.is_authenticated() {
        println!("{}", "Belum login.".yellow());
        return Ok(());
    }
    if refresh {
        session.refresh_user().await;
    }
    if let Some(user) = &session.state().user {
        print_user(user);
    }
    Ok(())
}

async fn profile(session: &mut AuthSession<FileStore>) -> Result<()> {
    let Some(current) = session.state().user.clone() else {
        println!("{}", "Belum login.".yellow());
        return Ok(());
    };

    let form = ProfileForm {
        initial_name: Input::new()
            .with_prompt("Nama panggilan")
            .with_initial_text(&current.initial_name)
            .allow_empty(true)
            .interact_text()?,
        full_name: Input::new()
            .with_prompt("Nama lengkap")
            .with_initial_text(&current.full_name)
            .interact_text()?,
        university: Input::new()
            .with_prompt("Universitas")
            .with_initial_text(&current.university)
            .allow_empty(true)
            .interact_text()?,
        phone_number: Input::new()
            .with_prompt("Nomor HP")
            .with_initial_text(&current.phone_number)
            .interact_text()?,
    };
    ensure_valid(&form.validate());

    if session.update_profile(&form).await {
        println!("{}", "Profil berhasil diperbarui.".green());
        Ok(())
    } else {
        fail(session.state().error.as_deref())
    }
}

async fn members(
    session: &mut AuthSession<FileStore>,
    client: PortalClient,
    command: MembersCommand,
) -> Result<()> {
    let mut directory = MemberDirectory::new(client);

    match command {
        MembersCommand::List { search } => {
            directory.fetch().await;
            if let Some(error) = directory.error() {
                return fail(Some(error));
            }
            let members = match &search {
                Some(term) => directory.filter(term),
                None => directory.members().iter().collect(),
            };
            if members.is_empty() {
                println!("{}", "Tidak ada member.".yellow());
            }
            for member in members {
                println!(
                    "{}  {}  {}  {}",
                    member.id.bold(),
                    member.full_name,
                    member.email,
                    member.phone_number
                );
            }
            Ok(())
        }
        MembersCommand::Add => {
            let form = prompt_member_form()?;
            ensure_valid(&form.validate());
            let new_member = form
                .into_new_member()
                .context("gender is validated before submission")?;
            match directory.add(new_member).await {
                Ok(member) => {
                    println!("{} {}", "Member terdaftar:".green(), member.id);
                    Ok(())
                }
                Err(message) => fail(Some(message.as_str())),
            }
        }
        MembersCommand::Delete { id } => {
            let Some(role) = session.role() else {
                println!("{}", "Belum login.".yellow());
                return Ok(());
            };
            directory.fetch().await;

            let prompt = directory.delete_prompt(id.as_str());
            println!("{}", prompt.title().bold());
            println!("{}", prompt.body());
            if !Confirm::new()
                .with_prompt(prompt.confirm_label())
                .default(false)
                .interact()?
            {
                prompt.cancel();
                println!("{}", "Batal.".yellow());
                return Ok(());
            }

            match directory.delete(role, prompt.confirm()).await {
                Ok(()) => {
                    println!("{}", "Member dihapus.".green());
                    Ok(())
                }
                Err(message) => fail(Some(message.as_str())),
            }
        }
        MembersCommand::DeleteAll => {
            let Some(role) = session.role() else {
                println!("{}", "Belum login.".yellow());
                return Ok(());
            };
            directory.fetch().await;

            let prompt = directory.delete_all_prompt();
            println!("{}", prompt.title().bold());
            println!("{}", prompt.body());
            if !Confirm::new()
                .with_prompt(prompt.confirm_label())
                .default(false)
                .interact()?
            {
                prompt.cancel();
                println!("{}", "Batal.".yellow());
                return Ok(());
            }

            match directory.delete(role, prompt.confirm()).await {
                Ok(()) => {
                    println!("{}", "Semua member dihapus.".green());
                    Ok(())
                }
                Err(message) => fail(Some(message.as_str())),
            }
        }
    }
}

fn prompt_register_form() -> Result<RegisterForm> {
    let full_name: String = Input::new().with_prompt("Nama lengkap").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Konfirmasi password", "Password tidak sama")
        .interact()?;

    Ok(RegisterForm {
        full_name,
        email,
        confirm_password: password.clone(),
        password,
        phone_number: Input::new().with_prompt("Nomor HP").interact_text()?,
        gender: Some(prompt_gender()?),
        birth_date: Input::new()
            .with_prompt("Tanggal lahir (YYYY-MM-DD)")
            .interact_text()?,
        address: Input::new().with_prompt("Alamat").interact_text()?,
    })
}

fn prompt_member_form() -> Result<MemberForm> {
    Ok(MemberForm {
        full_name: Input::new().with_prompt("Nama lengkap").interact_text()?,
        email: Input::new().with_prompt("Email").interact_text()?,
        phone_number: Input::new().with_prompt("Nomor HP").interact_text()?,
        gender: Some(prompt_gender()?),
        birth_date: Input::new()
            .with_prompt("Tanggal lahir (YYYY-MM-DD)")
            .interact_text()?,
        address: Input::new().with_prompt("Alamat").interact_text()?,
    })
}

fn prompt_gender() -> Result<Gender> {
    let choice = Select::new()
        .with_prompt("Gender")
        .items(&["male", "female"])
        .default(0)
        .interact()?;
    Ok(if choice == 0 {
        Gender::Male
    } else {
        Gender::Female
    })
}

fn print_user(user: &User) {
    println!("{} {}", "ID:".bold(), user.id);
    println!("{} {}", "Email:".bold(), user.email);
    println!("{} {}", "Nama:".bold(), user.full_name);
    println!("{} {}", "Nomor HP:".bold(), user.phone_number);
    println!("{} {}", "Universitas:".bold(), user.university);
    println!("{} {:?}", "Role:".bold(), user.role);
    println!(
        "{} {}",
        "Email terverifikasi:".bold(),
        if user.is_email_verified { "ya" } else { "belum" }
    );
}

/// Print field errors and bail out before anything touches the network.
fn ensure_valid(errors: &FormErrors) {
    if is_form_valid(errors) {
        return;
    }
    eprintln!("{}", "Form tidak valid:".red());
    for message in errors.values() {
        eprintln!("  - {message}");
    }
    process::exit(1);
}

fn fail(message: Option<&str>) -> Result<()> {
    eprintln!("{}", message.unwrap_or(GENERIC_FAILURE).red());
    process::exit(1)
}
