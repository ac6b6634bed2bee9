//! `library` — command-line host for the library management client.
//!
//! Each subcommand drives the application context the way the matching page
//! interaction would (a sidebar click, a tab click, a form submission) and
//! prints the containers, selectors and messages that interaction produced.

mod print;
mod settings;
mod transport;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use library_core::{
    App, AppConfig, Collection, CreateAuthor, CreateCategory, LogFormat, MessageSlot, NavEvent,
    Section, TabAxis, Transport,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::transport::UreqTransport;

/// Library management client.
#[derive(Parser, Debug)]
#[command(name = "library", version, about = "Library management client")]
struct Cli {
    /// Backend base URL (overrides configuration).
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all books.
    Books,

    /// List all members.
    Members,

    /// List borrowing history.
    Borrowings,

    /// List authors.
    Authors,

    /// List categories.
    Categories,

    /// Add a book. Numeric fields are read leniently, as the web form does.
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        year: String,
        #[arg(long, default_value = "")]
        isbn: String,
        #[arg(long, default_value = "")]
        stock: String,
        #[arg(long, default_value = "")]
        author_id: String,
        #[arg(long, default_value = "")]
        category_id: String,
    },

    /// Register a member.
    AddMember {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        email: String,
    },

    /// Borrow a book for a member.
    Borrow {
        #[arg(long, default_value = "")]
        book_id: String,
        #[arg(long, default_value = "")]
        member_id: String,
        /// Loan length in days.
        #[arg(long, default_value = "")]
        days: String,
    },

    /// Return a borrowed book.
    Return {
        /// Borrowing ID.
        borrowing_id: String,
    },

    /// Add an author.
    AddAuthor {
        #[arg(long)]
        name: String,
        /// Birth date (YYYY-MM-DD).
        #[arg(long)]
        born: Option<NaiveDate>,
    },

    /// Add a category.
    AddCategory {
        #[arg(long)]
        name: String,
    },

    /// Navigate to a section, optionally opening one of its tabs.
    Show {
        /// book-list, borrowing-management or member-management.
        section: String,
        /// Tab key within the section (e.g. list, new, return).
        #[arg(long)]
        tab: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = settings::load()?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    init_tracing(&config);

    let transport = UreqTransport::new(config.api.timeout());
    let mut app = App::new(&config, transport).context("invalid navigation routes")?;
    tracing::debug!(base_url = %app.client().base_url(), "client ready");

    let succeeded = run(&mut app, cli.command)?;
    print_messages(&app);
    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("library={level},library_core={level}", level = config.logging.level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Execute one command. Returns `false` when a submission was rejected; the
/// reason is already in a message slot.
fn run<T: Transport>(app: &mut App<T>, command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::Books => show_collection(app, Collection::Books),
        Commands::Members => show_collection(app, Collection::Members),
        Commands::Borrowings => show_collection(app, Collection::Borrowings),
        Commands::Authors => {
            let authors = app.authors().context("failed to load authors")?;
            println!("== Authors ==");
            for author in authors {
                match author.tanggal_lahir {
                    Some(born) => println!("[{}] {} (born {born})", author.id, author.nama),
                    None => println!("[{}] {}", author.id, author.nama),
                }
            }
        }
        Commands::Categories => {
            let categories = app.categories().context("failed to load categories")?;
            println!("== Categories ==");
            for category in categories {
                println!("[{}] {}", category.id, category.nama);
            }
        }
        Commands::AddBook {
            title,
            year,
            isbn,
            stock,
            author_id,
            category_id,
        } => {
            let form = &mut app.forms.book;
            form.judul = title;
            form.tahun_terbit = year;
            form.isbn = isbn;
            form.stok = stock;
            form.author_id = author_id;
            form.category_id = category_id;
            if app.submit_book().is_err() {
                return Ok(false);
            }
            print_collection(app, Collection::Books);
        }
        Commands::AddMember {
            name,
            phone,
            address,
            email,
        } => {
            let form = &mut app.forms.member;
            form.nama = name;
            form.telepon = phone;
            form.alamat = address;
            form.email = email;
            if app.submit_member().is_err() {
                return Ok(false);
            }
            print_collection(app, Collection::Members);
        }
        Commands::Borrow {
            book_id,
            member_id,
            days,
        } => {
            let form = &mut app.forms.borrow;
            form.book_id = book_id;
            form.member_id = member_id;
            form.durasi_peminjaman_hari = days;
            if app.submit_borrowing().is_err() {
                return Ok(false);
            }
            print_collection(app, Collection::Borrowings);
        }
        Commands::Return { borrowing_id } => {
            app.forms.ret.borrowing_id = borrowing_id;
            if app.submit_return().is_err() {
                return Ok(false);
            }
            print_collection(app, Collection::Borrowings);
        }
        Commands::AddAuthor { name, born } => {
            let author = app
                .add_author(&CreateAuthor {
                    nama: name,
                    tanggal_lahir: born,
                })
                .context("failed to add author")?;
            println!("Author added: [{}] {}", author.id, author.nama);
        }
        Commands::AddCategory { name } => {
            let category = app
                .add_category(&CreateCategory { nama: name })
                .context("failed to add category")?;
            println!("Category added: [{}] {}", category.id, category.nama);
        }
        Commands::Show { section, tab } => show_section(app, &section, tab.as_deref())?,
    }
    Ok(true)
}

fn show_collection<T: Transport>(app: &mut App<T>, collection: Collection) {
    app.refresh(collection);
    print_collection(app, collection);
}

fn show_section<T: Transport>(
    app: &mut App<T>,
    key: &str,
    tab: Option<&str>,
) -> anyhow::Result<()> {
    let mut effects = app.start();
    effects.extend(app.dispatch(NavEvent::section(key)?));
    if let Some(tab) = tab {
        let axis = match app.nav().section {
            Section::BorrowingManagement => TabAxis::Borrowing,
            Section::MemberManagement => TabAxis::Member,
            Section::BookList => anyhow::bail!("section `{key}` has no tabs"),
        };
        effects.extend(app.dispatch(NavEvent::tab(axis, tab)?));
    }

    for effect in &effects {
        print!("{}", print::effect(effect));
    }
    match app.nav().section {
        Section::BookList => print_collection(app, Collection::Books),
        Section::MemberManagement => print_collection(app, Collection::Members),
        Section::BorrowingManagement => {
            print_collection(app, Collection::Borrowings);
            print!("{}", print::select("Book choices", app.book_select()));
            print!("{}", print::select("Member choices", app.member_select()));
        }
    }
    Ok(())
}

fn print_collection<T: Transport>(app: &App<T>, collection: Collection) {
    let heading = match collection {
        Collection::Books => "Books",
        Collection::Members => "Members",
        Collection::Borrowings => "Borrowings",
    };
    print!("{}", print::container(heading, app.container(collection)));
}

fn print_messages<T: Transport>(app: &App<T>) {
    for slot in MessageSlot::ALL {
        if let Some(message) = app.message(slot) {
            print!("{}", print::message(slot, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use library_core::{BorrowingTab, MessageKind};

    use super::*;

    fn start_server() -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        format!("http://{addr}")
    }

    fn app_for(base_url: &str) -> App<UreqTransport> {
        let mut config = AppConfig::default();
        config.api.base_url = base_url.to_string();
        App::new(&config, UreqTransport::new(config.api.timeout())).unwrap()
    }

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args.iter().copied()).unwrap().command
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["library", "--base-url", "http://x", "books"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://x"));
        assert!(matches!(cli.command, Commands::Books));

        match parse(&["library", "show", "borrowing-management", "--tab", "return"]) {
            Commands::Show { section, tab } => {
                assert_eq!(section, "borrowing-management");
                assert_eq!(tab.as_deref(), Some("return"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        match parse(&["library", "add-author", "--name", "Tere Liye", "--born", "1979-05-21"]) {
            Commands::AddAuthor { born, .. } => {
                assert_eq!(born, NaiveDate::from_ymd_opt(1979, 5, 21));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let bad_date = ["library", "add-author", "--name", "X", "--born", "kemarin"];
        assert!(Cli::try_parse_from(bad_date).is_err());
    }

    #[test]
    fn rejected_borrow_reports_failure_without_request() {
        // Nothing listens here; a request would surface as a transport error.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let mut app = app_for(&format!("http://{addr}"));

        let borrow = parse(&["library", "borrow", "--book-id", "1", "--days", "7"]);
        let ok = run(&mut app, borrow).unwrap();
        assert!(!ok);
        let message = app.message(MessageSlot::Borrowing).unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, "All borrowing fields must be filled in correctly.");
    }

    #[test]
    fn commands_drive_the_backend() {
        let base_url = start_server();
        let mut app = app_for(&base_url);

        let add_author = parse(&["library", "add-author", "--name", "Andrea Hirata"]);
        assert!(run(&mut app, add_author).unwrap());
        assert!(run(&mut app, parse(&["library", "add-category", "--name", "Novel"])).unwrap());
        assert!(run(
            &mut app,
            parse(&[
                "library", "add-book", "--title", "Laskar Pelangi", "--stock", "2",
                "--author-id", "1", "--category-id", "1",
            ]),
        )
        .unwrap());
        assert_eq!(app.container(Collection::Books).cards().len(), 1);

        assert!(run(
            &mut app,
            parse(&["library", "add-member", "--name", "Ikal", "--phone", "0811"]),
        )
        .unwrap());
        assert!(run(
            &mut app,
            parse(&["library", "borrow", "--book-id", "1", "--member-id", "1", "--days", "14"]),
        )
        .unwrap());
        assert_eq!(app.container(Collection::Borrowings).cards().len(), 1);

        assert!(run(&mut app, parse(&["library", "return", "abc"])).is_ok_and(|ok| !ok));
        assert_eq!(
            app.message(MessageSlot::Return).unwrap().text,
            "Borrowing ID must be a valid number."
        );

        assert!(run(
            &mut app,
            parse(&["library", "show", "borrowing-management", "--tab", "new"]),
        )
        .unwrap());
        assert_eq!(app.nav().borrowing_tab, BorrowingTab::New);
        assert_eq!(app.book_select().len(), 2);

        assert!(run(&mut app, parse(&["library", "show", "book-list", "--tab", "new"])).is_err());
        assert!(run(&mut app, parse(&["library", "show", "reports"])).is_err());
    }
}
