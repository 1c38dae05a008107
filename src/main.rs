//! Shelfside - Personal Library Management Client
//!
//! Interactive shell over the session store and action layer: navigate
//! client routes, inspect the catalog, and run library/book mutations.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfside::{
    actions::Actions,
    config::AppConfig,
    http::HttpBackend,
    models::{BookDraft, SessionState},
    routes::{self, Resolution, Route},
    store::SessionStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("shelfside={}", config.logging.level).into());

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Shelfside client v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Backend API at {}", config.api.base_url);

    // Build the HTTP backend and the session store, then load the session
    // and catalog before showing anything.
    let backend = Arc::new(HttpBackend::new(&config.api)?);
    let store = SessionStore::new();
    store.initialize(backend.as_ref()).await;

    let state = AppState {
        config: Arc::new(config),
        actions: Arc::new(Actions::new(backend, store.clone())),
        store,
    };

    // Log every published snapshot; views would re-render off this stream
    let mut changes = WatchStream::new(state.store.subscribe());
    tokio::spawn(async move {
        while let Some(snapshot) = changes.next().await {
            tracing::debug!(
                "State changed: libraries={}, catalog={}",
                snapshot.libraries.len(),
                snapshot.books.len()
            );
        }
    });

    run_shell(state).await
}

/// Read commands from stdin and dispatch them to the action layer
async fn run_shell(app: AppState) -> anyhow::Result<()> {
    println!("Shelfside. Type 'help' for commands.");
    render(Resolution::Page(Route::Home), &app.store.read());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_help(),
            ["open", path] => {
                let resolution = routes::resolve(path, &app.store.read());
                render(resolution, &app.store.read());
            }
            ["login", username, password] => {
                report(app.actions.login(username, password).await);
            }
            ["signup", username, email, password] => {
                report(app.actions.signup(username, email, password).await);
            }
            ["logout"] => {
                report(app.actions.logout().await);
            }
            ["newlib", name @ ..] if !name.is_empty() => {
                report(app.actions.create_library(&name.join(" "), false).await);
            }
            ["rename", id, name @ ..] if !name.is_empty() => match id.parse() {
                Ok(id) => report(app.actions.update_library(id, &name.join(" ")).await),
                Err(_) => println!("! library id must be a number"),
            },
            ["dellib", id] => match id.parse() {
                Ok(id) => report(app.actions.delete_library(id).await),
                Err(_) => println!("! library id must be a number"),
            },
            ["add", library_id, book_id] => {
                match (library_id.parse(), book_id.parse()) {
                    (Ok(library_id), Ok(book_id)) => report(
                        app.actions
                            .add_book_to_library(library_id, BookDraft::existing(book_id))
                            .await,
                    ),
                    _ => println!("! usage: add <library-id> <book-id>"),
                }
            }
            ["newbook", library_id, fields @ ..] if !fields.is_empty() => {
                match (library_id.parse(), parse_book_draft(&fields.join(" "))) {
                    (Ok(library_id), Some(draft)) => {
                        report(app.actions.add_book_to_library(library_id, draft).await)
                    }
                    _ => println!(
                        "! usage: newbook <library-id> <title> / <author> [/ <genre>] [/ <year>]"
                    ),
                }
            }
            ["rate", library_id, book_id, rating] => {
                match (library_id.parse(), book_id.parse(), rating.parse()) {
                    (Ok(library_id), Ok(book_id), Ok(rating)) => {
                        report(app.actions.rate_book(library_id, book_id, rating).await)
                    }
                    _ => println!("! usage: rate <library-id> <book-id> <1-5>"),
                }
            }
            ["delbook", library_id, book_id] => {
                match (library_id.parse(), book_id.parse()) {
                    (Ok(library_id), Ok(book_id)) => {
                        report(app.actions.delete_book(library_id, book_id).await)
                    }
                    _ => println!("! usage: delbook <library-id> <book-id>"),
                }
            }
            _ => println!("! unknown command, type 'help'"),
        }
    }

    Ok(())
}

fn print_help() {
    println!("  open <path>                     navigate (/, /login, /books, ...)");
    println!("  login <username> <password>");
    println!("  signup <username> <email> <password>");
    println!("  logout");
    println!("  newlib <name>                   create a library");
    println!("  rename <library-id> <name>");
    println!("  dellib <library-id>");
    println!("  add <library-id> <book-id>      link a catalog book");
    println!("  newbook <library-id> <title> / <author> [/ <genre>] [/ <year>]");
    println!("  rate <library-id> <book-id> <1-5>");
    println!("  delbook <library-id> <book-id>");
    println!("  quit");
}

/// Render the resolved page from the current store snapshot
fn render(resolution: Resolution, state: &SessionState) {
    match resolution {
        Resolution::RedirectToLogin => {
            println!("-> redirected to /login (not logged in)");
        }
        Resolution::NotFound => {
            println!("-> page not found");
        }
        Resolution::Page(Route::Home) => {
            match &state.user {
                Some(user) => println!("Home - logged in as {}", user.username),
                None => println!("Home - anonymous"),
            }
            for library in &state.libraries {
                println!("  [{}] {} ({} books)", library.id, library.name, library.books.len());
            }
        }
        Resolution::Page(Route::BookIndex) => {
            println!("Catalog - {} books", state.books.len());
            for book in &state.books {
                let rating = book
                    .rating
                    .user_rating
                    .map(|r| format!(" rated {}/5", r))
                    .unwrap_or_default();
                println!("  [{}] {} - {}{}", book.id, book.title, book.author, rating);
            }
        }
        Resolution::Page(Route::Login) => println!("Login - use: login <username> <password>"),
        Resolution::Page(Route::Signup) => {
            println!("Signup - use: signup <username> <email> <password>")
        }
        Resolution::Page(Route::NewLibrary) => println!("New library - use: newlib <name>"),
        Resolution::Page(Route::NewBook) => {
            println!("New book - use: add <library-id> <book-id>");
            println!("           or: newbook <library-id> <title> / <author> [/ <genre>] [/ <year>]");
        }
    }
}

/// Parse `<title> / <author> [/ <genre>] [/ <year>]` into a full draft
fn parse_book_draft(input: &str) -> Option<BookDraft> {
    let mut fields = input.split('/').map(str::trim);
    let title = fields.next()?;
    let author = fields.next()?;
    if title.is_empty() || author.is_empty() {
        return None;
    }
    let mut draft = BookDraft::new(title, author);
    if let Some(genre) = fields.next() {
        if !genre.is_empty() {
            draft.genre = Some(genre.to_string());
        }
    }
    if let Some(year) = fields.next() {
        match year.parse() {
            Ok(year) => draft.published_year = Some(year),
            Err(_) => return None,
        }
    }
    Some(draft)
}

fn report<T>(result: shelfside::ClientResult<T>) {
    match result {
        Ok(_) => println!("ok"),
        Err(err) => println!("! {}", err),
    }
}
