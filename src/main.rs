use dbsession::config;
use dbsession::core::db::{Params, QueryOutcome, Session};
use tracing::info;

fn main() {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or("dbsession.toml");

    let config = match config::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(&config.database);
    if !session.connect() {
        eprintln!("{}", session.last_error().unwrap_or("connection failed"));
        std::process::exit(1);
    }
    info!("connected");

    if !session.check() {
        eprintln!(
            "{}",
            session.last_error().unwrap_or("liveness probe failed")
        );
        std::process::exit(1);
    }
    println!("Connection OK");

    // Optional one-shot query from the command line
    if let Some(query) = args.get(2) {
        match session.query(query, &Params::none(), true) {
            QueryOutcome::Rows(rows) => {
                for row in &rows {
                    let rendered: Vec<String> = row
                        .iter()
                        .map(|(name, value)| format!("{}={}", name, value))
                        .collect();
                    println!("{}", rendered.join(" "));
                }
                println!("({} rows)", rows.len());
            }
            QueryOutcome::Success => println!("OK"),
            QueryOutcome::Failed => {
                eprintln!("{}", session.last_error().unwrap_or("query failed"));
                std::process::exit(1);
            }
        }
    }
}
