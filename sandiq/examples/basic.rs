//! Basic example of the Sandiq DI container.
//!
//! Run with `RUST_LOG=sandiq=debug` to watch resolution happen.

use std::sync::Arc;

use sandiq::prelude::*;
use tracing_subscriber::EnvFilter;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

#[derive(Autowire)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Autowire)]
struct Config {
    #[sandiq(default = "postgres://localhost/myapp")]
    database_url: String,
    #[sandiq(default = true)]
    debug: bool,
}

#[derive(Autowire)]
struct Database {
    config: Arc<Config>,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.database_url)
    }
}

#[derive(Autowire)]
struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

struct UserService {
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
    greeting: String,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("{} {id}", self.greeting));
        self.repo.find_user(id)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sandiq=info")),
        )
        .init();

    let mut container = Container::builder()
        // every #[derive(Autowire)] type in this binary
        .discover()
        // Logger: trait bound to a concrete type
        .register_abstract::<dyn Logger>()
        .implement::<dyn Logger, ConsoleLogger>(|c| c as Arc<dyn Logger>)
        .set(Identifier::of::<dyn Logger>(), Definition::of_type::<ConsoleLogger>())
        // plain literal
        .set("greeting", Definition::value("Getting user"))
        // UserService: factory with access to the container
        .set(
            "user_service",
            Definition::factory(|c| {
                Ok(Value::object(Arc::new(UserService {
                    repo: c.resolve()?,
                    logger: c.resolve()?,
                    greeting: c.get_value("greeting")?,
                })))
            }),
        )
        .build();

    println!("Container built: {container:?}");

    let config: Arc<Config> = container.resolve()?;
    println!("Config: database_url={}, debug={}", config.database_url, config.debug);

    let service: Arc<UserService> = container.get_as("user_service")?;
    println!("{}", service.get_user(42));

    // same instance, nothing rebuilt
    let again: Arc<UserService> = container.get_as("user_service")?;
    println!("{}", again.get_user(7));
    assert!(Arc::ptr_eq(&service, &again));

    match container.get("user_servise") {
        Err(err) => println!("\n{err}"),
        Ok(_) => unreachable!(),
    }

    Ok(())
}
