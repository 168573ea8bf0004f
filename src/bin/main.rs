use anyhow::Result;
use catalog_server::auth::{AuthConfig, UserStore};
use catalog_server::config::{DEFAULT_BIND, parse_duration_secs};
use catalog_server::{AdminSeed, DatabaseConfig, ServerConfig, create_app};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-server")]
#[command(about = "Multi-tenant product catalog API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server
    Server {
        /// Bind address, e.g. 0.0.0.0:5000
        #[arg(long, env = "CATALOG_BIND", default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
        /// HMAC secret for signing tokens
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,
        /// Token lifetime: seconds, or a number with s/m/h/d suffix
        #[arg(long, env = "JWT_EXPIRES_IN", default_value = "7d")]
        jwt_expires_in: String,
        /// Create or promote this admin account at startup
        #[arg(long, env = "ADMIN_EMAIL", requires = "admin_password")]
        admin_email: Option<String>,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,
    },
    /// Initialize the database
    Init {
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Create an admin account, or promote an existing one
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("catalog_server=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            bind,
            db_url,
            jwt_secret,
            jwt_expires_in,
            admin_email,
            admin_password,
        } => {
            let database = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for REST server: {}", database.url);

            let bootstrap_admin = match (admin_email, admin_password) {
                (Some(email), Some(password)) => Some(AdminSeed {
                    email,
                    password,
                    name: None,
                }),
                _ => None,
            };

            let config = ServerConfig {
                bind,
                database,
                auth: AuthConfig::new(jwt_secret, parse_duration_secs(&jwt_expires_in)?),
                bootstrap_admin,
            };

            let app = create_app(&config).await?;
            let listener = tokio::net::TcpListener::bind(&config.bind).await?;

            info!("Server listening on http://{}", config.bind);
            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = catalog_server::create_connection(db_config).await?;
            catalog_server::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateAdmin {
            email,
            password,
            name,
            db_url,
        } => {
            let seed = AdminSeed {
                email,
                password,
                name,
            };
            seed.validate()?;

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = catalog_server::create_connection(db_config).await?;
            catalog_server::ensure_schema(&db).await?;

            let users = UserStore::new(db);
            let admin = users
                .ensure_admin(&seed.email, &seed.password, seed.name.as_deref())
                .await?;

            println!("Admin account ready.");
            println!();
            println!("  ID:    {}", admin.uid);
            println!("  Email: {}", admin.email);
            println!("  Role:  {}", admin.role);
        }
    }

    Ok(())
}
