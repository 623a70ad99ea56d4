use clap::{Parser, Subcommand};
use log::{error, info};
use std::net::{IpAddr, SocketAddr, TcpListener};

use photo_wall::config::Config;
use photo_wall::db::create_db_pool;
use photo_wall::ingest::Ingestor;
use photo_wall::maintenance;
use photo_wall::routes::build_routes;
use photo_wall::storage::StorageLayout;
use photo_wall::thumbnail_generator::ThumbnailGenerator;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(version, about = "Photo wall gallery server")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Create the database schema and upload folders.
    InitDb,
    /// Delete every photo record and every uploaded file.
    ClearAll {
        /// Skip the interactive confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::from_env()?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::InitDb => {
            maintenance::init_db(&config).await?;
            println!("Initialized the database.");
            Ok(())
        }
        Commands::ClearAll { yes } => clear_all(config, yes).await,
    }
}

async fn clear_all(config: Config, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !yes && !maintenance::confirm(std::io::stdin().lock(), std::io::stdout())? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let db_pool = create_db_pool(&config.db_path, config.max_connections).await?;
    let layout = StorageLayout::from_config(&config.storage);
    let report = maintenance::clear_all(&db_pool, &layout).await?;
    maintenance::print_report(&report, std::io::stdout())?;
    db_pool.close().await;

    Ok(())
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let host: IpAddr = config.host.parse()?;
    let addr = SocketAddr::new(host, config.port);

    info!("Starting photo wall server on {}", addr);
    info!("Data path: {}", config.data_path.display());
    info!("Database: {}", config.db_path.display());
    info!("Originals: {}", config.storage.originals_path.display());
    info!("Thumbnails: {}", config.storage.thumbnails_path.display());

    if !is_port_available(addr) {
        error!(
            "Port {} is already in use. Stop the other instance or set PHOTO_WALL_PORT.",
            config.port
        );
        return Err(format!("Port {} is already in use", config.port).into());
    }

    let db_pool = create_db_pool(&config.db_path, config.max_connections).await?;
    let layout = StorageLayout::from_config(&config.storage);
    layout.ensure_dirs()?;
    let ingestor = Ingestor::new(layout, ThumbnailGenerator::new(&config.thumbnail));

    let routes = build_routes(
        db_pool,
        ingestor,
        &config.admin_path,
        config.max_upload_bytes(),
    );

    info!(
        "Server started, gallery at http://localhost:{}/ and admin at http://localhost:{}/{}",
        config.port, config.port, config.admin_path
    );

    warp::serve(routes).run(addr).await;

    Ok(())
}

fn is_port_available(addr: SocketAddr) -> bool {
    TcpListener::bind(addr).is_ok()
}
