use clap::Parser;
use colored::Colorize;
use std::env;
use tracing::{info, Level};
use tracing_subscriber::{
    field::RecordFields,
    fmt::{self, time::ChronoUtc, FormatFields},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use error_common::{Result, TransitError};
use transit_server::{create_app, ServerConfig, TransitServer};

/// Transit Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "transit-server")]
#[command(about = "Non-emergency medical transportation API server")]
struct Args {
    /// Server bind address
    #[arg(long, env = "TRANSIT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "TRANSIT_PORT", default_value = "8080")]
    port: u16,

    /// Configuration file path (optional)
    #[arg(short, long, default_value = "transit-server.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Apply pending schema migrations before serving
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal outside development
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("🚐 {}", "Starting Transit Engine HTTP Server".bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());

    let config = ServerConfig::load(&args.config)
        .map_err(|e| TransitError::ConfigError(e.to_string()))?;

    let server = TransitServer::connect(config)
        .await
        .map_err(|e| TransitError::DatabaseError(format!("Failed to connect: {e}")))?;

    if args.migrate {
        info!("🗄️  {}", "Applying schema migrations...".bright_cyan());
        server
            .db
            .run_migrations()
            .await
            .map_err(|e| TransitError::DatabaseError(e.to_string()))?;
    }

    let db = server.db.clone();
    let app = create_app(server);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TransitError::NetworkError(format!("Failed to bind to {addr}: {e}")))?;

    info!("🚀 {}", format!("Transit Engine running on http://{addr}").bright_green());
    info!("📋 {}", format!("Health check available at: http://{addr}/health").bright_blue());
    info!("📖 {}", format!("OpenAPI document at: http://{addr}/api-docs/openapi.json").bright_blue());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TransitError::ServerError(format!("HTTP server error: {e}")))?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    // Check if we're in development or production
    let is_development =
        env::var("TRANSIT_ENV").unwrap_or_else(|_| "development".to_string()) == "development";
    let use_colors = env::var("NO_COLOR").is_err() && atty::is(atty::Stream::Stdout);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "transit_server={level},booking_service={level},insurance_service={level},billing_service={level},database_layer=info,tower_http=info,sqlx=warn"
        )
        .into()
    });

    if is_development && use_colors {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .event_format(ColoredFormatter)
                    .fmt_fields(ColoredFieldFormatter),
            )
            .init();

        print_startup_banner();
    } else {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .init();
    }
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                     🚐 TRANSIT ENGINE                        ║".bright_cyan());
    println!("{}", "║           Non-Emergency Medical Transportation API           ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}

// Colored formatter for development
struct ColoredFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ColoredFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        write!(
            writer,
            "{} ",
            chrono::Utc::now().format("%H:%M:%S%.3f").to_string().bright_black()
        )?;

        let level_str = match *metadata.level() {
            Level::TRACE => "TRACE".bright_purple(),
            Level::DEBUG => "DEBUG".bright_blue(),
            Level::INFO => " INFO".bright_green(),
            Level::WARN => " WARN".bright_yellow(),
            Level::ERROR => "ERROR".bright_red(),
        };
        write!(writer, "[{level_str}] ")?;

        if let Some(target) = metadata.target().split("::").last() {
            write!(writer, "{:<15} ", target.bright_cyan())?;
        }

        ctx.format_fields(writer.by_ref(), event)?;

        if metadata.level() <= &Level::DEBUG {
            if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
                let file_short = file.rsplit('/').next().unwrap_or(file);
                write!(writer, " {}", format!("({file_short}:{line})").bright_black())?;
            }
        }

        writeln!(writer)
    }
}

// Field formatter for colored output
struct ColoredFieldFormatter;

impl<'a> tracing_subscriber::fmt::FormatFields<'a> for ColoredFieldFormatter {
    fn format_fields<R: RecordFields>(
        &self,
        writer: tracing_subscriber::fmt::format::Writer<'_>,
        fields: R,
    ) -> std::fmt::Result {
        let mut visitor = ColoredFieldVisitor {
            writer,
            is_first: true,
            result: Ok(()),
        };
        fields.record(&mut visitor);
        visitor.result
    }
}

struct ColoredFieldVisitor<'a> {
    writer: tracing_subscriber::fmt::format::Writer<'a>,
    is_first: bool,
    result: std::fmt::Result,
}

impl ColoredFieldVisitor<'_> {
    fn write_field(&mut self, name: &str, value: &str) {
        if self.result.is_err() {
            return;
        }
        self.result = if name == "message" {
            write!(self.writer, "{}", value.white().bold())
        } else {
            let separator = if self.is_first { "" } else { " " };
            write!(
                self.writer,
                "{separator}{}={}",
                name.bright_yellow(),
                value.bright_white()
            )
        };
        self.is_first = false;
    }
}

impl tracing::field::Visit for ColoredFieldVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.write_field(field.name(), &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.write_field(field.name(), value);
    }
}
