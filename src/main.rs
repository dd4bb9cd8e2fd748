use decluttr::{open_key_value_store, AppConfig, AppError, RecycleBin};
use photo_gallery::{LocalMediaStore, PhotoAnalyzer, PhotoFeed};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_CONFIG_FILE: &str = "decluttr.toml";
const DEFAULT_FEED_COUNT: usize = 10;

enum Command {
    Status,
    Purge,
    Clear,
    Analyze,
    Feed(usize),
}

struct Args {
    config: PathBuf,
    command: Command,
}

fn print_usage() {
    eprintln!(
        "Usage: decluttr [--config FILE] <command>\n\
         \n\
         Commands:\n\
           status         Show recycle bin contents and XP\n\
           purge          Permanently delete photos past the retention window\n\
           clear          Permanently delete everything in the recycle bin\n\
           analyze        Count photos by orientation and find likely duplicates\n\
           feed [COUNT]   Print the most recent photos (default: {})\n",
        DEFAULT_FEED_COUNT
    );
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut config = PathBuf::from(DEFAULT_CONFIG_FILE);
    let mut command = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().ok_or("--config needs a file")?;
                config = PathBuf::from(path);
            }
            "status" => command = Some(Command::Status),
            "purge" => command = Some(Command::Purge),
            "clear" => command = Some(Command::Clear),
            "analyze" => command = Some(Command::Analyze),
            "feed" => command = Some(Command::Feed(DEFAULT_FEED_COUNT)),
            other => match (&command, other.parse::<usize>()) {
                (Some(Command::Feed(_)), Ok(count)) => command = Some(Command::Feed(count)),
                _ => return Err(format!("unknown argument: {other}")),
            },
        }
    }

    let command = command.ok_or("missing command")?;
    Ok(Args { config, command })
}

fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag("decluttr"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err.user_message());
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let config = AppConfig::load(&args.config)?;
    let media = Arc::new(LocalMediaStore::new(&config.library_path));

    match args.command {
        Command::Analyze => {
            let analyzer = PhotoAnalyzer::new(media, config.analyzer());
            let analysis = analyzer
                .analyze_photos_with_progress(|done, total| log::debug!("Analyzed {done}/{total}"))
                .await;
            println!("Photos:     {}", analysis.total_assets);
            println!("Landscape:  {}", analysis.landscape.len());
            println!("Portrait:   {}", analysis.portrait.len());
            println!("Square:     {}", analysis.square.len());
            println!("Skipped:    {}", analysis.skipped);
            println!(
                "Duplicates: {} photos in {} groups",
                analysis.duplicate_count(),
                analysis.duplicate_groups.len()
            );
            for group in &analysis.duplicate_groups {
                let ids: Vec<&str> = group.assets.iter().map(|a| a.id.as_str()).collect();
                println!("  {}: {}", group.key, ids.join(", "));
            }
            return Ok(());
        }
        Command::Feed(count) => {
            let mut feed = PhotoFeed::new(media, config.feed());
            for _ in 0..count {
                let Some(photo) = feed.next_photo().await else {
                    break;
                };
                println!("{}\t{}", photo.id, photo.uri);
            }
            return Ok(());
        }
        _ => {}
    }

    let store = open_key_value_store(&config.database_path);
    let bin = RecycleBin::new(store, media, config.recycle_bin());
    bin.hydrate().await;

    match args.command {
        Command::Status => {
            let state = bin.state().await;
            let now = chrono::Utc::now();
            let retention = bin.config().retention_days;
            println!("XP:            {}", state.xp);
            println!("Total deleted: {}", state.total_deleted);
            println!("Zen mode:      {}", state.zen_mode);
            println!("In recycle bin: {}", state.photos_count());
            for photo in &state.deleted_photos {
                println!(
                    "  {}\t{}\t{} day(s) left",
                    photo.id,
                    photo.deleted_at.format("%Y-%m-%d %H:%M"),
                    photo.days_until_expiry(now, retention)
                );
            }
        }
        Command::Purge => {
            let purged = bin.purge_expired_photos().await;
            println!("Purged {} expired photo(s)", purged);
        }
        Command::Clear => {
            let count = bin.state().await.photos_count();
            if !bin.clear_recycle_bin().await {
                return Err(AppError::Other(
                    "The photo library refused to delete the recycle bin contents".to_string(),
                ));
            }
            println!("Deleted {} photo(s), XP now {}", count, bin.xp().await);
        }
        Command::Analyze | Command::Feed(_) => {}
    }

    Ok(())
}
