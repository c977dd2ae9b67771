extern crate kalends as lib;

use flexi_logger::{FileSpec, Logger};
use lib::config::load_suitable_config;
use lib::date::CalendarDate;
use lib::events::Dispatcher;
use lib::store::{EventStore, FileStorage};
use lib::ui::{App, Context};
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "kal",
    author = "Julian Bigge <j.reedts@gmail.com>",
    about = "Kalends - a scrolling day calendar with holidays, anniversaries and events."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the day window non-interactively"
    )]
    pub show: bool,

    #[structopt(long = "start", help = "first day of the window (YYYY-MM-DD)")]
    pub start: Option<CalendarDate>,

    #[structopt(long = "days", help = "number of days in the window")]
    pub days: Option<u32>,

    #[structopt(long = "store", help = "path to the event store", parse(from_os_str))]
    pub store: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    std::panic::set_hook(Box::new(move |info| {
        println!("Kalends ran into a fatal error!");
        println!("Consider filing an issue with a log file and the backtrace below.");

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let mut config = load_suitable_config(args.configfile.as_deref())?;
    if let Some(path) = args.store {
        config.store.path = Some(path);
    }
    if let Some(days) = args.days {
        config.window.default_length = days;
    }

    let store_path = config.store_path()?;
    let store = EventStore::open(
        FileStorage::new(&store_path),
        config.calendar.palette.clone(),
    )?;

    let mut context = Context::new(config, store)?;
    if let Some(start) = args.start {
        context.window = context.window.jump_to(start);
    }

    if args.show {
        return Ok(App::new(context).show(&mut stdout().lock())?);
    }

    let mut dispatcher = Dispatcher::from_config(&context.config);
    if let Err(e) = dispatcher.watch(&store_path) {
        log::warn!("External changes to the events will not be noticed: {}", e);
    }

    let stdout = stdout();
    let mut app = App::new(context);

    app.run(dispatcher, stdout.lock())
}
