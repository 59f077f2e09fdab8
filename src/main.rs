use civic_i18n::mt::google_translate::API_KEY_VAR;
use civic_i18n::mt::{MockMode, MockTranslator};
use civic_i18n::{
    BridgeState, Config, FileStorage, HeadlessPage, LanguageContext, MemoryStorage,
    PreferenceStorage, language,
};
use clap::{Arg, ArgMatches, Command};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn cli() -> Command {
    let lang_arg = Arg::new("lang")
        .long("lang")
        .short('l')
        .help("Language to use instead of the saved one (e.g., es, hi, ar)");

    Command::new("civic-i18n")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Language preference and translation tools")
        .subcommand_required(true)
        .subcommand(Command::new("languages").about("List supported languages"))
        .subcommand(Command::new("show").about("Show the active language"))
        .subcommand(
            Command::new("set")
                .about("Save the preferred language")
                .arg(Arg::new("code").required(true).index(1)),
        )
        .subcommand(
            Command::new("t")
                .about("Translate a label with the static dictionary")
                .arg(Arg::new("phrase").required(true).index(1))
                .arg(lang_arg.clone()),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate text with the machine translation fallback")
                .arg(Arg::new("phrase").required(true).index(1))
                .arg(lang_arg)
                .arg(
                    Arg::new("mock")
                        .long("mock")
                        .short('m')
                        .help("Use mock translator instead of Google Translate")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("bridge")
                .about("Switch a headless page through the translation widget")
                .arg(Arg::new("code").required(true).index(1)),
        )
}

#[tokio::main]
async fn main() -> CliResult {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("languages", _)) => list_languages(),
        Some(("show", _)) => show(&config),
        Some(("set", args)) => set(&config, args),
        Some(("t", args)) => translate_label(&config, args),
        Some(("translate", args)) => translate_text(&config, args).await,
        Some(("bridge", args)) => drive_bridge(&config, args).await,
        _ => unreachable!("subcommand_required is set"),
    }
}

fn storage(config: &Config) -> Arc<dyn PreferenceStorage> {
    match config.preferences_path() {
        Some(path) => Arc::new(FileStorage::new(path)),
        None => {
            warn!("No configuration directory, preferences will not be saved");
            Arc::new(MemoryStorage::new())
        }
    }
}

/// Context over saved preferences, or over a throwaway store set to `--lang`
fn context(
    config: &Config,
    args: &ArgMatches,
) -> Result<LanguageContext, Box<dyn std::error::Error>> {
    let dictionary = config.dictionary()?;
    let ctx = match args.get_one::<String>("lang") {
        Some(code) => {
            let storage = Arc::new(MemoryStorage::new());
            let ctx = LanguageContext::new(HeadlessPage::new(), storage, None);
            if !ctx.change_language(code) {
                return Err(format!("Unsupported language: {}", code).into());
            }
            ctx
        }
        None => {
            let locale = language::system_locale();
            LanguageContext::new(HeadlessPage::new(), storage(config), locale.as_deref())
        }
    };
    Ok(ctx.with_dictionary(dictionary))
}

fn list_languages() -> CliResult {
    for lang in language::supported_languages() {
        println!("{}\t{}\t{}", lang.code, lang.name, lang.code.direction());
    }
    Ok(())
}

fn show(config: &Config) -> CliResult {
    let locale = language::system_locale();
    let ctx = LanguageContext::new(HeadlessPage::new(), storage(config), locale.as_deref());
    let preference = ctx.preference();
    println!("{}", serde_json::to_string_pretty(&preference)?);
    Ok(())
}

fn set(config: &Config, args: &ArgMatches) -> CliResult {
    let code = args
        .get_one::<String>("code")
        .ok_or("missing language code")?;
    let locale = language::system_locale();
    let ctx = LanguageContext::new(HeadlessPage::new(), storage(config), locale.as_deref());
    if !ctx.change_language(code) {
        return Err(format!("Unsupported language: {}", code).into());
    }
    println!("{} ({})", ctx.current_language_name(), ctx.language());
    Ok(())
}

fn translate_label(config: &Config, args: &ArgMatches) -> CliResult {
    let phrase = args.get_one::<String>("phrase").ok_or("missing phrase")?;
    let ctx = context(config, args)?;
    println!("{}", ctx.t(phrase));
    Ok(())
}

async fn translate_text(config: &Config, args: &ArgMatches) -> CliResult {
    let phrase = args.get_one::<String>("phrase").ok_or("missing phrase")?;
    let mut ctx = context(config, args)?;

    if args.get_flag("mock") {
        ctx = ctx.with_translator(Arc::new(MockTranslator::new(MockMode::Suffix)));
    } else {
        match config.translator()? {
            Some(translator) => ctx = ctx.with_translator(translator),
            None => warn!(
                "{} not set, falling back to the untranslated text (use --mock to try it out)",
                API_KEY_VAR
            ),
        }
    }

    // Labels the dictionary knows never need the network
    let label = ctx.t(phrase);
    let result = if label != *phrase {
        label
    } else {
        ctx.translate_async(phrase).await
    };
    println!("{}", result);
    Ok(())
}

async fn drive_bridge(config: &Config, args: &ArgMatches) -> CliResult {
    let code = args.get_one::<String>("code").ok_or("missing language code")?;
    let page = HeadlessPage::with_autoload(Duration::from_millis(200));
    let ctx = LanguageContext::new(page.clone(), Arc::new(MemoryStorage::new()), None)
        .with_dictionary(config.dictionary()?);

    if !ctx.select_language(code) {
        return Err(format!("Unsupported language: {}", code).into());
    }

    let bridge = ctx.bridge();
    let retry = bridge.config().retry_interval;
    let deadline = retry * (bridge.config().max_retries + 2);
    let started = tokio::time::Instant::now();
    while bridge.pending_tasks() > 0 && started.elapsed() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let control_value = page
        .control(&bridge.config().control_class)
        .and_then(|control| control.value());
    info!("Bridge finished in state {:?}", bridge.state());
    println!(
        "state={:?} dir={} control={}",
        bridge.state(),
        ctx.preference().direction(),
        control_value.as_deref().unwrap_or("-")
    );

    if bridge.state() != BridgeState::Ready && !ctx.language().is_default() {
        warn!("Translation widget did not become ready");
    }
    Ok(())
}
