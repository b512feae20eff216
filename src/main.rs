use clap::{Arg, ArgAction, Command};
use fakecheck_i18n::{
    DirSource, DocumentSource, FilePreferences, HttpSource, I18n, LANGUAGE_PREFERENCE_KEY,
    MemoryPreferences, Params, PreferenceStore, Translated, list_languages, preferred_language,
    system_language,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("fakecheck-i18n")
        .version("0.1.0")
        .about("Resolve translation keys for the fakecheck tool")
        .arg(
            Arg::new("key")
                .help("Translation key, e.g. home.title or tips.source.items[0]")
                .required_unless_present("list")
                .index(1),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Language tag (default: saved preference, then system language)"),
        )
        .arg(
            Arg::new("locales")
                .long("locales")
                .help("Directory holding {lang}/common.json and {lang}/home.json")
                .default_value("locales"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Fetch documents from {base-url}/locales/... instead of a directory"),
        )
        .arg(
            Arg::new("param")
                .long("param")
                .short('p')
                .help("Placeholder value as name=value (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("prefs")
                .long("prefs")
                .help("Preferences file used to read and save the preferred language"),
        )
        .arg(
            Arg::new("save")
                .long("save")
                .help("Remember --lang as the preferred language")
                .requires("lang")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List the languages available in the locales directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log document loading and key fallbacks")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .init();

    let locales = matches.get_one::<String>("locales").map(String::as_str).unwrap_or("locales");

    if matches.get_flag("list") {
        for lang in list_languages(Path::new(locales))? {
            println!("{}", lang);
        }
        return Ok(());
    }

    let mut prefs: Box<dyn PreferenceStore> = match matches.get_one::<String>("prefs") {
        Some(path) => Box::new(FilePreferences::open(path)?),
        None => Box::new(MemoryPreferences::new()),
    };

    let lang = match matches.get_one::<String>("lang") {
        Some(lang) => lang.clone(),
        None => preferred_language(prefs.as_ref(), system_language().as_deref()),
    };

    let source: Box<dyn DocumentSource> = match matches.get_one::<String>("base-url") {
        Some(url) => Box::new(HttpSource::new(url)?),
        None => Box::new(DirSource::new(locales)),
    };

    let mut i18n = I18n::new();
    let report = if matches.get_flag("save") {
        i18n.switch_language(&lang, source.as_ref(), prefs.as_mut()).await
    } else {
        i18n.load(&lang, source.as_ref()).await
    };

    if report.is_fallback_only() {
        eprintln!(
            "⚠️  No documents for '{}' in {}, using built-in fallback",
            lang,
            source.describe()
        );
    }
    if matches.get_flag("save") {
        if let Some(saved) = prefs.get(LANGUAGE_PREFERENCE_KEY) {
            eprintln!("💾 Preferred language: {}", saved);
        }
    }

    let mut params = Params::new();
    for pair in matches.get_many::<String>("param").into_iter().flatten() {
        match pair.split_once('=') {
            Some((name, value)) => params = params.with(name, value),
            None => return Err(format!("Invalid --param '{}', expected name=value", pair).into()),
        }
    }

    let key = matches.get_one::<String>("key").map(String::as_str).unwrap_or_default();
    match i18n.t_with(key, &params) {
        Translated::Text(text) => println!("{}", text),
        Translated::List(items) => {
            for item in items {
                println!("{}", item);
            }
        }
        Translated::Tree(tree) => println!("{}", serde_json::to_string_pretty(tree)?),
    }

    Ok(())
}
